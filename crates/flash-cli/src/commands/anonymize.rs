//! Anonymize command - run the filter over a data file.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use colored::Colorize;
use flash::{FixedLevelEngine, Flash, FlashConfig, HierarchySource, RelationWriter};
use tracing::debug;

use crate::cli::{AnonymizeArgs, OutputFormat, parse_level};

pub fn run(args: AnonymizeArgs, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = build_config(&args)?;

    let (relation, source) = super::read_relation(&args.file, args.relation.clone(), args.delimiter)?;
    debug!(file = %source.file, hash = %source.hash, "read input");

    println!(
        "{} {} ({} rows, {} attributes)",
        "Anonymizing".cyan().bold(),
        source.file.white(),
        source.row_count,
        source.column_count
    );

    let mut engine = FixedLevelEngine::new().with_default_level(args.default_level);
    for pair in &args.levels {
        let (name, level) = parse_level(pair)?;
        engine = engine.with_level(name, level);
    }

    let flash = Flash::new(engine).with_config(config);
    println!("Options: {}", flash.options_summary().join(" ").white());

    if let Some(ref path) = args.save_config {
        flash.config().save(path)?;
        println!("Saved configuration to {}", path.display().to_string().white());
    }

    let outcome = flash.process(&relation)?;
    let report = &outcome.report;

    if report.skipped {
        println!(
            "{}",
            "Relation has at most one row; written unchanged.".yellow()
        );
    } else {
        if verbose {
            println!();
            println!("{}", "Hierarchies:".yellow().bold());
            for (name, summary) in &report.hierarchies {
                let source = match &summary.source {
                    HierarchySource::File { path } => path.display().to_string(),
                    HierarchySource::Synthesized => "synthesized".to_string(),
                };
                println!(
                    "  {:20} {} levels, {} entries ({})",
                    name, summary.levels, summary.entries, source
                );
            }
            println!();
        }

        println!("{}", "Generalization:".yellow().bold());
        for (name, level) in &report.levels {
            let level = if *level > 0 {
                level.to_string().green()
            } else {
                level.to_string().white()
            };
            println!("  {:20} level {}", name, level);
        }
        if report.suppressed_rows > 0 {
            println!(
                "Suppressed {} rows as outliers",
                report.suppressed_rows.to_string().red()
            );
        }
    }

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.file, &args.format));
    write_output(&outcome.relation, &output, &args.format)?;
    println!(
        "{} {}",
        "Written to".green(),
        output.display().to_string().white()
    );

    if let Some(ref path) = args.report {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), report)?;
        println!("Report written to {}", path.display().to_string().white());
    }

    Ok(())
}

/// Start from the config file, if any, and apply command-line overrides.
fn build_config(args: &AnonymizeArgs) -> Result<FlashConfig, Box<dyn std::error::Error>> {
    let mut config = match args.config {
        Some(ref path) => FlashConfig::load(path)?,
        None => FlashConfig::default(),
    };

    if let Some(ref dir) = args.hierarchy_dir {
        config = config.with_hierarchy_dir(dir);
    }
    if let Some(ref list) = args.quasi_identifiers {
        config = config.with_quasi_identifiers(list);
    }
    if let Some(ref list) = args.sensitive {
        config = config.with_sensitive(list);
    }
    if args.no_k {
        config.criteria.k = None;
    } else if args.k.is_some() {
        config.criteria.k = args.k;
    }
    if args.l.is_some() {
        config.criteria.l = args.l;
    }
    if let Some(variant) = args.variant {
        config.criteria.l_variant = variant;
    }
    if args.t.is_some() {
        config.criteria.t = args.t;
    }
    if let Some(max_outliers) = args.max_outliers {
        config.max_outliers = max_outliers;
    }
    if let Some(metric) = args.metric {
        config.metric = metric;
    }

    Ok(config)
}

fn default_output(file: &Path, format: &OutputFormat) -> PathBuf {
    let stem = file.file_stem().unwrap_or_default().to_string_lossy();
    file.with_file_name(format!("{}.anon.{}", stem, format.extension()))
}

fn write_output(
    relation: &flash::Relation,
    path: &Path,
    format: &OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Csv => RelationWriter::new(b',').write_file(relation, path)?,
        OutputFormat::Tsv => RelationWriter::new(b'\t').write_file(relation, path)?,
        OutputFormat::Json => {
            let file = File::create(path)?;
            RelationWriter::write_json(relation, BufWriter::new(file))?;
        }
    }
    Ok(())
}
