//! Hierarchy command - show the hierarchy used for an attribute.

use std::path::PathBuf;

use colored::Colorize;
use flash::{FlashConfig, HierarchyLoader, HierarchySource};

pub fn run(
    file: PathBuf,
    attribute: String,
    config: Option<PathBuf>,
    hierarchy_dir: Option<PathBuf>,
    relation: Option<String>,
    json_output: bool,
    _verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match config {
        Some(ref path) => FlashConfig::load(path)?,
        None => FlashConfig::default(),
    };
    if let Some(dir) = hierarchy_dir {
        config = config.with_hierarchy_dir(dir);
    }
    if !config.hierarchy_dir.is_dir() {
        return Err(format!("Not a directory: {}", config.hierarchy_dir.display()).into());
    }

    let (relation, _) = super::read_relation(&file, relation, None)?;
    let loader = loader_for(&config, &relation.name)?;
    let loaded = loader.build(&attribute, &relation)?;

    if json_output {
        let status = serde_json::json!({
            "attribute": attribute,
            "source": loaded.source,
            "levels": loaded.hierarchy.max_level(),
            "rows": loaded.hierarchy.rows(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let source = match &loaded.source {
        HierarchySource::File { path } => path.display().to_string(),
        HierarchySource::Synthesized => format!(
            "synthesized (no {} found)",
            loader.path_for(&attribute).display()
        ),
    };

    println!(
        "{} {}",
        "Hierarchy for".cyan().bold(),
        attribute.white()
    );
    println!("Source: {}", source);
    println!(
        "Levels: {}, entries: {}",
        loaded.hierarchy.max_level().to_string().white().bold(),
        loaded.hierarchy.len()
    );
    println!();

    for row in loaded.hierarchy.rows() {
        let Some((raw, rest)) = row.split_first() else {
            continue;
        };
        let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
        println!("  {:20} {}", raw.white(), rest.join(" -> ").dimmed());
    }

    Ok(())
}

/// The loader `anonymize` would use under the same configuration.
fn loader_for(
    config: &FlashConfig,
    relation: &str,
) -> Result<HierarchyLoader, Box<dyn std::error::Error>> {
    Ok(HierarchyLoader::new(&config.hierarchy_dir, relation)
        .with_delimiter(config.delimiter_byte()?)
        .with_extension(config.hierarchy_extension.clone())
        .with_numeric_policy(config.numeric_policy))
}
