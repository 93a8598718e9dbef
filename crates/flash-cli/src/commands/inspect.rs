//! Inspect command - show attributes, kinds and roles of a data file.

use std::path::PathBuf;

use colored::Colorize;
use flash::schema::{classify, parse_name_list};
use flash::{AttributeKind, AttributeRole, RolePartition};

pub fn run(
    file: PathBuf,
    quasi_identifiers: Option<String>,
    sensitive: Option<String>,
    json_output: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (relation, source) = super::read_relation(&file, None, None)?;

    let columns = relation.attribute_names();
    let qi = match quasi_identifiers.as_deref() {
        Some(list) => parse_name_list(list),
        None => columns.iter().map(|c| c.to_string()).collect(),
    };
    let sens = sensitive.as_deref().map(parse_name_list).unwrap_or_default();
    let partition: RolePartition = classify(&columns, &qi, &sens)?;

    if json_output {
        let status = serde_json::json!({
            "source": source,
            "relation": relation.name,
            "attributes": relation.attributes(),
            "partition": partition,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!(
        "{} {} ({} format, {} rows)",
        "Relation".cyan().bold(),
        relation.name.white(),
        source.format,
        source.row_count
    );
    println!();

    for (index, attribute) in relation.attributes().iter().enumerate() {
        let kind = match &attribute.kind {
            AttributeKind::Nominal { values } => format!("nominal ({} values)", values.len()),
            AttributeKind::Numeric => "numeric".to_string(),
            AttributeKind::String => "string".to_string(),
        };
        let missing = relation.column_values(index).filter(|v| v.is_missing()).count();

        let role = match partition.role_of(&attribute.name) {
            Some(AttributeRole::QuasiIdentifying) => "quasi-identifying".yellow(),
            Some(AttributeRole::Sensitive) => "sensitive".red(),
            _ => "insensitive".normal(),
        };

        println!("  {:20} {:22} {}", attribute.name.white(), kind, role);
        if verbose && missing > 0 {
            println!("  {:20} {} missing", "", missing.to_string().dimmed());
        }
        if verbose {
            if let Some(domain) = attribute.domain() {
                let preview: Vec<&str> = domain.iter().take(8).map(String::as_str).collect();
                let more = if domain.len() > 8 { ", ..." } else { "" };
                println!("  {:20} {{{}{}}}", "", preview.join(", ").dimmed(), more);
            }
        }
    }

    Ok(())
}
