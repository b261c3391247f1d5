//! Inspect command implementation.

use super::{open_artifacts, IndexArtifact, OutputFormat, RawArtifacts};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Database inspection result.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Data file path.
    pub path: String,
    /// Data artifact size in bytes.
    pub data_size: u64,
    /// Index artifact size in bytes.
    pub index_size: u64,
    /// Number of stored records.
    pub record_count: usize,
    /// Record counts per type identity.
    pub types: Vec<TypeStats>,
    /// `present`, `missing` or `corrupt`.
    pub index_status: &'static str,
    /// Decode error for a corrupt index artifact.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_error: Option<String>,
    /// Per-index statistics.
    pub indexes: Vec<IndexStats>,
}

/// Statistics for one record type.
#[derive(Debug, Serialize)]
pub struct TypeStats {
    /// `namespace::name`.
    pub identity: String,
    /// Number of records of this type.
    pub record_count: usize,
}

/// Statistics for a single index.
#[derive(Debug, Serialize)]
pub struct IndexStats {
    /// `namespace::name.field`.
    pub definition: String,
    /// Number of distinct values.
    pub bucket_count: usize,
    /// Number of `(value, key)` entries.
    pub entry_count: usize,
}

/// Runs the inspect command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let format = OutputFormat::parse(format)?;
    let raw = open_artifacts(path)?;
    let result = analyze(path.display().to_string(), &raw);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print_text_output(&result),
    }
    Ok(())
}

/// Summarizes decoded artifacts.
pub fn analyze(path: String, raw: &RawArtifacts) -> InspectResult {
    let mut per_type: BTreeMap<String, usize> = BTreeMap::new();
    for record in &raw.data.records {
        *per_type.entry(record.identity.to_string()).or_default() += 1;
    }
    let types = per_type
        .into_iter()
        .map(|(identity, record_count)| TypeStats {
            identity,
            record_count,
        })
        .collect();

    let (index_status, index_error, indexes) = match &raw.index {
        IndexArtifact::Missing => ("missing", None, Vec::new()),
        IndexArtifact::Corrupt(err) => ("corrupt", Some(err.to_string()), Vec::new()),
        IndexArtifact::Loaded(snapshot) => {
            let stats = snapshot
                .indexes
                .iter()
                .map(|index| IndexStats {
                    definition: index.definition.to_string(),
                    bucket_count: index.buckets.len(),
                    entry_count: index.buckets.iter().map(|(_, keys)| keys.len()).sum(),
                })
                .collect();
            ("present", None, stats)
        }
    };

    InspectResult {
        path,
        data_size: raw.data_size,
        index_size: raw.index_size,
        record_count: raw.data.records.len(),
        types,
        index_status,
        index_error,
        indexes,
    }
}

fn print_text_output(result: &InspectResult) {
    println!("Prevail Database Inspection");
    println!("===========================");
    println!();
    println!("Path: {}", result.path);
    println!();
    println!("Storage:");
    println!("  Data artifact:  {}", format_size(result.data_size));
    println!("  Index artifact: {}", format_size(result.index_size));
    println!();
    println!("Records: {}", result.record_count);
    for stats in &result.types {
        println!("  {:<32} {}", stats.identity, stats.record_count);
    }
    println!();
    match &result.index_error {
        Some(err) => println!("Indexes: corrupt ({err}), rebuilt on next open"),
        None => println!("Indexes: {}", result.index_status),
    }
    for index in &result.indexes {
        println!(
            "  {:<32} {} values, {} entries",
            index.definition, index.bucket_count, index.entry_count
        );
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} bytes", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
