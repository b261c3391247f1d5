//! Verify command implementation.
//!
//! Checks the index artifact against the key and type set of the data
//! artifact. Field values cannot be recomputed without the application's
//! record types, so a key filed under the wrong value goes unnoticed here;
//! `Database::verify_indexes` covers that case.

use super::{open_artifacts, CliError, IndexArtifact, RawArtifacts};
use prevail_core::TypeIdentity;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// Verification result.
#[derive(Debug, Default)]
pub struct VerifyResult {
    /// Number of records in the data artifact.
    pub records_checked: usize,
    /// Number of indexes checked.
    pub indexes_checked: usize,
    /// Number of index entries checked.
    pub entries_checked: usize,
    /// Records of an indexed type that no bucket lists. Not an error: a
    /// record whose type has no such field is never indexed.
    pub unindexed_records: usize,
    /// List of errors found.
    pub errors: Vec<String>,
    /// Non-fatal observations.
    pub warnings: Vec<String>,
}

impl VerifyResult {
    /// True when no errors were found.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Runs the verify command.
pub fn run(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying database at {:?}", path);
    println!();

    let raw = open_artifacts(path)?;
    let result = verify(&raw);
    print_result(&result);

    println!();
    if result.is_ok() {
        println!("✓ Database verification passed");
        Ok(())
    } else {
        println!("✗ Database verification failed");
        Err(CliError::VerificationFailed(result.errors.len()).into())
    }
}

/// Checks decoded artifacts for consistency.
pub fn verify(raw: &RawArtifacts) -> VerifyResult {
    let mut result = VerifyResult {
        records_checked: raw.data.records.len(),
        ..VerifyResult::default()
    };

    let mut records: HashMap<&str, &TypeIdentity> = HashMap::new();
    for record in &raw.data.records {
        if records.insert(&record.key, &record.identity).is_some() {
            result
                .errors
                .push(format!("duplicate key in data artifact: {}", record.key));
        }
    }

    let snapshot = match &raw.index {
        IndexArtifact::Missing => {
            result
                .warnings
                .push("index artifact missing; declared indexes are rebuilt on open".into());
            return result;
        }
        IndexArtifact::Corrupt(err) => {
            result
                .warnings
                .push(format!("index artifact unreadable ({err}); rebuilt on open"));
            return result;
        }
        IndexArtifact::Loaded(snapshot) => snapshot,
    };

    let mut definitions = HashSet::new();
    for index in &snapshot.indexes {
        result.indexes_checked += 1;
        let definition = &index.definition;
        if !definitions.insert(definition) {
            result
                .errors
                .push(format!("index {definition} appears more than once"));
            continue;
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for (value, keys) in &index.buckets {
            for key in keys {
                result.entries_checked += 1;
                match records.get(key.as_str()) {
                    None => result.errors.push(format!(
                        "index {definition}: key {key} under {value:?} is not in the data artifact"
                    )),
                    Some(identity) if **identity != definition.identity => {
                        result.errors.push(format!(
                            "index {definition}: key {key} holds a {identity}"
                        ));
                    }
                    Some(_) => {}
                }
                if !seen.insert(key) {
                    result.errors.push(format!(
                        "index {definition}: key {key} is listed under more than one value"
                    ));
                }
            }
        }

        result.unindexed_records += records
            .iter()
            .filter(|(key, identity)| {
                ***identity == definition.identity && !seen.contains(**key)
            })
            .count();
    }

    result
}

fn print_result(result: &VerifyResult) {
    println!("  Records checked:   {}", result.records_checked);
    println!("  Indexes checked:   {}", result.indexes_checked);
    println!("  Entries checked:   {}", result.entries_checked);
    println!("  Unindexed records: {}", result.unindexed_records);

    for warning in &result.warnings {
        println!("  warning: {}", warning);
    }
    if !result.errors.is_empty() {
        println!("  Errors:");
        for error in result.errors.iter().take(20) {
            println!("    - {}", error);
        }
        if result.errors.len() > 20 {
            println!("    ... and {} more errors", result.errors.len() - 20);
        }
    }
}
