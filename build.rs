//! Build script: validates formalities.json at compile time.

use std::collections::HashSet;
use std::path::PathBuf;

fn main() {
    let manifest_dir =
        std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR set by Cargo");
    let config_path: PathBuf = [&manifest_dir, "config", "formalities.json"]
        .iter()
        .collect();
    println!("cargo:rerun-if-changed={}", config_path.display());
    let json = std::fs::read_to_string(&config_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read {}: {}. formalities.json must exist and be valid.",
            config_path.display(),
            e
        )
    });
    #[derive(serde::Deserialize)]
    struct FormalityEntry {
        name: String,
        label: String,
        instructions: String,
    }
    let entries: Vec<FormalityEntry> = serde_json::from_str(&json).unwrap_or_else(|e| {
        panic!(
            "formalities.json is invalid JSON: {}. Fix the file and rebuild.",
            e
        )
    });
    if entries.is_empty() {
        panic!("formalities.json must list at least one formality level");
    }
    let mut seen = HashSet::new();
    for entry in &entries {
        if entry.name.trim().is_empty()
            || entry.label.trim().is_empty()
            || entry.instructions.trim().is_empty()
        {
            panic!("formalities.json: every entry needs a name, label and instructions");
        }
        if !seen.insert(entry.name.to_lowercase()) {
            panic!("formalities.json: duplicate formality '{}'", entry.name);
        }
    }
}
