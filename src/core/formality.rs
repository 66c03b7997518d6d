//! Formality levels: how rigorous a generated proof should be.
//!
//! The catalogue lives in `config/formalities.json`, embedded at compile time
//! and validated by `build.rs`.

use std::sync::OnceLock;

use serde::Deserialize;

/// Level used when none is given.
pub const DEFAULT: &str = "semiformal";

const CATALOGUE: &str = include_str!("../../config/formalities.json");

/// One presentation style for proofs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Formality {
    pub name: String,
    pub label: String,
    pub instructions: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FormalityError {
    #[error("Unknown formality '{name}' (known: {known})")]
    Unknown { name: String, known: String },
}

/// All formality levels, in catalogue order.
pub fn all() -> &'static [Formality] {
    static LEVELS: OnceLock<Vec<Formality>> = OnceLock::new();
    LEVELS.get_or_init(|| {
        // build.rs rejects a malformed catalogue, so this only fails on a broken build.
        serde_json::from_str(CATALOGUE).unwrap_or_else(|e| {
            log::error!("Embedded formalities.json is invalid: {}", e);
            Vec::new()
        })
    })
}

/// Look up a level by name, case-insensitively.
pub fn find(name: &str) -> Result<&'static Formality, FormalityError> {
    let wanted = name.trim();
    all()
        .iter()
        .find(|f| f.name.eq_ignore_ascii_case(wanted))
        .ok_or_else(|| FormalityError::Unknown {
            name: wanted.to_string(),
            known: all()
                .iter()
                .map(|f| f.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        })
}
