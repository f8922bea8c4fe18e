//! Subcommand implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use litscore_core::config::{load_config_from, LitscoreConfig};
use litscore_core::model::QuestionBank;
use litscore_core::parser::load_bank;

pub mod init;
pub mod stats;
pub mod submit;
pub mod validate;
pub mod weights;

/// Parse a `key=value` respondent field.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{s}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

/// Config plus the question bank it selects (a `--bank` flag wins).
pub fn load_context(
    config_path: Option<&Path>,
    bank_override: Option<PathBuf>,
) -> Result<(LitscoreConfig, Arc<QuestionBank>)> {
    let config = load_config_from(config_path)?;
    let bank_path = bank_override.or_else(|| config.bank.clone());
    let bank = load_bank(bank_path.as_deref())?;
    tracing::debug!(
        bank = bank.id(),
        dimensions = bank.dimensions().len(),
        "question bank loaded"
    );
    Ok((config, Arc::new(bank)))
}
