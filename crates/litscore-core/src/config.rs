//! litscore configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Top-level litscore configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LitscoreConfig {
    /// Question bank TOML; the bundled bank is used when unset.
    #[serde(default)]
    pub bank: Option<PathBuf>,
    /// JSON file holding every scored record.
    #[serde(default = "default_store_path")]
    pub store_path: PathBuf,
    /// Bins for the population histogram.
    #[serde(default = "default_histogram_bins")]
    pub histogram_bins: usize,
    /// Respondent fields that cohort reports break totals down by.
    #[serde(default = "default_group_fields")]
    pub group_fields: Vec<String>,
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./litscore-data/records.json")
}
fn default_histogram_bins() -> usize {
    20
}
fn default_group_fields() -> Vec<String> {
    vec!["major".into(), "grade".into(), "data_exp".into()]
}

impl Default for LitscoreConfig {
    fn default() -> Self {
        Self {
            bank: None,
            store_path: default_store_path(),
            histogram_bins: default_histogram_bins(),
            group_fields: default_group_fields(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied through as-is and never expanded again.
/// Unset variables expand to an empty string with a warning.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        let var_name = &rest[start + 2..start + len];
        result.push_str(&rest[..start]);
        match std::env::var(var_name) {
            Ok(value) => result.push_str(&value),
            Err(_) => tracing::warn!("environment variable {var_name} is not set in {s:?}"),
        }
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_path(p: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&p.to_string_lossy()))
}

/// Load config from an explicit path, or search the default locations.
///
/// Search order without a path:
/// 1. `litscore.toml` in the current directory
/// 2. `~/.config/litscore/config.toml`
///
/// Environment variable overrides: `LITSCORE_STORE`, `LITSCORE_BANK`.
pub fn load_config_from(path: Option<&Path>) -> Result<LitscoreConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("litscore.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = parse_config_str(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!("loaded config from {}", path.display());
            config
        }
        None => LitscoreConfig::default(),
    };

    if let Ok(store) = std::env::var("LITSCORE_STORE") {
        config.store_path = PathBuf::from(store);
    }
    if let Ok(bank) = std::env::var("LITSCORE_BANK") {
        config.bank = Some(PathBuf::from(bank));
    }

    config.store_path = resolve_path(&config.store_path);
    config.bank = config.bank.as_deref().map(resolve_path);

    Ok(config)
}

/// Parse a config TOML string without applying environment overrides.
pub fn parse_config_str(content: &str) -> Result<LitscoreConfig> {
    Ok(toml::from_str(content)?)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("litscore"))
}
