// Session configuration
//
// JSON file, every field optional:
//   {
//     "items": ["우산", "충전기"],
//     "aliases": { "김민서": ["minseo kim", "kimminseo"] },
//     "policy": { "open_loans": "unlimited" },
//     "logging": { "filter": "info" }
//   }

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::ItemCatalog;
use crate::ledger::OpenLoanPolicy;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub items: ItemCatalog,

    /// Seed aliases: canonical name → alternate spellings
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    pub policy: PolicyConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub open_loans: OpenLoanPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by RUST_LOG
    #[serde(default = "default_logging_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: default_logging_filter(),
        }
    }
}

fn default_logging_filter() -> String {
    "info".to_string()
}

fn default_aliases() -> BTreeMap<String, Vec<String>> {
    let seed: &[(&str, &[&str])] = &[
        ("김민서", &["minseo kim", "kimminseo", "kim minseo", "minseokim"]),
        ("최민아", &["choi mina", "min a choi", "choimina"]),
        ("이선화", &["lee seonhwa", "seonhwa lee"]),
    ];

    seed.iter()
        .map(|(name, aliases)| {
            (
                name.to_string(),
                aliases.iter().map(|a| a.to_string()).collect(),
            )
        })
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            items: ItemCatalog::default(),
            aliases: default_aliases(),
            policy: PolicyConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json(&text)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).context("invalid config JSON")
    }

    /// `load(path)` when a path is given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}
