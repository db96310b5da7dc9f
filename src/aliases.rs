// Alias Registry - native-script name → romanized spellings
//
// "김민서" is what the front desk types, "MINSEO KIM" is what the PMS export
// holds. The registry bridges the two; matching itself lives in the directory.

use std::collections::{BTreeMap, HashMap};
use std::sync::{PoisonError, RwLock};

use crate::error::{require_non_blank, Result};

/// Canonical name → ordered, de-duplicated alias list
///
/// Append-only for the lifetime of a session.
#[derive(Debug, Default)]
pub struct AliasRegistry {
    entries: RwLock<HashMap<String, Vec<String>>>,
}

impl AliasRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from configured seed aliases
    ///
    /// Fails on the first blank canonical name or alias.
    pub fn seeded<'a, I, A>(seed: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a String, A)>,
        A: IntoIterator<Item = &'a String>,
    {
        let registry = Self::new();
        for (canonical, aliases) in seed {
            for alias in aliases {
                registry.add_alias(canonical, alias)?;
            }
        }
        Ok(registry)
    }

    /// Aliases registered under the exact (trimmed) canonical name
    pub fn resolve(&self, canonical: &str) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(canonical.trim())
            .cloned()
            .unwrap_or_default()
    }

    /// Append an alias, creating the entry if absent
    ///
    /// An alias already present (ignoring case) is dropped silently.
    pub fn add_alias(&self, canonical: &str, alias: &str) -> Result<()> {
        let canonical = require_non_blank("canonical_name", canonical)?;
        let alias = require_non_blank("alias", alias)?;

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let aliases = entries.entry(canonical.to_string()).or_default();

        let lower = alias.to_lowercase();
        if aliases.iter().any(|existing| existing.to_lowercase() == lower) {
            tracing::debug!(canonical, alias, "alias already registered");
            return Ok(());
        }

        aliases.push(alias.to_string());
        tracing::info!(canonical, alias, total = aliases.len(), "alias added");
        Ok(())
    }

    /// Sorted canonical names
    pub fn canonical_names(&self) -> Vec<String> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = entries.keys().cloned().collect();
        names.sort();
        names
    }

    /// Full mapping, sorted by canonical name
    pub fn snapshot(&self) -> BTreeMap<String, Vec<String>> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .map(|(name, aliases)| (name.clone(), aliases.clone()))
            .collect()
    }

    /// Number of canonical names
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
