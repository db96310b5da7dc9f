use std::sync::{PoisonError, RwLock};

use super::GuestRecord;

/// Current roster snapshot
#[derive(Debug, Default)]
pub struct GuestDirectory {
    guests: RwLock<Vec<GuestRecord>>,
}

impl GuestDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole snapshot (no merge with the previous one)
    pub fn replace_all(&self, records: Vec<GuestRecord>) {
        let mut guests = self.guests.write().unwrap_or_else(PoisonError::into_inner);
        let previous = guests.len();
        *guests = records;
        tracing::info!(previous, current = guests.len(), "roster snapshot replaced");
    }

    /// Guests whose name contains any alias, case-insensitively, in roster order
    ///
    /// No aliases means no results, never the whole roster. Blank aliases are
    /// skipped for the same reason.
    pub fn filter_by_aliases<S: AsRef<str>>(&self, aliases: &[S]) -> Vec<GuestRecord> {
        let needles: Vec<String> = aliases
            .iter()
            .map(|alias| alias.as_ref().to_lowercase())
            .filter(|alias| !alias.trim().is_empty())
            .collect();

        if needles.is_empty() {
            return Vec::new();
        }

        let guests = self.guests.read().unwrap_or_else(PoisonError::into_inner);
        guests
            .iter()
            .filter(|guest| {
                let name = guest.name.to_lowercase();
                needles.iter().any(|needle| name.contains(needle.as_str()))
            })
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.guests.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
