// Rental Service - the front-desk workflows
//
// search:   typed canonical name → aliases → matching roster guests
// loan:     guest from the last search + item/serial/staff → open loan
// return:   loan id + returning staff → returned loan

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use crate::aliases::AliasRegistry;
use crate::catalog::ItemCatalog;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::{RentalError, Result};
use crate::ledger::{LoanId, LoanLedger, LoanRecord};
use crate::roster::{importer_for_path, GuestDirectory, GuestRecord, RosterImporter};

/// One session's stores plus the search results the operator is looking at
pub struct RentalService {
    aliases: AliasRegistry,
    directory: GuestDirectory,
    ledger: LoanLedger,
    catalog: ItemCatalog,
    last_results: RwLock<Vec<GuestRecord>>,
}

impl RentalService {
    pub fn new(
        aliases: AliasRegistry,
        directory: GuestDirectory,
        ledger: LoanLedger,
        catalog: ItemCatalog,
    ) -> Self {
        RentalService {
            aliases,
            directory,
            ledger,
            catalog,
            last_results: RwLock::new(Vec::new()),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(config: &Config, clock: Arc<dyn Clock>) -> Result<Self> {
        let aliases = AliasRegistry::seeded(config.aliases.iter())?;
        Ok(Self::new(
            aliases,
            GuestDirectory::new(),
            LoanLedger::with_clock(config.policy.open_loans, clock),
            config.items.clone(),
        ))
    }

    // ========================================================================
    // ROSTER
    // ========================================================================

    /// Replace the roster snapshot; loans and last search results are kept
    pub fn import_roster(&self, guests: Vec<GuestRecord>) -> usize {
        let count = guests.len();
        self.directory.replace_all(guests);
        count
    }

    pub fn import_roster_document(&self, importer: &dyn RosterImporter, document: &str) -> usize {
        let guests = importer.parse(document);
        tracing::info!(format = importer.format(), guests = guests.len(), "roster imported");
        self.import_roster(guests)
    }

    /// Import a roster file, choosing the format from its extension
    pub fn import_roster_file(&self, path: &Path) -> Result<usize> {
        let importer = importer_for_path(path);
        let guests = importer.parse_file(path)?;
        tracing::info!(
            format = importer.format(),
            path = %path.display(),
            guests = guests.len(),
            "roster imported"
        );
        Ok(self.import_roster(guests))
    }

    pub fn guest_count(&self) -> usize {
        self.directory.len()
    }

    // ========================================================================
    // ALIASES + SEARCH
    // ========================================================================

    pub fn add_alias(&self, canonical: &str, alias: &str) -> Result<()> {
        self.aliases.add_alias(canonical, alias)
    }

    pub fn aliases(&self) -> &AliasRegistry {
        &self.aliases
    }

    /// Guests matching any alias registered under exactly `query`
    ///
    /// A query with no registered aliases finds nobody. The result replaces
    /// the previous search results.
    pub fn search(&self, query: &str) -> Vec<GuestRecord> {
        let aliases = self.aliases.resolve(query);
        let results = self.directory.filter_by_aliases(aliases.as_slice());

        tracing::debug!(
            query = query.trim(),
            aliases = aliases.len(),
            results = results.len(),
            "guest search"
        );

        *self.last_results.write().unwrap_or_else(PoisonError::into_inner) = results.clone();
        results
    }

    pub fn last_results(&self) -> Vec<GuestRecord> {
        self.last_results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    // ========================================================================
    // LOANS
    // ========================================================================

    /// Lend an item to a guest picked from the last search results
    pub fn register_loan(
        &self,
        guest: &GuestRecord,
        item: &str,
        serial_number: &str,
        staff: &str,
    ) -> Result<LoanRecord> {
        let listed = self
            .last_results
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(guest);
        if !listed {
            return Err(RentalError::validation(
                "guest",
                format!("{} is not in the current search results", guest.name),
            ));
        }

        if !self.catalog.contains(item) {
            tracing::debug!(item, "item not in catalog");
        }

        self.ledger
            .register(&guest.name, &guest.room, item, serial_number, staff)
    }

    pub fn return_loan(&self, loan_id: LoanId, staff: &str) -> Result<LoanRecord> {
        self.ledger.mark_returned(loan_id, staff)
    }

    pub fn list_loans(&self) -> Vec<LoanRecord> {
        self.ledger.list()
    }

    pub fn open_loans(&self) -> Vec<LoanRecord> {
        self.ledger.open_loans()
    }

    pub fn loans_for_guest(&self, guest: &GuestRecord) -> Vec<LoanRecord> {
        self.ledger.loans_for_guest(&guest.name, &guest.room)
    }

    pub fn catalog(&self) -> &ItemCatalog {
        &self.catalog
    }
}

// ============================================================================
// TESTS
// ============================================================================
