// Guest Loans - Core Library
// Roster import, alias search and the loan ledger behind the front-desk shell

pub mod aliases;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod ledger;
pub mod logging;
pub mod roster;
pub mod service;

// Re-export commonly used types
pub use aliases::AliasRegistry;
pub use catalog::{ItemCatalog, DEFAULT_ITEMS};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{Config, LoggingConfig, PolicyConfig};
pub use error::{RentalError, Result};
pub use ledger::{LoanId, LoanLedger, LoanRecord, LoanStatus, OpenLoanPolicy};
pub use roster::{
    importer_for_path, CsvRosterImporter, GuestDirectory, GuestRecord, RosterImporter,
    XmlRosterImporter,
};
pub use service::RentalService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
