// Guest roster - import + snapshot
//
// A roster is whatever the property-management system exported last. It has
// no stable guest IDs, so each import fully replaces the previous snapshot.

pub mod csv_import;
pub mod directory;
pub mod xml_import;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{RentalError, Result};

pub use csv_import::CsvRosterImporter;
pub use directory::GuestDirectory;
pub use xml_import::XmlRosterImporter;

/// One guest as imported
///
/// Fields hold the raw text from the document; missing fields are "".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GuestRecord {
    pub name: String,
    pub room: String,
    pub checkout_date: String,
}

impl GuestRecord {
    pub fn new(
        name: impl Into<String>,
        room: impl Into<String>,
        checkout_date: impl Into<String>,
    ) -> Self {
        GuestRecord {
            name: name.into(),
            room: room.into(),
            checkout_date: checkout_date.into(),
        }
    }
}

/// Turns an uploaded document into guest records
///
/// Importers never fail on content: a document they cannot read yields an
/// empty list, and a guest block with missing fields yields empty strings.
pub trait RosterImporter: Send + Sync {
    fn parse(&self, document: &str) -> Vec<GuestRecord>;

    /// Short format name for logs
    fn format(&self) -> &'static str;

    /// Read a file and parse it; only I/O failures are errors
    ///
    /// Bytes that are not UTF-8 (EUC-KR exports, truncated files) are
    /// replaced with U+FFFD rather than rejecting the file.
    fn parse_file(&self, path: &Path) -> Result<Vec<GuestRecord>> {
        let bytes = std::fs::read(path).map_err(|source| RentalError::io(path, source))?;
        Ok(self.parse(&String::from_utf8_lossy(&bytes)))
    }
}

/// Pick an importer from the file extension (`.csv` → CSV, anything else → XML)
pub fn importer_for_path(path: &Path) -> Box<dyn RosterImporter> {
    let is_csv = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        Box::new(CsvRosterImporter::new())
    } else {
        Box::new(XmlRosterImporter::new())
    }
}
