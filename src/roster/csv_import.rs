// CSV roster import
//
// Header row required. Columns are located by name, falling back to
// name,room,checkout order when the header is not recognized.
// Example:
//   name,room,checkout
//   "MINSEO KIM",204,2024-12-27

use csv::{ReaderBuilder, StringRecord, Trim};

use super::{GuestRecord, RosterImporter};

const NAME_HEADERS: &[&str] = &["name", "guest_name", "guest"];
const ROOM_HEADERS: &[&str] = &["room", "room_no", "room_number"];
const CHECKOUT_HEADERS: &[&str] = &["checkout", "checkout_date", "departure"];

#[derive(Debug, Clone, Copy, Default)]
pub struct CsvRosterImporter;

impl CsvRosterImporter {
    pub fn new() -> Self {
        CsvRosterImporter
    }
}

/// Column positions for the three guest fields
struct Columns {
    name: Option<usize>,
    room: Option<usize>,
    checkout: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Self {
        let find = |candidates: &[&str]| {
            headers.iter().position(|header| {
                let header = header.trim().to_lowercase();
                candidates.iter().any(|candidate| header == *candidate)
            })
        };

        let columns = Columns {
            name: find(NAME_HEADERS),
            room: find(ROOM_HEADERS),
            checkout: find(CHECKOUT_HEADERS),
        };

        if columns.name.is_none() && columns.room.is_none() && columns.checkout.is_none() {
            Columns {
                name: Some(0),
                room: Some(1),
                checkout: Some(2),
            }
        } else {
            columns
        }
    }

    fn field(record: &StringRecord, index: Option<usize>) -> String {
        index
            .and_then(|i| record.get(i))
            .unwrap_or("")
            .to_string()
    }

    fn guest(&self, record: &StringRecord) -> GuestRecord {
        GuestRecord {
            name: Self::field(record, self.name),
            room: Self::field(record, self.room),
            checkout_date: Self::field(record, self.checkout),
        }
    }
}

impl RosterImporter for CsvRosterImporter {
    fn parse(&self, document: &str) -> Vec<GuestRecord> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(document.as_bytes());

        let columns = match reader.headers() {
            Ok(headers) => Columns::from_headers(headers),
            Err(err) => {
                tracing::warn!(error = %err, "unreadable CSV roster header, importing nothing");
                return Vec::new();
            }
        };

        let mut guests = Vec::new();
        for (index, result) in reader.records().enumerate() {
            let record = match result {
                Ok(record) => record,
                Err(err) => {
                    tracing::warn!(
                        line = index + 2,
                        error = %err,
                        "malformed CSV roster, importing nothing"
                    );
                    return Vec::new();
                }
            };

            if record.iter().all(|field| field.is_empty()) {
                continue;
            }
            guests.push(columns.guest(&record));
        }

        guests
    }

    fn format(&self) -> &'static str {
        "csv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_named_columns() {
        let doc = "room,name,checkout\n204,MINSEO KIM,2024-12-27\n310,\"Choi, Mina\",2024-12-26\n";

        let guests = CsvRosterImporter::new().parse(doc);

        assert_eq!(
            guests,
            vec![
                GuestRecord::new("MINSEO KIM", "204", "2024-12-27"),
                GuestRecord::new("Choi, Mina", "310", "2024-12-26"),
            ]
        );
    }

    #[test]
    fn test_parse_departure_alias_header() {
        let doc = "GUEST_NAME,ROOM,DEPARTURE\nSeonhwa Lee,118,2024-12-28\n";

        let guests = CsvRosterImporter::new().parse(doc);

        assert_eq!(guests, vec![GuestRecord::new("Seonhwa Lee", "118", "2024-12-28")]);
    }

    #[test]
    fn test_parse_positional_fallback() {
        let doc = "Guest,Zimmer,Abreise\nMINSEO KIM,204,2024-12-27\n";

        let guests = CsvRosterImporter::new().parse(doc);

        // "Guest" is recognized, the other two are not
        assert_eq!(guests, vec![GuestRecord::new("MINSEO KIM", "", "")]);

        let doc = "Gast,Zimmer,Abreise\nMINSEO KIM,204,2024-12-27\n";
        let guests = CsvRosterImporter::new().parse(doc);
        assert_eq!(guests, vec![GuestRecord::new("MINSEO KIM", "204", "2024-12-27")]);
    }

    #[test]
    fn test_missing_fields_become_empty() {
        let doc = "name,room,checkout\nMINSEO KIM\n,512\n";

        let guests = CsvRosterImporter::new().parse(doc);

        assert_eq!(
            guests,
            vec![
                GuestRecord::new("MINSEO KIM", "", ""),
                GuestRecord::new("", "512", ""),
            ]
        );
    }

    #[test]
    fn test_blank_rows_skipped() {
        let doc = "name,room,checkout\n,,\nMINSEO KIM,204,\n";

        let guests = CsvRosterImporter::new().parse(doc);

        assert_eq!(guests.len(), 1);
    }

    #[test]
    fn test_empty_document() {
        assert!(CsvRosterImporter::new().parse("").is_empty());
    }
}
