// PMS XML roster import
//
// The in-house guest report is a flat list of G_ROOM blocks:
//
//   <G_ROOM>
//     <ROOM>204</ROOM>
//     <GUEST_NAME>MINSEO KIM</GUEST_NAME>
//     <DEPARTURE>27-DEC-24</DEPARTURE>
//   </G_ROOM>
//
// Only the first occurrence of each field inside a block counts. A G_ROOM
// nested inside another G_ROOM is not a guest of its own: its fields belong
// to the enclosing block. Any XML error discards the whole document.

use quick_xml::events::Event;
use quick_xml::Reader;

use super::{GuestRecord, RosterImporter};

const BLOCK_TAG: &[u8] = b"G_ROOM";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Name,
    Room,
    Checkout,
}

impl Field {
    fn from_tag(tag: &[u8]) -> Option<Self> {
        match tag {
            b"GUEST_NAME" => Some(Field::Name),
            b"ROOM" => Some(Field::Room),
            b"DEPARTURE" => Some(Field::Checkout),
            _ => None,
        }
    }
}

/// Fields collected for the G_ROOM block being read
#[derive(Default)]
struct PendingGuest {
    name: Option<String>,
    room: Option<String>,
    checkout: Option<String>,
}

impl PendingGuest {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::Name => &mut self.name,
            Field::Room => &mut self.room,
            Field::Checkout => &mut self.checkout,
        }
    }

    fn finish(self) -> GuestRecord {
        let clean = |value: Option<String>| value.map(|v| v.trim().to_string()).unwrap_or_default();
        GuestRecord {
            name: clean(self.name),
            room: clean(self.room),
            checkout_date: clean(self.checkout),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct XmlRosterImporter;

impl XmlRosterImporter {
    pub fn new() -> Self {
        XmlRosterImporter
    }

    fn try_parse(document: &str) -> Result<Vec<GuestRecord>, String> {
        let mut reader = Reader::from_str(document);
        reader.config_mut().trim_text(true);

        let mut guests = Vec::new();
        let mut depth = 0usize;
        // Depth of the open G_ROOM element
        let mut block: Option<(usize, PendingGuest)> = None;
        // Field currently receiving text, with the depth of its element
        let mut capture: Option<(Field, usize)> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => {
                    depth += 1;
                    let tag = e.local_name();
                    match block.as_mut() {
                        None if tag.as_ref() == BLOCK_TAG => {
                            block = Some((depth, PendingGuest::default()));
                        }
                        Some((_, pending)) if capture.is_none() => {
                            if let Some(field) = Field::from_tag(tag.as_ref()) {
                                let slot = pending.slot(field);
                                if slot.is_none() {
                                    *slot = Some(String::new());
                                    capture = Some((field, depth));
                                }
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::Empty(e)) => {
                    let tag = e.local_name();
                    match block.as_mut() {
                        // <G_ROOM/> is a guest with every field missing
                        None if tag.as_ref() == BLOCK_TAG => guests.push(GuestRecord::default()),
                        Some((_, pending)) if capture.is_none() => {
                            if let Some(field) = Field::from_tag(tag.as_ref()) {
                                pending.slot(field).get_or_insert_with(String::new);
                            }
                        }
                        _ => {}
                    }
                }
                Ok(Event::End(_)) => {
                    if matches!(capture, Some((_, d)) if d == depth) {
                        capture = None;
                    }
                    if matches!(block, Some((d, _)) if d == depth) {
                        if let Some((_, pending)) = block.take() {
                            guests.push(pending.finish());
                        }
                    }
                    depth = depth.saturating_sub(1);
                }
                Ok(Event::Text(text)) => {
                    if let (Some((field, _)), Some((_, pending))) = (capture, block.as_mut()) {
                        let text = text.unescape().map_err(|e| e.to_string())?;
                        if let Some(value) = pending.slot(field).as_mut() {
                            value.push_str(&text);
                        }
                    }
                }
                Ok(Event::CData(data)) => {
                    if let (Some((field, _)), Some((_, pending))) = (capture, block.as_mut()) {
                        let bytes = data.into_inner();
                        if let Some(value) = pending.slot(field).as_mut() {
                            value.push_str(&String::from_utf8_lossy(&bytes));
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(format!(
                        "error at position {}: {}",
                        reader.error_position(),
                        e
                    ))
                }
                Ok(_) => {}
            }
        }

        if depth != 0 {
            return Err(format!("document ended with {} unclosed element(s)", depth));
        }

        Ok(guests)
    }
}

impl RosterImporter for XmlRosterImporter {
    fn parse(&self, document: &str) -> Vec<GuestRecord> {
        match Self::try_parse(document) {
            Ok(guests) => guests,
            Err(reason) => {
                tracing::warn!(%reason, "malformed XML roster, importing nothing");
                Vec::new()
            }
        }
    }

    fn format(&self) -> &'static str {
        "xml"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_document() -> String {
        r#"<?xml version="1.0" encoding="UTF-8"?>
<INHOUSE>
  <LIST_G_ROOM>
    <G_ROOM>
      <ROOM>204</ROOM>
      <GUEST_NAME>MINSEO KIM</GUEST_NAME>
      <DEPARTURE>2024-12-27</DEPARTURE>
    </G_ROOM>
    <G_ROOM>
      <ROOM>310</ROOM>
      <GUEST_NAME>Choi Mina &amp; Family</GUEST_NAME>
      <DEPARTURE>2024-12-26</DEPARTURE>
    </G_ROOM>
  </LIST_G_ROOM>
</INHOUSE>"#
            .to_string()
    }

    #[test]
    fn test_parse_blocks_in_order() {
        let guests = XmlRosterImporter::new().parse(&create_test_document());

        assert_eq!(
            guests,
            vec![
                GuestRecord::new("MINSEO KIM", "204", "2024-12-27"),
                GuestRecord::new("Choi Mina & Family", "310", "2024-12-26"),
            ]
        );
    }

    #[test]
    fn test_missing_fields_become_empty() {
        let doc = "<ROOT><G_ROOM><GUEST_NAME>Seonhwa Lee</GUEST_NAME><ROOM/></G_ROOM><G_ROOM/></ROOT>";

        let guests = XmlRosterImporter::new().parse(doc);

        assert_eq!(
            guests,
            vec![
                GuestRecord::new("Seonhwa Lee", "", ""),
                GuestRecord::default(),
            ]
        );
    }

    #[test]
    fn test_first_occurrence_wins() {
        let doc = "<G_ROOM><ROOM>204</ROOM><ROOM>999</ROOM><GUEST_NAME>A</GUEST_NAME></G_ROOM>";

        let guests = XmlRosterImporter::new().parse(doc);

        assert_eq!(guests[0].room, "204");
    }

    #[test]
    fn test_nested_text_is_collected() {
        let doc = "<G_ROOM><GUEST_NAME><LAST>KIM</LAST> <FIRST>MINSEO</FIRST></GUEST_NAME></G_ROOM>";

        let guests = XmlRosterImporter::new().parse(doc);

        assert_eq!(guests[0].name, "KIMMINSEO");
    }

    #[test]
    fn test_nested_block_belongs_to_outer_guest() {
        let doc = "<G_ROOM><ROOM>204</ROOM><G_ROOM><GUEST_NAME>MINSEO KIM</GUEST_NAME>\
                   <ROOM>999</ROOM></G_ROOM></G_ROOM>";

        let guests = XmlRosterImporter::new().parse(doc);

        assert_eq!(guests, vec![GuestRecord::new("MINSEO KIM", "204", "")]);
    }

    #[test]
    fn test_cdata_name() {
        let doc = "<G_ROOM><GUEST_NAME><![CDATA[LEE <VIP>]]></GUEST_NAME></G_ROOM>";

        let guests = XmlRosterImporter::new().parse(doc);

        assert_eq!(guests[0].name, "LEE <VIP>");
    }

    #[test]
    fn test_fields_outside_blocks_ignored() {
        let doc = "<ROOT><GUEST_NAME>stray</GUEST_NAME></ROOT>";

        assert!(XmlRosterImporter::new().parse(doc).is_empty());
    }

    #[test]
    fn test_malformed_document_yields_empty_list() {
        let importer = XmlRosterImporter::new();

        assert!(importer
            .parse("<G_ROOM><GUEST_NAME>KIM</ROOM></G_ROOM>")
            .is_empty());
        assert!(importer.parse("<G_ROOM><GUEST_NAME>KIM</GUEST_NAME>").is_empty());
        assert!(importer.parse("not xml at all").is_empty());
    }
}
