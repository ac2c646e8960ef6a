use crate::application::ledger::HistoryEntry;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct HistoryRow<'a> {
    id: &'a str,
    date: String,
    location: &'a str,
    machine: &'a str,
    category: &'a str,
    tokens: u32,
    price: String,
    total: String,
    operator_share: String,
    owner_share: String,
}

impl<'a> From<&'a HistoryEntry> for HistoryRow<'a> {
    fn from(entry: &'a HistoryEntry) -> Self {
        let draft = &entry.collection.draft;
        Self {
            id: entry.collection.id.as_str(),
            date: draft.collected_at.to_rfc3339(),
            location: &entry.location_name,
            machine: &entry.machine_name,
            category: entry.category.label(),
            tokens: draft.token_count.value(),
            price: draft.applied_price.to_string(),
            total: draft.total.to_string(),
            operator_share: draft.operator_share.to_string(),
            owner_share: draft.owner_share.to_string(),
        }
    }
}

/// Writes collection history as CSV.
pub struct CollectionWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CollectionWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_history(&mut self, entries: &[HistoryEntry]) -> Result<()> {
        if entries.is_empty() {
            self.writer.write_record([
                "id",
                "date",
                "location",
                "machine",
                "category",
                "tokens",
                "price",
                "total",
                "operator_share",
                "owner_share",
            ])?;
        }
        for entry in entries {
            self.writer.serialize(HistoryRow::from(entry))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::MachineCategory;
    use crate::domain::collection::{Collection, CollectionDraft};
    use crate::domain::money::{Money, TokenCount, TokenPrice};
    use crate::domain::record::{Record, RecordId};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn test_write_history() {
        let entry = HistoryEntry {
            collection: Collection::from_draft(
                RecordId::new("c1"),
                CollectionDraft {
                    machine_id: RecordId::new("m2"),
                    location_id: RecordId::new("2"),
                    collected_at: Utc.with_ymd_and_hms(2025, 3, 14, 18, 0, 0).unwrap(),
                    token_count: TokenCount::new(5).unwrap(),
                    total: Money::new(dec!(2500)),
                    operator_share: Money::new(dec!(1500.00)),
                    owner_share: Money::new(dec!(1000.00)),
                    applied_price: TokenPrice::new(dec!(500)).unwrap(),
                },
            ),
            location_name: "Canchas La 10".to_string(),
            machine_name: "Pinball".to_string(),
            category: MachineCategory::Pinball,
        };

        let mut buffer = Vec::new();
        CollectionWriter::new(&mut buffer)
            .write_history(&[entry])
            .unwrap();
        let output = String::from_utf8(buffer).unwrap();

        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("id,date,location,machine,category,tokens,price,total,operator_share,owner_share")
        );
        assert_eq!(
            lines.next(),
            Some("c1,2025-03-14T18:00:00+00:00,Canchas La 10,Pinball,Pinball,5,500,2500,1500,1000")
        );
    }

    #[test]
    fn test_write_empty_history_has_header() {
        let mut buffer = Vec::new();
        CollectionWriter::new(&mut buffer).write_history(&[]).unwrap();
        let output = String::from_utf8(buffer).unwrap();
        assert!(output.starts_with("id,date,location"));
    }
}
