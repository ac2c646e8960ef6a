use crate::application::ledger::MachineEntry;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
struct MachineRow<'a> {
    id: &'a str,
    name: &'a str,
    category: &'a str,
    location: &'a str,
    price: String,
    source: String,
    inherited: String,
}

impl<'a> From<&'a MachineEntry> for MachineRow<'a> {
    fn from(entry: &'a MachineEntry) -> Self {
        Self {
            id: entry.machine.id.as_str(),
            name: &entry.machine.name,
            category: entry.machine.category.label(),
            location: &entry.location_name,
            price: entry.price.price.to_string(),
            source: entry.price.source.to_string(),
            inherited: entry.inherited.to_string(),
        }
    }
}

/// Writes the machine catalog with current prices as CSV.
pub struct MachineWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> MachineWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_machines(&mut self, entries: &[MachineEntry]) -> Result<()> {
        if entries.is_empty() {
            self.writer.write_record([
                "id",
                "name",
                "category",
                "location",
                "price",
                "source",
                "inherited",
            ])?;
        }
        for entry in entries {
            self.writer.serialize(MachineRow::from(entry))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::MachineCategory;
    use crate::domain::machine::{Machine, NewMachine};
    use crate::domain::money::TokenPrice;
    use crate::domain::pricing::{PriceSource, ResolvedPrice};
    use crate::domain::record::{Record, RecordId};
    use rust_decimal_macros::dec;

    #[test]
    fn test_write_machines() {
        let entry = MachineEntry {
            machine: Machine::from_draft(
                RecordId::new("m4"),
                NewMachine::new(MachineCategory::Volante, "3"),
            ),
            location_name: "Club Social, Haedo".to_string(),
            price: ResolvedPrice {
                price: TokenPrice::new(dec!(600.00)).unwrap(),
                source: PriceSource::MachineSpecific,
            },
            inherited: TokenPrice::new(dec!(300)).unwrap(),
        };

        let mut buffer = Vec::new();
        MachineWriter::new(&mut buffer)
            .write_machines(&[entry])
            .unwrap();
        let output = String::from_utf8(buffer).unwrap();

        let mut lines = output.lines();
        assert_eq!(
            lines.next(),
            Some("id,name,category,location,price,source,inherited")
        );
        assert_eq!(
            lines.next(),
            Some("m4,Juego de Volante,Juego de Volante,\"Club Social, Haedo\",600,machine-specific,300")
        );
    }
}
