use crate::domain::category::MachineCategory;
use crate::domain::location::Location;
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

const HEADER: [&str; 9] = [
    "id",
    "name",
    "address",
    "city",
    "active",
    "phone",
    "price_metegol",
    "price_pinball",
    "price_volante",
];

#[derive(Debug, Serialize)]
struct LocationRow<'a> {
    id: &'a str,
    name: &'a str,
    address: &'a str,
    city: &'a str,
    active: bool,
    phone: Option<&'a str>,
    price_metegol: Option<String>,
    price_pinball: Option<String>,
    price_volante: Option<String>,
}

impl<'a> From<&'a Location> for LocationRow<'a> {
    fn from(location: &'a Location) -> Self {
        let price = |category| location.price_for(category).map(|p| p.to_string());
        Self {
            id: location.id.as_str(),
            name: location.name(),
            address: &location.details.address,
            city: location.city(),
            active: location.is_active(),
            phone: location.details.phone_number.as_deref(),
            price_metegol: price(MachineCategory::Metegol),
            price_pinball: price(MachineCategory::Pinball),
            price_volante: price(MachineCategory::Volante),
        }
    }
}

/// Writes the location list as CSV. Unset overrides and phones are empty cells.
pub struct LocationWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LocationWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_locations(&mut self, locations: &[Location]) -> Result<()> {
        if locations.is_empty() {
            self.writer.write_record(HEADER)?;
        }
        for location in locations {
            self.writer.serialize(LocationRow::from(location))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::location::NewLocation;
    use crate::domain::money::TokenPrice;
    use crate::domain::record::{Record, RecordId};
    use rust_decimal_macros::dec;

    fn write(locations: &[Location]) -> String {
        let mut buffer = Vec::new();
        LocationWriter::new(&mut buffer)
            .write_locations(locations)
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_write_locations_quotes_commas() {
        let mut location = Location::from_draft(
            RecordId::new("1"),
            NewLocation {
                phone_number: Some("11-1234-5678".to_string()),
                ..NewLocation::new("Bar, Central", "Mitre 400, PB", "Haedo")
            },
        );
        location.details.prices.pinball = Some(TokenPrice::new(dec!(450)).unwrap());

        let output = write(&[location]);
        let mut lines = output.lines();
        assert_eq!(lines.next(), Some(HEADER.join(",").as_str()));
        assert_eq!(
            lines.next(),
            Some("1,\"Bar, Central\",\"Mitre 400, PB\",Haedo,true,11-1234-5678,,450,")
        );

        let mut reader = csv::Reader::from_reader(output.as_bytes());
        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(record.len(), HEADER.len());
        assert_eq!(&record[1], "Bar, Central");
    }

    #[test]
    fn test_write_no_locations_has_header() {
        assert_eq!(write(&[]), format!("{}\n", HEADER.join(",")));
    }
}
