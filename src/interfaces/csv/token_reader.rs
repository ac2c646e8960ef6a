use crate::application::calculator::TokenInputs;
use crate::domain::record::RecordId;
use crate::error::{LedgerError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize)]
struct TokenRow {
    machine: String,
    tokens: String,
}

/// Reads per-machine token counts from a CSV source with a
/// `machine,tokens` header.
///
/// Token values are kept as typed so the calculator applies its own rules
/// to blank or non-numeric entries.
pub struct TokenCountReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> TokenCountReader<R> {
    /// Creates a new `TokenCountReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Collects every row into a token-input map. A repeated machine keeps
    /// its last entry.
    pub fn read_inputs(self) -> Result<TokenInputs> {
        let mut inputs = TokenInputs::new();
        for row in self.reader.into_deserialize::<TokenRow>() {
            let row = row.map_err(LedgerError::from)?;
            let machine = RecordId::new(row.machine);
            if machine.is_blank() {
                return Err(LedgerError::Validation(
                    "token row without machine id".to_string(),
                ));
            }
            inputs.insert(machine, row.tokens);
        }
        Ok(inputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_valid_stream() {
        let data = "machine, tokens\nm1, 10\nm2, abc\nm3,";
        let inputs = TokenCountReader::new(data.as_bytes()).read_inputs().unwrap();

        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs[&RecordId::new("m1")], "10");
        assert_eq!(inputs[&RecordId::new("m2")], "abc");
        assert_eq!(inputs[&RecordId::new("m3")], "");
    }

    #[test]
    fn test_reader_missing_machine() {
        let data = "machine,tokens\n,5";
        let result = TokenCountReader::new(data.as_bytes()).read_inputs();
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_reader_malformed_header() {
        let data = "id,count\nm1,5";
        let result = TokenCountReader::new(data.as_bytes()).read_inputs();
        assert!(matches!(result, Err(LedgerError::Csv(_))));
    }
}
