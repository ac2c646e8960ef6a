use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The kind of arcade machine. Each kind has its own revenue split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum MachineCategory {
    /// Table football. Also the fallback for collections whose machine no longer exists.
    #[default]
    #[serde(rename = "Metegol", alias = "metegol")]
    Metegol,
    #[serde(rename = "Pinball", alias = "pinball")]
    Pinball,
    #[serde(rename = "Juego de Volante", alias = "volante", alias = "Volante")]
    Volante,
}

impl MachineCategory {
    pub const ALL: [MachineCategory; 3] = [
        MachineCategory::Metegol,
        MachineCategory::Pinball,
        MachineCategory::Volante,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MachineCategory::Metegol => "Metegol",
            MachineCategory::Pinball => "Pinball",
            MachineCategory::Volante => "Juego de Volante",
        }
    }
}

impl fmt::Display for MachineCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for MachineCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "metegol" => Ok(MachineCategory::Metegol),
            "pinball" => Ok(MachineCategory::Pinball),
            "volante" | "juego de volante" => Ok(MachineCategory::Volante),
            other => Err(format!("unknown machine category '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels_round_trip_through_serde() {
        let json = serde_json::to_string(&MachineCategory::Volante).unwrap();
        assert_eq!(json, "\"Juego de Volante\"");
        let parsed: MachineCategory = serde_json::from_str("\"volante\"").unwrap();
        assert_eq!(parsed, MachineCategory::Volante);
    }

    #[test]
    fn test_category_from_str() {
        assert_eq!("Pinball".parse(), Ok(MachineCategory::Pinball));
        assert_eq!(" juego de volante ".parse(), Ok(MachineCategory::Volante));
        assert!("skeeball".parse::<MachineCategory>().is_err());
    }
}
