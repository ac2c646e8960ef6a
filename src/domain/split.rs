use super::category::MachineCategory;
use super::money::Money;
use crate::error::LedgerError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Fractions of a collection's total kept by the operator and by the location owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevenueSplit {
    pub operator: Decimal,
    pub owner: Decimal,
}

impl RevenueSplit {
    pub fn new(operator: Decimal, owner: Decimal) -> Result<Self, LedgerError> {
        let split = Self { operator, owner };
        split.validate()?;
        Ok(split)
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        let in_range = |f: Decimal| f >= Decimal::ZERO && f <= Decimal::ONE;
        if !in_range(self.operator) || !in_range(self.owner) {
            return Err(LedgerError::Config(format!(
                "split fractions must lie in [0, 1], got {}/{}",
                self.operator, self.owner
            )));
        }
        if self.operator + self.owner != Decimal::ONE {
            return Err(LedgerError::Config(format!(
                "split fractions must sum to 1, got {}/{}",
                self.operator, self.owner
            )));
        }
        Ok(())
    }

    /// Splits `total` into (operator share, owner share).
    pub fn apply(&self, total: Money) -> (Money, Money) {
        (total * self.operator, total * self.owner)
    }

    /// Whole-number percentages, as shown on vouchers.
    pub fn operator_percent(&self) -> Decimal {
        (self.operator * dec!(100)).normalize()
    }

    pub fn owner_percent(&self) -> Decimal {
        (self.owner * dec!(100)).normalize()
    }
}

/// Revenue split per machine category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SplitTable {
    pub metegol: RevenueSplit,
    pub pinball: RevenueSplit,
    pub volante: RevenueSplit,
}

impl Default for SplitTable {
    fn default() -> Self {
        Self {
            metegol: RevenueSplit {
                operator: dec!(0.50),
                owner: dec!(0.50),
            },
            pinball: RevenueSplit {
                operator: dec!(0.60),
                owner: dec!(0.40),
            },
            volante: RevenueSplit {
                operator: dec!(0.60),
                owner: dec!(0.40),
            },
        }
    }
}

impl SplitTable {
    pub fn get(&self, category: MachineCategory) -> RevenueSplit {
        match category {
            MachineCategory::Metegol => self.metegol,
            MachineCategory::Pinball => self.pinball,
            MachineCategory::Volante => self.volante,
        }
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        for category in MachineCategory::ALL {
            self.get(category).validate().map_err(|e| {
                LedgerError::Config(format!("revenue split for {}: {}", category, e))
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let table = SplitTable::default();
        assert!(table.validate().is_ok());
        assert_eq!(table.get(MachineCategory::Metegol).operator, dec!(0.50));
        assert_eq!(table.get(MachineCategory::Pinball).owner, dec!(0.40));
        assert_eq!(table.get(MachineCategory::Volante).operator, dec!(0.60));
    }

    #[test]
    fn test_split_must_sum_to_one() {
        assert!(RevenueSplit::new(dec!(0.7), dec!(0.3)).is_ok());
        assert!(matches!(
            RevenueSplit::new(dec!(0.7), dec!(0.4)),
            Err(LedgerError::Config(_))
        ));
        assert!(matches!(
            RevenueSplit::new(dec!(1.2), dec!(-0.2)),
            Err(LedgerError::Config(_))
        ));
    }

    #[test]
    fn test_apply_conserves_total() {
        let split = SplitTable::default().get(MachineCategory::Pinball);
        let (operator, owner) = split.apply(Money::new(dec!(2500)));
        assert_eq!(operator, Money::new(dec!(1500)));
        assert_eq!(owner, Money::new(dec!(1000)));
        assert_eq!(operator + owner, Money::new(dec!(2500)));
    }

    #[test]
    fn test_percentages() {
        let split = SplitTable::default().get(MachineCategory::Pinball);
        assert_eq!(split.operator_percent().to_string(), "60");
        assert_eq!(split.owner_percent().to_string(), "40");
    }
}
