use super::location::Location;
use super::machine::Machine;
use super::money::TokenPrice;
use serde::Serialize;
use std::fmt;

/// Which override tier supplied a resolved price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PriceSource {
    MachineSpecific,
    ClientCategory,
    Global,
}

impl fmt::Display for PriceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PriceSource::MachineSpecific => "machine-specific",
            PriceSource::ClientCategory => "client-category",
            PriceSource::Global => "global",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedPrice {
    pub price: TokenPrice,
    pub source: PriceSource,
}

/// Resolves the token price for `machine`.
///
/// Priority: the machine's own price, then the location's price for the
/// machine's category, then `default_price`. A missing location skips the
/// location tier.
pub fn resolve_price(
    machine: &Machine,
    location: Option<&Location>,
    default_price: TokenPrice,
) -> ResolvedPrice {
    if let Some(price) = machine.token_price {
        return ResolvedPrice {
            price,
            source: PriceSource::MachineSpecific,
        };
    }

    if let Some(price) = location.and_then(|loc| loc.price_for(machine.category)) {
        return ResolvedPrice {
            price,
            source: PriceSource::ClientCategory,
        };
    }

    ResolvedPrice {
        price: default_price,
        source: PriceSource::Global,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::MachineCategory;
    use crate::domain::location::NewLocation;
    use crate::domain::machine::NewMachine;
    use crate::domain::record::{Record, RecordId};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn price(v: Decimal) -> TokenPrice {
        TokenPrice::new(v).unwrap()
    }

    fn location_with(category: MachineCategory, value: Option<Decimal>) -> Location {
        let mut loc = Location::from_draft(
            RecordId::new("1"),
            NewLocation::new("Club Social", "Mitre 400", "Haedo"),
        );
        loc.details
            .prices
            .set(category, TokenPrice::from_override(value));
        loc
    }

    fn machine(category: MachineCategory, own: Option<Decimal>) -> Machine {
        let mut m = Machine::from_draft(RecordId::new("m1"), NewMachine::new(category, "1"));
        m.token_price = TokenPrice::from_override(own);
        m
    }

    #[test]
    fn test_machine_override_wins() {
        let m = machine(MachineCategory::Volante, Some(dec!(600)));
        let loc = location_with(MachineCategory::Volante, Some(dec!(400)));
        let resolved = resolve_price(&m, Some(&loc), price(dec!(300)));
        assert_eq!(resolved.price, price(dec!(600)));
        assert_eq!(resolved.source, PriceSource::MachineSpecific);
    }

    #[test]
    fn test_location_category_override() {
        let m = machine(MachineCategory::Pinball, None);
        let loc = location_with(MachineCategory::Pinball, Some(dec!(500)));
        let resolved = resolve_price(&m, Some(&loc), price(dec!(300)));
        assert_eq!(resolved.price, price(dec!(500)));
        assert_eq!(resolved.source, PriceSource::ClientCategory);
    }

    #[test]
    fn test_location_override_for_other_category_is_ignored() {
        let m = machine(MachineCategory::Pinball, None);
        let loc = location_with(MachineCategory::Metegol, Some(dec!(500)));
        let resolved = resolve_price(&m, Some(&loc), price(dec!(300)));
        assert_eq!(resolved.source, PriceSource::Global);
        assert_eq!(resolved.price, price(dec!(300)));
    }

    #[test]
    fn test_non_positive_overrides_fall_through() {
        for sentinel in [dec!(0), dec!(-10)] {
            let m = machine(MachineCategory::Metegol, Some(sentinel));
            let loc = location_with(MachineCategory::Metegol, Some(sentinel));
            let resolved = resolve_price(&m, Some(&loc), price(dec!(300)));
            assert_eq!(resolved.source, PriceSource::Global);
        }

        let m = machine(MachineCategory::Metegol, Some(dec!(0)));
        let loc = location_with(MachineCategory::Metegol, Some(dec!(450)));
        let resolved = resolve_price(&m, Some(&loc), price(dec!(300)));
        assert_eq!(resolved.source, PriceSource::ClientCategory);
        assert_eq!(resolved.price, price(dec!(450)));
    }

    #[test]
    fn test_missing_location_uses_global() {
        let m = machine(MachineCategory::Pinball, None);
        let resolved = resolve_price(&m, None, price(dec!(300)));
        assert_eq!(resolved.source, PriceSource::Global);
        assert_eq!(resolved.price, price(dec!(300)));
    }

    #[test]
    fn test_source_labels() {
        assert_eq!(PriceSource::ClientCategory.to_string(), "client-category");
        assert_eq!(PriceSource::MachineSpecific.to_string(), "machine-specific");
        assert_eq!(PriceSource::Global.to_string(), "global");
    }
}
