use super::category::MachineCategory;
use super::money::{TokenPrice, deserialize_override};
use super::record::{Record, RecordId};
use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Per-category token prices negotiated with a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPrices {
    #[serde(
        default,
        rename = "priceMetegol",
        deserialize_with = "deserialize_override",
        skip_serializing_if = "Option::is_none"
    )]
    pub metegol: Option<TokenPrice>,
    #[serde(
        default,
        rename = "pricePinball",
        deserialize_with = "deserialize_override",
        skip_serializing_if = "Option::is_none"
    )]
    pub pinball: Option<TokenPrice>,
    #[serde(
        default,
        rename = "priceVolante",
        deserialize_with = "deserialize_override",
        skip_serializing_if = "Option::is_none"
    )]
    pub volante: Option<TokenPrice>,
}

impl CategoryPrices {
    pub fn get(&self, category: MachineCategory) -> Option<TokenPrice> {
        match category {
            MachineCategory::Metegol => self.metegol,
            MachineCategory::Pinball => self.pinball,
            MachineCategory::Volante => self.volante,
        }
    }

    pub fn set(&mut self, category: MachineCategory, price: Option<TokenPrice>) {
        match category {
            MachineCategory::Metegol => self.metegol = price,
            MachineCategory::Pinball => self.pinball = price,
            MachineCategory::Volante => self.volante = price,
        }
    }
}

/// A client site hosting machines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: RecordId,
    #[serde(flatten)]
    pub details: NewLocation,
}

/// A location as entered on the client form, before the store assigns an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLocation {
    pub name: String,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub contact_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(flatten)]
    pub prices: CategoryPrices,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl NewLocation {
    pub fn new(name: impl Into<String>, address: impl Into<String>, city: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            city: city.into(),
            contact_name: String::new(),
            phone_number: None,
            prices: CategoryPrices::default(),
            is_active: true,
        }
    }

    /// Name, address and city are required.
    pub fn validate(&self) -> Result<(), LedgerError> {
        let missing: Vec<&str> = [
            ("name", &self.name),
            ("address", &self.address),
            ("city", &self.city),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(LedgerError::Validation(format!(
                "missing required location fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Partial update of a location. `None` leaves the field untouched.
///
/// Price fields are doubly optional: `Some(None)` clears the override.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocationPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub contact_name: Option<String>,
    pub phone_number: Option<Option<String>>,
    pub price_metegol: Option<Option<TokenPrice>>,
    pub price_pinball: Option<Option<TokenPrice>>,
    pub price_volante: Option<Option<TokenPrice>>,
    pub is_active: Option<bool>,
}

impl LocationPatch {
    pub fn deactivate() -> Self {
        Self {
            is_active: Some(false),
            ..Self::default()
        }
    }

    /// Applies the patch, rejecting it if it would blank a required field.
    pub fn apply_to(&self, location: &Location) -> Result<Location, LedgerError> {
        let mut updated = location.clone();
        let details = &mut updated.details;
        if let Some(name) = &self.name {
            details.name = name.clone();
        }
        if let Some(address) = &self.address {
            details.address = address.clone();
        }
        if let Some(city) = &self.city {
            details.city = city.clone();
        }
        if let Some(contact) = &self.contact_name {
            details.contact_name = contact.clone();
        }
        if let Some(phone) = &self.phone_number {
            details.phone_number = phone.clone();
        }
        for (category, price) in [
            (MachineCategory::Metegol, self.price_metegol),
            (MachineCategory::Pinball, self.price_pinball),
            (MachineCategory::Volante, self.price_volante),
        ] {
            if let Some(price) = price {
                details.prices.set(category, price);
            }
        }
        if let Some(active) = self.is_active {
            details.is_active = active;
        }
        details.validate()?;
        Ok(updated)
    }
}

impl Location {
    pub fn name(&self) -> &str {
        &self.details.name
    }

    pub fn city(&self) -> &str {
        &self.details.city
    }

    pub fn is_active(&self) -> bool {
        self.details.is_active
    }

    pub fn price_for(&self, category: MachineCategory) -> Option<TokenPrice> {
        self.details.prices.get(category)
    }

    /// Case-insensitive match against name, city and address.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return true;
        }
        [&self.details.name, &self.details.city, &self.details.address]
            .iter()
            .any(|field| field.to_lowercase().contains(&term))
    }

    /// Phone number normalised for WhatsApp: digits only, with the mobile
    /// country prefix added to 10-digit local numbers.
    pub fn whatsapp_number(&self) -> Option<String> {
        let digits: String = self
            .details
            .phone_number
            .as_deref()?
            .chars()
            .filter(char::is_ascii_digit)
            .collect();
        match digits.len() {
            0 => None,
            10 => Some(format!("549{}", digits)),
            _ => Some(digits),
        }
    }
}

impl Record for Location {
    type Draft = NewLocation;
    const COLLECTION: &'static str = "locations";

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn from_draft(id: RecordId, draft: NewLocation) -> Self {
        Self { id, details: draft }
    }

    fn snapshot_order(a: &Self, b: &Self) -> Ordering {
        a.details
            .name
            .cmp(&b.details.name)
            .then_with(|| a.id.cmp(&b.id))
    }
}
