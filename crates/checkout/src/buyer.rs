//! Buyer identity and delivery address.

use common::BuyerId;
use serde::{Deserialize, Serialize};

/// Who is checking out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum BuyerIdentity {
    /// A known account holder. The address book may supply a default
    /// delivery address.
    #[serde(rename_all = "camelCase")]
    Registered { buyer_id: BuyerId },

    /// An anonymous buyer. Must supply a contact email and an explicit
    /// delivery address.
    #[serde(rename_all = "camelCase")]
    Guest { contact_email: String },
}

impl BuyerIdentity {
    /// True for guest checkouts.
    pub fn is_guest(&self) -> bool {
        matches!(self, BuyerIdentity::Guest { .. })
    }

    /// A printable identity handle: the buyer id, or the guest email.
    pub fn label(&self) -> String {
        match self {
            BuyerIdentity::Registered { buyer_id } => buyer_id.to_string(),
            BuyerIdentity::Guest { contact_email } => contact_email.clone(),
        }
    }
}

/// A postal delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    /// Creates an address from its parts.
    pub fn new(
        street: impl Into<String>,
        city: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            city: city.into(),
            postal_code: postal_code.into(),
            country: country.into(),
        }
    }

    /// True when every field has content.
    pub fn is_complete(&self) -> bool {
        !self.street.trim().is_empty()
            && !self.city.trim().is_empty()
            && !self.postal_code.trim().is_empty()
            && !self.country.trim().is_empty()
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}, {} {}, {}",
            self.street, self.city, self.postal_code, self.country
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_detection_and_label() {
        let guest = BuyerIdentity::Guest {
            contact_email: "visitor@example.com".to_string(),
        };
        assert!(guest.is_guest());
        assert_eq!(guest.label(), "visitor@example.com");

        let buyer_id = BuyerId::new();
        let registered = BuyerIdentity::Registered { buyer_id };
        assert!(!registered.is_guest());
        assert_eq!(registered.label(), buyer_id.to_string());
    }

    #[test]
    fn test_buyer_wire_format() {
        let guest = BuyerIdentity::Guest {
            contact_email: "visitor@example.com".to_string(),
        };
        let json = serde_json::to_value(&guest).unwrap();
        assert_eq!(json["type"], "guest");
        assert_eq!(json["contactEmail"], "visitor@example.com");
    }

    #[test]
    fn test_address_completeness() {
        let address = Address::new("1 Main St", "Springfield", "12345", "US");
        assert!(address.is_complete());

        let blank_city = Address::new("1 Main St", "  ", "12345", "US");
        assert!(!blank_city.is_complete());
    }

    #[test]
    fn test_address_display() {
        let address = Address::new("1 Main St", "Springfield", "12345", "US");
        assert_eq!(address.to_string(), "1 Main St, Springfield 12345, US");
    }
}
