//! Payment instrument variants.

use serde::{Deserialize, Serialize};

/// A payment instrument selected for one checkout attempt.
///
/// Closed set of variants. The wire representation carries a `type`
/// discriminator (`creditCard`, `bankAccount`, `wallet`) with the
/// variant fields inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PaymentMethod {
    /// Card charge.
    #[serde(rename_all = "camelCase")]
    CreditCard {
        /// Card number, 13 to 19 digits.
        number: String,
        /// Name as printed on the card.
        holder_name: String,
        /// Expiry in `MM/YY` form.
        expiry: String,
        /// Card verification value, 3 or 4 digits.
        cvv: String,
    },

    /// Direct debit against a bank account.
    #[serde(rename_all = "camelCase")]
    BankAccount {
        /// Account number, 8 to 20 digits.
        account_number: String,
        /// Name of the holding bank.
        bank_name: String,
    },

    /// Hosted wallet addressed by email.
    Wallet {
        /// Wallet account email.
        email: String,
    },
}

impl PaymentMethod {
    /// Returns the wire discriminator for this variant.
    pub fn kind(&self) -> &'static str {
        match self {
            PaymentMethod::CreditCard { .. } => "creditCard",
            PaymentMethod::BankAccount { .. } => "bankAccount",
            PaymentMethod::Wallet { .. } => "wallet",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    /// Human-readable description safe for logs and receipts. Card
    /// numbers are reduced to their last four digits.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::CreditCard { number, .. } => {
                let last4 = number
                    .get(number.len().saturating_sub(4)..)
                    .unwrap_or("****");
                write!(f, "credit card ending {last4}")
            }
            PaymentMethod::BankAccount { bank_name, .. } => {
                write!(f, "bank account at {bank_name}")
            }
            PaymentMethod::Wallet { email } => write!(f, "wallet {email}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_card_wire_format() {
        let method = PaymentMethod::CreditCard {
            number: "4111111111111111".to_string(),
            holder_name: "Ada Lovelace".to_string(),
            expiry: "12/30".to_string(),
            cvv: "123".to_string(),
        };
        let json = serde_json::to_value(&method).unwrap();
        assert_eq!(json["type"], "creditCard");
        assert_eq!(json["holderName"], "Ada Lovelace");
        assert_eq!(json["number"], "4111111111111111");
    }

    #[test]
    fn test_bank_account_wire_format() {
        let method = PaymentMethod::BankAccount {
            account_number: "12345678".to_string(),
            bank_name: "First National".to_string(),
        };
        let json = serde_json::to_value(&method).unwrap();
        assert_eq!(json["type"], "bankAccount");
        assert_eq!(json["accountNumber"], "12345678");
        assert_eq!(json["bankName"], "First National");
    }

    #[test]
    fn test_wallet_roundtrip() {
        let method = PaymentMethod::Wallet {
            email: "buyer@example.com".to_string(),
        };
        let json = serde_json::to_string(&method).unwrap();
        let back: PaymentMethod = serde_json::from_str(&json).unwrap();
        assert_eq!(method, back);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let raw = r#"{"type":"cheque","number":"123"}"#;
        assert!(serde_json::from_str::<PaymentMethod>(raw).is_err());
    }

    #[test]
    fn test_display_masks_card_number() {
        let method = PaymentMethod::CreditCard {
            number: "4111111111111111".to_string(),
            holder_name: "Ada Lovelace".to_string(),
            expiry: "12/30".to_string(),
            cvv: "123".to_string(),
        };
        assert_eq!(method.to_string(), "credit card ending 1111");
    }

    #[test]
    fn test_kind_labels() {
        let wallet = PaymentMethod::Wallet {
            email: "w@example.com".to_string(),
        };
        assert_eq!(wallet.kind(), "wallet");
    }
}
