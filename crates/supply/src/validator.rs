//! Structural validation for delivery methods and shipment orders.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{SupplyValidationError, SupplyValidationResult};
use crate::method::SupplyMethod;
use crate::shipment::ShipmentDetails;

/// Longest promised delivery window accepted for standard shipping.
pub const MAX_ESTIMATED_DAYS: u32 = 60;

/// Lowest (numerically highest) express priority tier.
pub const MAX_PRIORITY_LEVEL: u32 = 3;

static PICKUP_CODE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]{4,10}$").expect("pickup code pattern is valid"));

/// Validates the delivery method alone.
pub fn validate_method(method: &SupplyMethod) -> SupplyValidationResult {
    match method {
        SupplyMethod::Standard {
            carrier,
            estimated_days,
        } => {
            if carrier.trim().is_empty() {
                return Err(SupplyValidationError::CarrierMissing);
            }
            if !(1..=MAX_ESTIMATED_DAYS).contains(estimated_days) {
                return Err(SupplyValidationError::EstimatedDaysOutOfRange);
            }
            Ok(())
        }
        SupplyMethod::Express {
            carrier,
            priority_level,
        } => {
            if carrier.trim().is_empty() {
                return Err(SupplyValidationError::CarrierMissing);
            }
            if !(1..=MAX_PRIORITY_LEVEL).contains(priority_level) {
                return Err(SupplyValidationError::PriorityOutOfRange);
            }
            Ok(())
        }
        SupplyMethod::Pickup {
            location,
            pickup_code,
        } => {
            if location.trim().chars().count() < 3 {
                return Err(SupplyValidationError::LocationTooShort);
            }
            if !PICKUP_CODE_RE.is_match(pickup_code) {
                return Err(SupplyValidationError::PickupCodeMalformed);
            }
            Ok(())
        }
    }
}

/// Validates a complete shipment request: method, order, and weight.
pub fn validate_shipment(
    method: &SupplyMethod,
    details: &ShipmentDetails,
    weight_kg: f64,
) -> SupplyValidationResult {
    validate_method(method)?;
    if details.shipment_id.trim().is_empty() {
        return Err(SupplyValidationError::ShipmentIdMissing);
    }
    if details.address.trim().is_empty() {
        return Err(SupplyValidationError::AddressMissing);
    }
    if details.quantity == 0 {
        return Err(SupplyValidationError::QuantityZero);
    }
    // Guests ship without an account handle; everyone else needs one.
    if !details.is_guest && details.buyer_identity.trim().is_empty() {
        return Err(SupplyValidationError::BuyerMissing);
    }
    if !weight_kg.is_finite() || weight_kg <= 0.0 {
        return Err(SupplyValidationError::WeightNotPositive);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> SupplyMethod {
        SupplyMethod::Standard {
            carrier: "DHL".to_string(),
            estimated_days: 5,
        }
    }

    fn details() -> ShipmentDetails {
        ShipmentDetails::new(
            "chk-1/store-1",
            "1 Main St, Springfield 12345, US",
            2,
            "buyer@example.com",
            true,
        )
    }

    #[test]
    fn test_standard_rules() {
        assert!(validate_method(&standard()).is_ok());

        let blank_carrier = SupplyMethod::Standard {
            carrier: "  ".to_string(),
            estimated_days: 5,
        };
        assert_eq!(
            validate_method(&blank_carrier),
            Err(SupplyValidationError::CarrierMissing)
        );

        let slow = SupplyMethod::Standard {
            carrier: "DHL".to_string(),
            estimated_days: 61,
        };
        assert_eq!(
            validate_method(&slow),
            Err(SupplyValidationError::EstimatedDaysOutOfRange)
        );

        let zero_days = SupplyMethod::Standard {
            carrier: "DHL".to_string(),
            estimated_days: 0,
        };
        assert_eq!(
            validate_method(&zero_days),
            Err(SupplyValidationError::EstimatedDaysOutOfRange)
        );
    }

    #[test]
    fn test_express_rules() {
        let ok = SupplyMethod::Express {
            carrier: "UPS".to_string(),
            priority_level: 1,
        };
        assert!(validate_method(&ok).is_ok());

        let out_of_tier = SupplyMethod::Express {
            carrier: "UPS".to_string(),
            priority_level: 4,
        };
        assert_eq!(
            validate_method(&out_of_tier),
            Err(SupplyValidationError::PriorityOutOfRange)
        );

        let zero_tier = SupplyMethod::Express {
            carrier: "UPS".to_string(),
            priority_level: 0,
        };
        assert_eq!(
            validate_method(&zero_tier),
            Err(SupplyValidationError::PriorityOutOfRange)
        );
    }

    #[test]
    fn test_pickup_rules() {
        let ok = SupplyMethod::Pickup {
            location: "Central Station Locker 12".to_string(),
            pickup_code: "AB12CD".to_string(),
        };
        assert!(validate_method(&ok).is_ok());

        let short_location = SupplyMethod::Pickup {
            location: "A1".to_string(),
            pickup_code: "AB12CD".to_string(),
        };
        assert_eq!(
            validate_method(&short_location),
            Err(SupplyValidationError::LocationTooShort)
        );

        let lowercase_code = SupplyMethod::Pickup {
            location: "Central Station".to_string(),
            pickup_code: "ab12cd".to_string(),
        };
        assert_eq!(
            validate_method(&lowercase_code),
            Err(SupplyValidationError::PickupCodeMalformed)
        );

        let short_code = SupplyMethod::Pickup {
            location: "Central Station".to_string(),
            pickup_code: "AB1".to_string(),
        };
        assert_eq!(
            validate_method(&short_code),
            Err(SupplyValidationError::PickupCodeMalformed)
        );
    }

    #[test]
    fn test_shipment_order_rules() {
        assert!(validate_shipment(&standard(), &details(), 2.5).is_ok());

        let mut blank_address = details();
        blank_address.address = " ".to_string();
        assert_eq!(
            validate_shipment(&standard(), &blank_address, 2.5),
            Err(SupplyValidationError::AddressMissing)
        );

        let mut no_units = details();
        no_units.quantity = 0;
        assert_eq!(
            validate_shipment(&standard(), &no_units, 2.5),
            Err(SupplyValidationError::QuantityZero)
        );
    }

    #[test]
    fn test_buyer_identity_required_only_for_registered() {
        let guest = ShipmentDetails::new("chk-1/store-1", "1 Main St", 1, "", true);
        assert!(validate_shipment(&standard(), &guest, 1.0).is_ok());

        let registered = ShipmentDetails::new("chk-1/store-1", "1 Main St", 1, " ", false);
        assert_eq!(
            validate_shipment(&standard(), &registered, 1.0),
            Err(SupplyValidationError::BuyerMissing)
        );
    }

    #[test]
    fn test_weight_rules() {
        assert_eq!(
            validate_shipment(&standard(), &details(), 0.0),
            Err(SupplyValidationError::WeightNotPositive)
        );
        assert_eq!(
            validate_shipment(&standard(), &details(), -1.0),
            Err(SupplyValidationError::WeightNotPositive)
        );
        assert_eq!(
            validate_shipment(&standard(), &details(), f64::NAN),
            Err(SupplyValidationError::WeightNotPositive)
        );
        assert!(validate_shipment(&standard(), &details(), 0.05).is_ok());
    }
}
