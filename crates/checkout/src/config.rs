//! Checkout coordinator configuration.

/// Tunables for the checkout coordinator.
///
/// Reads from environment variables:
/// - `CHECKOUT_SHIPMENT_CONCURRENCY` — max shipment calls in flight per
///   checkout (default: `4`)
#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    /// Max shipment calls in flight at once for a single checkout.
    pub shipment_concurrency: usize,
}

impl CheckoutConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            shipment_concurrency: std::env::var("CHECKOUT_SHIPMENT_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(4),
        }
    }
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            shipment_concurrency: 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = CheckoutConfig::default();
        assert_eq!(config.shipment_concurrency, 4);
    }
}
