//! Shared building blocks for the checkout system.
//!
//! Identifier newtypes, the `Money` value type, email validation, and the
//! gateway configuration shared by the payment and supply front doors.

pub mod email;
pub mod gateway;
pub mod money;
pub mod types;

pub use gateway::{FAILED_TRANSACTION_ID, GatewayConfig, TransportError, VALID_TRANSACTION_IDS};
pub use money::{Money, MoneyError};
pub use types::{BuyerId, CheckoutId, OrderId, ProductId, StoreId};
