//! Payment instrument validation and the charge gateway.
//!
//! The [`validator`] checks instruments and amounts locally, the
//! [`PaymentClient`] trait is the transport seam to the remote
//! processor, and [`PaymentGateway`] ties the two together with retry
//! and failure classification.

pub mod client;
pub mod error;
pub mod gateway;
pub mod method;
pub mod result;
pub mod validator;

pub use client::{ChargeOutcome, ChargeRequest, InMemoryPaymentClient, PaymentClient};
pub use error::{PaymentError, ValidationError, ValidationResult};
pub use gateway::PaymentGateway;
pub use method::PaymentMethod;
pub use result::PaymentResult;
