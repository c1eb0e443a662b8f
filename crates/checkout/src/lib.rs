//! Checkout orchestration across the payment and supply gateways.
//!
//! One checkout runs as a saga over a multi-store cart:
//! 1. Validate the cart, instruments, and address, pricing every line
//!    from the catalog
//! 2. Reserve stock for each line
//! 3. Charge the payment instrument once for the whole cart
//! 4. Book one shipment per basket with bounded parallelism
//! 5. Create one order per basket and commit the stock decrements
//!
//! Any failure after the charge unwinds every succeeded step through
//! compensation before the caller sees the error.

pub mod buyer;
pub mod cart;
pub mod compensation;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod order;
pub mod saga;
pub mod services;
pub mod state;

pub use buyer::{Address, BuyerIdentity};
pub use cart::{Basket, CartLine, CartSnapshot};
pub use compensation::{
    BookedShipment, CompensationLeg, CompensationManager, CompensationReport, CompensationTarget,
};
pub use config::CheckoutConfig;
pub use coordinator::{CheckoutCoordinator, CheckoutReceipt, CheckoutRequest};
pub use error::{CheckoutError, CheckoutFailureKind};
pub use events::CheckoutSagaEvent;
pub use order::{Order, OrderStatus};
pub use saga::CheckoutSaga;
pub use services::{
    AddressBook, AddressBookError, EventPublisher, InMemoryAddressBook, InMemoryEventPublisher,
    InMemoryInventoryService, InMemoryOrderStore, InventoryError, InventoryService,
    LoggingEventPublisher, OrderCommitted, OrderStore, OrderStoreError, ProductOffer,
};
pub use state::CheckoutState;
