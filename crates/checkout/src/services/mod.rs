//! External collaborator traits and in-memory implementations.

pub mod address;
pub mod events;
pub mod inventory;
pub mod orders;

pub use address::{AddressBook, AddressBookError, InMemoryAddressBook};
pub use events::{EventPublisher, InMemoryEventPublisher, LoggingEventPublisher, OrderCommitted};
pub use inventory::{InMemoryInventoryService, InventoryError, InventoryService, ProductOffer};
pub use orders::{InMemoryOrderStore, OrderStore, OrderStoreError};
