//! Default delivery address collaborator.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::BuyerId;
use thiserror::Error;

use crate::buyer::Address;

/// Errors raised by the address book.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AddressBookError {
    /// The address backend itself failed.
    #[error("Address book backend error: {0}")]
    Backend(String),
}

/// Trait for resolving a registered buyer's default delivery address.
#[async_trait]
pub trait AddressBook: Send + Sync {
    /// Returns the buyer's default address, if one is on file.
    async fn default_address(&self, buyer_id: BuyerId) -> Result<Option<Address>, AddressBookError>;
}

/// In-memory address book for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAddressBook {
    addresses: Arc<RwLock<HashMap<BuyerId, Address>>>,
}

impl InMemoryAddressBook {
    /// Creates a new in-memory address book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a buyer's default address.
    pub fn set_default(&self, buyer_id: BuyerId, address: Address) {
        self.addresses.write().unwrap().insert(buyer_id, address);
    }
}

#[async_trait]
impl AddressBook for InMemoryAddressBook {
    async fn default_address(&self, buyer_id: BuyerId) -> Result<Option<Address>, AddressBookError> {
        let addresses = self.addresses.read().unwrap();
        Ok(addresses.get(&buyer_id).cloned())
    }
}
