//! Wallet manager contract and an in-memory implementation

use serde::{Deserialize, Serialize};
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletAccount {
    pub address: String,
}

impl WalletAccount {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.to_string(),
        }
    }
}

pub trait WalletManager: Send + Sync {
    fn get_active_account(&self) -> Option<WalletAccount>;
}

/// Holds whichever account was connected last.
#[derive(Debug, Default)]
pub struct InMemoryWalletManager {
    active: RwLock<Option<WalletAccount>>,
}

impl InMemoryWalletManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connected(address: &str) -> Self {
        let manager = Self::new();
        manager.connect(WalletAccount::new(address));
        manager
    }

    pub fn connect(&self, account: WalletAccount) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = Some(account);
    }

    pub fn disconnect(&self) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl WalletManager for InMemoryWalletManager {
    fn get_active_account(&self) -> Option<WalletAccount> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
