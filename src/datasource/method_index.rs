//! Lazily built index of off-chain ABI entries

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;
use crate::{
    errors::{DataSourceError, DataSourceResult},
    types::{AbiEntry, Contract},
};

/// Maps method name to its `offchain` ABI entry. A name is looked up in the
/// ABI list at most once; misses are not remembered.
#[derive(Debug, Default)]
pub struct OffChainMethodIndex {
    entries: Mutex<HashMap<String, Arc<AbiEntry>>>,
    scans: AtomicUsize,
}

impl OffChainMethodIndex {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, Arc<AbiEntry>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn resolve(&self, contract: &Contract, name: &str) -> DataSourceResult<Arc<AbiEntry>> {
        if let Some(entry) = self.entries().get(name) {
            return Ok(entry.clone());
        }

        self.scans.fetch_add(1, Ordering::Relaxed);
        let entry = contract
            .find_offchain(name)
            .cloned()
            .map(Arc::new)
            .ok_or_else(|| DataSourceError::MethodNotFound(name.to_string()))?;

        debug!(method = name, "Indexed offchain method");
        Ok(self
            .entries()
            .entry(name.to_string())
            .or_insert(entry)
            .clone())
    }

    /// How many times the ABI list has been scanned.
    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::Relaxed)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}
