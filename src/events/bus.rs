//! In-process event bus for pool filter changes

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::debug;
use uuid::Uuid;
use crate::types::PoolFilterValues;

pub type FilterChangeHandler = Arc<dyn Fn(&PoolFilterValues, &PoolFilterValues) + Send + Sync>;

lazy_static! {
    static ref GLOBAL_EVENT_BUS: Arc<EventBus> = Arc::new(EventBus::new());
}

#[derive(Default)]
pub struct EventBus {
    filter_handlers: Mutex<HashMap<Uuid, FilterChangeHandler>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn global() -> Arc<EventBus> {
        GLOBAL_EVENT_BUS.clone()
    }

    fn handlers(&self) -> MutexGuard<'_, HashMap<Uuid, FilterChangeHandler>> {
        self.filter_handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `handler` for `PoolFilterValuesChanged(old, new)` notifications.
    pub fn subscribe_pool_filter_values_changed(
        self: &Arc<Self>,
        handler: FilterChangeHandler,
    ) -> Subscription {
        let id = Uuid::new_v4();
        self.handlers().insert(id, handler);
        debug!(subscription = %id, "Subscribed to pool filter changes");
        Subscription {
            id,
            bus: Arc::downgrade(self),
        }
    }

    pub fn publish_pool_filter_values_changed(
        &self,
        old_values: &PoolFilterValues,
        new_values: &PoolFilterValues,
    ) {
        // handlers run outside the lock so they may subscribe or cancel
        let handlers: Vec<FilterChangeHandler> = self.handlers().values().cloned().collect();
        for handler in handlers {
            handler(old_values, new_values);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers().len()
    }

    fn unsubscribe(&self, id: &Uuid) {
        if self.handlers().remove(id).is_some() {
            debug!(subscription = %id, "Unsubscribed from pool filter changes");
        }
    }
}

/// Handle returned by a subscription; `cancel` consumes it so it runs once.
#[derive(Debug)]
pub struct Subscription {
    id: Uuid,
    bus: Weak<EventBus>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn cancel(self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.unsubscribe(&self.id);
        }
    }
}
