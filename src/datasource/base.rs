//! Lifecycle and cross-cutting state shared by every ledger backend

use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};
use tracing::{debug, error, info, warn};
use crate::{
    cache::TokenCache,
    config::SECONDS_PER_BLOCK,
    errors::{DataSourceError, DataSourceResult},
    events::{EventBus, Subscription},
    network::TokenDetailProvider,
    types::{PoolFilterValues, Token},
    wallet::{WalletAccount, WalletManager},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Uninitialized,
    Initializing,
    Initialized,
    Disposed,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Applies `new_values` only when it differs from `old_values`.
fn apply_filter_change(
    target: &RwLock<PoolFilterValues>,
    old_values: &PoolFilterValues,
    new_values: &PoolFilterValues,
) -> bool {
    if old_values == new_values {
        return false;
    }
    info!(filter = ?new_values, "Pool filter values changed");
    *target.write().unwrap_or_else(PoisonError::into_inner) = new_values.clone();
    true
}

type PendingToken = Shared<BoxFuture<'static, Token>>;

/// Queries the provider for `id` and caches the outcome, the unknown token
/// included.
async fn resolve_token(
    token_details: Arc<dyn TokenDetailProvider>,
    tokens: Arc<TokenCache>,
    id: String,
) -> Token {
    let token = match token_details.get_token_detail(&id).await {
        Ok(Some(detail)) => Token::from_detail(&id, detail),
        Ok(None) => {
            warn!(token_id = %id, "Token detail not found, using unknown token");
            Token::unknown(&id)
        }
        Err(e) => {
            error!(token_id = %id, error = %e, "Failed to fetch token detail");
            Token::unknown(&id)
        }
    };
    tokens.insert(token).await
}

/// Unix timestamp at which `end_block` is expected, assuming a fixed block
/// time, or 0 when the block is not in the future.
pub fn estimate_end_timestamp(end_block: u64, current_height: u64, now: i64) -> i64 {
    if end_block == 0 {
        return 0;
    }
    let remaining = i128::from(end_block) - i128::from(current_height);
    if remaining <= 0 {
        return 0;
    }
    let seconds = i64::try_from(remaining).unwrap_or(i64::MAX).saturating_mul(SECONDS_PER_BLOCK);
    now.saturating_add(seconds)
}

/// State every backend composes: lifecycle, filter subscription, wallet
/// access and the token cache.
pub struct DataSourceCore {
    state: Mutex<LifecycleState>,
    events: Arc<EventBus>,
    wallet: Arc<dyn WalletManager>,
    token_details: Arc<dyn TokenDetailProvider>,
    tokens: Arc<TokenCache>,
    pending_tokens: tokio::sync::Mutex<HashMap<String, PendingToken>>,
    filter_values: Arc<RwLock<PoolFilterValues>>,
    subscription: Mutex<Option<Subscription>>,
}

impl DataSourceCore {
    pub fn new(
        events: Arc<EventBus>,
        wallet: Arc<dyn WalletManager>,
        token_details: Arc<dyn TokenDetailProvider>,
        tokens: Arc<TokenCache>,
    ) -> Self {
        Self {
            state: Mutex::new(LifecycleState::Uninitialized),
            events,
            wallet,
            token_details,
            tokens,
            pending_tokens: tokio::sync::Mutex::new(HashMap::new()),
            filter_values: Arc::new(RwLock::new(PoolFilterValues::default())),
            subscription: Mutex::new(None),
        }
    }

    pub fn state(&self) -> LifecycleState {
        *lock(&self.state)
    }

    /// Moves to `Initializing`, subscribes to filter changes and resets the
    /// filter. Only valid from `Uninitialized`.
    pub fn begin_init(&self) -> DataSourceResult<()> {
        {
            let mut state = lock(&self.state);
            if *state != LifecycleState::Uninitialized {
                return Err(DataSourceError::InvalidState(format!(
                    "cannot initialize from {:?}",
                    *state
                )));
            }
            *state = LifecycleState::Initializing;
        }
        info!("Init data source");

        let target = self.filter_values.clone();
        let subscription = self.events.subscribe_pool_filter_values_changed(Arc::new(
            move |old_values, new_values| {
                apply_filter_change(&target, old_values, new_values);
            },
        ));
        *lock(&self.subscription) = Some(subscription);
        *self
            .filter_values
            .write()
            .unwrap_or_else(PoisonError::into_inner) = PoolFilterValues::default();
        Ok(())
    }

    pub fn complete_init(&self) {
        *lock(&self.state) = LifecycleState::Initialized;
    }

    /// Undoes `begin_init` after the backend initializer failed.
    pub fn abort_init(&self) {
        if let Some(subscription) = lock(&self.subscription).take() {
            subscription.cancel();
        }
        *lock(&self.state) = LifecycleState::Uninitialized;
        warn!("Data source initialization aborted");
    }

    /// Returns false if the core was already disposed.
    pub fn dispose(&self) -> bool {
        {
            let mut state = lock(&self.state);
            if *state == LifecycleState::Disposed {
                return false;
            }
            *state = LifecycleState::Disposed;
        }
        info!("Disposing data source");
        if let Some(subscription) = lock(&self.subscription).take() {
            subscription.cancel();
        }
        true
    }

    pub fn ensure_not_disposed(&self) -> DataSourceResult<()> {
        match self.state() {
            LifecycleState::Disposed => Err(DataSourceError::InvalidState(
                "data source has been disposed".to_string(),
            )),
            _ => Ok(()),
        }
    }

    pub fn handle_pool_filter_values_changed(
        &self,
        old_values: &PoolFilterValues,
        new_values: &PoolFilterValues,
    ) -> bool {
        apply_filter_change(&self.filter_values, old_values, new_values)
    }

    pub fn pool_filter_values(&self) -> PoolFilterValues {
        self.filter_values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get_account(&self) -> DataSourceResult<WalletAccount> {
        self.wallet.get_active_account().ok_or_else(|| {
            DataSourceError::PreconditionFailed("Please connect your wallet first.".to_string())
        })
    }

    pub fn tokens(&self) -> &Arc<TokenCache> {
        &self.tokens
    }

    /// Cache-first token lookup. Concurrent misses for one id share a single
    /// provider query. Provider failures resolve to the unknown token, which
    /// is cached like any other.
    pub async fn get_token(&self, id: &str) -> Token {
        if let Some(token) = self.tokens.get(id).await {
            return token;
        }

        let lookup = {
            let mut pending = self.pending_tokens.lock().await;
            // a lookup may have finished while we waited for the lock
            if let Some(token) = self.tokens.get(id).await {
                return token;
            }
            match pending.get(id) {
                Some(lookup) => {
                    debug!(token_id = id, "Joining in-flight token lookup");
                    lookup.clone()
                }
                None => {
                    let lookup = resolve_token(
                        self.token_details.clone(),
                        self.tokens.clone(),
                        id.to_string(),
                    )
                    .boxed()
                    .shared();
                    pending.insert(id.to_string(), lookup.clone());
                    lookup
                }
            }
        };

        let token = lookup.clone().await;

        let mut pending = self.pending_tokens.lock().await;
        if pending.get(id).is_some_and(|current| current.ptr_eq(&lookup)) {
            pending.remove(id);
        }
        token
    }
}
