//! TTL-gated memoization of an async producer with in-flight coalescing

use futures::future::{BoxFuture, FutureExt, Shared, TryFutureExt};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;
use crate::errors::{DataSourceError, DataSourceResult};

type Producer<T> = Arc<dyn Fn() -> BoxFuture<'static, DataSourceResult<T>> + Send + Sync>;
type InFlight<T> = Shared<BoxFuture<'static, Result<T, Arc<DataSourceError>>>>;

struct CacheState<T: Clone> {
    last: Option<(T, Instant)>,
    in_flight: Option<InFlight<T>>,
}

/// Wraps a zero-argument async producer so that it runs at most once per TTL
/// window. Callers arriving while a fetch is outstanding await the same
/// future and observe the same outcome. Failed fetches are never cached.
pub struct CachedFunctionCall<T: Clone + Send + Sync + 'static> {
    ttl: Duration,
    producer: Producer<T>,
    state: Mutex<CacheState<T>>,
    invocations: AtomicUsize,
}

impl<T: Clone + Send + Sync + 'static> CachedFunctionCall<T> {
    pub fn new<F, Fut>(ttl_ms: u64, producer: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = DataSourceResult<T>> + Send + 'static,
    {
        Self {
            ttl: Duration::from_millis(ttl_ms),
            producer: Arc::new(move || producer().boxed()),
            state: Mutex::new(CacheState {
                last: None,
                in_flight: None,
            }),
            invocations: AtomicUsize::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of times the underlying producer has been started.
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::Relaxed)
    }

    pub async fn get(&self) -> DataSourceResult<T> {
        let fetch = {
            let mut state = self.state.lock().await;
            if let Some((value, fetched_at)) = &state.last {
                if fetched_at.elapsed() < self.ttl {
                    return Ok(value.clone());
                }
            }
            match &state.in_flight {
                Some(fetch) => {
                    debug!("Joining in-flight cached call");
                    fetch.clone()
                }
                None => {
                    self.invocations.fetch_add(1, Ordering::Relaxed);
                    let fetch = (self.producer)().map_err(Arc::new).boxed().shared();
                    state.in_flight = Some(fetch.clone());
                    fetch
                }
            }
        };

        let outcome = fetch.clone().await;

        let mut state = self.state.lock().await;
        if state.in_flight.as_ref().is_some_and(|f| f.ptr_eq(&fetch)) {
            state.in_flight = None;
            if let Ok(value) = &outcome {
                state.last = Some((value.clone(), Instant::now()));
            }
        }
        outcome.map_err(DataSourceError::Shared)
    }

    /// Drops the remembered value so the next call fetches again.
    pub async fn invalidate(&self) {
        self.state.lock().await.last = None;
    }
}
