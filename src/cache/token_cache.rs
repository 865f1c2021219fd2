//! Process-wide token cache

use lazy_static::lazy_static;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use crate::types::Token;

lazy_static! {
    static ref GLOBAL_TOKEN_CACHE: Arc<TokenCache> = Arc::new(TokenCache::new());
}

/// Token records keyed by id. Entries are never replaced once present.
///
/// The data source never evicts, so the cache grows with the number of
/// distinct token ids seen for the life of the process. `evict` and `clear`
/// exist for owners that need to bound it.
#[derive(Debug, Default)]
pub struct TokenCache {
    tokens: RwLock<HashMap<String, Token>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cache shared by every data source in the process.
    pub fn global() -> Arc<TokenCache> {
        GLOBAL_TOKEN_CACHE.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Token> {
        self.tokens.read().await.get(id).cloned()
    }

    /// Stores `token` unless its id is already cached, and returns whichever
    /// record the cache holds afterwards.
    pub async fn insert(&self, token: Token) -> Token {
        self.tokens
            .write()
            .await
            .entry(token.id.clone())
            .or_insert(token)
            .clone()
    }

    pub async fn evict(&self, id: &str) -> Option<Token> {
        self.tokens.write().await.remove(id)
    }

    pub async fn clear(&self) {
        self.tokens.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.tokens.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tokens.read().await.is_empty()
    }
}
