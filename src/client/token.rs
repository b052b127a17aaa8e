//! Admin token cache
//!
//! The admin service hands out short-lived tokens. One token is shared by all
//! requests and refreshed under the lock once it expires.

use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

use crate::error::AppResult;

struct CachedToken {
    token: String,
    expires_at: Instant,
}

#[derive(Default)]
pub struct TokenCache {
    state: Mutex<Option<CachedToken>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached token, or call `fetch` for a new `(token, ttl)` pair
    /// when there is none or it has expired
    pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> AppResult<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = AppResult<(String, Duration)>>,
    {
        let mut state = self.state.lock().await;
        if let Some(cached) = state.as_ref() {
            if !cached.token.is_empty() && cached.expires_at > Instant::now() {
                return Ok(cached.token.clone());
            }
        }

        let (token, ttl) = fetch().await?;
        *state = Some(CachedToken {
            token: token.clone(),
            expires_at: Instant::now() + ttl,
        });
        Ok(token)
    }

    /// Drop the cached token, e.g. after the upstream rejected it
    pub async fn invalidate(&self) {
        *self.state.lock().await = None;
    }
}
