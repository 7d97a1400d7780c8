// In-memory cache for the supplier's OAuth access token
// One token per process; refreshed on demand and lost on restart.

use crate::provider::{Credentials, ProviderClient, ProviderError};
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};

// Tokens this close to expiry are treated as already expired
pub const EXPIRY_MARGIN_SECONDS: i64 = 30;

// Keeps the expiry arithmetic in range for absurd supplier TTLs
const MAX_TTL_SECONDS: u64 = 30 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CachedToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    pub fn issued_at(value: String, issued_at: DateTime<Utc>, ttl_seconds: u64) -> Self {
        let ttl = Duration::seconds(ttl_seconds.min(MAX_TTL_SECONDS) as i64);
        Self {
            value,
            expires_at: issued_at + ttl,
        }
    }

    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at - Duration::seconds(EXPIRY_MARGIN_SECONDS)
    }
}

#[derive(Debug, Default)]
struct TokenCacheCounters {
    hit_count: AtomicUsize,
    refresh_count: AtomicUsize,
    failed_refresh_count: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TokenCacheStats {
    pub hit_count: usize,
    pub refresh_count: usize,
    pub failed_refresh_count: usize,
}

pub struct TokenCache {
    credentials: Option<Credentials>,
    current: RwLock<Option<CachedToken>>,
    // Serializes refreshes so concurrent misses share one exchange
    refresh_lock: tokio::sync::Mutex<()>,
    counters: TokenCacheCounters,
}

impl TokenCache {
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self {
            credentials,
            current: RwLock::new(None),
            refresh_lock: tokio::sync::Mutex::new(()),
            counters: TokenCacheCounters::default(),
        }
    }

    pub fn cached(&self) -> Option<CachedToken> {
        self.current.read().clone()
    }

    // Replace the cached token wholesale
    pub fn store(&self, token: CachedToken) {
        *self.current.write() = Some(token);
    }

    fn fresh_token(&self, now: DateTime<Utc>) -> Option<String> {
        self.current
            .read()
            .as_ref()
            .filter(|token| token.is_fresh_at(now))
            .map(|token| token.value.clone())
    }

    // Return a valid bearer token, exchanging credentials when the cached one
    // is absent or within the expiry margin.
    pub async fn get_token<P>(&self, provider: &P) -> Result<String, ProviderError>
    where
        P: ProviderClient + ?Sized,
    {
        if let Some(token) = self.fresh_token(Utc::now()) {
            self.counters.hit_count.fetch_add(1, Ordering::SeqCst);
            return Ok(token);
        }

        let credentials = self
            .credentials
            .as_ref()
            .ok_or(ProviderError::MissingCredentials)?;

        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while we waited
        if let Some(token) = self.fresh_token(Utc::now()) {
            self.counters.hit_count.fetch_add(1, Ordering::SeqCst);
            return Ok(token);
        }

        let access = match provider.authenticate(credentials).await {
            Ok(access) => access,
            Err(e) => {
                self.counters
                    .failed_refresh_count
                    .fetch_add(1, Ordering::SeqCst);
                tracing::error!(error = %e, "Supplier token refresh failed");
                return Err(e);
            }
        };

        // Lifetime counts from receipt, not from when the exchange started
        let token = CachedToken::issued_at(access.token, Utc::now(), access.ttl_seconds);
        tracing::info!(
            expires_at = %token.expires_at,
            ttl_seconds = access.ttl_seconds,
            "Refreshed supplier access token"
        );

        let value = token.value.clone();
        self.store(token);
        self.counters.refresh_count.fetch_add(1, Ordering::SeqCst);

        Ok(value)
    }

    pub fn stats(&self) -> TokenCacheStats {
        TokenCacheStats {
            hit_count: self.counters.hit_count.load(Ordering::SeqCst),
            refresh_count: self.counters.refresh_count.load(Ordering::SeqCst),
            failed_refresh_count: self.counters.failed_refresh_count.load(Ordering::SeqCst),
        }
    }
}
