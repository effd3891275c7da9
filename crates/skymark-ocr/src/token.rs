//! Access-token caching
//!
//! A `TokenCache` holds the current access token and its expiry. A new token is
//! fetched only when none is cached or the cached one is within the refresh
//! margin of expiring. Refreshes are serialized behind an async mutex, so
//! concurrent callers sharing one cache trigger at most one fetch.

use crate::OcrError;
use skymark_domain::traits::TokenSource;
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Default lead time before expiry at which a token is refreshed (5 minutes)
pub const DEFAULT_REFRESH_MARGIN_SECS: u64 = 300;

/// Upper bound on the lifetime accepted from the issuer (one year)
pub const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(365 * 24 * 3600);

/// Token as returned by the issuing endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    /// Opaque token value
    pub value: String,
    /// Lifetime reported by the issuer
    pub expires_in: Duration,
}

/// Token with an absolute expiry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    /// Opaque token value
    pub value: String,
    /// Instant after which the issuer rejects the token
    pub expires_at: Instant,
}

impl CachedToken {
    /// Anchor an issued token at `now`; lifetimes above [`MAX_TOKEN_LIFETIME`] are capped
    pub fn issued_at(token: IssuedToken, now: Instant) -> Self {
        Self {
            value: token.value,
            expires_at: now + token.expires_in.min(MAX_TOKEN_LIFETIME),
        }
    }

    /// True while the token outlives `now` by more than `margin`
    pub fn is_fresh(&self, now: Instant, margin: Duration) -> bool {
        now + margin < self.expires_at
    }
}

/// Source of brand-new tokens (one network round trip per call)
pub trait TokenFetcher {
    /// Fetch a new token from the issuer
    fn fetch(&self) -> impl Future<Output = Result<IssuedToken, OcrError>> + Send;
}

/// Expiry-aware token holder
pub struct TokenCache<F> {
    fetcher: F,
    refresh_margin: Duration,
    state: Mutex<Option<CachedToken>>,
}

impl<F> TokenCache<F> {
    /// Create an empty cache around `fetcher`
    pub fn new(fetcher: F, refresh_margin: Duration) -> Self {
        Self {
            fetcher,
            refresh_margin,
            state: Mutex::new(None),
        }
    }

    /// Create a cache with the default 5-minute refresh margin
    pub fn with_default_margin(fetcher: F) -> Self {
        Self::new(fetcher, Duration::from_secs(DEFAULT_REFRESH_MARGIN_SECS))
    }

    /// Refresh margin in effect
    pub fn refresh_margin(&self) -> Duration {
        self.refresh_margin
    }
}

impl<F> TokenSource for TokenCache<F>
where
    F: TokenFetcher + Sync,
{
    type Error = OcrError;

    async fn valid_token(&self) -> Result<String, OcrError> {
        let mut state = self.state.lock().await;

        if let Some(token) = state.as_ref() {
            if token.is_fresh(Instant::now(), self.refresh_margin) {
                debug!("Reusing cached access token");
                return Ok(token.value.clone());
            }
        }

        let issued = self.fetcher.fetch().await?;
        info!(
            "Fetched new access token (expires in {}s)",
            issued.expires_in.as_secs()
        );
        let token = CachedToken::issued_at(issued, Instant::now());
        let value = token.value.clone();
        *state = Some(token);
        Ok(value)
    }

    async fn invalidate(&self) {
        if self.state.lock().await.take().is_some() {
            info!("Dropped rejected access token");
        }
    }
}
