//! Revoked token ids

use std::fmt::Debug;
use std::time::Duration;

use moka::future::Cache;

/// Set of revoked token ids
///
/// Entries live for the token lifetime: once that has passed, the token is
/// rejected as expired anyway and the entry can be dropped.
#[derive(Clone)]
pub struct TokenDenylist {
    revoked: Cache<String, ()>,
}

impl Debug for TokenDenylist {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenDenylist")
            .field("entries", &self.revoked.entry_count())
            .finish()
    }
}

impl TokenDenylist {
    /// The cache is not size-bounded: evicting a live entry would make a
    /// revoked token valid again. The TTL bounds it instead.
    pub fn new(token_ttl: Duration) -> Self {
        let revoked = Cache::builder()
            .time_to_live(token_ttl)
            .build();

        Self { revoked }
    }

    pub async fn revoke(&self, token_id: &str) {
        self.revoked.insert(token_id.to_string(), ()).await;
    }

    pub fn is_revoked(&self, token_id: &str) -> bool {
        self.revoked.contains_key(token_id)
    }
}
