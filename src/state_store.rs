use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_STATE_TTL: Duration = Duration::from_secs(600);
pub const DEFAULT_MAX_PENDING: usize = 1024;

/// OAuth `state` values handed out by `/auth/login` and not yet redeemed.
#[derive(Debug)]
pub struct PendingAuthorizations {
    states: RwLock<HashMap<String, Instant>>,
    ttl: Duration,
    capacity: usize,
}

impl Default for PendingAuthorizations {
    fn default() -> Self {
        Self::new(DEFAULT_STATE_TTL)
    }
}

impl PendingAuthorizations {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(ttl, DEFAULT_MAX_PENDING)
    }

    /// At most `capacity` states are kept; the oldest is evicted to make room.
    pub fn with_capacity(ttl: Duration, capacity: usize) -> Self {
        Self {
            states: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn insert(&self, state: &str) {
        let mut states = self.states.write().unwrap_or_else(PoisonError::into_inner);
        // Drop expired entries
        states.retain(|_, issued| issued.elapsed() < self.ttl);
        while states.len() >= self.capacity {
            let oldest = states
                .iter()
                .min_by_key(|(_, issued)| **issued)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    debug!("Evicting oldest pending OAuth state");
                    states.remove(&key);
                }
                None => break,
            }
        }
        states.insert(state.to_string(), Instant::now());
    }

    /// Remove `state`, returning whether it was issued and is still fresh.
    pub fn consume(&self, state: &str) -> bool {
        let mut states = self.states.write().unwrap_or_else(PoisonError::into_inner);
        match states.remove(state) {
            Some(issued) if issued.elapsed() < self.ttl => true,
            Some(_) => {
                debug!("OAuth state expired: {}", state);
                false
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.states
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
