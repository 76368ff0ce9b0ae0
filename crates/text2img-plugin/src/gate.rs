use std::{
    collections::{HashMap, HashSet},
    sync::{Arc, Mutex},
    time::Duration,
};

use thiserror::Error;
use tokio::time::Instant;

/// Debounce records are only purged once the table grows past this size
const PURGE_THRESHOLD: usize = 100;

/// Why the gate turned a request away
///
/// The display text is what the user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Same user asked again inside the debounce window
    #[error("You're going too fast, please try again later.")]
    TooFast,

    /// The user already has a generation running
    #[error("You already have an image generation in progress, please wait…")]
    Busy,
}

/// Per-user admission control: a debounce window plus an in-flight guard
pub struct RequestGate {
    window: Duration,
    record_ttl: Duration,
    last_accepted: Mutex<HashMap<String, Instant>>,
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl RequestGate {
    pub fn new(window: Duration, record_ttl: Duration) -> Self {
        Self {
            window,
            record_ttl,
            last_accepted: Mutex::new(HashMap::new()),
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Debounce check, then in-flight check
    ///
    /// A request that passes debounce is recorded even if the in-flight
    /// check then rejects it.
    pub fn admit(&self, user_id: &str) -> Result<InFlightGuard, Rejection> {
        self.check_debounce(user_id)?;
        self.try_acquire(user_id)
    }

    /// Reject if `user_id` was accepted less than one window ago, otherwise
    /// record now
    pub fn check_debounce(&self, user_id: &str) -> Result<(), Rejection> {
        let now = Instant::now();
        let mut last_accepted = self.last_accepted.lock().unwrap_or_else(|e| e.into_inner());

        if last_accepted.len() > PURGE_THRESHOLD {
            let ttl = self.record_ttl;
            last_accepted.retain(|_, at| now.duration_since(*at) <= ttl);
        }

        let too_soon = last_accepted
            .get(user_id)
            .is_some_and(|at| now.duration_since(*at) < self.window);

        if too_soon {
            tracing::debug!(user_id, "request rejected by debounce window");
            return Err(Rejection::TooFast);
        }

        last_accepted.insert(user_id.to_owned(), now);
        Ok(())
    }

    /// Mark `user_id` as in flight until the returned guard is dropped
    pub fn try_acquire(&self, user_id: &str) -> Result<InFlightGuard, Rejection> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(|e| e.into_inner());

        if !in_flight.insert(user_id.to_owned()) {
            tracing::debug!(user_id, "request rejected, generation already in progress");
            return Err(Rejection::Busy);
        }

        Ok(InFlightGuard {
            in_flight: Arc::clone(&self.in_flight),
            user_id: user_id.to_owned(),
        })
    }

    pub fn is_in_flight(&self, user_id: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(user_id)
    }

    /// Number of users with a debounce record
    pub fn tracked_users(&self) -> usize {
        self.last_accepted.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Clears the user's in-flight mark when dropped
#[must_use = "the user stays in flight only while the guard is held"]
pub struct InFlightGuard {
    in_flight: Arc<Mutex<HashSet<String>>>,
    user_id: String,
}

impl InFlightGuard {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.user_id);
    }
}

impl std::fmt::Debug for InFlightGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InFlightGuard").field("user_id", &self.user_id).finish()
    }
}
