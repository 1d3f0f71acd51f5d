//! Lookup state machine: `Idle -> Loading -> {Success, NotFound, Failed}`.
//!
//! Any state may move back to `Loading` when a new search starts. Each search
//! is tagged with a sequence number and only the newest one may complete, so a
//! slow response can never overwrite the result of a later search.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::{error::Error, model::Weather};

#[derive(Debug, Clone, PartialEq)]
pub enum LookupState {
    Idle,
    Loading { city: String },
    Success { weather: Weather, fetched_at: DateTime<Utc> },
    NotFound { city: String },
    Failed { message: String },
}

impl LookupState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LookupState::Idle | LookupState::Loading { .. })
    }
}

/// Handle for one in-flight lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug)]
pub struct LookupTracker {
    latest: AtomicU64,
    state: watch::Sender<LookupState>,
}

impl Default for LookupTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LookupTracker {
    pub fn new() -> Self {
        let (state, _) = watch::channel(LookupState::Idle);
        Self {
            latest: AtomicU64::new(0),
            state,
        }
    }

    /// Enter `Loading` for `city`. Any ticket issued earlier becomes stale.
    pub fn begin(&self, city: &str) -> Ticket {
        let mut seq = 0;
        self.state.send_modify(|state| {
            seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
            *state = LookupState::Loading {
                city: city.to_string(),
            };
        });
        Ticket(seq)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Apply the outcome of `ticket`'s request.
    ///
    /// Returns `false` and leaves the state alone when a newer search has
    /// started since `ticket` was issued.
    pub fn complete(&self, ticket: Ticket, outcome: &Result<Weather, Error>) -> bool {
        let next = match outcome {
            Ok(weather) => LookupState::Success {
                weather: weather.clone(),
                fetched_at: Utc::now(),
            },
            Err(Error::NotFound(city)) => LookupState::NotFound { city: city.clone() },
            Err(e) => LookupState::Failed {
                message: e.user_message().to_string(),
            },
        };

        // Sequence bumps and state writes both happen under the channel's
        // lock, so a concurrent `begin` cannot slip in between.
        self.state.send_if_modified(|state| {
            if !self.is_current(ticket) {
                return false;
            }
            *state = next;
            true
        })
    }

    /// Record a failure that happened before any request was issued, such as
    /// blank input. Supersedes whatever lookup was in flight.
    pub fn reject(&self, error: &Error) {
        self.state.send_modify(|state| {
            self.latest.fetch_add(1, Ordering::SeqCst);
            *state = LookupState::Failed {
                message: error.user_message().to_string(),
            };
        });
    }

    pub fn state(&self) -> LookupState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LookupState> {
        self.state.subscribe()
    }
}
