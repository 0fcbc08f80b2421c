//! Session state machine: time-in, time-out and the minimum-stay rule.
//!
//! Per identity a session moves `NoSession -> Open -> Closed`. A closed
//! session is terminal but a new open one may follow it. The caller always
//! supplies `now`; the engine never samples the clock itself.

use chrono::{Duration, NaiveDateTime};
use thiserror::Error;

use crate::store::{LogStore, SessionStore, StoreError, find_open_index};
use crate::time::{TimeError, format_duration, format_instant, parse_instant};
use crate::types::{Identity, SessionRecord, ValidationError};

/// Minimum time a session must stay open before it may be closed.
pub const MIN_STAY: Duration = Duration::seconds(15 * 60);

const MS_PER_MINUTE: i64 = 60_000;

/// Errors from session transitions. None of them mutate the store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("You already have an active session. Please Time-Out first.")]
    AlreadyActive { identity: Identity, since: String },

    #[error("No open session")]
    NoOpenSession { identity: Identity },

    #[error("Minimum stay is {min_stay_minutes} mins. Wait {minutes_remaining} more minute(s).")]
    MinimumStayNotMet {
        minutes_remaining: i64,
        min_stay_minutes: i64,
    },

    #[error(transparent)]
    Time(#[from] TimeError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A minimum stay that cannot be used as a session rule.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("minimum stay cannot be negative: {minutes} minutes")]
    Negative { minutes: i64 },

    #[error("minimum stay is out of range: {minutes} minutes")]
    OutOfRange { minutes: i64 },
}

/// Tunable session rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub min_stay: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self { min_stay: MIN_STAY }
    }
}

impl SessionPolicy {
    /// Policy with a minimum stay of `minutes` whole minutes.
    pub fn with_min_stay_minutes(minutes: i64) -> Result<Self, PolicyError> {
        if minutes < 0 {
            return Err(PolicyError::Negative { minutes });
        }
        let min_stay = Duration::try_minutes(minutes).ok_or(PolicyError::OutOfRange { minutes })?;
        Ok(Self { min_stay })
    }
}

/// Drives session transitions against an owned [`SessionStore`].
#[derive(Debug)]
pub struct SessionEngine<S> {
    store: SessionStore<S>,
    policy: SessionPolicy,
}

impl<S: LogStore> SessionEngine<S> {
    pub fn new(backend: S) -> Self {
        Self::with_policy(backend, SessionPolicy::default())
    }

    pub const fn with_policy(backend: S, policy: SessionPolicy) -> Self {
        Self {
            store: SessionStore::new(backend),
            policy,
        }
    }

    pub const fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SessionStore<S> {
        &mut self.store
    }

    pub const fn policy(&self) -> SessionPolicy {
        self.policy
    }

    /// Opens a new session for `first`/`last` starting at `now`.
    pub fn time_in(
        &mut self,
        first: &str,
        last: &str,
        now: NaiveDateTime,
    ) -> Result<SessionRecord, SessionError> {
        let identity = Identity::new(first, last)?;

        if let Some(active) = self.store.find_open_session(&identity)? {
            tracing::debug!(%identity, since = %active.time_in, "rejected duplicate time-in");
            return Err(SessionError::AlreadyActive {
                identity,
                since: active.time_in,
            });
        }

        let record = SessionRecord::open(&identity, format_instant(now));
        self.store.append(record.clone())?;
        tracing::info!(%identity, time_in = %record.time_in, "timed in");
        Ok(record)
    }

    /// Closes the open session for `first`/`last` at `now`.
    ///
    /// Fails without mutation when the minimum stay has not elapsed; the
    /// caller is expected to retry later.
    pub fn time_out(
        &mut self,
        first: &str,
        last: &str,
        now: NaiveDateTime,
    ) -> Result<SessionRecord, SessionError> {
        let identity = Identity::new(first, last)?;

        let mut records = self.store.records()?;
        let Some(idx) = find_open_index(&records, &identity) else {
            return Err(SessionError::NoOpenSession { identity });
        };

        let start = parse_instant(&records[idx].time_in)?;
        if now < start {
            return Err(TimeError::InvalidRange {
                start: records[idx].time_in.clone(),
                end: format_instant(now),
            }
            .into());
        }

        let elapsed = now.signed_duration_since(start);
        if elapsed < self.policy.min_stay {
            let minutes_remaining = ceil_minutes(self.policy.min_stay - elapsed);
            tracing::debug!(%identity, minutes_remaining, "minimum stay not met");
            return Err(SessionError::MinimumStayNotMet {
                minutes_remaining,
                min_stay_minutes: self.policy.min_stay.num_minutes(),
            });
        }

        let consumed = format_duration(start, now)?;
        let record = &mut records[idx];
        record.time_out = format_instant(now);
        record.consumed = consumed;
        let closed = record.clone();

        self.store.replace_all(&records)?;
        tracing::info!(%identity, consumed = %closed.consumed, "timed out");
        Ok(closed)
    }

    /// Returns the open session for `first`/`last`, if any.
    pub fn open_session(
        &self,
        first: &str,
        last: &str,
    ) -> Result<Option<SessionRecord>, SessionError> {
        let identity = Identity::new(first, last)?;
        Ok(self.store.find_open_session(&identity)?)
    }
}

/// Whole minutes still required, rounded up. `remaining` must be positive.
fn ceil_minutes(remaining: Duration) -> i64 {
    let ms = remaining.num_milliseconds();
    let whole = ms.div_euclid(MS_PER_MINUTE);
    if ms.rem_euclid(MS_PER_MINUTE) == 0 {
        whole
    } else {
        whole + 1
    }
}
