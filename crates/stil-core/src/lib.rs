//! Core domain logic for library attendance tracking.
//!
//! This crate contains the fundamental types and logic for:
//! - Time codec: canonical text for instants and durations
//! - Sessions: the time-in/time-out state machine and minimum-stay rule
//! - Exported tables: encoding records and decoding them for aggregation
//! - Aggregation: total consumed time per student across exports

pub mod aggregate;
mod engine;
pub mod records;
mod store;
pub mod time;
mod types;

pub use aggregate::{Aggregate, decode_all, seconds_to_duration_text, total_duration};
pub use engine::{MIN_STAY, PolicyError, SessionEngine, SessionError, SessionPolicy};
pub use records::{DecodedTable, PartialRecord, RowOutcome, SkipReason};
pub use store::{LogStore, MemoryStore, SessionStore, StoreError, find_open_index};
pub use time::TimeError;
pub use types::{Identity, NameKey, SessionRecord, ValidationError};
