//! Ordered session collection over an abstract persistence slot.
//!
//! The persistence collaborator holds the whole collection in one slot and is
//! read and written wholesale. [`SessionStore`] loads a fresh snapshot at the
//! start of every call and, for mutations, writes the full collection back at
//! the end. There are no partial updates.

use thiserror::Error;

use crate::types::{Identity, SessionRecord};

/// Failure reported by a [`LogStore`] implementation.
#[derive(Debug, Error)]
#[error("session storage failed: {message}")]
pub struct StoreError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// A single named slot holding the entire serialized session collection.
///
/// An absent slot is equivalent to an empty collection.
pub trait LogStore {
    /// Reads the whole collection.
    fn load(&self) -> Result<Vec<SessionRecord>, StoreError>;

    /// Replaces the whole collection.
    fn save(&mut self, records: &[SessionRecord]) -> Result<(), StoreError>;

    /// Removes the slot entirely. Removing an absent slot is not an error.
    fn remove(&mut self) -> Result<(), StoreError>;
}

/// In-process [`LogStore`], mainly for tests and dry runs.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    slot: Option<Vec<SessionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when nothing has been saved (or the slot was removed).
    pub fn is_vacant(&self) -> bool {
        self.slot.is_none()
    }
}

impl LogStore for MemoryStore {
    fn load(&self) -> Result<Vec<SessionRecord>, StoreError> {
        Ok(self.slot.clone().unwrap_or_default())
    }

    fn save(&mut self, records: &[SessionRecord]) -> Result<(), StoreError> {
        self.slot = Some(records.to_vec());
        Ok(())
    }

    fn remove(&mut self) -> Result<(), StoreError> {
        self.slot = None;
        Ok(())
    }
}

/// Position of the most recent open session for `identity`, scanning from
/// the newest record backwards. Identity matching is exact.
pub fn find_open_index(records: &[SessionRecord], identity: &Identity) -> Option<usize> {
    records
        .iter()
        .rposition(|record| record.is_open() && identity.matches_record(record))
}

/// Insertion-ordered session collection backed by a [`LogStore`].
#[derive(Debug)]
pub struct SessionStore<S> {
    backend: S,
}

impl<S: LogStore> SessionStore<S> {
    pub const fn new(backend: S) -> Self {
        Self { backend }
    }

    /// Loads a snapshot of every record in insertion order.
    pub fn records(&self) -> Result<Vec<SessionRecord>, StoreError> {
        let records = self.backend.load()?;
        tracing::debug!(count = records.len(), "loaded session records");
        Ok(records)
    }

    /// Returns the most recent open session for `identity`, if any.
    pub fn find_open_session(
        &self,
        identity: &Identity,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let records = self.records()?;
        Ok(find_open_index(&records, identity).map(|idx| records[idx].clone()))
    }

    /// Appends a record at the end of the collection.
    pub fn append(&mut self, record: SessionRecord) -> Result<(), StoreError> {
        let mut records = self.records()?;
        records.push(record);
        self.replace_all(&records)
    }

    /// Overwrites the whole collection.
    pub fn replace_all(&mut self, records: &[SessionRecord]) -> Result<(), StoreError> {
        self.backend.save(records)?;
        tracing::debug!(count = records.len(), "saved session records");
        Ok(())
    }

    /// Deletes every record. Clearing an empty store is a no-op.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        self.backend.remove()?;
        tracing::debug!("cleared session records");
        Ok(())
    }

    pub const fn backend(&self) -> &S {
        &self.backend
    }
}
