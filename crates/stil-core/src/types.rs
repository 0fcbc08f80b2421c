//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty after trimming.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// A person's identity as typed at the desk: first and last name.
///
/// Both parts are trimmed on construction and must be non-empty. Stored
/// casing is preserved; comparisons that ignore case go through
/// [`Identity::key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    first: String,
    last: String,
}

impl Identity {
    /// Creates a new identity after trimming and validation.
    pub fn new(first: impl AsRef<str>, last: impl AsRef<str>) -> Result<Self, ValidationError> {
        let first = first.as_ref().trim();
        if first.is_empty() {
            return Err(ValidationError::Empty {
                field: "first name",
            });
        }
        let last = last.as_ref().trim();
        if last.is_empty() {
            return Err(ValidationError::Empty { field: "last name" });
        }
        Ok(Self {
            first: first.to_string(),
            last: last.to_string(),
        })
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn last(&self) -> &str {
        &self.last
    }

    /// Lowercased key used for case-insensitive matching.
    pub fn key(&self) -> NameKey {
        NameKey {
            first: fold(&self.first).collect(),
            last: fold(&self.last).collect(),
        }
    }

    /// Exact, case-sensitive match against a stored record.
    pub fn matches_record(&self, record: &SessionRecord) -> bool {
        record.first == self.first && record.last == self.last
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.first, self.last)
    }
}

/// Case-folded form of an [`Identity`], built once and compared against many
/// raw name pairs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NameKey {
    first: String,
    last: String,
}

impl NameKey {
    /// Case-insensitive match against a raw name pair. Surrounding whitespace
    /// is ignored.
    pub fn matches(&self, first: &str, last: &str) -> bool {
        fold(first.trim()).eq(self.first.chars()) && fold(last.trim()).eq(self.last.chars())
    }
}

fn fold(text: &str) -> impl Iterator<Item = char> + '_ {
    text.chars().flat_map(char::to_lowercase)
}

/// One attendance event as persisted.
///
/// Timestamps and the consumed duration are kept in their canonical text
/// forms (see [`crate::time`]). An empty `time_out` marks an open session;
/// `consumed` is filled in together with `time_out` and never on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub first: String,
    pub last: String,
    pub time_in: String,
    #[serde(default)]
    pub time_out: String,
    #[serde(default)]
    pub consumed: String,
}

impl SessionRecord {
    /// Creates an open record for `identity` starting at `time_in`.
    pub fn open(identity: &Identity, time_in: String) -> Self {
        Self {
            first: identity.first().to_string(),
            last: identity.last().to_string(),
            time_in,
            time_out: String::new(),
            consumed: String::new(),
        }
    }

    /// Returns true while no time-out has been recorded.
    pub fn is_open(&self) -> bool {
        self.time_out.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_trims_names() {
        let id = Identity::new("  Jane ", "\tDoe\n").unwrap();
        assert_eq!(id.first(), "Jane");
        assert_eq!(id.last(), "Doe");
    }

    #[test]
    fn identity_rejects_blank_parts() {
        assert_eq!(
            Identity::new("   ", "Doe").unwrap_err(),
            ValidationError::Empty {
                field: "first name"
            }
        );
        assert_eq!(
            Identity::new("Jane", "").unwrap_err(),
            ValidationError::Empty { field: "last name" }
        );
    }

    #[test]
    fn identity_exact_match_is_case_sensitive() {
        let id = Identity::new("Jane", "Doe").unwrap();
        let mut record = SessionRecord::open(&id, "01/01/2024 10:00:00".to_string());
        assert!(id.matches_record(&record));

        record.first = "jane".to_string();
        assert!(!id.matches_record(&record));
    }

    #[test]
    fn name_key_matches_ignoring_case_and_padding() {
        let key = Identity::new("Jane", "Doe").unwrap().key();
        assert!(key.matches("JANE", " doe "));
        assert!(!key.matches("Jane", "Smith"));
        assert!(!key.matches("Jan", "Doe"));
        assert!(!key.matches("Janet", "Doe"));
    }

    #[test]
    fn name_key_folds_non_ascii_letters() {
        let key = Identity::new("RENÉ", "Roe").unwrap().key();
        assert!(key.matches("René", "ROE"));
        assert_eq!(key, Identity::new("rené", "roe").unwrap().key());
    }

    #[test]
    fn record_serializes_with_original_keys() {
        let id = Identity::new("Jane", "Doe").unwrap();
        let record = SessionRecord::open(&id, "01/01/2024 10:00:00".to_string());
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"first":"Jane","last":"Doe","timeIn":"01/01/2024 10:00:00","timeOut":"","consumed":""}"#
        );
    }

    #[test]
    fn record_tolerates_missing_optional_fields() {
        let json = r#"{"first":"Jane","last":"Doe","timeIn":"01/01/2024 10:00:00"}"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert!(record.is_open());
        assert!(record.consumed.is_empty());
    }
}
