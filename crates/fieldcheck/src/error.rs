//! Error types: the per-field error map produced by a run, and the errors that
//! abort a run.

use crate::spec::RuleParseError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Per-field failure messages.
///
/// Fields keep first-insertion order, and each field's messages are distinct
/// and ordered by first insertion. Fields are never removed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorMap {
    fields: IndexMap<String, Vec<String>>,
}

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a message for a field.
    ///
    /// Returns `false` when the field already holds the exact same message.
    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) -> bool {
        let message = message.into();
        let messages = self.fields.entry(field.into()).or_default();
        if messages.contains(&message) {
            false
        } else {
            messages.push(message);
            true
        }
    }

    /// Merge another map into this one, keeping the de-duplication rules.
    pub fn merge(&mut self, other: ErrorMap) {
        for (field, messages) in other.fields {
            for message in messages {
                self.insert(field.clone(), message);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Total number of messages across all fields.
    pub fn len(&self) -> usize {
        self.fields.values().map(Vec::len).sum()
    }

    /// Messages for a field.
    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.fields.get(field).map(Vec::as_slice)
    }

    pub fn contains_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.fields
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }

    /// `Ok` when there are no errors.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ErrorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Validation failed: {} error(s) in {} field(s)",
            self.len(),
            self.fields.len()
        )
    }
}

impl std::error::Error for ErrorMap {}

impl<'a> IntoIterator for &'a ErrorMap {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = indexmap::map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// Failure reported by a record lookup backend.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct LookupError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl LookupError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Wrap a backend error.
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

/// Errors that abort a validation run.
///
/// Rule failures are never reported here; they land in the [`ErrorMap`].
#[derive(Debug, thiserror::Error)]
pub enum ValidateError {
    #[error("invalid rule `{descriptor}` for field `{field}`: {source}")]
    InvalidRule {
        field: String,
        descriptor: String,
        #[source]
        source: RuleParseError,
    },

    #[error("unknown rule `{name}` for field `{field}`")]
    UnknownRule { field: String, name: String },

    #[error("rule `unique` on `{table}.{column}` needs a record lookup, none is configured")]
    NoRecordLookup { table: String, column: String },

    #[error("record lookup failed for `{table}.{column}`: {source}")]
    Lookup {
        table: String,
        column: String,
        #[source]
        source: LookupError,
    },
}
