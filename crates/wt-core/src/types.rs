//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// Lifecycle state of an interval, derived from its start and end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntervalStatus {
    /// Neither start nor end is set.
    Pending,
    /// Started, not yet stopped.
    Running,
    /// Both start and end are set.
    Stopped,
}

impl IntervalStatus {
    /// String representation for display and JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for IntervalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated interval identifier.
    ///
    /// Fresh intervals get a random UUID; stored intervals keep whatever
    /// non-empty ID they were persisted with.
    IntervalId, "interval ID"
);

define_string_id!(
    /// A validated project identifier.
    ///
    /// The engine only compares project IDs for equality and ordering; it never
    /// inspects the project itself.
    ProjectId, "project ID"
);

impl IntervalId {
    /// Generates a fresh random ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interval_id_rejects_empty() {
        assert!(IntervalId::new("").is_err());
        assert!(IntervalId::new("   ").is_err());
        assert!(IntervalId::new("valid-id").is_ok());
    }

    #[test]
    fn project_id_rejects_empty() {
        assert_eq!(
            ProjectId::new("").unwrap_err(),
            ValidationError::Empty {
                field: "project ID"
            }
        );
        assert!(ProjectId::new("writing").is_ok());
    }

    #[test]
    fn generated_interval_ids_are_unique() {
        let a = IntervalId::generate();
        let b = IntervalId::generate();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 36);
    }

    #[test]
    fn project_id_serde_roundtrip() {
        let id = ProjectId::new("thesis").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"thesis\"");
        let parsed: ProjectId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn project_id_serde_rejects_empty() {
        let result: Result<ProjectId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }

    #[test]
    fn interval_status_serde_matches_as_str() {
        for status in [
            IntervalStatus::Pending,
            IntervalStatus::Running,
            IntervalStatus::Stopped,
        ] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }
}
