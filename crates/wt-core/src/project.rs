//! Projects that intervals are tracked against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::ProjectId;

/// A named project.
///
/// The engine only relies on `id` equality and writes `last_accessed_at` when an
/// interval is started. Everything else belongs to whoever manages projects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub id: ProjectId,

    /// Display name.
    pub name: String,

    /// Display colour as `0xRRGGBB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,

    /// Optional parent project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ProjectId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    pub created_at: DateTime<Utc>,

    /// Last time an interval was started for this project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_accessed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn optional_fields_are_omitted_from_json() {
        let project = Project {
            id: ProjectId::new("garden").unwrap(),
            name: "Garden".to_string(),
            color: None,
            parent: None,
            notes: None,
            created_at: Utc.with_ymd_and_hms(2024, 7, 16, 12, 0, 0).unwrap(),
            last_accessed_at: None,
        };

        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "garden",
                "name": "Garden",
                "created_at": "2024-07-16T12:00:00Z",
            })
        );
        assert_eq!(serde_json::from_value::<Project>(json).unwrap(), project);
    }
}
