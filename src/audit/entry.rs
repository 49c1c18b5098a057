//! Audit entry data structures
//!
//! An audit entry is itself a record in the `audit` resource. Its persisted
//! shape is `{ id, resource, data_id, activityType, activityDetail, actorId,
//! timestamp }`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RegisterResult;
use crate::models::{Actor, Fields, Record, RecordId};

/// Kind of activity an entry records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    /// User signed in
    Login,
    /// User signed out
    Logout,
    /// Record was created
    Create,
    /// Record was updated
    Edit,
    /// Record was deleted
    Delete,
}

impl std::fmt::Display for ActivityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActivityType::Login => write!(f, "LOGIN"),
            ActivityType::Logout => write!(f, "LOGOUT"),
            ActivityType::Create => write!(f, "CREATE"),
            ActivityType::Edit => write!(f, "EDIT"),
            ActivityType::Delete => write!(f, "DELETE"),
        }
    }
}

/// A stored audit entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: RecordId,

    /// Resource of the affected record
    pub resource: String,

    /// Id of the affected record
    #[serde(rename = "data_id", default, skip_serializing_if = "Option::is_none")]
    pub data_id: Option<RecordId>,

    pub activity_type: ActivityType,

    /// Human-readable description
    pub activity_detail: String,

    /// User the activity is attributed to
    pub actor_id: RecordId,

    /// When the activity happened (UTC)
    pub timestamp: DateTime<Utc>,
}

/// Fields of an entry before the store assigns its id
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewAuditEntry<'a> {
    resource: &'a str,
    #[serde(rename = "data_id", skip_serializing_if = "Option::is_none")]
    data_id: Option<RecordId>,
    activity_type: ActivityType,
    activity_detail: &'a str,
    actor_id: RecordId,
    timestamp: DateTime<Utc>,
}

impl AuditEntry {
    /// Field map for a new entry, timestamped now
    pub fn draft(
        actor: &Actor,
        activity_type: ActivityType,
        resource: &str,
        data_id: Option<RecordId>,
        detail: &str,
    ) -> RegisterResult<Fields> {
        let draft = NewAuditEntry {
            resource,
            data_id,
            activity_type,
            activity_detail: detail,
            actor_id: actor.id,
            timestamp: Utc::now(),
        };
        match serde_json::to_value(draft)? {
            serde_json::Value::Object(fields) => Ok(fields),
            _ => Ok(Fields::new()),
        }
    }

    /// Read an entry back from its record
    pub fn from_record(record: &Record) -> RegisterResult<Self> {
        Ok(serde_json::from_value(record.to_value())?)
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.activity_type,
            self.resource,
        );

        if let Some(data_id) = self.data_id {
            output.push_str(&format!(" #{}", data_id));
        }

        output.push_str(&format!(" by user {}", self.actor_id));

        if !self.activity_detail.is_empty() {
            output.push_str(&format!("\n  {}", self.activity_detail));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn actor() -> Actor {
        Actor::new(RecordId::new(1), "ian", true)
    }

    #[test]
    fn test_activity_type_display() {
        assert_eq!(ActivityType::Create.to_string(), "CREATE");
        assert_eq!(ActivityType::Edit.to_string(), "EDIT");
        assert_eq!(ActivityType::Logout.to_string(), "LOGOUT");
    }

    #[test]
    fn test_draft_uses_persisted_field_names() {
        let fields = AuditEntry::draft(
            &actor(),
            ActivityType::Create,
            "items",
            Some(RecordId::new(4)),
            "Created item V01/2025/05",
        )
        .unwrap();

        assert_eq!(fields.get("resource"), Some(&json!("items")));
        assert_eq!(fields.get("data_id"), Some(&json!(4)));
        assert_eq!(fields.get("activityType"), Some(&json!("create")));
        assert_eq!(fields.get("activityDetail"), Some(&json!("Created item V01/2025/05")));
        assert_eq!(fields.get("actorId"), Some(&json!(1)));
        assert!(fields.contains_key("timestamp"));
        assert!(!fields.contains_key("id"));
    }

    #[test]
    fn test_from_record() {
        let fields =
            AuditEntry::draft(&actor(), ActivityType::Login, "users", None, "Logged in").unwrap();
        let record = Record::new(RecordId::new(9), fields);

        let entry = AuditEntry::from_record(&record).unwrap();
        assert_eq!(entry.id, RecordId::new(9));
        assert_eq!(entry.activity_type, ActivityType::Login);
        assert_eq!(entry.data_id, None);
        assert_eq!(entry.actor_id, RecordId::new(1));
    }

    #[test]
    fn test_human_readable_format() {
        let fields = AuditEntry::draft(
            &actor(),
            ActivityType::Delete,
            "batches",
            Some(RecordId::new(2)),
            "Deleted batch V00/2025",
        )
        .unwrap();
        let entry = AuditEntry::from_record(&Record::new(RecordId::new(0), fields)).unwrap();

        let formatted = entry.format_human_readable();
        assert!(formatted.contains("DELETE"));
        assert!(formatted.contains("batches #2"));
        assert!(formatted.contains("Deleted batch V00/2025"));
    }
}
