//! Run identity for correlating context lifecycles in logs and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Identifies one context's lifetime across log records and events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunIdentity {
    /// The unique ID for this context.
    pub run_id: Uuid,

    /// An optional caller-supplied correlation ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<Uuid>,

    /// When the context was created.
    pub created_at: DateTime<Utc>,
}

impl RunIdentity {
    /// Creates a new identity with a generated run ID.
    #[must_use]
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            correlation_id: None,
            created_at: Utc::now(),
        }
    }

    /// Creates an identity with a specific run ID.
    #[must_use]
    pub fn with_run_id(run_id: Uuid) -> Self {
        Self {
            run_id,
            correlation_id: None,
            created_at: Utc::now(),
        }
    }

    /// Sets the correlation ID.
    #[must_use]
    pub fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }

    /// Returns the run ID as a string.
    #[must_use]
    pub fn run_id_str(&self) -> String {
        self.run_id.to_string()
    }

    /// Converts to a dictionary with string values (or null).
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();

        map.insert(
            "run_id".to_string(),
            serde_json::json!(self.run_id.to_string()),
        );
        map.insert(
            "correlation_id".to_string(),
            self.correlation_id
                .map_or(serde_json::Value::Null, |id| {
                    serde_json::json!(id.to_string())
                }),
        );
        map.insert(
            "created_at".to_string(),
            serde_json::json!(self.created_at.to_rfc3339()),
        );

        map
    }
}

impl Default for RunIdentity {
    fn default() -> Self {
        Self::new()
    }
}
