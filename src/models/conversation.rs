use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, sqlx::FromRow)]
pub struct Conversation {
    pub id: i64,
    /// Normalized sender address, unique per instance
    pub phone: String,
    pub name: Option<String>,
    /// First matched ORIGIN result, never overwritten once set
    pub origin: Option<String>,
    /// Latest matched STATUS result
    pub status: String,
    pub last_message: Option<String>,
    pub instance_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to create or refresh a conversation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationUpsert {
    pub phone: String,
    pub name: Option<String>,
    pub origin: Option<String>,
    pub status: Option<String>,
    pub last_message: Option<String>,
    pub instance_id: Option<i64>,
}
