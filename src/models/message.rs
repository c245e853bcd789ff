use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::consts;

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub conversation_id: i64,
    pub phone: String,
    pub body: String,
    pub direction: String,
    pub instance_id: Option<i64>,
    /// Provider delivery id, kept for analysis. Redeliveries are not deduplicated.
    pub provider_message_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn inbound(
        conversation_id: i64,
        phone: &str,
        body: &str,
        instance_id: Option<i64>,
        provider_message_id: Option<String>,
    ) -> Self {
        Self {
            id: 0,
            conversation_id,
            phone: phone.to_string(),
            body: body.to_string(),
            direction: consts::INBOUND_DIRECTION.to_string(),
            instance_id,
            provider_message_id,
            created_at: Utc::now(),
        }
    }
}
