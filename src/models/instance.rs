use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Local mirror of a provider WhatsApp session
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, sqlx::FromRow)]
pub struct Instance {
    pub id: i64,
    pub name: String,
    /// Number the click-to-chat link opens, digits only
    pub phone: Option<String>,
    pub message_template: String,
    /// Appended to the template as `[ref:<tag>]` so ORIGIN rules can spot link traffic
    pub ref_tag: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
