use chrono::{DateTime, Utc};
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// How a rule's text is compared against an inbound message
#[derive(Debug, Display, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The rule text appears anywhere in the message
    #[default]
    #[display("contains")]
    Contains,
    /// The whole message equals the rule text
    #[display("exact")]
    Exact,
}

/// Which conversation field a matching rule writes
#[derive(Debug, Display, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "varchar", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleType {
    #[default]
    #[display("ORIGIN")]
    Origin,
    #[display("STATUS")]
    Status,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, sqlx::FromRow)]
pub struct Rule {
    pub id: i64,
    pub text: String,
    pub mode: MatchMode,
    pub rule_type: RuleType,
    pub result: String,
    pub active: bool,
    /// Rules without scope apply to every instance
    pub scope_instance_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

/// Payload to register a rule
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NewRule {
    pub text: String,
    #[serde(default)]
    pub mode: MatchMode,
    pub rule_type: RuleType,
    pub result: String,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub scope_instance_id: Option<i64>,
}

fn default_active() -> bool {
    true
}

impl NewRule {
    pub fn is_valid(&self) -> bool {
        !self.text.trim().is_empty() && !self.result.trim().is_empty()
    }
}

/// Rule input rejected before or by storage
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum RuleInputError {
    #[display("rule text and result must not be empty")]
    Blank,
    #[display("instance {_0} does not exist")]
    UnknownInstance(#[error(not(source))] i64),
}
