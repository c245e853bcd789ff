pub mod sqlite;
pub mod sqlite_queries;
pub mod unconfigured;

use crate::models;
use async_trait::async_trait;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AppRepo {
    /// Active rules in storage order, unscoped ones plus the ones scoped to `instance_id`
    async fn get_active_rules(
        &self,
        instance_id: Option<i64>,
    ) -> anyhow::Result<Vec<models::rule::Rule>>;

    async fn get_all_rules(&self) -> anyhow::Result<Vec<models::rule::Rule>>;

    async fn insert_rule(&self, rule: &models::rule::NewRule) -> anyhow::Result<models::rule::Rule>;

    /// Returns `false` when no rule has `rule_id`
    async fn set_rule_active(&self, rule_id: i64, active: bool) -> anyhow::Result<bool>;

    /// Returns `false` when no rule has `rule_id`
    async fn delete_rule(&self, rule_id: i64) -> anyhow::Result<bool>;

    /// Creates or refreshes the conversation of (phone, instance) in a single
    /// statement and returns its id.
    async fn upsert_conversation(
        &self,
        conversation: &models::conversation::ConversationUpsert,
    ) -> anyhow::Result<i64>;

    async fn get_conversation(
        &self,
        phone: &str,
        instance_id: Option<i64>,
    ) -> anyhow::Result<Option<models::conversation::Conversation>>;

    async fn get_recent_conversations(
        &self,
        limit: i64,
    ) -> anyhow::Result<Vec<models::conversation::Conversation>>;

    async fn insert_message(&self, message: &models::message::Message) -> anyhow::Result<i64>;

    /// Id of the instance called `name`, registering it on first sight
    async fn get_or_create_instance(&self, name: &str) -> anyhow::Result<i64>;

    /// Inserts the instance or updates phone, template and ref tag of the one with the same name
    async fn save_instance(&self, instance: &models::instance::Instance) -> anyhow::Result<i64>;

    async fn get_instances(&self) -> anyhow::Result<Vec<models::instance::Instance>>;

    /// Counts one click on the instance link and returns the updated instance
    async fn register_instance_click(
        &self,
        name: &str,
    ) -> anyhow::Result<Option<models::instance::Instance>>;
}

pub type ImplAppRepo = Box<dyn AppRepo>;

/// Cloneable handle to the configured repository, boxed once per server worker
#[derive(Clone)]
pub enum RepoHandle {
    Sqlite(sqlite::SqlxSqliteRepo),
    Unconfigured(unconfigured::UnconfiguredRepo),
}

impl RepoHandle {
    pub fn boxed(&self) -> ImplAppRepo {
        match self {
            RepoHandle::Sqlite(repo) => Box::new(repo.clone()),
            RepoHandle::Unconfigured(repo) => Box::new(repo.clone()),
        }
    }
}
