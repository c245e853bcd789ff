//! Repository used when the backing-store variables are missing.
//!
//! The server still starts so the health check answers; every storage call
//! fails with the list of missing variables.

use crate::models;
use async_trait::async_trait;

use super::AppRepo;

#[derive(Clone, Debug)]
pub struct UnconfiguredRepo {
    pub missing_vars: Vec<&'static str>,
}

impl UnconfiguredRepo {
    fn error(&self) -> anyhow::Error {
        anyhow::anyhow!(
            "storage is not configured, missing environment variables: {}",
            self.missing_vars.join(", ")
        )
    }
}

#[async_trait]
impl AppRepo for UnconfiguredRepo {
    async fn get_active_rules(
        &self,
        _instance_id: Option<i64>,
    ) -> anyhow::Result<Vec<models::rule::Rule>> {
        Err(self.error())
    }

    async fn get_all_rules(&self) -> anyhow::Result<Vec<models::rule::Rule>> {
        Err(self.error())
    }

    async fn insert_rule(
        &self,
        _rule: &models::rule::NewRule,
    ) -> anyhow::Result<models::rule::Rule> {
        Err(self.error())
    }

    async fn set_rule_active(&self, _rule_id: i64, _active: bool) -> anyhow::Result<bool> {
        Err(self.error())
    }

    async fn delete_rule(&self, _rule_id: i64) -> anyhow::Result<bool> {
        Err(self.error())
    }

    async fn upsert_conversation(
        &self,
        _conversation: &models::conversation::ConversationUpsert,
    ) -> anyhow::Result<i64> {
        Err(self.error())
    }

    async fn get_conversation(
        &self,
        _phone: &str,
        _instance_id: Option<i64>,
    ) -> anyhow::Result<Option<models::conversation::Conversation>> {
        Err(self.error())
    }

    async fn get_recent_conversations(
        &self,
        _limit: i64,
    ) -> anyhow::Result<Vec<models::conversation::Conversation>> {
        Err(self.error())
    }

    async fn insert_message(&self, _message: &models::message::Message) -> anyhow::Result<i64> {
        Err(self.error())
    }

    async fn get_or_create_instance(&self, _name: &str) -> anyhow::Result<i64> {
        Err(self.error())
    }

    async fn save_instance(&self, _instance: &models::instance::Instance) -> anyhow::Result<i64> {
        Err(self.error())
    }

    async fn get_instances(&self) -> anyhow::Result<Vec<models::instance::Instance>> {
        Err(self.error())
    }

    async fn register_instance_click(
        &self,
        _name: &str,
    ) -> anyhow::Result<Option<models::instance::Instance>> {
        Err(self.error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[ntex::test]
    async fn test_every_call_names_missing_vars() {
        let repo = UnconfiguredRepo {
            missing_vars: vec!["DB_HOST", "DB_PASS_ENCRYPT"],
        };

        let err = repo.get_active_rules(None).await.unwrap_err();

        assert!(err.to_string().contains("DB_HOST, DB_PASS_ENCRYPT"));
    }
}
