use crate::models;
use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::{AppRepo, sqlite_queries};

#[derive(Clone)]
pub struct SqlxSqliteRepo {
    pub db_pool: SqlitePool,
}

/// Short uppercase tag appended to click-to-chat messages
fn new_ref_tag() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}

#[async_trait]
impl AppRepo for SqlxSqliteRepo {
    async fn get_active_rules(
        &self,
        instance_id: Option<i64>,
    ) -> anyhow::Result<Vec<models::rule::Rule>> {
        Ok(
            sqlx::query_as::<_, models::rule::Rule>(sqlite_queries::QUERY_GET_ACTIVE_RULES)
                .bind(instance_id)
                .fetch_all(&self.db_pool)
                .await?,
        )
    }

    async fn get_all_rules(&self) -> anyhow::Result<Vec<models::rule::Rule>> {
        Ok(
            sqlx::query_as::<_, models::rule::Rule>(sqlite_queries::QUERY_GET_ALL_RULES)
                .fetch_all(&self.db_pool)
                .await?,
        )
    }

    async fn insert_rule(&self, rule: &models::rule::NewRule) -> anyhow::Result<models::rule::Rule> {
        let inserted =
            sqlx::query_as::<_, models::rule::Rule>(sqlite_queries::QUERY_INSERT_RULE)
                .bind(rule.text.trim())
                .bind(rule.mode)
                .bind(rule.rule_type)
                .bind(rule.result.trim())
                .bind(rule.active)
                .bind(rule.scope_instance_id)
                .bind(Utc::now())
                .fetch_one(&self.db_pool)
                .await;

        match (inserted, rule.scope_instance_id) {
            (Err(sqlx::Error::Database(e)), Some(instance_id))
                if matches!(e.kind(), sqlx::error::ErrorKind::ForeignKeyViolation) =>
            {
                Err(models::rule::RuleInputError::UnknownInstance(instance_id).into())
            }
            (inserted, _) => Ok(inserted?),
        }
    }

    async fn set_rule_active(&self, rule_id: i64, active: bool) -> anyhow::Result<bool> {
        Ok(sqlx::query("UPDATE rule SET active=$2 WHERE id=$1;")
            .bind(rule_id)
            .bind(active)
            .execute(&self.db_pool)
            .await?
            .rows_affected()
            > 0)
    }

    async fn delete_rule(&self, rule_id: i64) -> anyhow::Result<bool> {
        Ok(sqlx::query("DELETE FROM rule WHERE id=$1;")
            .bind(rule_id)
            .execute(&self.db_pool)
            .await?
            .rows_affected()
            > 0)
    }

    async fn upsert_conversation(
        &self,
        conversation: &models::conversation::ConversationUpsert,
    ) -> anyhow::Result<i64> {
        let initial_status = conversation
            .status
            .as_deref()
            .unwrap_or(crate::consts::DEFAULT_CONVERSATION_STATUS);

        let query = match conversation.instance_id {
            Some(_) => sqlite_queries::QUERY_UPSERT_CONVERSATION_SCOPED,
            None => sqlite_queries::QUERY_UPSERT_CONVERSATION_UNSCOPED,
        };

        let query = sqlx::query_scalar::<_, i64>(query)
            .bind(&conversation.phone)
            .bind(&conversation.name)
            .bind(&conversation.origin)
            .bind(initial_status)
            .bind(&conversation.last_message)
            .bind(Utc::now())
            .bind(&conversation.status);

        let query = match conversation.instance_id {
            Some(instance_id) => query.bind(instance_id),
            None => query,
        };

        Ok(query.fetch_one(&self.db_pool).await?)
    }

    async fn get_conversation(
        &self,
        phone: &str,
        instance_id: Option<i64>,
    ) -> anyhow::Result<Option<models::conversation::Conversation>> {
        Ok(sqlx::query_as::<_, models::conversation::Conversation>(
            sqlite_queries::QUERY_GET_CONVERSATION,
        )
        .bind(phone)
        .bind(instance_id)
        .fetch_optional(&self.db_pool)
        .await?)
    }

    async fn get_recent_conversations(
        &self,
        limit: i64,
    ) -> anyhow::Result<Vec<models::conversation::Conversation>> {
        Ok(sqlx::query_as::<_, models::conversation::Conversation>(
            sqlite_queries::QUERY_GET_RECENT_CONVERSATIONS,
        )
        .bind(limit)
        .fetch_all(&self.db_pool)
        .await?)
    }

    async fn insert_message(&self, message: &models::message::Message) -> anyhow::Result<i64> {
        Ok(sqlx::query(sqlite_queries::QUERY_INSERT_MESSAGE)
            .bind(message.conversation_id)
            .bind(&message.phone)
            .bind(&message.body)
            .bind(&message.direction)
            .bind(message.instance_id)
            .bind(&message.provider_message_id)
            .bind(message.created_at)
            .execute(&self.db_pool)
            .await?
            .last_insert_rowid())
    }

    async fn get_or_create_instance(&self, name: &str) -> anyhow::Result<i64> {
        Ok(
            sqlx::query_scalar::<_, i64>(sqlite_queries::QUERY_GET_OR_CREATE_INSTANCE)
                .bind(name)
                .bind(new_ref_tag())
                .bind(Utc::now())
                .fetch_one(&self.db_pool)
                .await?,
        )
    }

    async fn save_instance(&self, instance: &models::instance::Instance) -> anyhow::Result<i64> {
        let ref_tag = if instance.ref_tag.trim().is_empty() {
            new_ref_tag()
        } else {
            instance.ref_tag.trim().to_string()
        };

        Ok(
            sqlx::query_scalar::<_, i64>(sqlite_queries::QUERY_SAVE_INSTANCE)
                .bind(&instance.name)
                .bind(&instance.phone)
                .bind(&instance.message_template)
                .bind(ref_tag)
                .bind(Utc::now())
                .fetch_one(&self.db_pool)
                .await?,
        )
    }

    async fn get_instances(&self) -> anyhow::Result<Vec<models::instance::Instance>> {
        Ok(
            sqlx::query_as::<_, models::instance::Instance>(sqlite_queries::QUERY_GET_INSTANCES)
                .fetch_all(&self.db_pool)
                .await?,
        )
    }

    async fn register_instance_click(
        &self,
        name: &str,
    ) -> anyhow::Result<Option<models::instance::Instance>> {
        Ok(sqlx::query_as::<_, models::instance::Instance>(
            sqlite_queries::QUERY_REGISTER_INSTANCE_CLICK,
        )
        .bind(name)
        .bind(Utc::now())
        .fetch_optional(&self.db_pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        conversation::ConversationUpsert,
        rule::{MatchMode, NewRule, RuleType},
    };
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_repo() -> SqlxSqliteRepo {
        let db_pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(
                sqlx::sqlite::SqliteConnectOptions::new()
                    .in_memory(true)
                    .pragma("foreign_keys", "ON"),
            )
            .await
            .unwrap();
        sqlx::raw_sql(include_str!("../../migrations/001_init.sql"))
            .execute(&db_pool)
            .await
            .unwrap();

        SqlxSqliteRepo { db_pool }
    }

    fn new_rule(text: &str, rule_type: RuleType, result: &str) -> NewRule {
        NewRule {
            text: text.to_string(),
            mode: MatchMode::Contains,
            rule_type,
            result: result.to_string(),
            active: true,
            scope_instance_id: None,
        }
    }

    fn upsert(phone: &str, instance_id: Option<i64>) -> ConversationUpsert {
        ConversationUpsert {
            phone: phone.to_string(),
            instance_id,
            ..Default::default()
        }
    }

    async fn count_conversations(repo: &SqlxSqliteRepo) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM conversation;")
            .fetch_one(&repo.db_pool)
            .await
            .unwrap()
    }

    #[ntex::test]
    async fn test_new_conversation_defaults_to_new_status() {
        let repo = setup_repo().await;

        let id = repo
            .upsert_conversation(&ConversationUpsert {
                name: Some("Ana".to_string()),
                origin: Some("SITE OFICIAL".to_string()),
                last_message: Some("quero saber mais, vim pelo site".to_string()),
                ..upsert("5511999999999", None)
            })
            .await
            .unwrap();

        let conversation = repo
            .get_conversation("5511999999999", None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.id, id);
        assert_eq!(conversation.status, "NEW");
        assert_eq!(conversation.origin.as_deref(), Some("SITE OFICIAL"));
        assert_eq!(conversation.name.as_deref(), Some("Ana"));
    }

    #[ntex::test]
    async fn test_upsert_merges_fields_on_existing_conversation() {
        let repo = setup_repo().await;

        let first_id = repo
            .upsert_conversation(&ConversationUpsert {
                origin: Some("SITE OFICIAL".to_string()),
                last_message: Some("vim pelo site".to_string()),
                ..upsert("5511999999999", None)
            })
            .await
            .unwrap();

        let second_id = repo
            .upsert_conversation(&ConversationUpsert {
                name: Some("Ana".to_string()),
                origin: Some("INSTAGRAM".to_string()),
                status: Some("CANCELADO".to_string()),
                last_message: Some("quero cancelar".to_string()),
                ..upsert("5511999999999", None)
            })
            .await
            .unwrap();

        assert_eq!(first_id, second_id);
        assert_eq!(count_conversations(&repo).await, 1);

        let conversation = repo
            .get_conversation("5511999999999", None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.origin.as_deref(), Some("SITE OFICIAL"));
        assert_eq!(conversation.status, "CANCELADO");
        assert_eq!(conversation.name.as_deref(), Some("Ana"));
        assert_eq!(conversation.last_message.as_deref(), Some("quero cancelar"));
    }

    #[ntex::test]
    async fn test_upsert_without_status_keeps_stored_status() {
        let repo = setup_repo().await;

        repo.upsert_conversation(&ConversationUpsert {
            status: Some("EM ATENDIMENTO".to_string()),
            last_message: Some("oi".to_string()),
            ..upsert("5511988887777", None)
        })
        .await
        .unwrap();
        repo.upsert_conversation(&upsert("5511988887777", None))
            .await
            .unwrap();

        let conversation = repo
            .get_conversation("5511988887777", None)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(conversation.status, "EM ATENDIMENTO");
        assert_eq!(conversation.last_message.as_deref(), Some("oi"));
    }

    #[ntex::test]
    async fn test_same_phone_is_distinct_per_instance() {
        let repo = setup_repo().await;
        let instance_id = repo.get_or_create_instance("loja-centro").await.unwrap();

        let unscoped = repo
            .upsert_conversation(&upsert("5511999999999", None))
            .await
            .unwrap();
        let scoped = repo
            .upsert_conversation(&upsert("5511999999999", Some(instance_id)))
            .await
            .unwrap();
        let scoped_again = repo
            .upsert_conversation(&upsert("5511999999999", Some(instance_id)))
            .await
            .unwrap();

        assert_ne!(unscoped, scoped);
        assert_eq!(scoped, scoped_again);
        assert_eq!(count_conversations(&repo).await, 2);
    }

    #[ntex::test]
    async fn test_rule_scoped_to_unknown_instance_is_rejected() {
        let repo = setup_repo().await;
        let rule = NewRule {
            scope_instance_id: Some(99),
            ..new_rule("vim pelo site", RuleType::Origin, "SITE OFICIAL")
        };

        let error = repo.insert_rule(&rule).await.unwrap_err();

        assert_eq!(
            error.downcast_ref::<models::rule::RuleInputError>(),
            Some(&models::rule::RuleInputError::UnknownInstance(99))
        );
        assert!(repo.get_all_rules().await.unwrap().is_empty());
    }

    #[ntex::test]
    async fn test_active_rules_respect_scope_and_order() {
        let repo = setup_repo().await;
        let instance_id = repo.get_or_create_instance("loja-centro").await.unwrap();
        let other_instance_id = repo.get_or_create_instance("loja-norte").await.unwrap();

        let site = repo
            .insert_rule(&new_rule("vim pelo site", RuleType::Origin, "SITE OFICIAL"))
            .await
            .unwrap();
        let scoped = repo
            .insert_rule(&NewRule {
                scope_instance_id: Some(instance_id),
                ..new_rule("cancelar", RuleType::Status, "CANCELADO")
            })
            .await
            .unwrap();
        repo.insert_rule(&NewRule {
            scope_instance_id: Some(other_instance_id),
            ..new_rule("promo", RuleType::Origin, "PROMO NORTE")
        })
        .await
        .unwrap();
        let disabled = repo
            .insert_rule(&new_rule("instagram", RuleType::Origin, "INSTAGRAM"))
            .await
            .unwrap();
        assert!(repo.set_rule_active(disabled.id, false).await.unwrap());

        let unscoped_rules = repo.get_active_rules(None).await.unwrap();
        assert_eq!(unscoped_rules, vec![site.clone()]);

        let scoped_rules = repo.get_active_rules(Some(instance_id)).await.unwrap();
        assert_eq!(scoped_rules, vec![site, scoped]);

        assert_eq!(repo.get_all_rules().await.unwrap().len(), 4);
    }

    #[ntex::test]
    async fn test_delete_unknown_rule_reports_false() {
        let repo = setup_repo().await;

        assert!(!repo.delete_rule(404).await.unwrap());
        assert!(!repo.set_rule_active(404, true).await.unwrap());
    }

    #[ntex::test]
    async fn test_get_or_create_instance_is_stable() {
        let repo = setup_repo().await;

        let first = repo.get_or_create_instance("loja-centro").await.unwrap();
        let second = repo.get_or_create_instance("loja-centro").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(repo.get_instances().await.unwrap().len(), 1);
    }

    #[ntex::test]
    async fn test_register_instance_click_counts() {
        let repo = setup_repo().await;
        repo.save_instance(&models::instance::Instance {
            name: "loja-centro".to_string(),
            phone: Some("5511999999999".to_string()),
            message_template: "Olá, quero saber mais".to_string(),
            ref_tag: "SITE01".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();

        repo.register_instance_click("loja-centro").await.unwrap();
        let instance = repo
            .register_instance_click("loja-centro")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(instance.clicks, 2);
        assert_eq!(instance.ref_tag, "SITE01");
        assert!(
            repo.register_instance_click("desconhecida")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[ntex::test]
    async fn test_messages_are_appended_without_dedup() {
        let repo = setup_repo().await;
        let conversation_id = repo
            .upsert_conversation(&upsert("5511999999999", None))
            .await
            .unwrap();
        let message = models::message::Message::inbound(
            conversation_id,
            "5511999999999",
            "oi",
            None,
            Some("3EB0C767D26A".to_string()),
        );

        let first = repo.insert_message(&message).await.unwrap();
        let second = repo.insert_message(&message).await.unwrap();

        assert_ne!(first, second);
    }

    #[ntex::test]
    async fn test_concurrent_first_messages_create_one_conversation() {
        let db_path = std::env::temp_dir().join(format!("wa-lead-tracker-{}.db", Uuid::new_v4()));
        let options = sqlx::sqlite::SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .busy_timeout(std::time::Duration::from_secs(10))
            .pragma("foreign_keys", "ON");
        let db_pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await
            .unwrap();
        sqlx::raw_sql(include_str!("../../migrations/001_init.sql"))
            .execute(&db_pool)
            .await
            .unwrap();
        let repo = SqlxSqliteRepo { db_pool };

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let repo = repo.clone();
                ntex::rt::spawn(async move {
                    repo.upsert_conversation(&ConversationUpsert {
                        last_message: Some(format!("mensagem {i}")),
                        ..upsert("5511999999999", None)
                    })
                    .await
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap());
        }

        assert!(ids.iter().all(|id| *id == ids[0]));
        assert_eq!(count_conversations(&repo).await, 1);

        repo.db_pool.close().await;
        let _ = std::fs::remove_file(&db_path);
    }
}
