//! # Conversation Upsert & Message Logger
//!
//! A conversation is keyed by (normalized phone, instance). Name and origin
//! are filled only while empty, status and last message follow the newest
//! values. The whole merge happens in one storage statement, see
//! [`crate::repo::AppRepo::upsert_conversation`].

use super::rules::RuleMatch;
use crate::{
    consts,
    models::{
        conversation::{Conversation, ConversationUpsert},
        message::Message,
    },
    repo,
};

/// Inbound message reduced to what the conversation needs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboundContact<'a> {
    pub phone: &'a str,
    pub name: Option<&'a str>,
    pub text: &'a str,
    pub instance_id: Option<i64>,
}

/// Builds the upsert for `contact`, blank values never overwrite stored ones
pub fn build_upsert(contact: &InboundContact<'_>, rule_match: &RuleMatch) -> ConversationUpsert {
    let non_blank = |value: &str| {
        let value = value.trim();
        (!value.is_empty()).then(|| value.to_string())
    };

    ConversationUpsert {
        phone: contact.phone.to_string(),
        name: contact.name.and_then(non_blank),
        origin: rule_match.origin.clone(),
        status: rule_match.status.clone(),
        last_message: non_blank(contact.text),
        instance_id: contact.instance_id,
    }
}

/// Creates or refreshes the conversation of `contact` and returns its id
pub async fn upsert_conversation(
    contact: &InboundContact<'_>,
    rule_match: &RuleMatch,
    repo: &repo::ImplAppRepo,
) -> anyhow::Result<i64> {
    repo.upsert_conversation(&build_upsert(contact, rule_match))
        .await
}

/// Appends the inbound message row. Redeliveries produce new rows.
pub async fn log_inbound_message(
    conversation_id: i64,
    contact: &InboundContact<'_>,
    provider_message_id: Option<String>,
    repo: &repo::ImplAppRepo,
) -> anyhow::Result<i64> {
    let message = Message::inbound(
        conversation_id,
        contact.phone,
        contact.text,
        contact.instance_id,
        provider_message_id,
    );

    repo.insert_message(&message).await
}

/// Most recently updated conversations, `limit` clamped to a sane window
pub async fn get_recent_conversations(
    limit: Option<i64>,
    repo: &repo::ImplAppRepo,
) -> anyhow::Result<Vec<Conversation>> {
    let limit = limit
        .unwrap_or(consts::DEFAULT_CONVERSATIONS_LIMIT)
        .clamp(1, consts::MAX_CONVERSATIONS_LIMIT);

    repo.get_recent_conversations(limit).await
}

/// Conversation of the address `phone` within `instance_id`, `None` when the
/// address is not tracked or has no conversation yet
pub async fn find_conversation(
    phone: &str,
    instance_id: Option<i64>,
    repo: &repo::ImplAppRepo,
) -> anyhow::Result<Option<Conversation>> {
    let Some(phone) = super::phone::normalize(phone) else {
        return Ok(None);
    };

    repo.get_conversation(&phone, instance_id).await
}
