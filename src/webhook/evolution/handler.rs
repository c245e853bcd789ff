//! # Evolution-API Webhook Handler
//!
//! Runs one provider delivery through the inbound pipeline: field extraction,
//! event and sender filtering, rule matching, conversation upsert and message
//! logging.

use anyhow::Result;
use serde_json::Value;

use super::schemas::{IgnoreReason, TrackedMessage, WebhookOutcome};
use crate::{
    api::{self, conversation::InboundContact, phone::PhoneClass},
    consts, metric, repo,
};

/// Whether `event` carries an inbound message. Payloads without an event
/// name are treated as messages.
pub fn is_message_event(event: Option<&str>) -> bool {
    match event {
        Some(event) => consts::MESSAGE_EVENTS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(event.trim())),
        None => true,
    }
}

/// Processes one webhook delivery.
///
/// Deliveries that carry nothing to track end as [`WebhookOutcome::Ignored`]
/// without touching storage. Errors are storage failures of the rule lookup,
/// the instance registration or the conversation upsert.
pub async fn process_webhook(payload: &Value, repo: &repo::ImplAppRepo) -> Result<WebhookOutcome> {
    let fields = api::extractor::extract_fields(payload);

    if !is_message_event(fields.event.as_deref()) {
        let event = fields.event.unwrap_or_default();
        return Ok(WebhookOutcome::Ignored(IgnoreReason::UnhandledEvent(event)));
    }

    if fields.from_me {
        return Ok(WebhookOutcome::Ignored(IgnoreReason::FromMe));
    }

    let Some(raw_phone) = fields.phone.as_deref() else {
        return Ok(WebhookOutcome::Ignored(IgnoreReason::MissingSender));
    };

    let phone = match api::phone::classify(raw_phone) {
        PhoneClass::Tracked(phone) => phone,
        PhoneClass::Dropped(reason) => {
            return Ok(WebhookOutcome::Ignored(IgnoreReason::Dropped(reason)));
        }
    };

    let instance_id = api::instance::resolve_instance_id(fields.instance.as_deref(), repo).await?;
    let rule_match = api::rules::classify_message(&fields.text, instance_id, repo).await?;

    if let Some(origin) = &rule_match.origin {
        logfire::info!("Origin matched for {phone}: {origin}", phone = &phone, origin = origin);
        metric::incr_rule_match_statds("ORIGIN");
    }
    if let Some(status) = &rule_match.status {
        logfire::info!("Status matched for {phone}: {status}", phone = &phone, status = status);
        metric::incr_rule_match_statds("STATUS");
    }

    let contact = InboundContact {
        phone: &phone,
        name: fields.name.as_deref(),
        text: &fields.text,
        instance_id,
    };

    let conversation_id = api::conversation::upsert_conversation(&contact, &rule_match, repo).await?;

    let message_id = match api::conversation::log_inbound_message(
        conversation_id,
        &contact,
        fields.provider_message_id.clone(),
        repo,
    )
    .await
    {
        Ok(id) => Some(id),
        Err(e) => {
            logfire::error!(
                "Failed to log message of conversation {conversation_id}: {error}",
                conversation_id = conversation_id,
                error = e.to_string()
            );
            None
        }
    };

    Ok(WebhookOutcome::Tracked(TrackedMessage {
        conversation_id,
        message_id,
        phone,
        instance_id,
        origin: rule_match.origin,
        status: rule_match.status,
    }))
}
