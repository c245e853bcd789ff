//! # Field Extractor
//!
//! Evolution-style providers changed their payload layout between versions
//! (nested `data.key.remoteJid`, flat `from`/`pushName`, arrays of messages,
//! alias addresses next to the real one). Every field is read through an
//! ordered list of candidate paths and the first present, non-empty value
//! wins. Missing fields are not an error.

use serde_json::Value;

use crate::consts;

/// Where a candidate path is resolved from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// The message record (`data`, `data[0]` or the root of flat payloads)
    Record,
    Root,
}

type Candidates = &'static [(Scope, &'static str)];

const PHONE_CANDIDATES: Candidates = &[
    (Scope::Record, "/key/remoteJid"),
    (Scope::Record, "/key/remoteJidAlt"),
    (Scope::Record, "/key/senderPn"),
    (Scope::Record, "/key/participant"),
    (Scope::Record, "/remoteJid"),
    (Scope::Record, "/from"),
    (Scope::Root, "/from"),
];

const NAME_CANDIDATES: Candidates = &[
    (Scope::Record, "/pushName"),
    (Scope::Record, "/notifyName"),
    (Scope::Root, "/pushName"),
];

const TEXT_CANDIDATES: Candidates = &[
    (Scope::Record, "/message/conversation"),
    (Scope::Record, "/message/extendedTextMessage/text"),
    (Scope::Record, "/message/imageMessage/caption"),
    (Scope::Record, "/message/videoMessage/caption"),
    (Scope::Record, "/message/documentMessage/caption"),
    (Scope::Record, "/message/buttonsResponseMessage/selectedDisplayText"),
    (Scope::Record, "/message/listResponseMessage/title"),
    (
        Scope::Record,
        "/message/templateButtonReplyMessage/selectedDisplayText",
    ),
    (Scope::Root, "/message/conversation"),
    (Scope::Root, "/text"),
    (Scope::Root, "/body"),
];

const MESSAGE_ID_CANDIDATES: Candidates = &[(Scope::Record, "/key/id"), (Scope::Root, "/id")];

const INSTANCE_CANDIDATES: Candidates = &[(Scope::Root, "/instance"), (Scope::Root, "/instanceName")];

const EVENT_CANDIDATES: Candidates = &[(Scope::Root, "/event")];

/// Fields read from one inbound provider payload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedFields {
    pub event: Option<String>,
    pub instance: Option<String>,
    /// Raw sender address, normalized later by [`super::phone`]
    pub phone: Option<String>,
    pub name: Option<String>,
    /// Message text, empty when the message carries none
    pub text: String,
    /// Echo of a message sent by the connected account itself
    pub from_me: bool,
    pub provider_message_id: Option<String>,
}

/// The message record of the payload
fn message_record(payload: &Value) -> &Value {
    match payload.get("data") {
        Some(Value::Array(messages)) => messages.first().unwrap_or(payload),
        Some(data @ Value::Object(_)) => data,
        _ => payload,
    }
}

fn resolve<'a>(record: &'a Value, root: &'a Value, scope: Scope, path: &str) -> Option<&'a str> {
    let source = match scope {
        Scope::Record => record,
        Scope::Root => root,
    };

    source
        .pointer(path)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Every present, non-empty candidate in candidate order
fn all_present<'a>(record: &'a Value, root: &'a Value, candidates: Candidates) -> Vec<&'a str> {
    candidates
        .iter()
        .filter_map(|(scope, path)| resolve(record, root, *scope, path))
        .collect()
}

fn first_present<'a>(record: &'a Value, root: &'a Value, candidates: Candidates) -> Option<&'a str> {
    candidates
        .iter()
        .find_map(|(scope, path)| resolve(record, root, *scope, path))
}

fn has_user_suffix(address: &str) -> bool {
    let address = address.to_lowercase();
    consts::USER_JID_SUFFIXES
        .iter()
        .any(|suffix| address.ends_with(suffix))
}

/// Picks the sender address, preferring the one-to-one chat form over aliases
fn pick_phone<'a>(record: &'a Value, root: &'a Value) -> Option<&'a str> {
    let candidates = all_present(record, root, PHONE_CANDIDATES);

    candidates
        .iter()
        .find(|address| has_user_suffix(address))
        .or_else(|| candidates.first())
        .copied()
}

fn is_from_me(record: &Value, root: &Value) -> bool {
    record
        .pointer("/key/fromMe")
        .or_else(|| root.get("fromMe"))
        .and_then(Value::as_bool)
        .unwrap_or_default()
}

/// Extracts the tracked fields from an inbound payload of any known shape
pub fn extract_fields(payload: &Value) -> ExtractedFields {
    let record = message_record(payload);
    let owned = |value: Option<&str>| value.map(str::to_string);

    ExtractedFields {
        event: owned(first_present(record, payload, EVENT_CANDIDATES)),
        instance: owned(first_present(record, payload, INSTANCE_CANDIDATES)),
        phone: owned(pick_phone(record, payload)),
        name: owned(first_present(record, payload, NAME_CANDIDATES)),
        text: first_present(record, payload, TEXT_CANDIDATES)
            .unwrap_or_default()
            .to_string(),
        from_me: is_from_me(record, payload),
        provider_message_id: owned(first_present(record, payload, MESSAGE_ID_CANDIDATES)),
    }
}
