//! # Phone Normalizer & Classifier
//!
//! Turns a provider address into the key conversations are stored under and
//! decides whether the message is tracked at all.

use derive_more::Display;

use crate::consts;

/// Why an address is not tracked
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    #[display("broadcast")]
    Broadcast,
    #[display("newsletter")]
    Newsletter,
    #[display("unaddressable")]
    Unaddressable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhoneClass {
    /// Normalized key of a trackable sender
    Tracked(String),
    Dropped(DropReason),
}

fn is_ascii_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Normalizes the local part of an address (domain and device already removed).
///
/// Group and alias ids look like `<digits>-<digits>`: the leading segment is
/// used when it has 10 to 15 digits, otherwise the id is kept as-is. Anything
/// else keeps only its ASCII digits.
fn normalize_local(local: &str) -> Option<String> {
    let is_composite = local.contains('-') && local.split('-').all(is_ascii_digits);

    let normalized = if is_composite {
        match local.split('-').next() {
            Some(leading) if consts::COMPOSITE_LEADING_DIGITS.contains(&leading.len()) => {
                leading.to_string()
            }
            _ => local.to_string(),
        }
    } else {
        local.chars().filter(char::is_ascii_digit).collect()
    };

    (!normalized.is_empty()).then_some(normalized)
}

/// Classifies a raw provider address
pub fn classify(raw: &str) -> PhoneClass {
    let raw = raw.trim();
    let lowercase = raw.to_lowercase();

    if lowercase.ends_with(consts::BROADCAST_JID_SUFFIX) {
        return PhoneClass::Dropped(DropReason::Broadcast);
    }
    if lowercase.ends_with(consts::NEWSLETTER_JID_SUFFIX) {
        return PhoneClass::Dropped(DropReason::Newsletter);
    }

    // `5511999999999:12@s.whatsapp.net` -> `5511999999999`
    let local = raw.split('@').next().unwrap_or_default();
    let local = local.split(':').next().unwrap_or_default().trim();

    match normalize_local(local) {
        Some(phone) => PhoneClass::Tracked(phone),
        None => PhoneClass::Dropped(DropReason::Unaddressable),
    }
}

/// Normalized key of `raw`, `None` when the address is not tracked
pub fn normalize(raw: &str) -> Option<String> {
    match classify(raw) {
        PhoneClass::Tracked(phone) => Some(phone),
        PhoneClass::Dropped(_) => None,
    }
}
