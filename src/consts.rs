pub const SERVICE_NAME: &str = "wa-lead-tracker";

/// Status given to a conversation when no STATUS rule matched its first message
pub const DEFAULT_CONVERSATION_STATUS: &str = "NEW";
pub const INBOUND_DIRECTION: &str = "inbound";

/// Address suffixes of one-to-one chats, preferred over alias forms like `@lid`
pub const USER_JID_SUFFIXES: [&str; 2] = ["@s.whatsapp.net", "@c.us"];
pub const BROADCAST_JID_SUFFIX: &str = "@broadcast";
pub const NEWSLETTER_JID_SUFFIX: &str = "@newsletter";

/// Digits accepted as the leading segment of a composite group/alias address
pub const COMPOSITE_LEADING_DIGITS: std::ops::RangeInclusive<usize> = 10..=15;

/// Evolution events carrying inbound messages. Payloads without an event
/// name are treated as messages.
pub const MESSAGE_EVENTS: [&str; 2] = ["messages.upsert", "MESSAGES_UPSERT"];

pub const WEBHOOK_API_KEY_HEADER: &str = "apikey";
pub const ADMIN_API_KEY_HEADER: &str = "x-api-key";

pub const DEFAULT_CONVERSATIONS_LIMIT: i64 = 50;
pub const MAX_CONVERSATIONS_LIMIT: i64 = 500;

/// Largest webhook body accepted, media events carry base64 content
pub const WEBHOOK_PAYLOAD_LIMIT: usize = 16 * 1024 * 1024;
