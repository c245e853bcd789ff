//! # Webhook Schemas
//!
//! Outcomes of processing one provider delivery and the acknowledgement sent
//! back. The provider payload itself is read loosely, see
//! [`crate::api::extractor`].

use derive_more::Display;
use ntex::{http, web};
use serde::{Deserialize, Serialize};

use crate::api::phone::DropReason;

/// Why a delivery was accepted without side effects
#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    #[display("event {_0} is not a message")]
    UnhandledEvent(String),
    #[display("message sent by the connected account")]
    FromMe,
    #[display("payload has no sender address")]
    MissingSender,
    #[display("{_0} address")]
    Dropped(DropReason),
}

/// Records written for a tracked message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedMessage {
    pub conversation_id: i64,
    /// `None` when the message row could not be written
    pub message_id: Option<i64>,
    pub phone: String,
    pub instance_id: Option<i64>,
    pub origin: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    Ignored(IgnoreReason),
    Tracked(TrackedMessage),
}

/// Body of every webhook response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct WebhookAck {
    pub success: bool,
}

/// What the provider is told about a delivery.
///
/// Receipt is always acknowledged with 200 so providers do not retry in a
/// loop; `success` tells whether processing worked. Surfacing failures as 500
/// is opt-in through `SURFACE_STORAGE_ERRORS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Acknowledgement {
    /// Tracked or deliberately ignored
    Processed,
    /// Received but not stored
    Failed,
}

impl Acknowledgement {
    pub fn status_code(&self, surface_errors: bool) -> http::StatusCode {
        match self {
            Acknowledgement::Failed if surface_errors => http::StatusCode::INTERNAL_SERVER_ERROR,
            _ => http::StatusCode::OK,
        }
    }

    pub fn body(&self) -> WebhookAck {
        WebhookAck {
            success: *self == Acknowledgement::Processed,
        }
    }

    pub fn into_response(self, surface_errors: bool) -> web::HttpResponse {
        web::HttpResponse::build(self.status_code(surface_errors)).json(&self.body())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failures_are_acknowledged_by_default() {
        assert_eq!(
            Acknowledgement::Failed.status_code(false),
            http::StatusCode::OK
        );
        assert_eq!(Acknowledgement::Failed.body(), WebhookAck { success: false });
    }

    #[test]
    fn test_failures_can_be_surfaced() {
        assert_eq!(
            Acknowledgement::Failed.status_code(true),
            http::StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            Acknowledgement::Processed.status_code(true),
            http::StatusCode::OK
        );
    }

    #[test]
    fn test_ack_serialization() {
        let body = serde_json::to_string(&Acknowledgement::Processed.body()).unwrap();

        assert_eq!(body, r#"{"success":true}"#);
    }

    #[test]
    fn test_ignore_reason_display() {
        assert_eq!(
            IgnoreReason::Dropped(DropReason::Broadcast).to_string(),
            "broadcast address"
        );
        assert_eq!(
            IgnoreReason::UnhandledEvent("connection.update".to_string()).to_string(),
            "event connection.update is not a message"
        );
    }
}
