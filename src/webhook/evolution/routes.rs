//! Evolution-API webhook endpoint
//!
//! Receipt is acknowledged even when processing fails, so the provider does
//! not retry the same delivery in a loop. See
//! [`super::schemas::Acknowledgement`].

use super::{
    handler,
    schemas::{Acknowledgement, WebhookOutcome},
    security,
};
use crate::{
    front::{AppState, errors},
    metric,
};
use ntex::{util::Bytes, web};
use serde_json::Value;
use tracing::Instrument;

/// Webhook receiver endpoint (POST)
///
/// # Returns
/// - 200 `{"success": true}` when the delivery was tracked or ignored
/// - 200 `{"success": false}` when the payload is not JSON or storage failed
/// - 500 `{"success": false}` instead of the above on storage failures when
///   `SURFACE_STORAGE_ERRORS` is enabled
/// - 401 when `WEBHOOK_API_KEY` is set and the delivery does not carry it
#[web::post("")]
pub async fn receive(
    req: web::HttpRequest,
    body: Bytes,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let surface_errors = app_state.config.surface_storage_errors;

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            logfire::warn!(
                "Failed to parse webhook payload: {error}",
                error = e.to_string()
            );
            metric::incr_webhook_outcome_statds("failed");
            return Ok(Acknowledgement::Failed.into_response(false));
        }
    };

    if let Some(expected) = app_state.config.webhook_api_key.as_deref() {
        if !security::verify_api_key(security::provided_api_key(&req, &payload), expected) {
            return Err(errors::UserError::Unauthorized.into());
        }
    }

    let result = handler::process_webhook(&payload, &app_state.repo)
        .instrument(logfire::span!("whatsapp_webhook"))
        .await;

    let acknowledgement = match result {
        Ok(WebhookOutcome::Tracked(tracked)) => {
            logfire::info!(
                "Tracked message of {phone} in conversation {conversation_id}",
                phone = tracked.phone,
                conversation_id = tracked.conversation_id
            );
            metric::incr_webhook_outcome_statds("tracked");
            Acknowledgement::Processed
        }
        Ok(WebhookOutcome::Ignored(reason)) => {
            logfire::info!("Ignored webhook delivery: {reason}", reason = reason.to_string());
            metric::incr_webhook_outcome_statds("ignored");
            Acknowledgement::Processed
        }
        Err(e) => {
            logfire::error!("Failed to process webhook: {error}", error = e.to_string());
            metric::incr_webhook_outcome_statds("failed");
            Acknowledgement::Failed
        }
    };

    Ok(acknowledgement.into_response(surface_errors))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config, repo::MockAppRepo, webhook::evolution::schemas::WebhookAck};
    use ntex::{
        http,
        web::{App, test},
    };
    use serde_json::json;

    fn create_test_state(
        mock_repo: MockAppRepo,
        configure: impl FnOnce(&mut config::AppConfig),
    ) -> AppState {
        let mut config = config::test_config();
        configure(&mut config);

        AppState {
            repo: Box::new(mock_repo),
            config,
        }
    }

    fn broadcast_payload() -> Value {
        json!({
            "event": "messages.upsert",
            "data": {
                "key": {"remoteJid": "status@broadcast", "fromMe": false},
                "message": {"conversation": "promoção"}
            }
        })
    }

    #[ntex::test]
    async fn test_malformed_body_is_acknowledged() {
        let state = create_test_state(MockAppRepo::new(), |_| {});
        let app = test::init_service(
            App::new()
                .state(state)
                .service(web::scope("/webhook/whatsapp").service(receive)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/webhook/whatsapp")
            .set_payload("not json")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), http::StatusCode::OK);
        let body: WebhookAck = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body, WebhookAck { success: false });
    }

    #[ntex::test]
    async fn test_broadcast_is_acknowledged_as_success() {
        let state = create_test_state(MockAppRepo::new(), |_| {});
        let app = test::init_service(
            App::new()
                .state(state)
                .service(web::scope("/webhook/whatsapp").service(receive)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/webhook/whatsapp")
            .set_json(&broadcast_payload())
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), http::StatusCode::OK);
        let body: WebhookAck = serde_json::from_slice(&test::read_body(resp).await).unwrap();
        assert_eq!(body, WebhookAck { success: true });
    }

    #[ntex::test]
    async fn test_storage_failure_status_follows_config() {
        for (surface_errors, expected) in [
            (false, http::StatusCode::OK),
            (true, http::StatusCode::INTERNAL_SERVER_ERROR),
        ] {
            let mut mock_repo = MockAppRepo::new();
            mock_repo
                .expect_get_active_rules()
                .returning(|_| Err(anyhow::anyhow!("database is locked")));
            let state = create_test_state(mock_repo, |config| {
                config.surface_storage_errors = surface_errors;
            });
            let app = test::init_service(
                App::new()
                    .state(state)
                    .service(web::scope("/webhook/whatsapp").service(receive)),
            )
            .await;

            let req = test::TestRequest::post()
                .uri("/webhook/whatsapp")
                .set_json(&json!({
                    "data": {
                        "key": {"remoteJid": "5511999999999@s.whatsapp.net"},
                        "message": {"conversation": "oi"}
                    }
                }))
                .to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), expected);
            let body: WebhookAck = serde_json::from_slice(&test::read_body(resp).await).unwrap();
            assert_eq!(body, WebhookAck { success: false });
        }
    }

    #[ntex::test]
    async fn test_api_key_is_required_when_configured() {
        let state = create_test_state(MockAppRepo::new(), |config| {
            config.webhook_api_key = Some("evo-key".to_string());
        });
        let app = test::init_service(
            App::new()
                .state(state)
                .service(web::scope("/webhook/whatsapp").service(receive)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/webhook/whatsapp")
            .set_json(&broadcast_payload())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), http::StatusCode::UNAUTHORIZED);

        let req = test::TestRequest::post()
            .uri("/webhook/whatsapp")
            .header("apikey", "evo-key")
            .set_json(&broadcast_payload())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), http::StatusCode::OK);
    }
}
