use ntex::web;

use crate::consts;

/// Configures webhook routes for the WhatsApp provider.
///
/// These routes are public endpoints; the provider can be required to send a
/// shared token, see [`super::evolution::security`].
///
/// # Routes
/// - `POST /webhook/whatsapp` - Inbound message events
pub fn whatsapp(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/webhook/whatsapp")
            .state(web::types::PayloadConfig::new(consts::WEBHOOK_PAYLOAD_LIMIT))
            .service((super::evolution::receive,)),
    );
}
