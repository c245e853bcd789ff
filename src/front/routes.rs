//! Route configuration module.
//!
//! Routes are grouped by functionality into scopes; the webhook scope lives in
//! [`crate::webhook::routes`].

use super::{admin, link};
use ntex::web;

/// Configures the tracked click-to-chat links.
///
/// Public routes, every hit counts one click on the instance.
///
/// # Routes
/// - `GET /go/{instance}` - Redirect to the instance chat with its tagged message
pub fn links(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/go").service((link::go_to_chat,)));
}

/// Configures the operator api.
///
/// All routes require the `X-Api-Key` header to match `ADMIN_API_KEY`.
///
/// # Routes
/// - `GET /api/rules` - List every rule in evaluation order
/// - `POST /api/rules` - Create a rule
/// - `PATCH /api/rules/{rule_id}` - Enable or disable a rule
/// - `DELETE /api/rules/{rule_id}` - Delete a rule
/// - `GET /api/instances` - List instances with their click counts
/// - `POST /api/instances` - Register or update an instance link
/// - `GET /api/conversations?limit=N` - Most recently updated conversations
/// - `GET /api/conversations/{phone}?instance_id=N` - Conversation of one address
pub fn admin(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api").service((
        admin::get_rules,
        admin::create_rule,
        admin::set_rule_active,
        admin::delete_rule,
        admin::get_instances,
        admin::save_instance,
        admin::get_conversations,
        admin::get_conversation,
    )));
}
