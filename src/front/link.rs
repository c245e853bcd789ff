//! Tracked click-to-chat links

use ntex::web;

use crate::{
    api, metric,
    front::{AppState, errors, utils},
};

/// Counts the click and redirects to the chat of the instance with its
/// tagged message pre-filled. Unknown instances and instances without a
/// phone are not found.
#[web::get("/{instance}")]
pub async fn go_to_chat(
    path: web::types::Path<String>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let instance = path.into_inner();

    let link = api::instance::register_click(&instance, &app_state.config.wa_link_base, &app_state.repo)
        .await
        .map_err(|e| {
            errors::ServerError::StorageError(format!(
                "at /go/{instance} the click couldnt be registered: {e}"
            ))
        })?;

    let Some(link) = link else {
        return Err(errors::UserError::UrlNotFound.into());
    };

    logfire::info!("Link click on instance {instance}", instance = &instance);
    metric::incr_link_click_statds(&instance);

    utils::redirect_to(&link)
}
