//! Operator api for keyword rules, instances and conversations.
//!
//! Every endpoint requires the [`AdminApiKey`](middleware::api_key::AdminApiKey) guard.

use ntex::web;
use serde::Deserialize;
use serde_json::json;

use crate::{
    api,
    front::{AppState, errors, middleware},
    models::rule::{NewRule, RuleInputError},
};

#[derive(Debug, Deserialize)]
pub struct RuleActiveForm {
    pub active: bool,
}

#[derive(Debug, Deserialize)]
pub struct ConversationsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ConversationLookupQuery {
    pub instance_id: Option<i64>,
}

fn storage_error(endpoint: &str, e: anyhow::Error) -> errors::ServerError {
    errors::ServerError::StorageError(format!("at {endpoint} storage failed: {e}"))
}

#[web::get("/rules")]
pub async fn get_rules(
    _: middleware::api_key::AdminApiKey,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let rules = api::rules::list_rules(&app_state.repo)
        .await
        .map_err(|e| storage_error("GET /api/rules", e))?;

    Ok(web::HttpResponse::Ok().json(&rules))
}

#[web::post("/rules")]
pub async fn create_rule(
    _: middleware::api_key::AdminApiKey,
    form: web::types::Json<NewRule>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    if !form.is_valid() {
        return Err(errors::UserError::FormInputValueError(
            "rule text and result must not be empty".to_string(),
        )
        .into());
    }

    let rule = api::rules::create_rule(&form, &app_state.repo)
        .await
        .map_err(|e| -> web::Error {
            match e.downcast_ref::<RuleInputError>() {
                Some(input_error) => {
                    errors::UserError::FormInputValueError(input_error.to_string()).into()
                }
                None => storage_error("POST /api/rules", e).into(),
            }
        })?;

    logfire::info!(
        "Rule {id} created: {rule_type} -> {result}",
        id = rule.id,
        rule_type = rule.rule_type.to_string(),
        result = &rule.result
    );

    Ok(web::HttpResponse::Created().json(&rule))
}

#[web::patch("/rules/{rule_id}")]
pub async fn set_rule_active(
    _: middleware::api_key::AdminApiKey,
    path: web::types::Path<i64>,
    form: web::types::Json<RuleActiveForm>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let rule_id = path.into_inner();

    let updated = api::rules::set_rule_active(rule_id, form.active, &app_state.repo)
        .await
        .map_err(|e| storage_error("PATCH /api/rules", e))?;

    if !updated {
        return Err(errors::UserError::UrlNotFound.into());
    }

    Ok(web::HttpResponse::Ok().json(&json!({ "id": rule_id, "active": form.active })))
}

#[web::delete("/rules/{rule_id}")]
pub async fn delete_rule(
    _: middleware::api_key::AdminApiKey,
    path: web::types::Path<i64>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let deleted = api::rules::delete_rule(path.into_inner(), &app_state.repo)
        .await
        .map_err(|e| storage_error("DELETE /api/rules", e))?;

    if !deleted {
        return Err(errors::UserError::UrlNotFound.into());
    }

    Ok(web::HttpResponse::NoContent().finish())
}

#[web::get("/instances")]
pub async fn get_instances(
    _: middleware::api_key::AdminApiKey,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let instances = api::instance::list_instances(&app_state.repo)
        .await
        .map_err(|e| storage_error("GET /api/instances", e))?;

    Ok(web::HttpResponse::Ok().json(&instances))
}

#[web::post("/instances")]
pub async fn save_instance(
    _: middleware::api_key::AdminApiKey,
    form: web::types::Json<api::instance::InstanceSettings>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    if form.name.trim().is_empty() {
        return Err(errors::UserError::FormInputValueError(
            "instance name must not be empty".to_string(),
        )
        .into());
    }
    if let Some(phone) = form.phone.as_deref().filter(|phone| !phone.trim().is_empty()) {
        if api::phone::normalize(phone).is_none() {
            return Err(errors::UserError::FormInputValueError(format!(
                "invalid instance phone: {phone}"
            ))
            .into());
        }
    }

    let id = api::instance::save_instance(&form, &app_state.repo)
        .await
        .map_err(|e| storage_error("POST /api/instances", e))?;

    Ok(web::HttpResponse::Ok().json(&json!({ "id": id })))
}

#[web::get("/conversations")]
pub async fn get_conversations(
    _: middleware::api_key::AdminApiKey,
    query: web::types::Query<ConversationsQuery>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let conversations = api::conversation::get_recent_conversations(query.limit, &app_state.repo)
        .await
        .map_err(|e| storage_error("GET /api/conversations", e))?;

    Ok(web::HttpResponse::Ok().json(&conversations))
}

/// Conversation of one address. `instance_id` selects the instance scope,
/// conversations outside any instance are returned without it.
#[web::get("/conversations/{phone}")]
pub async fn get_conversation(
    _: middleware::api_key::AdminApiKey,
    path: web::types::Path<String>,
    query: web::types::Query<ConversationLookupQuery>,
    app_state: web::types::State<AppState>,
) -> Result<impl web::Responder, web::Error> {
    let conversation =
        api::conversation::find_conversation(&path.into_inner(), query.instance_id, &app_state.repo)
            .await
            .map_err(|e| storage_error("GET /api/conversations/{phone}", e))?;

    match conversation {
        Some(conversation) => Ok(web::HttpResponse::Ok().json(&conversation)),
        None => Err(errors::UserError::UrlNotFound.into()),
    }
}
