//! Handlers not linked to a specific url

use ntex::web;
use serde_json::json;

use crate::{consts, front::errors};

/// Return a [UrlNotFound](errors::UserError::UrlNotFound) error for urls not defined
pub async fn serve_not_found() -> Result<web::HttpResponse, web::Error> {
    Err(errors::UserError::UrlNotFound.into())
}

/// Health check
#[web::get("/")]
pub async fn index() -> Result<impl web::Responder, web::Error> {
    Ok(web::HttpResponse::Ok().json(&json!({
        "status": "ok",
        "service": consts::SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
    })))
}
