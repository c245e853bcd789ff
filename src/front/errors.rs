use derive_more::{Display, Error};
use log::error;
use ntex::{http, web};
use serde_json::json;

#[derive(Debug, Display, Error)]
pub enum UserError {
    UrlNotFound,
    Unauthorized,
    FormInputValueError(#[error(not(source))] String),
}

impl web::error::WebResponseError for UserError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        error!("{:#?}", self);

        let details = match self {
            UserError::UrlNotFound => "resource not found".to_string(),
            UserError::Unauthorized => "missing or invalid api key".to_string(),
            UserError::FormInputValueError(msg) => format!("invalid input values: {msg}"),
        };

        web::HttpResponse::build(self.status_code()).json(&json!({ "error": details }))
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            UserError::UrlNotFound => http::StatusCode::NOT_FOUND,
            UserError::Unauthorized => http::StatusCode::UNAUTHORIZED,
            UserError::FormInputValueError(_) => http::StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Display, Error)]
pub enum ServerError {
    StorageError(#[error(not(source))] String),
    InternalServerError(#[error(not(source))] String),
}

impl ServerError {
    fn get_error_message(&self) -> String {
        match self {
            ServerError::StorageError(msg) => format!("[StorageError] {:#?}", msg),
            ServerError::InternalServerError(msg) => format!("[InternalServerError] {:#?}", msg),
        }
    }
}

impl web::error::WebResponseError for ServerError {
    fn error_response(&self, _: &web::HttpRequest) -> web::HttpResponse {
        error!("{}", self.get_error_message());

        web::HttpResponse::build(self.status_code())
            .json(&json!({ "error": "internal server error" }))
    }

    fn status_code(&self) -> http::StatusCode {
        match *self {
            ServerError::StorageError(_) => http::StatusCode::SERVICE_UNAVAILABLE,
            ServerError::InternalServerError(_) => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
