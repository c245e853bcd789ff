use ntex::{http::Payload, web};
use subtle::ConstantTimeEq;

use crate::{
    consts,
    front::{AppState, errors},
};

/// Guard for the admin api: the request carries `X-Api-Key` equal to
/// `ADMIN_API_KEY`. Every request is rejected while the key is not configured.
#[derive(Debug, Default)]
pub struct AdminApiKey;

fn is_api_key_valid(req: &web::HttpRequest) -> bool {
    let provided = req
        .headers()
        .get(consts::ADMIN_API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());
    let expected = req
        .app_state::<AppState>()
        .and_then(|app_state| app_state.config.admin_api_key.as_deref());

    if let (Some(provided), Some(expected)) = (provided, expected) {
        return !expected.is_empty() && bool::from(provided.as_bytes().ct_eq(expected.as_bytes()));
    }

    false
}

impl<Err> web::FromRequest<Err> for AdminApiKey {
    type Error = web::Error;

    fn from_request(
        req: &web::HttpRequest,
        _: &mut Payload,
    ) -> impl std::future::Future<Output = Result<Self, Self::Error>> {
        if !is_api_key_valid(req) {
            return std::future::ready(Err(errors::UserError::Unauthorized.into()));
        }

        std::future::ready(Ok(Self))
    }
}
