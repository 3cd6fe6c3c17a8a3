use super::error::ApiError;
use crate::auth::{Actor, AuthLevel};
use crate::shared::ids::UserId;
use crate::shared::WorkflowError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;

pub const USER_HEADER: &str = "x-user-id";
pub const LEVEL_HEADER: &str = "x-auth-level";
pub const VERIFIED_HEADER: &str = "x-account-verified";

/// The authenticated caller, as forwarded by the gateway in front of this service.
///
/// A missing level means a base user; only an explicit `false` marks the
/// account unverified.
#[derive(Debug, Clone)]
pub struct Caller(pub Actor);

impl Caller {
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ApiError> {
        let id = header(headers, USER_HEADER)?
            .ok_or_else(|| WorkflowError::unauthorized(format!("missing `{USER_HEADER}` header")))?;
        let id = UserId::parse(id)
            .map_err(|err| ApiError::bad_request(format!("invalid `{USER_HEADER}`: {err}")))?;
        let level = match header(headers, LEVEL_HEADER)? {
            Some(raw) => AuthLevel::parse(raw)
                .map_err(|err| ApiError::bad_request(format!("invalid `{LEVEL_HEADER}`: {err}")))?,
            None => AuthLevel::BaseUser,
        };
        let actor = Actor::new(id, level);
        let verified = header(headers, VERIFIED_HEADER)?
            .map(|raw| !raw.trim().eq_ignore_ascii_case("false"))
            .unwrap_or(true);
        Ok(Self(if verified { actor } else { actor.unverified() }))
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, ApiError> {
    headers
        .get(name)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| ApiError::bad_request(format!("`{name}` must be visible ASCII")))
        })
        .transpose()
}

impl<S> FromRequestParts<S> for Caller
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers)
    }
}
