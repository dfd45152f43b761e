//! Caller identity taken from request headers.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use common::UserId;

/// Header carrying the caller's user ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// The user on whose behalf a request runs.
///
/// Falls back to [`UserId::anonymous`] when the header is missing or is
/// not a UUID, so extraction never rejects a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub UserId);

impl<S: Send + Sync> FromRequestParts<S> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok());
        Ok(Caller(UserId::parse(header)))
    }
}
