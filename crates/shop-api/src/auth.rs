//! # Caller Identity
//!
//! The gateway sits behind the application's auth layer, which forwards the
//! authenticated user's identity in trusted headers. Checkout requires that
//! identity (the email prefills the hosted page, the id becomes the session
//! client reference).

use crate::handlers::ErrorResponse;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    Json,
};
use shop_core::CheckoutUser;

/// Header carrying the authenticated user's internal id
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the authenticated user's email
pub const USER_EMAIL_HEADER: &str = "x-user-email";

/// Extractor for the authenticated caller. Rejects with 401 when either
/// identity header is absent.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub CheckoutUser);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
                .filter(|value| !value.is_empty())
        };

        match (header(USER_ID_HEADER), header(USER_EMAIL_HEADER)) {
            (Some(id), Some(email)) => Ok(Self(CheckoutUser { id, email })),
            _ => Err((
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new("Authentication required", 401)),
            )),
        }
    }
}
