//! Middleware for bearer token validation

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::warn;
use uuid::Uuid;

use crate::{error::AuthError, jwt::JwtService};

/// Identity resolved from a valid bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Resolve `Authorization: Bearer <token>` to an [`AuthUser`]
///
/// The user is inserted into the request extensions so handlers can take it
/// with `Extension<AuthUser>`.
pub async fn require_bearer(
    State(jwt_service): State<JwtService>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AuthError::Unauthorized)?;

    let claims = jwt_service.validate_token(bearer.token()).map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        AuthError::Unauthorized
    })?;

    req.extensions_mut().insert(AuthUser { id: claims.sub });

    Ok(next.run(req).await)
}
