use axum::{body::Body, extract::Request, middleware::Next, response::Response};
use contracts::system::auth::TokenClaims;

use crate::shared::config;
use crate::shared::error::AppError;

/// Claims from the `Authorization: Bearer` header, or `Unauthorized`
fn bearer_claims(req: &Request<Body>) -> Result<TokenClaims, AppError> {
    let auth_header = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    let secret = &config::current()?.auth.jwt_secret;
    super::jwt::validate_token(secret, token).map_err(|e| {
        tracing::debug!("Rejected bearer token: {:#}", e);
        AppError::Unauthorized
    })
}

/// Middleware that requires valid JWT authentication
pub async fn require_auth(mut req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let claims = bearer_claims(&req)?;

    // Add claims to request extensions for use in handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Middleware that requires admin privileges
pub async fn require_admin(mut req: Request<Body>, next: Next) -> Result<Response, AppError> {
    let claims = bearer_claims(&req)?;

    if !claims.is_admin {
        return Err(AppError::Forbidden);
    }

    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
