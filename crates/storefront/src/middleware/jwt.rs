use axum::{
    Extension,
    body::Body,
    http::{Request, header},
    middleware::Next,
    response::IntoResponse,
};
use shared::{abstract_trait::DynJwtService, errors::HttpError};
use tracing::debug;

/// Resolves the bearer token into an `AuthUser` request extension.
pub async fn auth_middleware(
    Extension(jwt): Extension<DynJwtService>,
    mut req: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|auth_header| auth_header.to_str().ok())
        .and_then(|auth_value| auth_value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| {
            HttpError::Unauthorized("Missing or invalid Authorization header".to_string())
        })?;

    let user = jwt.verify_token(&token).map_err(|e| {
        debug!("Rejected bearer token: {e}");
        HttpError::Unauthorized("Invalid or expired token".to_string())
    })?;

    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}
