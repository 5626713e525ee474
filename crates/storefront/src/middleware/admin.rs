use axum::{body::Body, http::Request, middleware::Next, response::IntoResponse};
use shared::{domain::identity::AuthUser, errors::HttpError};

/// Runs after `auth_middleware`; lets only admins through.
pub async fn admin_middleware(
    req: Request<Body>,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    match req.extensions().get::<AuthUser>() {
        None => Err(HttpError::Unauthorized(
            "Missing or invalid Authorization header".to_string(),
        )),
        Some(user) if !user.is_admin() => {
            Err(HttpError::Forbidden("Insufficient permissions".to_string()))
        }
        Some(_) => Ok(next.run(req).await),
    }
}
