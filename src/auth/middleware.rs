use crate::auth::jwt::{JwtService, TokenType};
use crate::entities::UserRole;
use crate::error::AppError;
use axum::{extract::Request, middleware::Next, response::Response};
use tracing::debug;

/// Authenticated user information extracted from a verified access token
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
}

/// JWT authentication middleware.
///
/// Extracts the token from the Authorization header, verifies it, and adds
/// `Option<AuthUser>` to request extensions. If no token or an invalid
/// token is present the request continues anonymously; endpoint-level
/// checks decide whether that is acceptable.
pub async fn jwt_auth_middleware(
    axum::extract::State(jwt): axum::extract::State<std::sync::Arc<JwtService>>,
    mut request: Request,
    next: Next,
) -> Response {
    let auth_user = extract_auth_user(&request, &jwt);

    match &auth_user {
        Some(user) => debug!("Authenticated user: {} ({:?})", user.username, user.role),
        None => debug!("No valid authentication token"),
    }
    request.extensions_mut().insert(auth_user);

    next.run(request).await
}

/// Extract and verify the token from the request.
///
/// Only access tokens authenticate; a refresh token on the Authorization
/// header is treated as anonymous.
fn extract_auth_user(request: &Request, jwt: &JwtService) -> Option<AuthUser> {
    let auth_header = request.headers().get("authorization")?;
    let auth_str = auth_header.to_str().ok()?;

    // Handle both "Bearer <token>" and a raw token
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);

    let claims = jwt.verify_token(token).ok()?;
    if claims.token_type != TokenType::Access {
        return None;
    }

    Some(AuthUser {
        user_id: claims.user_id,
        username: claims.username,
        role: claims.role,
    })
}

/// Any authenticated caller.
pub fn require_auth(user: Option<&AuthUser>) -> Result<&AuthUser, AppError> {
    user.ok_or_else(|| {
        AppError::Unauthorized("Authentication credentials were not provided".to_string())
    })
}

/// Admin role required.
pub fn require_admin(user: Option<&AuthUser>) -> Result<&AuthUser, AppError> {
    let user = require_auth(user)?;
    if user.role != UserRole::Admin {
        return Err(AppError::Forbidden("Admin role required".to_string()));
    }
    Ok(user)
}

/// Fund creator role required.
pub fn require_fund_creator(user: Option<&AuthUser>) -> Result<&AuthUser, AppError> {
    let user = require_auth(user)?;
    if user.role != UserRole::FundCreator {
        return Err(AppError::Forbidden("Fund creator role required".to_string()));
    }
    Ok(user)
}
