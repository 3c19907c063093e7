// ============================================================================
// Admin Middleware - role gate for catalog administration routes
// ============================================================================
//
// Must run AFTER auth_middleware, which places `Claims` in the request
// extensions:
//
//   .layer(middleware::from_fn(admin_middleware))
//   .layer(middleware::from_fn_with_state(config, auth_middleware))
//
// ============================================================================

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use crate::middleware::auth::Claims;

/// Require admin or superadmin role.
///
/// Returns 401 when no claims were attached and 403 for non-admin users.
pub async fn admin_middleware(
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let claims = request
        .extensions()
        .get::<Claims>()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !claims.is_admin() {
        tracing::warn!(
            "Admin access denied for user {} with role {}",
            claims.user_id,
            claims.role.as_str()
        );
        return Err(StatusCode::FORBIDDEN);
    }

    tracing::debug!("Admin access granted to user {}", claims.user_id);

    Ok(next.run(request).await)
}
