//! Admin authorization middleware.
//!
//! The caller's login is taken from the identity header set by the
//! authenticating reverse proxy (`auth.identity_header`). The caller must be
//! an active user holding the global `admin` permission in the default
//! organization: directly, through one of their groups, or through a grant
//! to "Anyone".
//!
//! Runs before any handler extractor, so unauthenticated and unauthorized
//! requests are rejected before their parameters are looked at.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use super::RequestId;
use crate::{AppState, models::SYSTEM_ADMIN, models::User, routes::admin::AdminError};

/// Authenticated administrator, inserted into request extensions.
#[derive(Debug, Clone)]
pub struct AdminAuth {
    pub user: User,
}

pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AdminError> {
    let request_id = req
        .extensions()
        .get::<RequestId>()
        .map(|r| r.as_str().to_string());

    let login = caller_login(&state, req.headers())?;
    let user = authorize(&state, &login).await?;

    tracing::debug!(
        request_id = ?request_id,
        login = %user.login,
        "Admin request authorized"
    );

    req.extensions_mut().insert(AdminAuth { user });
    Ok(next.run(req).await)
}

/// Login forwarded by the proxy in `auth.identity_header`, trimmed.
fn caller_login(state: &AppState, headers: &HeaderMap) -> Result<String, AdminError> {
    headers
        .get(state.config.auth.identity_header.as_str())
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|login| !login.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AdminError::Unauthenticated("Authentication is required".into()))
}

async fn authorize(state: &AppState, login: &str) -> Result<User, AdminError> {
    let (Some(db), Some(services)) = (&state.db, &state.services) else {
        return Err(AdminError::ServicesRequired);
    };

    let user = db.users().get_active_by_login(login).await?.ok_or_else(|| {
        tracing::debug!(login = %login, "Unknown or inactive caller");
        AdminError::Unauthenticated("Authentication is required".into())
    })?;

    let org = services.organizations.default_organization().await?;
    if !db
        .permissions()
        .user_has_permission(org.id, user.id, SYSTEM_ADMIN)
        .await?
    {
        tracing::warn!(login = %user.login, "Admin access denied");
        return Err(AdminError::Forbidden("Insufficient privileges".into()));
    }

    Ok(user)
}
