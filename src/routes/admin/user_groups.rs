//! `/api/user_groups/*` actions.
//!
//! Parameters are form-encoded. Each action requires system administration,
//! enforced by [`admin_auth_middleware`](crate::middleware::admin_auth_middleware)
//! before the form is parsed.

use axum::{
    Extension, Json,
    extract::{Form, State, rejection::FormRejection},
    http::StatusCode,
};
use serde::Serialize;

use super::AdminError;
use crate::{
    AppState,
    middleware::AdminAuth,
    models::{CreateGroup, GroupDetails, GroupMemberParams, GroupRefParams, UpdateGroup},
    services::Services,
};

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub group: GroupDetails,
}

fn get_services(state: &AppState) -> Result<&Services, AdminError> {
    state.services.as_ref().ok_or(AdminError::ServicesRequired)
}

/// Create a group
#[tracing::instrument(
    name = "user_groups.create",
    skip(state, admin, form),
    fields(actor = %admin.user.login)
)]
pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminAuth>,
    form: Result<Form<CreateGroup>, FormRejection>,
) -> Result<Json<GroupResponse>, AdminError> {
    let Form(input) = form?;
    let services = get_services(&state)?;

    let group = services.groups.create(input).await?;
    Ok(Json(GroupResponse { group }))
}

/// Update a group's name and/or description
#[tracing::instrument(
    name = "user_groups.update",
    skip(state, admin, form),
    fields(actor = %admin.user.login)
)]
pub async fn update(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminAuth>,
    form: Result<Form<UpdateGroup>, FormRejection>,
) -> Result<Json<GroupResponse>, AdminError> {
    let Form(input) = form?;
    let services = get_services(&state)?;

    let group = services.groups.update(input).await?;
    Ok(Json(GroupResponse { group }))
}

/// Delete a group, by id or by organization key and name
#[tracing::instrument(
    name = "user_groups.delete",
    skip(state, admin, form),
    fields(actor = %admin.user.login)
)]
pub async fn delete(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminAuth>,
    form: Result<Form<GroupRefParams>, FormRejection>,
) -> Result<StatusCode, AdminError> {
    let Form(params) = form?;
    let services = get_services(&state)?;

    services.groups.delete(&params).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Add a user to a group
#[tracing::instrument(
    name = "user_groups.add_user",
    skip(state, admin, form),
    fields(actor = %admin.user.login)
)]
pub async fn add_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminAuth>,
    form: Result<Form<GroupMemberParams>, FormRejection>,
) -> Result<StatusCode, AdminError> {
    let Form(params) = form?;
    let services = get_services(&state)?;

    services.groups.add_user(&params).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove a user from a group
#[tracing::instrument(
    name = "user_groups.remove_user",
    skip(state, admin, form),
    fields(actor = %admin.user.login)
)]
pub async fn remove_user(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminAuth>,
    form: Result<Form<GroupMemberParams>, FormRejection>,
) -> Result<StatusCode, AdminError> {
    let Form(params) = form?;
    let services = get_services(&state)?;

    services.groups.remove_user(&params).await?;
    Ok(StatusCode::NO_CONTENT)
}
