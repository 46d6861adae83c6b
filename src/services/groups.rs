use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use super::{DeletionGuard, GroupRefResolver, OrganizationService};
use crate::{
    db::{DbError, DbPool},
    models::{
        CreateGroup, DeletionDenied, Group, GroupDetails, GroupMemberParams, GroupRefParams,
        UpdateGroup, User,
    },
};

/// Errors returned by group operations.
#[derive(Debug, Error)]
pub enum GroupError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(DbError),
}

impl From<DbError> for GroupError {
    fn from(e: DbError) -> Self {
        match e {
            DbError::Conflict(msg) => GroupError::Conflict(msg),
            other => GroupError::Database(other),
        }
    }
}

impl From<DeletionDenied> for GroupError {
    fn from(e: DeletionDenied) -> Self {
        GroupError::InvalidInput(e.to_string())
    }
}

impl From<ValidationErrors> for GroupError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));

        let messages: Vec<String> = fields
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid value for '{}'", field),
                })
            })
            .collect();

        GroupError::InvalidInput(messages.join(", "))
    }
}

/// Service layer for user group administration
#[derive(Clone)]
pub struct GroupService {
    db: Arc<DbPool>,
    organizations: OrganizationService,
    resolver: GroupRefResolver,
    guard: DeletionGuard,
}

impl GroupService {
    pub fn new(
        db: Arc<DbPool>,
        organizations: OrganizationService,
        resolver: GroupRefResolver,
    ) -> Self {
        Self {
            guard: DeletionGuard::new(db.clone()),
            db,
            organizations,
            resolver,
        }
    }

    /// Create a group in the given organization, or the default one.
    pub async fn create(&self, input: CreateGroup) -> Result<GroupDetails, GroupError> {
        input.validate()?;

        let org = self
            .organizations
            .find_by_key(input.organization_key.as_deref())
            .await?;
        self.ensure_name_available(org.id, &input.name).await?;

        let group = self
            .db
            .groups()
            .create(org.id, &input.name, input.description.as_deref())
            .await?;

        tracing::info!(group_id = group.id, org = %org.key, name = %group.name, "Group created");
        Ok(GroupDetails::new(group, org.key, 0))
    }

    /// Update a group's name and/or description.
    ///
    /// Renaming the default group carries the `sonar.defaultGroup` setting
    /// along.
    pub async fn update(&self, input: UpdateGroup) -> Result<GroupDetails, GroupError> {
        input.validate()?;

        let group = self.db.groups().get_by_id(input.id).await?.ok_or_else(|| {
            GroupError::NotFound(format!(
                "Could not find a user group with id '{}'.",
                input.id
            ))
        })?;
        let org_key = self.organizations.key_of(group.org_id).await?;

        let new_name = input.name.as_deref();
        if let Some(name) = new_name {
            self.ensure_name_available(group.org_id, name).await?;
        }

        let group = if new_name.is_some() || input.description.is_some() {
            self.db
                .groups()
                .update(group.id, new_name, input.description.as_deref())
                .await
                .map_err(|e| self.not_found_by_id(e, input.id))?
        } else {
            group
        };

        let members_count = self.db.groups().count_members(group.id).await?;
        tracing::info!(group_id = group.id, name = %group.name, "Group updated");
        Ok(GroupDetails::new(group, org_key, members_count))
    }

    /// Delete a group with its memberships, role grants and permission
    /// template references.
    pub async fn delete(&self, params: &GroupRefParams) -> Result<(), GroupError> {
        let group = self.resolver.find(params).await?;

        self.guard
            .delete(&group)
            .await
            .map_err(|e| self.not_found_by_id(e, group.id))??;

        tracing::info!(group_id = group.id, name = %group.name, "Group deleted");
        Ok(())
    }

    /// Add an active user to a group. Adding an existing member is a no-op.
    pub async fn add_user(&self, params: &GroupMemberParams) -> Result<(), GroupError> {
        let group = self.resolver.find(&params.group()).await?;
        let user = self.active_user(&params.login).await?.ok_or_else(|| {
            GroupError::NotFound(format!(
                "Could not find a user with login '{}'",
                params.login
            ))
        })?;

        let added = self.db.groups().add_member(group.id, user.id).await?;
        log_membership(&group, &user, added, "User added to group");
        Ok(())
    }

    /// Remove an active user from a group. Removing a non-member is a no-op.
    pub async fn remove_user(&self, params: &GroupMemberParams) -> Result<(), GroupError> {
        let group = self.resolver.find(&params.group()).await?;
        let user = self.active_user(&params.login).await?.ok_or_else(|| {
            GroupError::NotFound(format!("User with login '{}' is not found", params.login))
        })?;

        let removed = self.db.groups().remove_member(group.id, user.id).await?;
        log_membership(&group, &user, removed, "User removed from group");
        Ok(())
    }

    async fn active_user(&self, login: &str) -> Result<Option<User>, GroupError> {
        Ok(self.db.users().get_active_by_login(login).await?)
    }

    async fn ensure_name_available(&self, org_id: Uuid, name: &str) -> Result<(), GroupError> {
        if self.db.groups().get_by_name(org_id, name).await?.is_some() {
            return Err(GroupError::Conflict(format!(
                "Group '{}' already exists",
                name
            )));
        }
        Ok(())
    }

    /// The group vanished between lookup and write.
    fn not_found_by_id(&self, e: DbError, id: i64) -> GroupError {
        match e {
            DbError::NotFound => GroupError::NotFound(format!("No group with id '{}'", id)),
            other => other.into(),
        }
    }
}

fn log_membership(group: &Group, user: &User, changed: bool, message: &str) {
    if changed {
        tracing::info!(group_id = group.id, login = %user.login, "{}", message);
    } else {
        tracing::debug!(group_id = group.id, login = %user.login, "Membership unchanged");
    }
}
