use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::{
    config::GroupsConfig,
    db::{DEFAULT_GROUP_SETTING, DbError, DbPool, DbResult},
    models::{CreateOrganization, CreateUser, Group, Organization, SYSTEM_ADMIN},
};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Invalid [groups] configuration: {0}")]
    InvalidConfig(#[from] ValidationErrors),

    #[error(transparent)]
    Database(#[from] DbError),
}

const DEFAULT_GROUP_DESCRIPTION: &str = "Any new users created will automatically join this group";
const ADMIN_GROUP_DESCRIPTION: &str = "System administrators";

/// Seed the default organization, default group and optional first admin.
///
/// Safe to run on every startup: existing rows are left alone, and the
/// default group setting is only written when it has no value.
pub async fn bootstrap(db: &DbPool, config: &GroupsConfig) -> Result<(), BootstrapError> {
    let org = ensure_organization(db, config).await?;

    ensure_group(db, &org, &config.default_group, DEFAULT_GROUP_DESCRIPTION).await?;
    if db
        .settings()
        .set_if_absent(DEFAULT_GROUP_SETTING, &config.default_group)
        .await?
    {
        tracing::info!(group = %config.default_group, "Default group setting initialized");
    }

    let Some(admin_group) = &config.admin_group else {
        return Ok(());
    };
    let admins = ensure_group(db, &org, admin_group, ADMIN_GROUP_DESCRIPTION).await?;
    db.permissions()
        .grant_to_group(org.id, Some(admins.id), SYSTEM_ADMIN)
        .await?;

    if let Some(login) = &config.bootstrap_admin {
        let user = match db.users().get_by_login(login).await? {
            Some(user) => {
                if !user.active {
                    tracing::warn!(login = %login, "Reactivating bootstrap admin");
                    db.users().set_active(user.id, true).await?;
                }
                user
            }
            None => {
                let input = CreateUser {
                    login: login.clone(),
                    name: None,
                    email: None,
                };
                input.validate()?;
                tracing::info!(login = %login, "Creating bootstrap admin");
                db.users().create(input).await?
            }
        };
        if db.groups().add_member(admins.id, user.id).await? {
            tracing::info!(login = %login, group = %admin_group, "Bootstrap admin joined admin group");
        }
    }

    Ok(())
}

async fn ensure_organization(
    db: &DbPool,
    config: &GroupsConfig,
) -> Result<Organization, BootstrapError> {
    if let Some(org) = db
        .organizations()
        .get_by_key(&config.default_organization_key)
        .await?
    {
        return Ok(org);
    }

    let input = CreateOrganization {
        key: config.default_organization_key.clone(),
        name: config.default_organization_name.clone(),
    };
    input.validate()?;

    tracing::info!(key = %config.default_organization_key, "Creating default organization");
    Ok(db.organizations().create(input).await?)
}

async fn ensure_group(
    db: &DbPool,
    org: &Organization,
    name: &str,
    description: &str,
) -> DbResult<Group> {
    if let Some(group) = db.groups().get_by_name(org.id, name).await? {
        return Ok(group);
    }

    tracing::info!(org = %org.key, group = %name, "Creating group");
    db.groups().create(org.id, name, Some(description)).await
}
