use async_trait::async_trait;
use uuid::Uuid;

use crate::{db::error::DbResult, models::PermissionTemplate};

/// Global (resource-less) permission grants to groups and users.
#[async_trait]
pub trait PermissionRepo: Send + Sync {
    /// Grant a global permission to a group, or to "Anyone" when `group_id` is `None`.
    /// Granting an existing permission is a no-op.
    async fn grant_to_group(
        &self,
        org_id: Uuid,
        group_id: Option<i64>,
        permission: &str,
    ) -> DbResult<()>;

    /// Grant a global permission directly to a user. Granting an existing
    /// permission is a no-op.
    async fn grant_to_user(&self, org_id: Uuid, user_id: Uuid, permission: &str) -> DbResult<()>;

    /// Global permissions held by a group.
    async fn list_group_permissions(&self, group_id: i64) -> DbResult<Vec<String>>;

    async fn group_has_permission(&self, group_id: i64, permission: &str) -> DbResult<bool>;

    /// Number of persisted groups in the organization holding the permission globally.
    async fn count_groups_with_permission(&self, org_id: Uuid, permission: &str)
    -> DbResult<i64>;

    /// Number of active users holding the permission through a direct grant.
    /// Group memberships are not considered.
    async fn count_users_with_direct_permission(
        &self,
        org_id: Uuid,
        permission: &str,
    ) -> DbResult<i64>;

    /// Whether a user holds a global permission directly, through one of
    /// their groups, or through a grant to "Anyone".
    async fn user_has_permission(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        permission: &str,
    ) -> DbResult<bool>;
}

#[async_trait]
pub trait PermissionTemplateRepo: Send + Sync {
    async fn create(&self, org_id: Uuid, name: &str) -> DbResult<PermissionTemplate>;

    /// Reference a group from a template for the given permission.
    async fn add_group(&self, template_id: i64, group_id: i64, permission: &str) -> DbResult<()>;

    /// Number of template entries referencing a group.
    async fn count_group_references(&self, group_id: i64) -> DbResult<i64>;
}
