use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{DeletionCheck, DeletionDenied, Group},
};

#[async_trait]
pub trait GroupRepo: Send + Sync {
    /// Create a group. Fails with `Conflict` when the name is taken in the organization.
    async fn create(
        &self,
        org_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> DbResult<Group>;

    async fn get_by_id(&self, id: i64) -> DbResult<Option<Group>>;

    /// Get a group by exact name within an organization.
    async fn get_by_name(&self, org_id: Uuid, name: &str) -> DbResult<Option<Group>>;

    /// Update name and/or description; `None` leaves a field unchanged.
    ///
    /// When the group is renamed and the `sonar.defaultGroup` setting holds
    /// its old name, the setting is rewritten to the new name in the same
    /// transaction.
    async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> DbResult<Group>;

    /// Delete a group along with its memberships, role grants and
    /// permission-template references. Either everything is removed or
    /// nothing is.
    ///
    /// `check` sees the default group setting and the admin snapshot as
    /// read inside the deleting transaction; a denial leaves the group in
    /// place and is returned as the inner error.
    async fn delete(&self, id: i64, check: DeletionCheck) -> DbResult<Result<(), DeletionDenied>>;

    // ========================================================================
    // Membership operations
    // ========================================================================

    async fn count_members(&self, group_id: i64) -> DbResult<i64>;

    async fn is_member(&self, group_id: i64, user_id: Uuid) -> DbResult<bool>;

    /// Add a user to a group. Returns `false` if the user was already a member.
    async fn add_member(&self, group_id: i64, user_id: Uuid) -> DbResult<bool>;

    /// Remove a user from a group. Returns `false` if the user was not a member.
    async fn remove_member(&self, group_id: i64, user_id: Uuid) -> DbResult<bool>;
}
