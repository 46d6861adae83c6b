//! Safety checks run before a group is deleted.
//!
//! Two groups must never disappear:
//! - the default group, named by the `sonar.defaultGroup` setting;
//! - the last group granting system administration, unless some user holds
//!   the permission directly.
//!
//! The decision itself is the pure [`evaluate`] function; [`DeletionGuard`]
//! applies it inside the deleting transaction.

use std::sync::Arc;

use crate::{
    db::{DbPool, DbResult},
    models::{AdminSnapshot, DeletionDenied, Group},
};

fn is_last_admin_path(admins: &AdminSnapshot) -> bool {
    admins.group_grants_admin && admins.admin_group_count == 1 && admins.direct_admin_user_count == 0
}

/// Decide whether a group named `group_name` may be deleted.
///
/// Users who are admins only through membership in another group do not
/// count towards `direct_admin_user_count`.
pub fn evaluate(
    group_name: &str,
    default_group: Option<&str>,
    admins: AdminSnapshot,
) -> Result<(), DeletionDenied> {
    if default_group == Some(group_name) {
        return Err(DeletionDenied::DefaultGroup(group_name.to_string()));
    }
    if is_last_admin_path(&admins) {
        return Err(DeletionDenied::LastAdminGroup(group_name.to_string()));
    }
    Ok(())
}

#[derive(Clone)]
pub struct DeletionGuard {
    db: Arc<DbPool>,
}

impl DeletionGuard {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Delete `group` if [`evaluate`] allows it. The default group setting
    /// and admin grants are read in the same write transaction as the
    /// delete, so concurrent deletions cannot both pass the check.
    pub async fn delete(&self, group: &Group) -> DbResult<Result<(), DeletionDenied>> {
        self.db.groups().delete(group.id, evaluate).await
    }
}
