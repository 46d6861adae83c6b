use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeletionDenied {
    #[error("Default group '{0}' cannot be deleted")]
    DefaultGroup(String),

    #[error("The last system admin group '{0}' cannot be deleted")]
    LastAdminGroup(String),
}

/// System-admin grants in the group's organization at the time of the check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdminSnapshot {
    /// The group being deleted grants `admin` globally
    pub group_grants_admin: bool,
    /// Groups in the organization granting `admin` globally, this one included
    pub admin_group_count: i64,
    /// Active users holding `admin` through a direct grant
    pub direct_admin_user_count: i64,
}

/// Decides on a deletion from the group name, the default group setting and
/// the admin snapshot, all read in the deleting transaction.
pub type DeletionCheck = fn(&str, Option<&str>, AdminSnapshot) -> Result<(), DeletionDenied>;
