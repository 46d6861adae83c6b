mod bootstrap;
mod deletion_guard;
mod group_ref;
mod groups;
mod organizations;

use std::sync::Arc;

pub use bootstrap::bootstrap;
pub use deletion_guard::DeletionGuard;
pub use group_ref::GroupRefResolver;
pub use groups::{GroupError, GroupService};
pub use organizations::OrganizationService;

use crate::{config::GroupsConfig, db::DbPool};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub organizations: OrganizationService,
    pub group_refs: GroupRefResolver,
    pub groups: GroupService,
}

impl Services {
    pub fn new(db: Arc<DbPool>, config: &GroupsConfig) -> Self {
        let organizations =
            OrganizationService::new(db.clone(), &config.default_organization_key);
        let group_refs = GroupRefResolver::new(db.clone(), organizations.clone());
        Self {
            groups: GroupService::new(db, organizations.clone(), group_refs.clone()),
            organizations,
            group_refs,
        }
    }
}
