mod common;
mod groups;
mod organizations;
mod permissions;
mod settings;
mod users;

pub use groups::SqliteGroupRepo;
pub use organizations::SqliteOrganizationRepo;
pub use permissions::{SqlitePermissionRepo, SqlitePermissionTemplateRepo};
pub use settings::SqliteSettingsRepo;
pub use users::SqliteUserRepo;
