use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Global permission granting system administration.
pub const SYSTEM_ADMIN: &str = "admin";

/// Named set of permissions applied to new projects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionTemplate {
    pub id: i64,
    pub org_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}
