use async_trait::async_trait;

use crate::db::error::DbResult;

/// Key of the setting naming the default group.
pub const DEFAULT_GROUP_SETTING: &str = "sonar.defaultGroup";

/// Global key/value settings.
#[async_trait]
pub trait SettingsRepo: Send + Sync {
    async fn get(&self, key: &str) -> DbResult<Option<String>>;

    /// Insert or overwrite a setting.
    async fn set(&self, key: &str, value: &str) -> DbResult<()>;

    /// Insert a setting only if it has no value yet. Returns whether it was written.
    async fn set_if_absent(&self, key: &str, value: &str) -> DbResult<bool>;
}
