use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{CreateUser, User},
};

#[async_trait]
pub trait UserRepo: Send + Sync {
    /// Create a new, active user.
    async fn create(&self, input: CreateUser) -> DbResult<User>;

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<User>>;

    /// Get a user by login, whether active or not.
    async fn get_by_login(&self, login: &str) -> DbResult<Option<User>>;

    /// Get a user by login, ignoring deactivated users.
    async fn get_active_by_login(&self, login: &str) -> DbResult<Option<User>>;

    /// Activate or deactivate a user.
    async fn set_active(&self, id: Uuid, active: bool) -> DbResult<()>;
}
