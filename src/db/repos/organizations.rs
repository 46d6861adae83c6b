use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    db::error::DbResult,
    models::{CreateOrganization, Organization},
};

#[async_trait]
pub trait OrganizationRepo: Send + Sync {
    async fn create(&self, input: CreateOrganization) -> DbResult<Organization>;
    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<Organization>>;
    async fn get_by_key(&self, key: &str) -> DbResult<Option<Organization>>;
}
