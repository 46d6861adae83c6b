use std::sync::Arc;

use uuid::Uuid;

use super::GroupError;
use crate::{db::DbPool, models::Organization};

/// Service layer for organization lookups
#[derive(Clone)]
pub struct OrganizationService {
    db: Arc<DbPool>,
    default_key: Arc<str>,
}

impl OrganizationService {
    pub fn new(db: Arc<DbPool>, default_key: &str) -> Self {
        Self {
            db,
            default_key: Arc::from(default_key),
        }
    }

    /// The platform default organization.
    ///
    /// Created at startup, so a missing row means the database was modified
    /// behind our back.
    pub async fn default_organization(&self) -> Result<Organization, GroupError> {
        self.db
            .organizations()
            .get_by_key(&self.default_key)
            .await?
            .ok_or_else(|| {
                tracing::error!(key = %self.default_key, "Default organization is missing");
                GroupError::NotFound(format!(
                    "Default organization '{}' does not exist",
                    self.default_key
                ))
            })
    }

    /// Organization with the given key, or the default organization when `None`.
    pub async fn find_by_key(&self, key: Option<&str>) -> Result<Organization, GroupError> {
        let Some(key) = key else {
            return self.default_organization().await;
        };
        self.db
            .organizations()
            .get_by_key(key)
            .await?
            .ok_or_else(|| GroupError::NotFound(format!("No organization with key '{}'", key)))
    }

    /// Organization key for a group's `org_id`.
    pub async fn key_of(&self, org_id: Uuid) -> Result<String, GroupError> {
        self.db
            .organizations()
            .get_by_id(org_id)
            .await?
            .map(|org| org.key)
            .ok_or_else(|| {
                GroupError::NotFound(format!("Could not find organization with id '{}'.", org_id))
            })
    }
}

#[cfg(all(test, feature = "database-sqlite"))]
mod tests {
    use super::*;
    use crate::{db::tests::harness::create_test_db, models::CreateOrganization};

    async fn service() -> OrganizationService {
        let db = Arc::new(create_test_db().await);
        for key in ["default-organization", "acme"] {
            db.organizations()
                .create(CreateOrganization {
                    key: key.to_string(),
                    name: key.to_string(),
                })
                .await
                .unwrap();
        }
        OrganizationService::new(db, "default-organization")
    }

    #[tokio::test]
    async fn test_find_by_key_defaults() {
        let orgs = service().await;
        let org = orgs.find_by_key(None).await.unwrap();
        assert_eq!(org.key, "default-organization");
    }

    #[tokio::test]
    async fn test_find_by_key() {
        let orgs = service().await;
        let org = orgs.find_by_key(Some("acme")).await.unwrap();
        assert_eq!(org.key, "acme");
        assert_eq!(orgs.key_of(org.id).await.unwrap(), "acme");
    }

    #[tokio::test]
    async fn test_find_by_key_missing() {
        let orgs = service().await;
        let err = orgs.find_by_key(Some("missing")).await.unwrap_err();
        assert!(
            matches!(err, GroupError::NotFound(ref msg) if msg == "No organization with key 'missing'")
        );
    }

    #[tokio::test]
    async fn test_missing_default_organization() {
        let db = Arc::new(create_test_db().await);
        let orgs = OrganizationService::new(db, "default-organization");
        assert!(matches!(
            orgs.default_organization().await,
            Err(GroupError::NotFound(_))
        ));
    }
}
