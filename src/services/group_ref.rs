//! Resolution of request parameters to a single group.
//!
//! A group is referenced either by its numeric `id`, or by the pair
//! `organizationKey`/`name` where a missing key means the default
//! organization. Mixing the two forms is rejected.

use std::sync::Arc;

use super::{GroupError, OrganizationService};
use crate::{
    db::DbPool,
    models::{Group, GroupRef, GroupRefParams, is_anyone},
};

const ID_OR_NAME_REQUIRED: &str = "Either id or couple organizationKey/name must be set";

/// Shape of a group reference before the organization is looked up.
#[derive(Debug, PartialEq, Eq)]
enum RefTarget<'a> {
    Id(i64),
    Name {
        organization_key: Option<&'a str>,
        name: &'a str,
    },
}

fn classify(params: &GroupRefParams) -> Result<RefTarget<'_>, GroupError> {
    if let Some(id) = params.id {
        if params.organization_key.is_some() || params.name.is_some() {
            return Err(GroupError::InvalidInput(ID_OR_NAME_REQUIRED.into()));
        }
        if id <= 0 {
            return Err(GroupError::InvalidInput(format!(
                "Group id must be positive: {}",
                id
            )));
        }
        return Ok(RefTarget::Id(id));
    }

    let name = params
        .name
        .as_deref()
        .ok_or_else(|| GroupError::InvalidInput(ID_OR_NAME_REQUIRED.into()))?;
    Ok(RefTarget::Name {
        organization_key: params.organization_key.as_deref(),
        name,
    })
}

#[derive(Clone)]
pub struct GroupRefResolver {
    db: Arc<DbPool>,
    organizations: OrganizationService,
}

impl GroupRefResolver {
    pub fn new(db: Arc<DbPool>, organizations: OrganizationService) -> Self {
        Self { db, organizations }
    }

    /// Turn request parameters into a reference. The organization is looked
    /// up for the name form; the group itself is not.
    pub async fn resolve(&self, params: &GroupRefParams) -> Result<GroupRef, GroupError> {
        match classify(params)? {
            RefTarget::Id(id) => Ok(GroupRef::Id(id)),
            RefTarget::Name {
                organization_key,
                name,
            } => {
                let org = self.organizations.find_by_key(organization_key).await?;
                Ok(GroupRef::Name {
                    org_id: org.id,
                    name: name.to_string(),
                })
            }
        }
    }

    /// Like [`resolve`](Self::resolve), but a name matching "Anyone" in any
    /// case yields `None`: the virtual group of all users.
    pub async fn resolve_or_anyone(
        &self,
        params: &GroupRefParams,
    ) -> Result<Option<GroupRef>, GroupError> {
        match self.resolve(params).await? {
            GroupRef::Name { ref name, .. } if is_anyone(name) => Ok(None),
            group_ref => Ok(Some(group_ref)),
        }
    }

    /// Load the persisted group a reference points to.
    pub async fn find_group(&self, group_ref: &GroupRef) -> Result<Group, GroupError> {
        match group_ref {
            GroupRef::Id(id) => self
                .db
                .groups()
                .get_by_id(*id)
                .await?
                .ok_or_else(|| GroupError::NotFound(format!("No group with id '{}'", id))),
            GroupRef::Name { org_id, name } => self
                .db
                .groups()
                .get_by_name(*org_id, name)
                .await?
                .ok_or_else(|| {
                    GroupError::NotFound(format!(
                        "No group with name '{}' in organization '{}'",
                        name, org_id
                    ))
                }),
        }
    }

    /// Resolve and load in one step. "Anyone" is not a persisted group and
    /// therefore not found.
    pub async fn find(&self, params: &GroupRefParams) -> Result<Group, GroupError> {
        let group_ref = self.resolve(params).await?;
        self.find_group(&group_ref).await
    }

    /// Resolve and load, returning `None` for the "Anyone" group.
    pub async fn find_or_anyone(
        &self,
        params: &GroupRefParams,
    ) -> Result<Option<Group>, GroupError> {
        match self.resolve_or_anyone(params).await? {
            Some(group_ref) => self.find_group(&group_ref).await.map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn params(id: Option<i64>, organization_key: Option<&str>, name: Option<&str>) -> GroupRefParams {
        GroupRefParams {
            id,
            organization_key: organization_key.map(str::to_string),
            name: name.map(str::to_string),
        }
    }

    #[rstest]
    #[case(params(Some(42), None, None), RefTarget::Id(42))]
    #[case(
        params(None, None, Some("devs")),
        RefTarget::Name { organization_key: None, name: "devs" }
    )]
    #[case(
        params(None, Some("acme"), Some("devs")),
        RefTarget::Name { organization_key: Some("acme"), name: "devs" }
    )]
    fn test_classify(#[case] input: GroupRefParams, #[case] expected: RefTarget<'static>) {
        assert_eq!(classify(&input).unwrap(), expected);
    }

    #[rstest]
    #[case::id_and_name(params(Some(42), None, Some("devs")))]
    #[case::id_and_org(params(Some(42), Some("acme"), None))]
    #[case::nothing(params(None, None, None))]
    #[case::org_without_name(params(None, Some("acme"), None))]
    fn test_classify_rejects_ambiguous(#[case] input: GroupRefParams) {
        assert!(matches!(
            classify(&input),
            Err(GroupError::InvalidInput(ref msg)) if msg == ID_OR_NAME_REQUIRED
        ));
    }

    #[rstest]
    #[case(0)]
    #[case(-1)]
    fn test_classify_rejects_non_positive_id(#[case] id: i64) {
        assert!(matches!(
            classify(&params(Some(id), None, None)),
            Err(GroupError::InvalidInput(_))
        ));
    }

    #[cfg(feature = "database-sqlite")]
    mod db {
        use super::*;
        use crate::{db::tests::harness::create_test_db, models::CreateOrganization};

        struct Fixture {
            db: Arc<DbPool>,
            resolver: GroupRefResolver,
            default_org: uuid::Uuid,
            acme: uuid::Uuid,
        }

        async fn fixture() -> Fixture {
            let db = Arc::new(create_test_db().await);
            let mut ids = Vec::new();
            for key in ["default-organization", "acme"] {
                let org = db
                    .organizations()
                    .create(CreateOrganization {
                        key: key.to_string(),
                        name: key.to_string(),
                    })
                    .await
                    .unwrap();
                ids.push(org.id);
            }
            let organizations = OrganizationService::new(db.clone(), "default-organization");
            Fixture {
                resolver: GroupRefResolver::new(db.clone(), organizations),
                db,
                default_org: ids[0],
                acme: ids[1],
            }
        }

        #[tokio::test]
        async fn test_resolve_by_id_skips_lookup() {
            let f = fixture().await;
            let group_ref = f.resolver.resolve(&GroupRefParams::by_id(999)).await.unwrap();
            assert_eq!(group_ref, GroupRef::Id(999));
        }

        #[tokio::test]
        async fn test_resolve_by_name_in_default_org() {
            let f = fixture().await;
            let group_ref = f
                .resolver
                .resolve(&GroupRefParams::by_name(None, "devs"))
                .await
                .unwrap();
            assert_eq!(
                group_ref,
                GroupRef::Name {
                    org_id: f.default_org,
                    name: "devs".into()
                }
            );
        }

        #[tokio::test]
        async fn test_resolve_unknown_org() {
            let f = fixture().await;
            let err = f
                .resolver
                .resolve(&GroupRefParams::by_name(Some("missing"), "devs"))
                .await
                .unwrap_err();
            assert!(
                matches!(err, GroupError::NotFound(ref msg) if msg == "No organization with key 'missing'")
            );
        }

        #[tokio::test]
        async fn test_find_group() {
            let f = fixture().await;
            let group = f.db.groups().create(f.acme, "devs", None).await.unwrap();

            let by_id = f.resolver.find(&GroupRefParams::by_id(group.id)).await.unwrap();
            assert_eq!(by_id, group);

            let by_name = f
                .resolver
                .find(&GroupRefParams::by_name(Some("acme"), "devs"))
                .await
                .unwrap();
            assert_eq!(by_name, group);

            // Same name, default organization
            let err = f
                .resolver
                .find(&GroupRefParams::by_name(None, "devs"))
                .await
                .unwrap_err();
            assert!(matches!(err, GroupError::NotFound(ref msg) if msg.starts_with("No group with name 'devs'")));
        }

        #[tokio::test]
        async fn test_find_group_missing_id() {
            let f = fixture().await;
            let err = f
                .resolver
                .find(&GroupRefParams::by_id(404))
                .await
                .unwrap_err();
            assert!(matches!(err, GroupError::NotFound(ref msg) if msg == "No group with id '404'"));
        }

        #[rstest]
        #[case("anyone")]
        #[case("Anyone")]
        #[case("ANYONE")]
        #[tokio::test]
        async fn test_resolve_or_anyone(#[case] name: &str) {
            let f = fixture().await;
            let params = GroupRefParams::by_name(None, name);

            assert_eq!(f.resolver.resolve_or_anyone(&params).await.unwrap(), None);
            assert!(f.resolver.find_or_anyone(&params).await.unwrap().is_none());
            // The plain lookup treats it as any other missing group
            assert!(matches!(
                f.resolver.find(&params).await,
                Err(GroupError::NotFound(_))
            ));
        }

        #[tokio::test]
        async fn test_find_or_anyone_returns_real_groups() {
            let f = fixture().await;
            let group = f
                .db
                .groups()
                .create(f.default_org, "devs", None)
                .await
                .unwrap();

            let found = f
                .resolver
                .find_or_anyone(&GroupRefParams::by_name(None, "devs"))
                .await
                .unwrap();
            assert_eq!(found, Some(group.clone()));

            let found = f
                .resolver
                .find_or_anyone(&GroupRefParams::by_id(group.id))
                .await
                .unwrap();
            assert_eq!(found, Some(group));
        }
    }
}
