//! Shared tests for permission grants and settings

use uuid::Uuid;

use crate::{
    db::repos::{
        DEFAULT_GROUP_SETTING, GroupRepo, OrganizationRepo, PermissionRepo, SettingsRepo,
        UserRepo,
    },
    models::{CreateOrganization, CreateUser, SYSTEM_ADMIN},
};

pub struct PermissionTestContext<'a> {
    pub permissions: &'a dyn PermissionRepo,
    pub groups: &'a dyn GroupRepo,
    pub orgs: &'a dyn OrganizationRepo,
    pub users: &'a dyn UserRepo,
    pub settings: &'a dyn SettingsRepo,
}

impl PermissionTestContext<'_> {
    async fn org(&self, key: &str) -> Uuid {
        self.orgs
            .create(CreateOrganization {
                key: key.to_string(),
                name: key.to_uppercase(),
            })
            .await
            .expect("Failed to create org")
            .id
    }

    async fn user(&self, login: &str) -> Uuid {
        self.users
            .create(CreateUser {
                login: login.to_string(),
                name: None,
                email: None,
            })
            .await
            .expect("Failed to create user")
            .id
    }
}

// ============================================================================
// Grants
// ============================================================================

pub async fn test_grant_to_group_is_idempotent(ctx: &PermissionTestContext<'_>) {
    let org_id = ctx.org("acme").await;
    let group = ctx.groups.create(org_id, "admins", None).await.unwrap();

    ctx.permissions
        .grant_to_group(org_id, Some(group.id), SYSTEM_ADMIN)
        .await
        .unwrap();
    ctx.permissions
        .grant_to_group(org_id, Some(group.id), SYSTEM_ADMIN)
        .await
        .unwrap();
    ctx.permissions
        .grant_to_group(org_id, Some(group.id), "gateadmin")
        .await
        .unwrap();

    assert_eq!(
        ctx.permissions
            .list_group_permissions(group.id)
            .await
            .unwrap(),
        vec![SYSTEM_ADMIN.to_string(), "gateadmin".to_string()]
    );
    assert!(
        ctx.permissions
            .group_has_permission(group.id, SYSTEM_ADMIN)
            .await
            .unwrap()
    );
    assert!(
        !ctx.permissions
            .group_has_permission(group.id, "provisioning")
            .await
            .unwrap()
    );
}

pub async fn test_anyone_grant_is_idempotent(ctx: &PermissionTestContext<'_>) {
    let org_id = ctx.org("acme").await;

    ctx.permissions
        .grant_to_group(org_id, None, "scan")
        .await
        .unwrap();
    ctx.permissions
        .grant_to_group(org_id, None, "scan")
        .await
        .expect("Repeated Anyone grant should be a no-op");
}

// ============================================================================
// Counting
// ============================================================================

pub async fn test_count_groups_with_permission(ctx: &PermissionTestContext<'_>) {
    let org_id = ctx.org("acme").await;
    let other_org = ctx.org("other").await;
    let admins = ctx.groups.create(org_id, "admins", None).await.unwrap();
    let ops = ctx.groups.create(org_id, "ops", None).await.unwrap();
    let elsewhere = ctx.groups.create(other_org, "admins", None).await.unwrap();

    assert_eq!(
        ctx.permissions
            .count_groups_with_permission(org_id, SYSTEM_ADMIN)
            .await
            .unwrap(),
        0
    );

    ctx.permissions
        .grant_to_group(org_id, Some(admins.id), SYSTEM_ADMIN)
        .await
        .unwrap();
    ctx.permissions
        .grant_to_group(org_id, Some(ops.id), "scan")
        .await
        .unwrap();
    // Neither the Anyone grant nor other organizations are counted
    ctx.permissions
        .grant_to_group(org_id, None, SYSTEM_ADMIN)
        .await
        .unwrap();
    ctx.permissions
        .grant_to_group(other_org, Some(elsewhere.id), SYSTEM_ADMIN)
        .await
        .unwrap();

    assert_eq!(
        ctx.permissions
            .count_groups_with_permission(org_id, SYSTEM_ADMIN)
            .await
            .unwrap(),
        1
    );

    ctx.permissions
        .grant_to_group(org_id, Some(ops.id), SYSTEM_ADMIN)
        .await
        .unwrap();
    assert_eq!(
        ctx.permissions
            .count_groups_with_permission(org_id, SYSTEM_ADMIN)
            .await
            .unwrap(),
        2
    );
}

pub async fn test_count_users_with_direct_permission(ctx: &PermissionTestContext<'_>) {
    let org_id = ctx.org("acme").await;
    let other_org = ctx.org("other").await;
    let alice = ctx.user("alice").await;
    let bob = ctx.user("bob").await;
    let carol = ctx.user("carol").await;
    let group = ctx.groups.create(org_id, "admins", None).await.unwrap();

    ctx.permissions
        .grant_to_user(org_id, alice, SYSTEM_ADMIN)
        .await
        .unwrap();
    ctx.permissions
        .grant_to_user(org_id, bob, SYSTEM_ADMIN)
        .await
        .unwrap();
    ctx.permissions
        .grant_to_user(other_org, carol, SYSTEM_ADMIN)
        .await
        .unwrap();
    // Membership in an admin group is not a direct grant
    ctx.permissions
        .grant_to_group(org_id, Some(group.id), SYSTEM_ADMIN)
        .await
        .unwrap();
    ctx.groups.add_member(group.id, carol).await.unwrap();

    assert_eq!(
        ctx.permissions
            .count_users_with_direct_permission(org_id, SYSTEM_ADMIN)
            .await
            .unwrap(),
        2
    );

    ctx.users.set_active(bob, false).await.unwrap();
    assert_eq!(
        ctx.permissions
            .count_users_with_direct_permission(org_id, SYSTEM_ADMIN)
            .await
            .unwrap(),
        1
    );
}

// ============================================================================
// Effective permission
// ============================================================================

pub async fn test_user_has_permission(ctx: &PermissionTestContext<'_>) {
    let org_id = ctx.org("acme").await;
    let direct = ctx.user("direct").await;
    let member = ctx.user("member").await;
    let outsider = ctx.user("outsider").await;
    let group = ctx.groups.create(org_id, "admins", None).await.unwrap();

    ctx.permissions
        .grant_to_user(org_id, direct, SYSTEM_ADMIN)
        .await
        .unwrap();
    ctx.permissions
        .grant_to_group(org_id, Some(group.id), SYSTEM_ADMIN)
        .await
        .unwrap();
    ctx.groups.add_member(group.id, member).await.unwrap();

    for (user, expected) in [(direct, true), (member, true), (outsider, false)] {
        assert_eq!(
            ctx.permissions
                .user_has_permission(org_id, user, SYSTEM_ADMIN)
                .await
                .unwrap(),
            expected
        );
    }

    assert!(
        !ctx.permissions
            .user_has_permission(org_id, member, "scan")
            .await
            .unwrap()
    );
}

pub async fn test_anyone_grant_applies_to_everyone(ctx: &PermissionTestContext<'_>) {
    let org_id = ctx.org("acme").await;
    let other_org = ctx.org("other").await;
    let user = ctx.user("anybody").await;

    ctx.permissions
        .grant_to_group(org_id, None, SYSTEM_ADMIN)
        .await
        .unwrap();

    assert!(
        ctx.permissions
            .user_has_permission(org_id, user, SYSTEM_ADMIN)
            .await
            .unwrap()
    );
    assert!(
        !ctx.permissions
            .user_has_permission(other_org, user, SYSTEM_ADMIN)
            .await
            .unwrap()
    );
}

// ============================================================================
// Settings
// ============================================================================

pub async fn test_settings(ctx: &PermissionTestContext<'_>) {
    assert!(ctx.settings.get(DEFAULT_GROUP_SETTING).await.unwrap().is_none());

    assert!(
        ctx.settings
            .set_if_absent(DEFAULT_GROUP_SETTING, "sonar-users")
            .await
            .unwrap()
    );
    assert!(
        !ctx.settings
            .set_if_absent(DEFAULT_GROUP_SETTING, "ignored")
            .await
            .unwrap()
    );
    assert_eq!(
        ctx.settings
            .get(DEFAULT_GROUP_SETTING)
            .await
            .unwrap()
            .as_deref(),
        Some("sonar-users")
    );

    ctx.settings
        .set(DEFAULT_GROUP_SETTING, "members")
        .await
        .unwrap();
    assert_eq!(
        ctx.settings
            .get(DEFAULT_GROUP_SETTING)
            .await
            .unwrap()
            .as_deref(),
        Some("members")
    );
}

// ============================================================================
// SQLite Tests
// ============================================================================

mod sqlite_tests {
    use super::*;
    use crate::db::{
        sqlite::{
            SqliteGroupRepo, SqliteOrganizationRepo, SqlitePermissionRepo, SqliteSettingsRepo,
            SqliteUserRepo,
        },
        tests::harness::{create_sqlite_pool, run_sqlite_migrations},
    };

    macro_rules! sqlite_test {
        ($name:ident) => {
            #[tokio::test]
            async fn $name() {
                let pool = create_sqlite_pool().await;
                run_sqlite_migrations(&pool).await;
                let permissions = SqlitePermissionRepo::new(pool.clone());
                let groups = SqliteGroupRepo::new(pool.clone());
                let orgs = SqliteOrganizationRepo::new(pool.clone());
                let users = SqliteUserRepo::new(pool.clone());
                let settings = SqliteSettingsRepo::new(pool);
                let ctx = PermissionTestContext {
                    permissions: &permissions,
                    groups: &groups,
                    orgs: &orgs,
                    users: &users,
                    settings: &settings,
                };
                super::$name(&ctx).await;
            }
        };
    }

    sqlite_test!(test_grant_to_group_is_idempotent);
    sqlite_test!(test_anyone_grant_is_idempotent);
    sqlite_test!(test_count_groups_with_permission);
    sqlite_test!(test_count_users_with_direct_permission);
    sqlite_test!(test_user_has_permission);
    sqlite_test!(test_anyone_grant_applies_to_everyone);
    sqlite_test!(test_settings);
}
