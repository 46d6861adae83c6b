use async_trait::async_trait;
use sqlx::{Executor, Row, Sqlite, SqlitePool};
use uuid::Uuid;

use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{PermissionRepo, PermissionTemplateRepo},
    },
    models::PermissionTemplate,
};

pub struct SqlitePermissionRepo {
    pool: SqlitePool,
}

impl SqlitePermissionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepo for SqlitePermissionRepo {
    async fn grant_to_group(
        &self,
        org_id: Uuid,
        group_id: Option<i64>,
        permission: &str,
    ) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO group_roles (org_id, group_id, role, resource_id, created_at)
            VALUES (?, ?, ?, NULL, ?)
            "#,
        )
        .bind(org_id.to_string())
        .bind(group_id)
        .bind(permission)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn grant_to_user(&self, org_id: Uuid, user_id: Uuid, permission: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO user_roles (org_id, user_id, role, resource_id, created_at)
            VALUES (?, ?, ?, NULL, ?)
            "#,
        )
        .bind(org_id.to_string())
        .bind(user_id.to_string())
        .bind(permission)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_group_permissions(&self, group_id: i64) -> DbResult<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT role FROM group_roles
            WHERE group_id = ? AND resource_id IS NULL
            ORDER BY role
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(|row| row.get("role")).collect())
    }

    async fn group_has_permission(&self, group_id: i64, permission: &str) -> DbResult<bool> {
        group_has_permission(&self.pool, group_id, permission).await
    }

    async fn count_groups_with_permission(
        &self,
        org_id: Uuid,
        permission: &str,
    ) -> DbResult<i64> {
        count_groups_with_permission(&self.pool, org_id, permission).await
    }

    async fn count_users_with_direct_permission(
        &self,
        org_id: Uuid,
        permission: &str,
    ) -> DbResult<i64> {
        count_users_with_direct_permission(&self.pool, org_id, permission).await
    }

    async fn user_has_permission(
        &self,
        org_id: Uuid,
        user_id: Uuid,
        permission: &str,
    ) -> DbResult<bool> {
        let row = sqlx::query(
            r#"
            SELECT 1 FROM user_roles
            WHERE org_id = ?1 AND user_id = ?2 AND role = ?3 AND resource_id IS NULL
            UNION ALL
            SELECT 1 FROM group_roles gr
            LEFT JOIN group_memberships gm ON gm.group_id = gr.group_id
            WHERE gr.org_id = ?1 AND gr.role = ?3 AND gr.resource_id IS NULL
              AND (gr.group_id IS NULL OR gm.user_id = ?2)
            LIMIT 1
            "#,
        )
        .bind(org_id.to_string())
        .bind(user_id.to_string())
        .bind(permission)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }
}

// Shared with the group deletion transaction.

pub(super) async fn group_has_permission<'e, E>(
    executor: E,
    group_id: i64,
    permission: &str,
) -> DbResult<bool>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        r#"
        SELECT 1 FROM group_roles
        WHERE group_id = ? AND role = ? AND resource_id IS NULL
        "#,
    )
    .bind(group_id)
    .bind(permission)
    .fetch_optional(executor)
    .await?;
    Ok(row.is_some())
}

pub(super) async fn count_groups_with_permission<'e, E>(
    executor: E,
    org_id: Uuid,
    permission: &str,
) -> DbResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(DISTINCT group_id) FROM group_roles
        WHERE org_id = ? AND role = ? AND resource_id IS NULL AND group_id IS NOT NULL
        "#,
    )
    .bind(org_id.to_string())
    .bind(permission)
    .fetch_one(executor)
    .await?;
    Ok(count)
}

pub(super) async fn count_users_with_direct_permission<'e, E>(
    executor: E,
    org_id: Uuid,
    permission: &str,
) -> DbResult<i64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let count: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(DISTINCT ur.user_id)
        FROM user_roles ur
        INNER JOIN users u ON u.id = ur.user_id
        WHERE ur.org_id = ? AND ur.role = ? AND ur.resource_id IS NULL AND u.active = 1
        "#,
    )
    .bind(org_id.to_string())
    .bind(permission)
    .fetch_one(executor)
    .await?;
    Ok(count)
}

pub struct SqlitePermissionTemplateRepo {
    pool: SqlitePool,
}

impl SqlitePermissionTemplateRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionTemplateRepo for SqlitePermissionTemplateRepo {
    async fn create(&self, org_id: Uuid, name: &str) -> DbResult<PermissionTemplate> {
        let now = chrono::Utc::now();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO permission_templates (org_id, name, created_at)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(org_id.to_string())
        .bind(name)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Conflict(format!("Permission template '{}' already exists", name))
            }
            _ => DbError::from(e),
        })?;

        Ok(PermissionTemplate {
            id,
            org_id,
            name: name.to_string(),
            created_at: now,
        })
    }

    async fn add_group(&self, template_id: i64, group_id: i64, permission: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO perm_templates_groups (template_id, group_id, permission, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(template_id)
        .bind(group_id)
        .bind(permission)
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn count_group_references(&self, group_id: i64) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM perm_templates_groups WHERE group_id = ?")
                .bind(group_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
