use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::{common::parse_uuid, permissions};
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::{DEFAULT_GROUP_SETTING, GroupRepo},
    },
    models::{AdminSnapshot, DeletionCheck, DeletionDenied, Group, SYSTEM_ADMIN},
};

pub struct SqliteGroupRepo {
    pool: SqlitePool,
}

impl SqliteGroupRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_group(row: &SqliteRow) -> DbResult<Group> {
        Ok(Group {
            id: row.get("id"),
            org_id: parse_uuid(&row.get::<String, _>("org_id"))?,
            name: row.get("name"),
            description: row.get("description"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }

    fn map_name_conflict(e: sqlx::Error, name: &str) -> DbError {
        match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Conflict(format!("Group '{}' already exists", name))
            }
            _ => DbError::from(e),
        }
    }
}

#[async_trait]
impl GroupRepo for SqliteGroupRepo {
    async fn create(
        &self,
        org_id: Uuid,
        name: &str,
        description: Option<&str>,
    ) -> DbResult<Group> {
        let now = chrono::Utc::now();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO groups (org_id, name, description, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(org_id.to_string())
        .bind(name)
        .bind(description)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| Self::map_name_conflict(e, name))?;

        Ok(Group {
            id,
            org_id,
            name: name.to_string(),
            description: description.map(str::to_string),
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: i64) -> DbResult<Option<Group>> {
        let row = sqlx::query(
            r#"
            SELECT id, org_id, name, description, created_at, updated_at
            FROM groups
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::parse_group).transpose()
    }

    async fn get_by_name(&self, org_id: Uuid, name: &str) -> DbResult<Option<Group>> {
        let row = sqlx::query(
            r#"
            SELECT id, org_id, name, description, created_at, updated_at
            FROM groups
            WHERE org_id = ? AND name = ?
            "#,
        )
        .bind(org_id.to_string())
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::parse_group).transpose()
    }

    async fn update(
        &self,
        id: i64,
        name: Option<&str>,
        description: Option<&str>,
    ) -> DbResult<Group> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            SELECT id, org_id, name, description, created_at, updated_at
            FROM groups
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(DbError::NotFound)?;
        let existing = Self::parse_group(&row)?;

        let now = chrono::Utc::now();
        let new_name = name.unwrap_or(existing.name.as_str());
        let new_description = match description {
            Some(d) => Some(d.to_string()),
            None => existing.description.clone(),
        };

        sqlx::query(
            r#"
            UPDATE groups
            SET name = ?, description = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(new_name)
        .bind(&new_description)
        .bind(now)
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(|e| Self::map_name_conflict(e, new_name))?;

        if new_name != existing.name {
            let renamed = sqlx::query(
                r#"
                UPDATE settings
                SET value = ?, updated_at = ?
                WHERE key = ? AND value = ?
                "#,
            )
            .bind(new_name)
            .bind(now)
            .bind(DEFAULT_GROUP_SETTING)
            .bind(&existing.name)
            .execute(&mut *tx)
            .await?;

            if renamed.rows_affected() > 0 {
                tracing::info!(
                    group_id = id,
                    old_name = %existing.name,
                    new_name = %new_name,
                    "Default group setting follows group rename"
                );
            }
        }

        tx.commit().await?;

        Ok(Group {
            id,
            org_id: existing.org_id,
            name: new_name.to_string(),
            description: new_description,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    async fn delete(&self, id: i64, check: DeletionCheck) -> DbResult<Result<(), DeletionDenied>> {
        let mut tx = self.pool.begin().await?;

        // Take the write lock before reading, so concurrent deletions see
        // each other's outcome.
        let locked = sqlx::query("UPDATE groups SET updated_at = updated_at WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if locked.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        let row = sqlx::query(
            r#"
            SELECT id, org_id, name, description, created_at, updated_at
            FROM groups
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
        let group = Self::parse_group(&row)?;

        let default_group: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
                .bind(DEFAULT_GROUP_SETTING)
                .fetch_optional(&mut *tx)
                .await?;
        let admins = AdminSnapshot {
            group_grants_admin: permissions::group_has_permission(&mut *tx, id, SYSTEM_ADMIN)
                .await?,
            admin_group_count: permissions::count_groups_with_permission(
                &mut *tx,
                group.org_id,
                SYSTEM_ADMIN,
            )
            .await?,
            direct_admin_user_count: permissions::count_users_with_direct_permission(
                &mut *tx,
                group.org_id,
                SYSTEM_ADMIN,
            )
            .await?,
        };

        if let Err(denied) = check(&group.name, default_group.as_deref(), admins) {
            tracing::debug!(group_id = id, ?admins, reason = %denied, "Group deletion denied");
            return Ok(Err(denied));
        }

        let members = sqlx::query("DELETE FROM group_memberships WHERE group_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let roles = sqlx::query("DELETE FROM group_roles WHERE group_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let template_refs = sqlx::query("DELETE FROM perm_templates_groups WHERE group_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM groups WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::debug!(
            group_id = id,
            memberships = members.rows_affected(),
            roles = roles.rows_affected(),
            template_refs = template_refs.rows_affected(),
            "Group deleted"
        );

        Ok(Ok(()))
    }

    async fn count_members(&self, group_id: i64) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM group_memberships WHERE group_id = ?")
                .bind(group_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn is_member(&self, group_id: i64, user_id: Uuid) -> DbResult<bool> {
        let row = sqlx::query(
            r#"
            SELECT 1 FROM group_memberships
            WHERE group_id = ? AND user_id = ?
            "#,
        )
        .bind(group_id)
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    async fn add_member(&self, group_id: i64, user_id: Uuid) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO group_memberships (group_id, user_id, created_at)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(group_id)
        .bind(user_id.to_string())
        .bind(chrono::Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn remove_member(&self, group_id: i64, user_id: Uuid) -> DbResult<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM group_memberships
            WHERE group_id = ? AND user_id = ?
            "#,
        )
        .bind(group_id)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
