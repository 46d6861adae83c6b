use async_trait::async_trait;
use sqlx::{Row, SqlitePool, sqlite::SqliteRow};
use uuid::Uuid;

use super::common::parse_uuid;
use crate::{
    db::{
        error::{DbError, DbResult},
        repos::UserRepo,
    },
    models::{CreateUser, User},
};

pub struct SqliteUserRepo {
    pool: SqlitePool,
}

impl SqliteUserRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_user(row: &SqliteRow) -> DbResult<User> {
        Ok(User {
            id: parse_uuid(&row.get::<String, _>("id"))?,
            login: row.get("login"),
            name: row.get("name"),
            email: row.get("email"),
            active: row.get("active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl UserRepo for SqliteUserRepo {
    async fn create(&self, input: CreateUser) -> DbResult<User> {
        let id = Uuid::new_v4();
        let now = chrono::Utc::now();

        sqlx::query(
            r#"
            INSERT INTO users (id, login, name, email, active, created_at, updated_at)
            VALUES (?, ?, ?, ?, 1, ?, ?)
            "#,
        )
        .bind(id.to_string())
        .bind(&input.login)
        .bind(&input.name)
        .bind(&input.email)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DbError::Conflict(format!("User with login '{}' already exists", input.login))
            }
            _ => DbError::from(e),
        })?;

        Ok(User {
            id,
            login: input.login,
            name: input.name,
            email: input.email,
            active: true,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_by_id(&self, id: Uuid) -> DbResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, login, name, email, active, created_at, updated_at
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::parse_user).transpose()
    }

    async fn get_by_login(&self, login: &str) -> DbResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, login, name, email, active, created_at, updated_at
            FROM users
            WHERE login = ?
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::parse_user).transpose()
    }

    async fn get_active_by_login(&self, login: &str) -> DbResult<Option<User>> {
        let row = sqlx::query(
            r#"
            SELECT id, login, name, email, active, created_at, updated_at
            FROM users
            WHERE login = ? AND active = 1
            "#,
        )
        .bind(login)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::parse_user).transpose()
    }

    async fn set_active(&self, id: Uuid, active: bool) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET active = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(active)
        .bind(chrono::Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        Ok(())
    }
}
