use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::user_repository::{NewUser, ProfileFields, UserRepository};
use crate::domain::users::user::User;
use crate::infrastructure::db::PgPool;

const USER_COLUMNS: &str = "id, username, email, is_listener, is_creator, bio, \
                            profile_picture, header_image, created_at";

pub struct SqlxUserRepository {
    pub pool: PgPool,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

pub(crate) fn map_user(r: &PgRow) -> User {
    User {
        id: r.get("id"),
        username: r.get("username"),
        email: r.get("email"),
        is_listener: r.get("is_listener"),
        is_creator: r.get("is_creator"),
        bio: r.get("bio"),
        profile_picture: r.try_get("profile_picture").ok().flatten(),
        header_image: r.try_get("header_image").ok().flatten(),
        created_at: r.get("created_at"),
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_user(&self, new_user: NewUser<'_>) -> anyhow::Result<User> {
        let row = sqlx::query(&format!(
            "INSERT INTO users (username, email, password_hash, is_listener, is_creator)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new_user.username)
        .bind(new_user.email)
        .bind(new_user.password_hash)
        .bind(new_user.is_listener)
        .bind(new_user.is_creator)
        .fetch_one(&self.pool)
        .await?;
        Ok(map_user(&row))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_user))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_user))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_user))
    }

    async fn password_hash(&self, id: Uuid) -> anyhow::Result<Option<String>> {
        let row = sqlx::query("SELECT password_hash FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get("password_hash")))
    }

    async fn update_profile(
        &self,
        id: Uuid,
        fields: &ProfileFields,
    ) -> anyhow::Result<Option<User>> {
        let row = sqlx::query(&format!(
            "UPDATE users SET
                bio = COALESCE($2, bio),
                is_listener = $3,
                is_creator = $4,
                profile_picture = $5,
                header_image = $6
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(fields.bio.as_deref())
        .bind(fields.is_listener)
        .bind(fields.is_creator)
        .bind(fields.profile_picture.as_deref())
        .bind(fields.header_image.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.as_ref().map(map_user))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
