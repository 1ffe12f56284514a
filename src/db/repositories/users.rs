use chrono::{DateTime, Utc};
use sea_orm::{
    prelude::DateTimeWithTimeZone, ActiveModelTrait, ColumnTrait, DatabaseConnection,
    EntityTrait, QueryFilter, Set, SqlErr,
};

use crate::db::entities::{session, user};
use crate::error::{AppError, Result};

pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<user::Model>> {
        Ok(user::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<user::Model>> {
        Ok(user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    /// Inserts a user; a taken username surfaces as IntegrityConflict.
    pub async fn create(&self, username: &str, password_hash: String) -> Result<user::Model> {
        let user = user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        user.insert(&self.db).await.map_err(|err| match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::IntegrityConflict("A user with that username already exists.".to_string())
            }
            _ => err.into(),
        })
    }

    pub async fn create_session(
        &self,
        user_id: i32,
        token_hash: String,
        expires_at: DateTime<Utc>,
    ) -> Result<session::Model> {
        let session = session::ActiveModel {
            user_id: Set(user_id),
            token_hash: Set(token_hash),
            expires_at: Set(expires_at.into()),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        Ok(session.insert(&self.db).await?)
    }

    pub async fn find_session(&self, token_hash: &str) -> Result<Option<session::Model>> {
        Ok(session::Entity::find()
            .filter(session::Column::TokenHash.eq(token_hash))
            .one(&self.db)
            .await?)
    }

    pub async fn delete_session(&self, token_hash: &str) -> Result<u64> {
        Ok(session::Entity::delete_many()
            .filter(session::Column::TokenHash.eq(token_hash))
            .exec(&self.db)
            .await?
            .rows_affected)
    }

    pub async fn delete_expired_sessions(&self) -> Result<u64> {
        let now: DateTimeWithTimeZone = Utc::now().into();
        Ok(session::Entity::delete_many()
            .filter(session::Column::ExpiresAt.lte(now))
            .exec(&self.db)
            .await?
            .rows_affected)
    }
}
