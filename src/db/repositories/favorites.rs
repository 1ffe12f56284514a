use std::collections::HashSet;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, SqlErr, TransactionTrait,
};

use crate::db::entities::{artist, favorite, song};
use crate::error::Result;

/// Result of inserting a favorite row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FavoriteInsert {
    Inserted(favorite::Model),
    /// The (user, song) unique index already held a row.
    Duplicate,
    /// The song does not exist, or was deleted before the row landed.
    SongMissing,
}

pub struct FavoriteRepository {
    db: DatabaseConnection,
}

impl FavoriteRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn exists(&self, user_id: i32, song_id: i32) -> Result<bool> {
        let count = favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::SongId.eq(song_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    /// Checks the song and any existing row, then inserts, all in one
    /// transaction. Constraint violations from concurrent writers map onto
    /// the same outcomes as the checks.
    pub async fn insert(&self, user_id: i32, song_id: i32) -> Result<FavoriteInsert> {
        let txn = self.db.begin().await?;

        if song::Entity::find_by_id(song_id).one(&txn).await?.is_none() {
            return Ok(FavoriteInsert::SongMissing);
        }

        let existing = favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::SongId.eq(song_id))
            .count(&txn)
            .await?;
        if existing > 0 {
            return Ok(FavoriteInsert::Duplicate);
        }

        let favorite = favorite::ActiveModel {
            user_id: Set(user_id),
            song_id: Set(song_id),
            created_at: Set(Utc::now().into()),
            ..Default::default()
        };

        let outcome = match favorite.insert(&txn).await {
            Ok(model) => FavoriteInsert::Inserted(model),
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => FavoriteInsert::Duplicate,
                Some(SqlErr::ForeignKeyConstraintViolation(_)) => FavoriteInsert::SongMissing,
                _ => return Err(err.into()),
            },
        };

        txn.commit().await?;
        Ok(outcome)
    }

    /// Deletes the (user, song) row, returning how many rows went away.
    pub async fn delete(&self, user_id: i32, song_id: i32) -> Result<u64> {
        Ok(favorite::Entity::delete_many()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::SongId.eq(song_id))
            .exec(&self.db)
            .await?
            .rows_affected)
    }

    /// The subset of `song_ids` that `user_id` has favorited.
    pub async fn favorited_song_ids(&self, user_id: i32, song_ids: &[i32]) -> Result<HashSet<i32>> {
        if song_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let ids: Vec<i32> = favorite::Entity::find()
            .filter(favorite::Column::UserId.eq(user_id))
            .filter(favorite::Column::SongId.is_in(song_ids.iter().copied()))
            .select_only()
            .column(favorite::Column::SongId)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(ids.into_iter().collect())
    }

    /// Songs favorited by `user_id` with their artists, most recent first.
    pub async fn songs_for_user(&self, user_id: i32) -> Result<Vec<(song::Model, artist::Model)>> {
        let rows = song::Entity::find()
            .join(JoinType::InnerJoin, song::Relation::Favorites.def())
            .filter(favorite::Column::UserId.eq(user_id))
            .order_by_desc(favorite::Column::CreatedAt)
            .order_by_desc(favorite::Column::Id)
            .find_also_related(artist::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(song, artist)| artist.map(|a| (song, a)))
            .collect())
    }

    pub async fn count_for_song(&self, song_id: i32) -> Result<u64> {
        Ok(favorite::Entity::find()
            .filter(favorite::Column::SongId.eq(song_id))
            .count(&self.db)
            .await?)
    }
}
