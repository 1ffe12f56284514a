use std::collections::HashSet;

use sea_orm::DatabaseConnection;
use serde::Serialize;
use tracing::{debug, info};

use super::accounts::Identity;
use crate::db::entities::{artist, song, user};
use crate::db::repositories::{FavoriteInsert, FavoriteRepository};
use crate::error::{AppError, Result};

/// What `add_favorite` did. Adding an existing favorite is a no-op, not an
/// error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FavoriteOutcome {
    Added,
    AlreadyFavorited,
}

pub struct FavoriteService {
    favorites: FavoriteRepository,
}

impl FavoriteService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            favorites: FavoriteRepository::new(db),
        }
    }

    pub async fn add_favorite(&self, identity: &Identity, song_id: i32) -> Result<FavoriteOutcome> {
        let user = identity.require_user()?;

        match self.favorites.insert(user.id, song_id).await? {
            FavoriteInsert::Inserted(favorite) => {
                info!("User {} favorited song {}", favorite.user_id, favorite.song_id);
                Ok(FavoriteOutcome::Added)
            }
            FavoriteInsert::Duplicate => {
                debug!("Favorite ({}, {}) already present", user.id, song_id);
                Ok(FavoriteOutcome::AlreadyFavorited)
            }
            FavoriteInsert::SongMissing => Err(AppError::NotFound("Song not found".to_string())),
        }
    }

    pub async fn remove_favorite(&self, identity: &Identity, song_id: i32) -> Result<()> {
        let user = identity.require_user()?;

        if self.favorites.delete(user.id, song_id).await? == 0 {
            return Err(AppError::NotFound("Favorite not found".to_string()));
        }

        info!("User {} unfavorited song {}", user.id, song_id);
        Ok(())
    }

    pub async fn song_has_favorite(&self, song: &song::Model, user: &user::Model) -> Result<bool> {
        self.favorites.exists(user.id, song.id).await
    }

    /// Membership check for rendering; anonymous callers have no favorites.
    pub async fn is_favorited(&self, identity: &Identity, song_id: i32) -> Result<bool> {
        match identity.user() {
            Some(user) => self.favorites.exists(user.id, song_id).await,
            None => Ok(false),
        }
    }

    pub async fn favorited_song_ids(
        &self,
        identity: &Identity,
        song_ids: &[i32],
    ) -> Result<HashSet<i32>> {
        match identity.user() {
            Some(user) => self.favorites.favorited_song_ids(user.id, song_ids).await,
            None => Ok(HashSet::new()),
        }
    }

    pub async fn list_favorites(
        &self,
        identity: &Identity,
    ) -> Result<Vec<(song::Model, artist::Model)>> {
        let user = identity.require_user()?;
        self.favorites.songs_for_user(user.id).await
    }

    pub async fn favorite_count(&self, song_id: i32) -> Result<u64> {
        self.favorites.count_for_song(song_id).await
    }
}
