use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::DeleteSummary;
use crate::db::entities::{artist, favorite, song};
use crate::db::validation::{self, SONG_ALBUM_MAX, SONG_PREVIEW_URL_MAX, SONG_TITLE_MAX};
use crate::error::{AppError, Result, ValidationErrors};

/// Complete set of user-editable song fields. An empty `preview_url` is
/// stored as no preview.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongFields {
    pub artist_id: i32,
    pub title: String,
    #[serde(default)]
    pub album: String,
    #[serde(default)]
    pub preview_url: Option<String>,
}

impl SongFields {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        self.collect_errors(&mut errors);
        errors.into_result()
    }

    /// Field checks that need no database access.
    pub fn collect_errors(&self, errors: &mut ValidationErrors) {
        validation::required(errors, "title", &self.title);
        validation::max_chars(errors, "title", &self.title, SONG_TITLE_MAX);
        validation::max_chars(errors, "album", &self.album, SONG_ALBUM_MAX);
        if let Some(url) = &self.preview_url {
            validation::max_chars(errors, "preview_url", url, SONG_PREVIEW_URL_MAX);
        }
    }

    fn normalized_preview_url(&self) -> Option<String> {
        self.preview_url.clone().filter(|url| !url.is_empty())
    }
}

impl From<&song::Model> for SongFields {
    fn from(song: &song::Model) -> Self {
        Self {
            artist_id: song.artist_id,
            title: song.title.clone(),
            album: song.album.clone(),
            preview_url: song.preview_url.clone(),
        }
    }
}

/// Partial update. `preview_url: Some("")` clears the preview.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongChanges {
    pub artist_id: Option<i32>,
    pub title: Option<String>,
    pub album: Option<String>,
    pub preview_url: Option<String>,
}

impl SongChanges {
    fn merge_into(self, mut fields: SongFields) -> SongFields {
        if let Some(artist_id) = self.artist_id {
            fields.artist_id = artist_id;
        }
        if let Some(title) = self.title {
            fields.title = title;
        }
        if let Some(album) = self.album {
            fields.album = album;
        }
        if let Some(preview_url) = self.preview_url {
            fields.preview_url = Some(preview_url);
        }
        fields
    }
}

impl From<SongFields> for SongChanges {
    fn from(fields: SongFields) -> Self {
        Self {
            artist_id: Some(fields.artist_id),
            title: Some(fields.title),
            album: Some(fields.album),
            preview_url: Some(fields.preview_url.unwrap_or_default()),
        }
    }
}

pub struct SongRepository {
    db: DatabaseConnection,
}

impl SongRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<song::Model>> {
        Ok(song::Entity::find()
            .order_by_asc(song::Column::Id)
            .all(&self.db)
            .await?)
    }

    /// All songs paired with their artist, in storage order.
    pub async fn list_with_artists(&self) -> Result<Vec<(song::Model, artist::Model)>> {
        let rows = song::Entity::find()
            .order_by_asc(song::Column::Id)
            .find_also_related(artist::Entity)
            .all(&self.db)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|(song, artist)| artist.map(|a| (song, a)))
            .collect())
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<song::Model>> {
        Ok(song::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn get(&self, id: i32) -> Result<song::Model> {
        self.find_by_id(id).await?.ok_or_else(song_not_found)
    }

    pub async fn get_with_artist(&self, id: i32) -> Result<(song::Model, artist::Model)> {
        match song::Entity::find_by_id(id)
            .find_also_related(artist::Entity)
            .one(&self.db)
            .await?
        {
            Some((song, Some(artist))) => Ok((song, artist)),
            _ => Err(song_not_found()),
        }
    }

    /// Songs owned by `artist_id`; NotFound when the artist does not exist.
    pub async fn list_for_artist(&self, artist_id: i32) -> Result<Vec<song::Model>> {
        ensure_artist(&self.db, artist_id).await?;

        Ok(song::Entity::find()
            .filter(song::Column::ArtistId.eq(artist_id))
            .order_by_asc(song::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn create(&self, fields: SongFields) -> Result<song::Model> {
        fields.validate()?;

        let txn = self.db.begin().await?;
        ensure_artist(&txn, fields.artist_id).await?;

        let now = Utc::now().into();
        let song = song::ActiveModel {
            artist_id: Set(fields.artist_id),
            title: Set(fields.title.clone()),
            album: Set(fields.album.clone()),
            preview_url: Set(fields.normalized_preview_url()),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let song = song.insert(&txn).await.map_err(missing_artist)?;
        txn.commit().await?;

        info!(
            "Created song {} ({}) for artist {}",
            song.id, song.title, song.artist_id
        );
        Ok(song)
    }

    pub async fn update(&self, id: i32, changes: SongChanges) -> Result<song::Model> {
        let txn = self.db.begin().await?;

        let existing = song::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(song_not_found)?;
        let fields = changes.merge_into(SongFields::from(&existing));
        fields.validate()?;

        if fields.artist_id != existing.artist_id {
            ensure_artist(&txn, fields.artist_id).await?;
        }

        let preview_url = fields.normalized_preview_url();
        let mut active: song::ActiveModel = existing.into();
        active.artist_id = Set(fields.artist_id);
        active.title = Set(fields.title);
        active.album = Set(fields.album);
        active.preview_url = Set(preview_url);
        active.updated_at = Set(Utc::now().into());

        let song = active.update(&txn).await.map_err(|err| match err {
            DbErr::RecordNotUpdated => song_not_found(),
            other => missing_artist(other),
        })?;

        txn.commit().await?;
        Ok(song)
    }

    /// Removes the song and its favorites in a single transaction.
    pub async fn delete(&self, id: i32) -> Result<DeleteSummary> {
        let txn = self.db.begin().await?;

        let song = song::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(song_not_found)?;

        let favorites = favorite::Entity::delete_many()
            .filter(favorite::Column::SongId.eq(song.id))
            .exec(&txn)
            .await?
            .rows_affected;

        let songs = song::Entity::delete_by_id(song.id)
            .exec(&txn)
            .await?
            .rows_affected;

        txn.commit().await?;

        info!(
            "Deleted song {} ({}) with {} favorites",
            song.id, song.title, favorites
        );

        Ok(DeleteSummary {
            artists: 0,
            songs,
            favorites,
        })
    }
}

fn song_not_found() -> AppError {
    AppError::NotFound("Song not found".to_string())
}

/// An artist removed between the check and the write trips the foreign key.
fn missing_artist(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
            AppError::NotFound("Artist not found".to_string())
        }
        _ => err.into(),
    }
}

async fn ensure_artist<C: ConnectionTrait>(conn: &C, artist_id: i32) -> Result<()> {
    artist::Entity::find_by_id(artist_id)
        .one(conn)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Artist not found".to_string()))
}
