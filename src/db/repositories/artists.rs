use chrono::Utc;
use sea_orm::{
    sea_query::LikeExpr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::prefix_pattern;
use crate::db::entities::{artist, favorite, song};
use crate::db::validation::{self, ARTIST_NAME_MAX, ARTIST_NATIONALITY_MAX};
use crate::error::{AppError, Result, ValidationErrors};

/// Complete set of user-editable artist fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistFields {
    pub name: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub photo_url: String,
}

impl ArtistFields {
    pub fn validate(&self) -> Result<()> {
        let mut errors = ValidationErrors::new();
        validation::required(&mut errors, "name", &self.name);
        validation::max_chars(&mut errors, "name", &self.name, ARTIST_NAME_MAX);
        validation::max_chars(
            &mut errors,
            "nationality",
            &self.nationality,
            ARTIST_NATIONALITY_MAX,
        );
        errors.into_result()
    }
}

impl From<&artist::Model> for ArtistFields {
    fn from(artist: &artist::Model) -> Self {
        Self {
            name: artist.name.clone(),
            nationality: artist.nationality.clone(),
            photo_url: artist.photo_url.clone(),
        }
    }
}

/// Partial update; `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtistChanges {
    pub name: Option<String>,
    pub nationality: Option<String>,
    pub photo_url: Option<String>,
}

impl ArtistChanges {
    fn merge_into(self, mut fields: ArtistFields) -> ArtistFields {
        if let Some(name) = self.name {
            fields.name = name;
        }
        if let Some(nationality) = self.nationality {
            fields.nationality = nationality;
        }
        if let Some(photo_url) = self.photo_url {
            fields.photo_url = photo_url;
        }
        fields
    }
}

impl From<ArtistFields> for ArtistChanges {
    fn from(fields: ArtistFields) -> Self {
        Self {
            name: Some(fields.name),
            nationality: Some(fields.nationality),
            photo_url: Some(fields.photo_url),
        }
    }
}

/// Artist search: name prefix and exact nationality, combined with AND.
/// Blank values are ignored so empty form fields behave like absent ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtistFilter {
    pub name: Option<String>,
    pub nationality: Option<String>,
}

impl ArtistFilter {
    fn name_prefix(&self) -> Option<&str> {
        self.name.as_deref().filter(|s| !s.is_empty())
    }

    fn nationality(&self) -> Option<&str> {
        self.nationality.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.name_prefix().is_none() && self.nationality().is_none()
    }
}

/// Rows removed by a cascading delete, per table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteSummary {
    pub artists: u64,
    pub songs: u64,
    pub favorites: u64,
}

impl DeleteSummary {
    pub fn total(&self) -> u64 {
        self.artists + self.songs + self.favorites
    }
}

fn artist_not_found() -> AppError {
    AppError::NotFound("Artist not found".to_string())
}

pub struct ArtistRepository {
    db: DatabaseConnection,
}

impl ArtistRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> Result<Vec<artist::Model>> {
        Ok(artist::Entity::find()
            .order_by_asc(artist::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<artist::Model>> {
        Ok(artist::Entity::find_by_id(id).one(&self.db).await?)
    }

    pub async fn get(&self, id: i32) -> Result<artist::Model> {
        self.find_by_id(id).await?.ok_or_else(artist_not_found)
    }

    pub async fn filter(&self, filter: &ArtistFilter) -> Result<Vec<artist::Model>> {
        let mut select = artist::Entity::find();

        if let Some(prefix) = filter.name_prefix() {
            select = select.filter(
                artist::Column::Name.like(LikeExpr::new(prefix_pattern(prefix)).escape('\\')),
            );
        }

        if let Some(nationality) = filter.nationality() {
            select = select.filter(artist::Column::Nationality.eq(nationality));
        }

        Ok(select
            .order_by_asc(artist::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn count(&self) -> Result<u64> {
        Ok(artist::Entity::find().count(&self.db).await?)
    }

    pub async fn create(&self, fields: ArtistFields) -> Result<artist::Model> {
        fields.validate()?;

        let now = Utc::now().into();
        let artist = artist::ActiveModel {
            name: Set(fields.name),
            nationality: Set(fields.nationality),
            photo_url: Set(fields.photo_url),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        let artist = artist.insert(&self.db).await?;
        info!("Created artist {} ({})", artist.id, artist.name);
        Ok(artist)
    }

    /// Merges `changes` over the stored record and validates the result
    /// before anything is written.
    pub async fn update(&self, id: i32, changes: ArtistChanges) -> Result<artist::Model> {
        let txn = self.db.begin().await?;

        let existing = artist::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(artist_not_found)?;
        let fields = changes.merge_into(ArtistFields::from(&existing));
        fields.validate()?;

        let mut active: artist::ActiveModel = existing.into();
        active.name = Set(fields.name);
        active.nationality = Set(fields.nationality);
        active.photo_url = Set(fields.photo_url);
        active.updated_at = Set(Utc::now().into());

        // Deleted after the read: nothing left to update
        let artist = active.update(&txn).await.map_err(|err| match err {
            DbErr::RecordNotUpdated => artist_not_found(),
            other => other.into(),
        })?;

        txn.commit().await?;
        Ok(artist)
    }

    /// Removes the artist, its songs and every favorite of those songs in a
    /// single transaction.
    pub async fn delete(&self, id: i32) -> Result<DeleteSummary> {
        let txn = self.db.begin().await?;

        let artist = artist::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(artist_not_found)?;

        let song_ids: Vec<i32> = song::Entity::find()
            .filter(song::Column::ArtistId.eq(artist.id))
            .select_only()
            .column(song::Column::Id)
            .into_tuple()
            .all(&txn)
            .await?;

        let favorites = if song_ids.is_empty() {
            0
        } else {
            favorite::Entity::delete_many()
                .filter(favorite::Column::SongId.is_in(song_ids))
                .exec(&txn)
                .await?
                .rows_affected
        };

        let songs = song::Entity::delete_many()
            .filter(song::Column::ArtistId.eq(artist.id))
            .exec(&txn)
            .await?
            .rows_affected;

        let artists = artist::Entity::delete_by_id(artist.id)
            .exec(&txn)
            .await?
            .rows_affected;

        txn.commit().await?;

        info!(
            "Deleted artist {} ({}) with {} songs and {} favorites",
            artist.id, artist.name, songs, favorites
        );

        Ok(DeleteSummary {
            artists,
            songs,
            favorites,
        })
    }
}
