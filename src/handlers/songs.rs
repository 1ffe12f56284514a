use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::{
        entities::{artist, song},
        repositories::{DeleteSummary, SongChanges, SongFields},
    },
    error::Result,
    services::Identity,
    state::AppState,
};

#[derive(Deserialize)]
pub struct ListSongsQuery {
    pub artist_id: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SongResponse {
    pub id: i32,
    pub artist_id: i32,
    pub artist_name: String,
    pub title: String,
    pub album: String,
    pub preview_url: Option<String>,
    pub favorited: bool,
}

impl SongResponse {
    pub fn new(song: song::Model, artist: &artist::Model, favorited: bool) -> Self {
        Self {
            id: song.id,
            artist_id: song.artist_id,
            artist_name: artist.name.clone(),
            title: song.title,
            album: song.album,
            preview_url: song.preview_url,
            favorited,
        }
    }
}

#[derive(Serialize)]
pub struct SongListResponse {
    pub songs: Vec<SongResponse>,
    pub total: usize,
}

/// List songs with the caller's favorite flag on each
pub async fn list_songs(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<ListSongsQuery>,
) -> Result<Json<SongListResponse>> {
    let rows = match query.artist_id {
        Some(artist_id) => {
            let artist = state.artists().get(artist_id).await?;
            state
                .songs()
                .list_for_artist(artist_id)
                .await?
                .into_iter()
                .map(|song| (song, artist.clone()))
                .collect()
        }
        None => state.songs().list_with_artists().await?,
    };

    let song_ids: Vec<i32> = rows.iter().map(|(song, _)| song.id).collect();
    let favorited = state
        .favorites()
        .favorited_song_ids(&identity, &song_ids)
        .await?;

    let songs: Vec<SongResponse> = rows
        .into_iter()
        .map(|(song, artist)| {
            let is_favorite = favorited.contains(&song.id);
            SongResponse::new(song, &artist, is_favorite)
        })
        .collect();

    Ok(Json(SongListResponse {
        total: songs.len(),
        songs,
    }))
}

pub async fn get_song(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i32>,
) -> Result<Json<SongResponse>> {
    let (song, artist) = state.songs().get_with_artist(id).await?;
    let favorited = state.favorites().is_favorited(&identity, song.id).await?;

    Ok(Json(SongResponse::new(song, &artist, favorited)))
}

pub async fn create_song(
    State(state): State<AppState>,
    Json(fields): Json<SongFields>,
) -> Result<(StatusCode, Json<song::Model>)> {
    let song = state.songs().create(fields).await?;
    Ok((StatusCode::CREATED, Json(song)))
}

pub async fn update_song(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(changes): Json<SongChanges>,
) -> Result<Json<song::Model>> {
    Ok(Json(state.songs().update(id, changes).await?))
}

pub async fn delete_song(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteSummary>> {
    Ok(Json(state.songs().delete(id).await?))
}
