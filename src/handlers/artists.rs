use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::{
    db::{
        entities::{artist, song},
        repositories::{ArtistChanges, ArtistFields, ArtistFilter, DeleteSummary},
    },
    error::Result,
    state::AppState,
};

#[derive(Serialize)]
pub struct ArtistListResponse {
    pub artists: Vec<artist::Model>,
    pub total: usize,
}

#[derive(Serialize)]
pub struct ArtistDetailResponse {
    pub artist: artist::Model,
    pub songs: Vec<song::Model>,
}

/// List artists, optionally narrowed by `?name=` prefix and `?nationality=`
pub async fn list_artists(
    State(state): State<AppState>,
    Query(filter): Query<ArtistFilter>,
) -> Result<Json<ArtistListResponse>> {
    let artists = if filter.is_empty() {
        state.artists().list().await?
    } else {
        state.artists().filter(&filter).await?
    };

    Ok(Json(ArtistListResponse {
        total: artists.len(),
        artists,
    }))
}

/// Get a single artist with their songs
pub async fn get_artist(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ArtistDetailResponse>> {
    let artist = state.artists().get(id).await?;
    let songs = state.songs().list_for_artist(artist.id).await?;

    Ok(Json(ArtistDetailResponse { artist, songs }))
}

pub async fn create_artist(
    State(state): State<AppState>,
    Json(fields): Json<ArtistFields>,
) -> Result<(StatusCode, Json<artist::Model>)> {
    let artist = state.artists().create(fields).await?;
    Ok((StatusCode::CREATED, Json(artist)))
}

pub async fn update_artist(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(changes): Json<ArtistChanges>,
) -> Result<Json<artist::Model>> {
    Ok(Json(state.artists().update(id, changes).await?))
}

pub async fn delete_artist(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteSummary>> {
    Ok(Json(state.artists().delete(id).await?))
}
