use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use super::songs::{SongListResponse, SongResponse};
use crate::{
    error::Result,
    services::{FavoriteOutcome, Identity},
    state::AppState,
};

#[derive(Serialize)]
pub struct FavoriteStatusResponse {
    pub song_id: i32,
    pub favorited: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<FavoriteOutcome>,
}

/// 201 when the favorite was created, 200 when it already existed
pub async fn add_favorite(
    State(state): State<AppState>,
    identity: Identity,
    Path(song_id): Path<i32>,
) -> Result<(StatusCode, Json<FavoriteStatusResponse>)> {
    let outcome = state.favorites().add_favorite(&identity, song_id).await?;

    let status = match outcome {
        FavoriteOutcome::Added => StatusCode::CREATED,
        FavoriteOutcome::AlreadyFavorited => StatusCode::OK,
    };

    Ok((
        status,
        Json(FavoriteStatusResponse {
            song_id,
            favorited: true,
            outcome: Some(outcome),
        }),
    ))
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    identity: Identity,
    Path(song_id): Path<i32>,
) -> Result<Json<FavoriteStatusResponse>> {
    state.favorites().remove_favorite(&identity, song_id).await?;

    Ok(Json(FavoriteStatusResponse {
        song_id,
        favorited: false,
        outcome: None,
    }))
}

/// The caller's favorite songs, most recently favorited first
pub async fn list_favorites(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<SongListResponse>> {
    let songs: Vec<SongResponse> = state
        .favorites()
        .list_favorites(&identity)
        .await?
        .into_iter()
        .map(|(song, artist)| SongResponse::new(song, &artist, true))
        .collect();

    Ok(Json(SongListResponse {
        total: songs.len(),
        songs,
    }))
}
