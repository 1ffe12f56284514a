use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;

use super::session::{expired_session_cookie, session_cookie, session_token, SessionToken};
use crate::{
    db::{
        entities::{artist, song},
        repositories::{ArtistChanges, ArtistFields, ArtistFilter, SongChanges, SongFields},
    },
    error::{AppError, ValidationErrors},
    services::{Credentials, Identity},
    state::AppState,
    templates::{
        artist_detail_page, artist_form_page, artist_list_page, error_page, favorite_button,
        favorites_page, login_page, signup_page, song_detail_page, song_form_page,
        song_list_page, SongFormValues, SongRowData,
    },
};

/// Renders errors as HTML pages. Anonymous access to a protected page
/// redirects to the login form.
pub struct HtmlError(AppError);

impl From<AppError> for HtmlError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

/// Attached to error page responses so [`render_error_pages`] can redraw
/// them with the caller's username.
#[derive(Debug, Clone)]
struct ErrorPage {
    message: String,
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        if matches!(self.0, AppError::AuthenticationRequired) {
            return Redirect::to("/login").into_response();
        }

        let status = self.0.status();
        let message = self.0.public_message();
        let mut response = (
            status,
            Html(error_page(None, status.as_u16(), &message).into_string()),
        )
            .into_response();
        response.extensions_mut().insert(ErrorPage { message });
        response
    }
}

/// Middleware for the HTML routes: error pages keep the signed-in header
/// even when the failing handler never resolved the session.
pub async fn render_error_pages(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let token = session_token(request.headers());
    let response = next.run(request).await;

    let Some(ErrorPage { message }) = response.extensions().get::<ErrorPage>().cloned() else {
        return response;
    };
    if token.is_none() {
        return response;
    }

    match state.accounts().resolve(token.as_deref()).await {
        Ok(identity) => match identity.username() {
            Some(username) => {
                let status = response.status();
                (
                    status,
                    Html(error_page(Some(username), status.as_u16(), &message).into_string()),
                )
                    .into_response()
            }
            None => response,
        },
        Err(err) => {
            tracing::warn!("Could not resolve session for error page: {}", err);
            response
        }
    }
}

type PageResult = std::result::Result<Response, HtmlError>;

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("HX-Request")
}

fn page(markup: maud::Markup) -> Response {
    Html(markup.into_string()).into_response()
}

fn invalid_page(status: StatusCode, markup: maud::Markup) -> Response {
    (status, Html(markup.into_string())).into_response()
}

async fn song_rows(
    state: &AppState,
    identity: &Identity,
    rows: Vec<(song::Model, artist::Model)>,
) -> crate::error::Result<Vec<SongRowData>> {
    let song_ids: Vec<i32> = rows.iter().map(|(song, _)| song.id).collect();
    let favorited = state
        .favorites()
        .favorited_song_ids(identity, &song_ids)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(song, artist)| SongRowData {
            favorited: favorited.contains(&song.id),
            id: song.id,
            title: song.title,
            album: song.album,
            preview_url: song.preview_url,
            artist_id: artist.id,
            artist_name: artist.name,
        })
        .collect())
}

// ============================================================================
// Artists
// ============================================================================

pub async fn artist_list(
    State(state): State<AppState>,
    identity: Identity,
    Query(filter): Query<ArtistFilter>,
) -> PageResult {
    let artists = if filter.is_empty() {
        state.artists().list().await?
    } else {
        state.artists().filter(&filter).await?
    };

    Ok(page(artist_list_page(identity.username(), &artists, &filter)))
}

pub async fn artist_detail(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i32>,
) -> PageResult {
    let artist = state.artists().get(id).await?;
    let rows = state
        .songs()
        .list_for_artist(artist.id)
        .await?
        .into_iter()
        .map(|song| (song, artist.clone()))
        .collect();
    let songs = song_rows(&state, &identity, rows).await?;

    Ok(page(artist_detail_page(identity.username(), &artist, &songs)))
}

pub async fn artist_new(identity: Identity) -> PageResult {
    Ok(page(artist_form_page(
        identity.username(),
        "New artist",
        "/artists/new",
        &ArtistFields::default(),
        &ValidationErrors::new(),
    )))
}

pub async fn artist_create(
    State(state): State<AppState>,
    identity: Identity,
    Form(fields): Form<ArtistFields>,
) -> PageResult {
    match state.artists().create(fields.clone()).await {
        Ok(artist) => Ok(Redirect::to(&format!("/artists/{}", artist.id)).into_response()),
        Err(AppError::Validation(errors)) => Ok(invalid_page(
            StatusCode::UNPROCESSABLE_ENTITY,
            artist_form_page(identity.username(), "New artist", "/artists/new", &fields, &errors),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn artist_edit(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i32>,
) -> PageResult {
    let artist = state.artists().get(id).await?;

    Ok(page(artist_form_page(
        identity.username(),
        &format!("Edit {}", artist.name),
        &format!("/artists/{}/edit", artist.id),
        &ArtistFields::from(&artist),
        &ValidationErrors::new(),
    )))
}

pub async fn artist_update(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i32>,
    Form(fields): Form<ArtistFields>,
) -> PageResult {
    match state
        .artists()
        .update(id, ArtistChanges::from(fields.clone()))
        .await
    {
        Ok(artist) => Ok(Redirect::to(&format!("/artists/{}", artist.id)).into_response()),
        Err(AppError::Validation(errors)) => Ok(invalid_page(
            StatusCode::UNPROCESSABLE_ENTITY,
            artist_form_page(
                identity.username(),
                "Edit artist",
                &format!("/artists/{}/edit", id),
                &fields,
                &errors,
            ),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn artist_delete(State(state): State<AppState>, Path(id): Path<i32>) -> PageResult {
    state.artists().delete(id).await?;
    Ok(Redirect::to("/artists").into_response())
}

// ============================================================================
// Songs
// ============================================================================

#[derive(Deserialize)]
pub struct NewSongQuery {
    pub artist_id: Option<i32>,
}

/// Parses the artist choice and runs the field checks in one pass so every
/// problem shows up on the re-rendered form.
fn song_fields(values: &SongFormValues) -> std::result::Result<SongFields, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    let artist_id = match values.artist_id.trim().parse::<i32>() {
        Ok(id) => id,
        Err(_) => {
            errors.add("artist_id", "This field is required.");
            0
        }
    };

    let fields = SongFields {
        artist_id,
        title: values.title.clone(),
        album: values.album.clone(),
        preview_url: Some(values.preview_url.clone()).filter(|url| !url.is_empty()),
    };
    fields.collect_errors(&mut errors);

    if errors.is_empty() {
        Ok(fields)
    } else {
        Err(errors)
    }
}

fn unknown_artist_errors() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(
        "artist_id",
        "Select a valid choice. That choice is not one of the available choices.",
    );
    errors
}

pub async fn song_list(State(state): State<AppState>, identity: Identity) -> PageResult {
    let rows = state.songs().list_with_artists().await?;
    let songs = song_rows(&state, &identity, rows).await?;

    Ok(page(song_list_page(identity.username(), &songs)))
}

pub async fn song_detail(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i32>,
) -> PageResult {
    let (song, artist) = state.songs().get_with_artist(id).await?;
    let favorite_count = state.favorites().favorite_count(song.id).await?;
    let mut songs = song_rows(&state, &identity, vec![(song, artist)]).await?;

    match songs.pop() {
        Some(song) => Ok(page(song_detail_page(
            identity.username(),
            &song,
            favorite_count,
        ))),
        None => Err(AppError::NotFound("Song not found".to_string()).into()),
    }
}

pub async fn song_new(
    State(state): State<AppState>,
    identity: Identity,
    Query(query): Query<NewSongQuery>,
) -> PageResult {
    let artists = state.artists().list().await?;
    let values = SongFormValues {
        artist_id: query.artist_id.map(|id| id.to_string()).unwrap_or_default(),
        ..Default::default()
    };

    Ok(page(song_form_page(
        identity.username(),
        "New song",
        "/songs/new",
        &values,
        &artists,
        &ValidationErrors::new(),
    )))
}

pub async fn song_create(
    State(state): State<AppState>,
    identity: Identity,
    Form(values): Form<SongFormValues>,
) -> PageResult {
    let result = match song_fields(&values) {
        Ok(fields) => state.songs().create(fields).await,
        Err(errors) => Err(AppError::Validation(errors)),
    };

    let errors = match result {
        Ok(song) => return Ok(Redirect::to(&format!("/songs/{}", song.id)).into_response()),
        Err(AppError::Validation(errors)) => errors,
        Err(AppError::NotFound(_)) => unknown_artist_errors(),
        Err(e) => return Err(e.into()),
    };

    let artists = state.artists().list().await?;
    Ok(invalid_page(
        StatusCode::UNPROCESSABLE_ENTITY,
        song_form_page(
            identity.username(),
            "New song",
            "/songs/new",
            &values,
            &artists,
            &errors,
        ),
    ))
}

pub async fn song_edit(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i32>,
) -> PageResult {
    let song = state.songs().get(id).await?;
    let artists = state.artists().list().await?;

    Ok(page(song_form_page(
        identity.username(),
        &format!("Edit {}", song.title),
        &format!("/songs/{}/edit", song.id),
        &SongFormValues::from(&song),
        &artists,
        &ValidationErrors::new(),
    )))
}

pub async fn song_update(
    State(state): State<AppState>,
    identity: Identity,
    Path(id): Path<i32>,
    Form(values): Form<SongFormValues>,
) -> PageResult {
    // 404 for a missing song before looking at the submitted fields
    state.songs().get(id).await?;

    let result = match song_fields(&values) {
        Ok(fields) => state.songs().update(id, SongChanges::from(fields)).await,
        Err(errors) => Err(AppError::Validation(errors)),
    };

    let errors = match result {
        Ok(song) => return Ok(Redirect::to(&format!("/songs/{}", song.id)).into_response()),
        Err(AppError::Validation(errors)) => errors,
        Err(AppError::NotFound(_)) => unknown_artist_errors(),
        Err(e) => return Err(e.into()),
    };

    let artists = state.artists().list().await?;
    Ok(invalid_page(
        StatusCode::UNPROCESSABLE_ENTITY,
        song_form_page(
            identity.username(),
            "Edit song",
            &format!("/songs/{}/edit", id),
            &values,
            &artists,
            &errors,
        ),
    ))
}

pub async fn song_delete(State(state): State<AppState>, Path(id): Path<i32>) -> PageResult {
    let song = state.songs().get(id).await?;
    state.songs().delete(song.id).await?;
    Ok(Redirect::to(&format!("/artists/{}", song.artist_id)).into_response())
}

// ============================================================================
// Favorites
// ============================================================================

/// HTMX gets the swapped button back; plain form posts go to the song page.
fn favorite_response(headers: &HeaderMap, song_id: i32, favorited: bool) -> Response {
    if is_htmx(headers) {
        page(favorite_button(song_id, favorited, true))
    } else {
        Redirect::to(&format!("/songs/{}", song_id)).into_response()
    }
}

fn login_required(headers: &HeaderMap) -> Response {
    if is_htmx(headers) {
        ([("HX-Redirect", "/login")], "").into_response()
    } else {
        Redirect::to("/login").into_response()
    }
}

pub async fn song_favorite(
    State(state): State<AppState>,
    identity: Identity,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> PageResult {
    match state.favorites().add_favorite(&identity, id).await {
        Ok(_) => Ok(favorite_response(&headers, id, true)),
        Err(AppError::AuthenticationRequired) => Ok(login_required(&headers)),
        Err(e) => Err(e.into()),
    }
}

/// Removing a favorite that is already gone just shows the current state.
pub async fn song_unfavorite(
    State(state): State<AppState>,
    identity: Identity,
    headers: HeaderMap,
    Path(id): Path<i32>,
) -> PageResult {
    match state.favorites().remove_favorite(&identity, id).await {
        Ok(()) => Ok(favorite_response(&headers, id, false)),
        Err(AppError::NotFound(_)) => {
            state.songs().get(id).await?;
            Ok(favorite_response(&headers, id, false))
        }
        Err(AppError::AuthenticationRequired) => Ok(login_required(&headers)),
        Err(e) => Err(e.into()),
    }
}

pub async fn favorites(State(state): State<AppState>, identity: Identity) -> PageResult {
    let rows = state.favorites().list_favorites(&identity).await?;
    let songs = song_rows(&state, &identity, rows).await?;

    Ok(page(favorites_page(identity.username(), &songs)))
}

// ============================================================================
// Accounts
// ============================================================================

pub async fn login_form() -> Html<String> {
    Html(login_page("", None).into_string())
}

pub async fn login_submit(
    State(state): State<AppState>,
    Form(credentials): Form<Credentials>,
) -> PageResult {
    match state.accounts().login(&credentials).await {
        Ok(session) => {
            let cookie = session_cookie(&session.token, state.config.session_ttl_hours * 3600);
            Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/artists")).into_response())
        }
        Err(AppError::InvalidCredentials) => Ok(invalid_page(
            StatusCode::UNAUTHORIZED,
            login_page(
                &credentials.username,
                Some("Please enter a correct username and password."),
            ),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn signup_form() -> Html<String> {
    Html(signup_page("", &ValidationErrors::new()).into_string())
}

/// Creates the account and signs the new user straight in.
pub async fn signup_submit(
    State(state): State<AppState>,
    Form(credentials): Form<Credentials>,
) -> PageResult {
    let accounts = state.accounts();

    let (status, errors) = match accounts.sign_up(&credentials).await {
        Ok(_) => {
            let session = accounts.login(&credentials).await?;
            let cookie = session_cookie(&session.token, state.config.session_ttl_hours * 3600);
            return Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/artists")).into_response());
        }
        Err(AppError::Validation(errors)) => (StatusCode::UNPROCESSABLE_ENTITY, errors),
        Err(AppError::IntegrityConflict(message)) => {
            let mut errors = ValidationErrors::new();
            errors.add("username", message);
            (StatusCode::CONFLICT, errors)
        }
        Err(e) => return Err(e.into()),
    };

    Ok(invalid_page(status, signup_page(&credentials.username, &errors)))
}

pub async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> PageResult {
    if let Some(token) = token {
        state.accounts().logout(&token).await?;
    }

    Ok((
        [(header::SET_COOKIE, expired_session_cookie())],
        Redirect::to("/artists"),
    )
        .into_response())
}
