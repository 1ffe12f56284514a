pub mod artists;
pub mod auth;
pub mod favorites;
pub mod health;
pub mod html;
pub mod session;
pub mod songs;

use axum::{
    middleware,
    response::Redirect,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Auth endpoints
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))

        // Artist endpoints
        .route("/artists", get(artists::list_artists).post(artists::create_artist))
        .route(
            "/artists/:id",
            get(artists::get_artist)
                .patch(artists::update_artist)
                .delete(artists::delete_artist),
        )

        // Song endpoints
        .route("/songs", get(songs::list_songs).post(songs::create_song))
        .route(
            "/songs/:id",
            get(songs::get_song)
                .patch(songs::update_song)
                .delete(songs::delete_song),
        )

        // Favorite endpoints
        .route(
            "/songs/:id/favorite",
            post(favorites::add_favorite).delete(favorites::remove_favorite),
        )
        .route("/favorites", get(favorites::list_favorites))
}

pub fn html_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/artists") }))

        // Artists
        .route("/artists", get(html::artist_list))
        .route("/artists/new", get(html::artist_new).post(html::artist_create))
        .route("/artists/:id", get(html::artist_detail))
        .route("/artists/:id/edit", get(html::artist_edit).post(html::artist_update))
        .route("/artists/:id/delete", post(html::artist_delete))

        // Songs
        .route("/songs", get(html::song_list))
        .route("/songs/new", get(html::song_new).post(html::song_create))
        .route("/songs/:id", get(html::song_detail))
        .route("/songs/:id/edit", get(html::song_edit).post(html::song_update))
        .route("/songs/:id/delete", post(html::song_delete))
        .route("/songs/:id/favorite", post(html::song_favorite))
        .route("/songs/:id/unfavorite", post(html::song_unfavorite))
        .route("/favorites", get(html::favorites))

        // Accounts
        .route("/login", get(html::login_form).post(html::login_submit))
        .route("/signup", get(html::signup_form).post(html::signup_submit))
        .route("/logout", post(html::logout))
}

/// The complete application: JSON API, HTML pages, static files and middleware.
pub fn create_router(state: AppState) -> Router {
    let static_dir = state.config.static_dir.clone();

    Router::new()
        // Health check
        .route("/health", get(health::health_check))

        // API routes (JSON)
        .nest("/api", api_routes())

        // HTML routes (Maud + HTMX)
        .merge(html_routes().layer(middleware::from_fn_with_state(
            state.clone(),
            html::render_error_pages,
        )))

        .nest_service("/static", ServeDir::new(static_dir))

        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
