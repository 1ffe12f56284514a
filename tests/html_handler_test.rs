//! Integration tests for the server-rendered pages
//!
//! Drives the full router the way a browser (or HTMX) would:
//! - Pages render with catalog data
//! - Invalid forms re-render with field errors
//! - Error pages keep the signed-in header
//! - Favorite toggles redirect anonymous visitors to the login page

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use sea_orm::{EntityTrait, PaginatorTrait};
use tower::util::ServiceExt;

use tunr::db::entities::{artist, favorite};
use tunr::handlers;
use tunr::state::AppState;
use tunr::test_utils::*;

fn create_test_router(state: &AppState) -> Router {
    handlers::create_router(state.clone())
}

async fn body_text(response: axum::response::Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

fn location(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
}

fn page(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("tunr_session={}", token));
    }
    builder.body(Body::empty()).unwrap()
}

fn form_post(uri: &str, body: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(token) = token {
        builder = builder.header(header::COOKIE, format!("tunr_session={}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let state = setup_test_app_state().await;
    let app = create_test_router(&state);

    let response = app.oneshot(page("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("ok"));
}

#[tokio::test]
async fn test_root_redirects_to_artists() {
    let state = setup_test_app_state().await;
    let app = create_test_router(&state);

    let response = app.oneshot(page("/", None)).await.unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/artists");
}

#[tokio::test]
async fn test_artist_list_page() {
    let state = setup_test_app_state().await;
    create_test_artist(&state.db, "Kanye West", "USA").await;
    create_test_artist(&state.db, "Adele", "UK").await;
    let app = create_test_router(&state);

    let response = app
        .clone()
        .oneshot(page("/artists", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Kanye West"));
    assert!(html.contains("Adele"));
    assert!(html.contains("Log in"));

    let response = app
        .oneshot(page("/artists?name=Kan&nationality=", None))
        .await
        .unwrap();
    let html = body_text(response).await;
    assert!(html.contains("Kanye West"));
    assert!(!html.contains("Adele"));
}

#[tokio::test]
async fn test_artist_detail_page_and_missing_artist() {
    let state = setup_test_app_state().await;
    let artist = create_test_artist(&state.db, "Kanye West", "USA").await;
    create_test_song(&state.db, artist.id, "Ultralight Beam").await;
    let app = create_test_router(&state);

    let response = app
        .clone()
        .oneshot(page(&format!("/artists/{}", artist.id), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Ultralight Beam"));
    assert!(html.contains("Log in to favorite"));

    let response = app.oneshot(page("/artists/9999", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_text(response).await.contains("Artist not found"));
}

#[tokio::test]
async fn test_error_page_keeps_signed_in_header() {
    let state = setup_test_app_state().await;
    let app = create_test_router(&state);
    let (_, token) = login_test_user(&state, "listener").await;

    let response = app
        .clone()
        .oneshot(page("/artists/9999", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let html = body_text(response).await;
    assert!(html.contains("Artist not found"));
    assert!(html.contains("Signed in as <strong>listener</strong>"));

    // Anonymous visitors still get the plain page
    let response = app.oneshot(page("/songs/9999", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(!body_text(response).await.contains("Signed in as"));
}

#[tokio::test]
async fn test_create_artist_form() {
    let state = setup_test_app_state().await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(form_post(
            "/artists/new",
            "name=Kanye+West&nationality=USA&photo_url=",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let artists = artist::Entity::find().all(&state.db).await.unwrap();
    assert_eq!(artists.len(), 1);
    assert_eq!(artists[0].name, "Kanye West");
    assert_eq!(location(&response), format!("/artists/{}", artists[0].id));
}

#[tokio::test]
async fn test_create_artist_form_rerenders_errors() {
    let state = setup_test_app_state().await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(form_post(
            "/artists/new",
            "name=&nationality=USA&photo_url=",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("errorlist"));
    assert!(html.contains("This field is required."));
    assert!(html.contains("value=\"USA\""));
    assert_eq!(artist::Entity::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_delete_artist_form() {
    let state = setup_test_app_state().await;
    let artist = create_test_artist(&state.db, "Kanye West", "USA").await;
    create_test_song(&state.db, artist.id, "Ultralight Beam").await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(form_post(&format!("/artists/{}/delete", artist.id), "", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/artists");
    assert_eq!(artist::Entity::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_create_song_form_unknown_artist() {
    let state = setup_test_app_state().await;
    create_test_artist(&state.db, "Kanye West", "USA").await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(form_post(
            "/songs/new",
            "artist_id=999&title=Orphan&album=&preview_url=",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let html = body_text(response).await;
    assert!(html.contains("Select a valid choice."));
}

#[tokio::test]
async fn test_create_song_form() {
    let state = setup_test_app_state().await;
    let artist = create_test_artist(&state.db, "Kanye West", "USA").await;
    let app = create_test_router(&state);

    let response = app
        .clone()
        .oneshot(form_post(
            "/songs/new",
            &format!(
                "artist_id={}&title=Ultralight+Beam&album=&preview_url=",
                artist.id
            ),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let target = location(&response).to_string();
    assert!(target.starts_with("/songs/"));

    let response = app.oneshot(page(&target, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Ultralight Beam"));
    assert!(html.contains("0 listeners"));
}

#[tokio::test]
async fn test_favorite_redirects_anonymous_to_login() {
    let state = setup_test_app_state().await;
    let artist = create_test_artist(&state.db, "Kanye West", "USA").await;
    let song = create_test_song(&state.db, artist.id, "Ultralight Beam").await;
    let app = create_test_router(&state);

    let response = app
        .oneshot(form_post(&format!("/songs/{}/favorite", song.id), "", None))
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");
    assert_eq!(favorite::Entity::find().count(&state.db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_favorite_htmx_anonymous_gets_hx_redirect() {
    let state = setup_test_app_state().await;
    let artist = create_test_artist(&state.db, "Kanye West", "USA").await;
    let song = create_test_song(&state.db, artist.id, "Ultralight Beam").await;
    let app = create_test_router(&state);

    let request = Request::builder()
        .method("POST")
        .uri(format!("/songs/{}/favorite", song.id))
        .header("HX-Request", "true")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers().get("HX-Redirect").unwrap(), "/login");
}

#[tokio::test]
async fn test_favorite_toggle_with_htmx() {
    let state = setup_test_app_state().await;
    let artist = create_test_artist(&state.db, "Kanye West", "USA").await;
    let song = create_test_song(&state.db, artist.id, "Ultralight Beam").await;
    let (_, token) = login_test_user(&state, "listener").await;
    let app = create_test_router(&state);

    let request = Request::builder()
        .method("POST")
        .uri(format!("/songs/{}/favorite", song.id))
        .header("HX-Request", "true")
        .header(header::COOKIE, format!("tunr_session={}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("data-favorited=\"true\""));
    assert!(html.contains(&format!("/songs/{}/unfavorite", song.id)));
    assert_eq!(favorite::Entity::find().count(&state.db).await.unwrap(), 1);

    let request = Request::builder()
        .method("POST")
        .uri(format!("/songs/{}/unfavorite", song.id))
        .header("HX-Request", "true")
        .header(header::COOKIE, format!("tunr_session={}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let html = body_text(response).await;
    assert!(html.contains("data-favorited=\"false\""));
    assert_eq!(favorite::Entity::find().count(&state.db).await.unwrap(), 0);

    // Unfavoriting again is a no-op for the page
    let response = app
        .oneshot(form_post(
            &format!("/songs/{}/unfavorite", song.id),
            "",
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), format!("/songs/{}", song.id));
}

#[tokio::test]
async fn test_favorites_page() {
    let state = setup_test_app_state().await;
    let artist = create_test_artist(&state.db, "Kanye West", "USA").await;
    let beam = create_test_song(&state.db, artist.id, "Ultralight Beam").await;
    create_test_song(&state.db, artist.id, "Famous").await;
    let (user, token) = login_test_user(&state, "listener").await;
    create_test_favorite(&state.db, user.id, beam.id).await;
    let app = create_test_router(&state);

    let response = app
        .clone()
        .oneshot(page("/favorites", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("Ultralight Beam"));
    assert!(!html.contains("Famous"));
    assert!(html.contains("listener"));

    let response = app.oneshot(page("/favorites", None)).await.unwrap();
    assert!(response.status().is_redirection());
    assert_eq!(location(&response), "/login");
}

#[tokio::test]
async fn test_login_form_sets_cookie() {
    let state = setup_test_app_state().await;
    create_test_user(&state.db, "listener").await;
    let app = create_test_router(&state);

    let response = app
        .clone()
        .oneshot(form_post(
            "/login",
            "username=listener&password=correct+horse+battery",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("tunr_session="));

    let response = app
        .oneshot(form_post("/login", "username=listener&password=nope", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(body_text(response)
        .await
        .contains("Please enter a correct username and password."));
}

#[tokio::test]
async fn test_signup_form() {
    let state = setup_test_app_state().await;
    create_test_user(&state.db, "taken").await;
    let app = create_test_router(&state);

    let response = app
        .clone()
        .oneshot(form_post(
            "/signup",
            "username=newcomer&password=supersecret",
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(response.headers().get(header::SET_COOKIE).is_some());

    let response = app
        .clone()
        .oneshot(form_post("/signup", "username=taken&password=supersecret", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert!(body_text(response)
        .await
        .contains("A user with that username already exists."));

    let response = app
        .oneshot(form_post("/signup", "username=shorty&password=abc", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
