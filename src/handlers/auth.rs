use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use super::session::{expired_session_cookie, session_cookie, SessionToken};
use crate::{
    db::entities::user,
    error::Result,
    services::{Credentials, Identity},
    state::AppState,
};

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: String,
    pub user: user::Model,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub authenticated: bool,
    pub user: Option<user::Model>,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<(StatusCode, Json<user::Model>)> {
    let user = state.accounts().sign_up(&credentials).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Opens a session; the token is returned in the body and as a cookie
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<impl IntoResponse> {
    let session = state.accounts().login(&credentials).await?;
    let cookie = session_cookie(&session.token, state.config.session_ttl_hours * 3600);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            token: session.token,
            expires_at: session.expires_at.to_rfc3339(),
            user: session.user,
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    SessionToken(token): SessionToken,
) -> Result<impl IntoResponse> {
    if let Some(token) = token {
        state.accounts().logout(&token).await?;
    }

    Ok((
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, expired_session_cookie())],
    ))
}

pub async fn me(identity: Identity) -> Json<MeResponse> {
    Json(MeResponse {
        authenticated: identity.is_authenticated(),
        user: identity.user().cloned(),
    })
}
