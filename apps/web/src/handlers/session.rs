//! Login, logout and the home page.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect};
use axum::Form;
use serde::Deserialize;
use tracing::{info, warn};

use super::PageResult;
use crate::auth::{session_token, CurrentUser};
use crate::error::ApiError;
use crate::pages;
use crate::AppState;

/// Shown when the username is unknown or the password does not match.
pub const LOGIN_FAILED_MESSAGE: &str = "Wrong username or password";

/// Shown on the login page after signing out.
pub const LOGGED_OUT_MESSAGE: &str = "Logged Out";

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn index(State(state): State<AppState>, headers: HeaderMap) -> Result<Redirect, ApiError> {
    match CurrentUser::from_headers(&headers, &state).await? {
        Some(_) => Ok(Redirect::to("/home")),
        None => Ok(Redirect::to("/login")),
    }
}

pub async fn login_form() -> impl IntoResponse {
    pages::login_page("")
}

pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> PageResult {
    let username = form.username.trim();
    if username.is_empty() || form.password.is_empty() {
        return Ok(pages::login_page(LOGIN_FAILED_MESSAGE)?.into_response());
    }

    let Some(user) = state.db.users().authenticate(username, &form.password).await? else {
        warn!(username = %username, "Login failed");
        return Ok(pages::login_page(LOGIN_FAILED_MESSAGE)?.into_response());
    };

    let token = state.sessions.issue(&user.username)?;
    info!(username = %user.username, role = %user.role, "User signed in");

    Ok((
        [(SET_COOKIE, state.sessions.session_cookie(&token))],
        Redirect::to("/home"),
    )
        .into_response())
}

/// Revokes the presented token, then clears the cookie.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> PageResult {
    if let Some(token) = session_token(&headers) {
        if let Ok(claims) = state.sessions.validate(token).await {
            state.sessions.revoke(&claims).await;
            info!(username = %claims.sub, "User signed out");
        }
    }

    Ok((
        [(SET_COOKIE, state.sessions.clear_cookie())],
        pages::login_page(LOGGED_OUT_MESSAGE)?,
    )
        .into_response())
}

pub async fn home(user: CurrentUser, State(state): State<AppState>) -> PageResult {
    let products = state.db.products().list().await?;
    Ok(pages::home_page(&user, &products)?.into_response())
}
