//! Session handling.
//!
//! A signed token (HS256 JWT) in an `HttpOnly` cookie names the user. The
//! token carries no role: each request looks the user up in `users`, so a
//! role change or a deleted account applies to sessions already issued.
//!
//! Logout revokes the token id. Revocations live in memory until the token
//! would have expired; a restart forgets them.

use std::collections::HashMap;

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use stockroom_core::Role;

use crate::config::SessionSettings;
use crate::error::ApiError;
use crate::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "stockroom_session";

/// Session token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// Token id
    pub jti: String,
}

/// Issues, validates and revokes session tokens.
pub struct SessionManager {
    secret: String,
    lifetime_secs: i64,
    secure_cookie: bool,

    /// Revoked token ids and their expiry.
    revoked: RwLock<HashMap<String, i64>>,
}

impl SessionManager {
    pub fn new(secret: impl Into<String>, lifetime_secs: i64) -> Self {
        SessionManager {
            secret: secret.into(),
            lifetime_secs,
            secure_cookie: false,
            revoked: RwLock::new(HashMap::new()),
        }
    }

    pub fn from_settings(settings: &SessionSettings) -> Self {
        SessionManager {
            secure_cookie: settings.secure_cookie,
            ..SessionManager::new(settings.secret.clone(), settings.lifetime_secs)
        }
    }

    /// Issues a token for a signed-in user.
    pub fn issue(&self, username: &str) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.lifetime_secs);

        let claims = Claims {
            sub: username.to_string(),
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| ApiError::internal(format!("Failed to issue session: {}", e)))
    }

    /// Validates signature, expiry and revocation.
    pub async fn validate(&self, token: &str) -> Result<Claims, ApiError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| {
            tracing::debug!(error = %e, "Rejected session token");
            ApiError::unauthenticated()
        })?;

        if self.revoked.read().await.contains_key(&data.claims.jti) {
            tracing::debug!(username = %data.claims.sub, "Rejected revoked session token");
            return Err(ApiError::unauthenticated());
        }

        Ok(data.claims)
    }

    /// Refuses `claims` from now on. Expired revocations are dropped.
    pub async fn revoke(&self, claims: &Claims) {
        let now = Utc::now().timestamp();
        let mut revoked = self.revoked.write().await;
        revoked.retain(|_, exp| *exp > now);
        revoked.insert(claims.jti.clone(), claims.exp);
    }

    /// `Set-Cookie` value carrying `token`.
    pub fn session_cookie(&self, token: &str) -> String {
        let secure = if self.secure_cookie { "; Secure" } else { "" };
        format!(
            "{SESSION_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{secure}",
            self.lifetime_secs
        )
    }

    /// `Set-Cookie` value that removes the session.
    pub fn clear_cookie(&self) -> String {
        format!("{SESSION_COOKIE}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0")
    }
}

/// Session token from the request's `Cookie` headers.
pub fn session_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Extractors
// =============================================================================

/// The signed-in user of this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub username: String,
    /// Role as stored now, not as it was at login.
    pub role: Role,
}

impl CurrentUser {
    /// Resolves the user from the session cookie.
    ///
    /// ## Returns
    /// * `Ok(None)` - No cookie, an invalid or revoked token, or the user
    ///   no longer exists
    /// * `Err(_)` - The users table could not be read
    pub async fn from_headers(headers: &HeaderMap, state: &AppState) -> Result<Option<Self>, ApiError> {
        let Some(token) = session_token(headers) else {
            return Ok(None);
        };
        let Ok(claims) = state.sessions.validate(token).await else {
            return Ok(None);
        };

        let user = state.db.users().find_by_username(&claims.sub).await?;
        if user.is_none() {
            tracing::debug!(username = %claims.sub, "Session names an unknown user");
        }

        Ok(user.map(|user| CurrentUser {
            username: user.username,
            role: user.role,
        }))
    }
}

/// Page routes: no session redirects to `/login`.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_headers(&parts.headers, state).await {
            Ok(Some(user)) => Ok(user),
            Ok(None) => Err(Redirect::to("/login").into_response()),
            Err(e) => Err(e.into_response()),
        }
    }
}

/// Admin page routes: non-admins go back to `/home` before the body is read.
#[derive(Debug, Clone)]
pub struct AdminUser(pub CurrentUser);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;
        if !user.role.is_admin() {
            tracing::warn!(username = %user.username, path = %parts.uri.path(), "Admin route refused");
            return Err(Redirect::to("/home").into_response());
        }
        Ok(AdminUser(user))
    }
}

/// JSON routes: no session answers 401 instead of redirecting.
#[derive(Debug, Clone)]
pub struct ApiUser(pub CurrentUser);

impl FromRequestParts<AppState> for ApiUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        CurrentUser::from_headers(&parts.headers, state)
            .await?
            .map(ApiUser)
            .ok_or_else(ApiError::unauthenticated)
    }
}

/// Admin JSON routes: 403 for other roles, decided before the body is
/// parsed.
#[derive(Debug, Clone)]
pub struct ApiAdmin(pub CurrentUser);

impl FromRequestParts<AppState> for ApiAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let ApiUser(user) = ApiUser::from_request_parts(parts, state).await?;
        if let Err(e) = user.role.require_admin("use this endpoint") {
            tracing::warn!(username = %user.username, path = %parts.uri.path(), "Admin endpoint refused");
            return Err(e.into());
        }
        Ok(ApiAdmin(user))
    }
}
