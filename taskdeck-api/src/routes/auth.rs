/// Authentication endpoints
///
/// The Google OAuth flow and session teardown:
///
/// - `GET /auth/google` - Redirect the browser to Google's consent screen
/// - `GET /auth/google/callback` - Complete the flow: exchange the code,
///   resolve the profile, look up or create the user, establish a session
/// - `GET /logout` - Invalidate the session and clear the cookie
///
/// The browser-facing endpoints never answer with an error page: the
/// callback redirects to the configured failure destination on any failure
/// (missing/invalid state, CSRF mismatch, provider error, persistence
/// error), with the cause logged server-side.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Deserialize;
use time::Duration as TimeDuration;

use crate::{app::AppState, error::ApiResult};
use taskdeck_shared::auth::{
    google::{GoogleAuthState, OAuthError},
    middleware::SESSION_COOKIE,
    session::SessionError,
};
use taskdeck_shared::models::user::{CreateUser, User};

/// Auth state cookie name (CSRF + PKCE state during the OAuth flow).
const OAUTH_STATE_COOKIE: &str = "oauth_state";

/// Query parameters for the OAuth callback.
///
/// Both fields are optional: Google reports a denied consent screen with an
/// `error` parameter and no code, and that must land on the failure
/// redirect rather than a deserialization error.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
    state: Option<String>,
}

/// Builds a 302 Found redirect.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

/// Initiates the login flow by redirecting to Google.
///
/// The CSRF token and PKCE verifier are held in a short-lived HttpOnly
/// cookie on the redirect response; nothing is written server-side.
pub async fn google_login(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    let (auth_url, auth_state) = state.oauth.authorization_url();

    let state_json = serde_json::to_string(&auth_state).expect("serialize auth state");

    let cookie = Cookie::build((OAUTH_STATE_COOKIE, state_json))
        .path("/")
        .http_only(true)
        .secure(state.config.session.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(10));

    (jar.add(cookie), found(&auth_url))
}

/// Handles the callback after the user authenticates with Google.
///
/// On success the browser is sent to the success redirect with a fresh
/// session cookie; on any failure it is sent to the failure redirect. The
/// state cookie is cleared either way.
pub async fn google_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
    jar: CookieJar,
) -> impl IntoResponse {
    let remove_state = Cookie::build((OAUTH_STATE_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO);

    match complete_auth(&state, &query, &jar).await {
        Ok(token) => {
            let session_cookie = Cookie::build((SESSION_COOKIE, token))
                .path("/")
                .http_only(true)
                .secure(state.config.session.secure_cookies)
                .same_site(SameSite::Lax)
                .max_age(TimeDuration::hours(state.config.session.ttl_hours));

            (
                jar.add(session_cookie).add(remove_state),
                found(&state.config.session.success_redirect),
            )
        }
        Err(e) => {
            tracing::error!("login failed: {}", e);
            (
                jar.add(remove_state),
                found(&state.config.session.failure_redirect),
            )
        }
    }
}

/// Logs out by invalidating the session and clearing the cookie.
///
/// Ending an already-invalid session is a no-op; a session-store failure is
/// the one case that surfaces as 500 instead of the redirect.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> ApiResult<impl IntoResponse> {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.end_session(session_cookie.value()).await?;
    }

    let remove_session = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO);

    Ok((jar.add(remove_session), found("/")))
}

/// Everything that can go wrong between the callback query string and a
/// established session.
#[derive(Debug, thiserror::Error)]
enum CallbackError {
    #[error("callback missing authorization code")]
    MissingCode,

    #[error("missing auth state cookie")]
    MissingAuthState,

    #[error("invalid auth state cookie")]
    InvalidAuthState,

    #[error("CSRF state mismatch")]
    CsrfMismatch,

    #[error("identity provider error: {0}")]
    Provider(#[from] OAuthError),

    #[error("persistence error: {0}")]
    Persistence(#[from] sqlx::Error),

    #[error("session error: {0}")]
    Session(#[from] SessionError),
}

/// Turns a callback into an established session, returning the session
/// token for the cookie.
async fn complete_auth(
    state: &AppState,
    query: &CallbackQuery,
    jar: &CookieJar,
) -> Result<String, CallbackError> {
    let state_cookie = jar
        .get(OAUTH_STATE_COOKIE)
        .ok_or(CallbackError::MissingAuthState)?;

    let auth_state: GoogleAuthState = serde_json::from_str(state_cookie.value())
        .map_err(|_| CallbackError::InvalidAuthState)?;

    let code = query.code.as_deref().ok_or(CallbackError::MissingCode)?;

    if query.state.as_deref() != Some(auth_state.csrf_token.as_str()) {
        return Err(CallbackError::CsrfMismatch);
    }

    let access_token = state
        .oauth
        .exchange_code(code, &auth_state.pkce_verifier)
        .await?;

    let profile = state.oauth.fetch_profile(&access_token).await?;

    let user = User::find_or_create(
        &state.db,
        CreateUser {
            google_id: profile.sub,
            email: profile.email,
            display_name: profile.name,
            avatar_url: profile.picture,
        },
    )
    .await?;

    let token = state.sessions.begin_session(user.id).await?;

    tracing::info!(user_id = %user.id, "login completed");
    Ok(token)
}
