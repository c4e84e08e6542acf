/// Session authentication middleware for Axum
///
/// The guard in front of every task endpoint. It reads the session cookie,
/// resolves it through the [`SessionManager`], and attaches the resolved
/// user to the request as a [`CurrentUser`] extension. Any failure — no
/// cookie, unknown or expired token, a session pointing at a deleted user,
/// or a session-store error — terminates the request with 401 before the
/// handler runs. There are no retries.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Extension, Router};
/// use taskdeck_shared::auth::middleware::{create_session_middleware, CurrentUser};
/// use taskdeck_shared::auth::session::SessionManager;
///
/// async fn protected(Extension(CurrentUser(user)): Extension<CurrentUser>) -> String {
///     format!("Hello, user {}!", user.id)
/// }
///
/// fn router(sessions: SessionManager) -> Router {
///     Router::new()
///         .route("/api/tasks", get(protected))
///         .layer(middleware::from_fn(create_session_middleware(sessions)))
/// }
/// ```

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::CookieJar;

use super::session::{SessionError, SessionManager};
use crate::models::user::User;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "taskdeck_session";

/// The authenticated user, added to request extensions by the guard
///
/// Handlers extract it with Axum's `Extension` extractor.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Rejection produced by the session guard
///
/// Every variant answers 401: the caller learns only that the request was
/// not authenticated, never why.
#[derive(Debug)]
pub enum AuthRejection {
    /// No session cookie was presented
    MissingSession,

    /// The cookie named a token that did not resolve to a user
    InvalidSession,

    /// The session store failed while resolving
    StoreFailure,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "error": "unauthorized",
            "message": "Authentication required",
        }));

        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Session authentication middleware
///
/// # Returns
///
/// The inner response with a [`CurrentUser`] extension added on success.
///
/// # Errors
///
/// Returns 401 Unauthorized if:
/// - The session cookie is missing
/// - The token is unknown or expired
/// - The referenced user no longer exists
/// - The session store is unreachable
pub async fn session_auth_middleware(
    sessions: SessionManager,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthRejection> {
    let jar = CookieJar::from_headers(req.headers());

    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .ok_or(AuthRejection::MissingSession)?;

    let user = sessions
        .resolve_session(&token)
        .await
        .map_err(|e| match e {
            SessionError::Storage(err) => {
                tracing::error!("session store error during auth: {}", err);
                AuthRejection::StoreFailure
            }
            SessionError::NoSession | SessionError::UserNotFound => AuthRejection::InvalidSession,
        })?;

    req.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(req).await)
}

/// Creates a session authentication middleware closure
///
/// Helper that captures the session manager and returns a function usable
/// with `axum::middleware::from_fn`.
pub fn create_session_middleware(
    sessions: SessionManager,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<
    Box<dyn std::future::Future<Output = Result<Response, AuthRejection>> + Send>,
> + Clone {
    move |req, next| {
        let sessions = sessions.clone();
        Box::pin(session_auth_middleware(sessions, req, next))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_is_always_401() {
        for rejection in [
            AuthRejection::MissingSession,
            AuthRejection::InvalidSession,
            AuthRejection::StoreFailure,
        ] {
            let response = rejection.into_response();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        }
    }
}
