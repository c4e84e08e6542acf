/// Authentication for TaskDeck
///
/// This module owns the full authentication surface:
///
/// - `google`: OAuth 2.0 client for the Google authorization-code flow
/// - `session`: session token generation and the session manager
///   (begin / resolve / end)
/// - `middleware`: the request guard that turns a session cookie into a
///   `CurrentUser` extension, rejecting everything else with 401
///
/// There is no global auth registry: the session manager and OAuth client
/// are constructed once at startup and handed to the router through
/// application state.

pub mod google;
pub mod middleware;
pub mod session;

pub use google::{GoogleAuthState, GoogleOAuthClient, GoogleProfile, OAuthError};
pub use middleware::{create_session_middleware, CurrentUser, SESSION_COOKIE};
pub use session::{generate_session_token, hash_session_token, SessionError, SessionManager};
