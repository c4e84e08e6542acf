//! Google OAuth 2.0 client for login.
//!
//! Implements the authorization-code flow with PKCE against Google's
//! endpoints and resolves the resulting access token into a profile via the
//! userinfo endpoint. The `sub` claim of the profile is the stable external
//! identifier users are keyed by.

use oauth2::{
    basic::BasicClient, AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken,
    PkceCodeChallenge, PkceCodeVerifier, RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};

/// Google OAuth authorization URL.
const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google OAuth token URL.
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Google userinfo endpoint.
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Scopes requested at login.
const LOGIN_SCOPES: &[&str] = &["openid", "profile", "email"];

/// Google OAuth client for authenticating users.
#[derive(Clone)]
pub struct GoogleOAuthClient {
    client_id: String,
    client_secret: String,
    redirect_url: String,
}

/// State generated when starting the flow, to be validated on callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleAuthState {
    pub csrf_token: String,
    pub pkce_verifier: String,
}

/// Profile assertion returned by the userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    /// Stable subject identifier issued by Google.
    pub sub: String,
    /// Email address, if the `email` scope was granted.
    pub email: Option<String>,
    /// Display name.
    pub name: Option<String>,
    /// Profile picture URL.
    pub picture: Option<String>,
}

impl GoogleOAuthClient {
    /// Creates a new client from credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the redirect URL is not a valid URL.
    pub fn new(
        client_id: String,
        client_secret: String,
        redirect_url: String,
    ) -> Result<Self, OAuthError> {
        let _ = RedirectUrl::new(redirect_url.clone())
            .map_err(|e| OAuthError::Configuration(format!("invalid redirect URL: {}", e)))?;

        Ok(Self {
            client_id,
            client_secret,
            redirect_url,
        })
    }

    /// Generates the authorization URL to redirect the user to.
    ///
    /// Returns the URL along with the CSRF token and PKCE verifier the
    /// caller must hold (in a short-lived cookie) until the callback.
    pub fn authorization_url(&self) -> (String, GoogleAuthState) {
        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_auth_uri(AuthUrl::new(GOOGLE_AUTH_URL.to_string()).expect("valid auth URL"))
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_url.clone()).expect("valid redirect URL"),
            );

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();

        let mut auth_request = client
            .authorize_url(CsrfToken::new_random)
            .set_pkce_challenge(pkce_challenge);

        for scope in LOGIN_SCOPES {
            auth_request = auth_request.add_scope(Scope::new((*scope).to_string()));
        }

        let (auth_url, csrf_token) = auth_request.url();

        let state = GoogleAuthState {
            csrf_token: csrf_token.secret().clone(),
            pkce_verifier: pkce_verifier.secret().clone(),
        };

        (auth_url.to_string(), state)
    }

    /// Exchanges the authorization code for an access token.
    pub async fn exchange_code(
        &self,
        code: &str,
        pkce_verifier: &str,
    ) -> Result<String, OAuthError> {
        let http_client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| OAuthError::TokenExchange(format!("HTTP client error: {}", e)))?;

        let client = BasicClient::new(ClientId::new(self.client_id.clone()))
            .set_client_secret(ClientSecret::new(self.client_secret.clone()))
            .set_token_uri(TokenUrl::new(GOOGLE_TOKEN_URL.to_string()).expect("valid token URL"))
            .set_redirect_uri(
                RedirectUrl::new(self.redirect_url.clone()).expect("valid redirect URL"),
            );

        let token_result = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_string()))
            .request_async(&http_client)
            .await
            .map_err(|e| OAuthError::TokenExchange(format!("token exchange failed: {}", e)))?;

        Ok(token_result.access_token().secret().clone())
    }

    /// Fetches the user's profile with the access token.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile, OAuthError> {
        let response = reqwest::Client::new()
            .get(GOOGLE_USERINFO_URL)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| OAuthError::Profile(format!("userinfo request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(OAuthError::Profile(format!(
                "userinfo returned {}",
                response.status()
            )));
        }

        response
            .json::<GoogleProfile>()
            .await
            .map_err(|e| OAuthError::Profile(format!("invalid userinfo payload: {}", e)))
    }
}

/// OAuth-related errors.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// Invalid client configuration (bad URLs).
    #[error("OAuth configuration error: {0}")]
    Configuration(String),

    /// The code-for-token exchange failed.
    #[error("OAuth token exchange error: {0}")]
    TokenExchange(String),

    /// The userinfo fetch failed or returned garbage.
    #[error("OAuth profile error: {0}")]
    Profile(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> GoogleOAuthClient {
        GoogleOAuthClient::new(
            "client-id".to_string(),
            "client-secret".to_string(),
            "http://localhost:8080/auth/google/callback".to_string(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_redirect_url() {
        let result = GoogleOAuthClient::new(
            "client-id".to_string(),
            "client-secret".to_string(),
            "not a url".to_string(),
        );
        assert!(matches!(result, Err(OAuthError::Configuration(_))));
    }

    #[test]
    fn test_authorization_url_contents() {
        let client = test_client();
        let (url, state) = client.authorization_url();

        assert!(url.starts_with(GOOGLE_AUTH_URL));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=client-id"));
        assert!(url.contains("code_challenge="));
        assert!(url.contains(&format!("state={}", state.csrf_token)));
        // Scopes are space-separated, URL-encoded as +
        assert!(url.contains("scope=openid+profile+email"));
        assert!(!state.pkce_verifier.is_empty());
    }

    #[test]
    fn test_authorization_url_state_is_unique() {
        let client = test_client();
        let (_, first) = client.authorization_url();
        let (_, second) = client.authorization_url();
        assert_ne!(first.csrf_token, second.csrf_token);
        assert_ne!(first.pkce_verifier, second.pkce_verifier);
    }

    #[test]
    fn test_profile_deserialization() {
        let json = r#"{
            "sub": "118234567890",
            "email": "user@example.com",
            "email_verified": true,
            "name": "Jane Doe",
            "picture": "https://lh3.googleusercontent.com/a/photo"
        }"#;

        let profile: GoogleProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.sub, "118234567890");
        assert_eq!(profile.email.as_deref(), Some("user@example.com"));
        assert_eq!(profile.name.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_profile_deserialization_minimal() {
        // Google omits email when the scope is not granted
        let profile: GoogleProfile = serde_json::from_str(r#"{"sub": "42"}"#).unwrap();
        assert_eq!(profile.sub, "42");
        assert!(profile.email.is_none());
        assert!(profile.name.is_none());
        assert!(profile.picture.is_none());
    }
}
