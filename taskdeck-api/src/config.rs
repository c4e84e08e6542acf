/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `GOOGLE_CLIENT_ID`: Google OAuth client id (required)
/// - `GOOGLE_CLIENT_SECRET`: Google OAuth client secret (required)
/// - `GOOGLE_REDIRECT_URL`: OAuth callback URL registered with Google (required)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
/// - `APP_ENV`: "production" enables HSTS and strict defaults
/// - `SESSION_TTL_HOURS`: Session lifetime (default: 168 = 7 days)
/// - `SECURE_COOKIES`: Mark cookies Secure (default: true in production)
/// - `LOGIN_SUCCESS_REDIRECT`: Where the callback sends the browser on
///   success (default: /dashboard)
/// - `LOGIN_FAILURE_REDIRECT`: Where the callback sends the browser on any
///   failure (default: /login)
/// - `RUST_LOG`: Log level (default: info)
///
/// # Example
///
/// ```no_run
/// use taskdeck_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Google OAuth configuration
    pub google: GoogleConfig,

    /// Session and cookie configuration
    pub session: SessionConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins ("*" means permissive)
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Google OAuth configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// OAuth client id
    pub client_id: String,

    /// OAuth client secret
    pub client_secret: String,

    /// Callback URL registered with Google
    pub redirect_url: String,
}

/// Session and cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session time-to-live in hours
    pub ttl_hours: i64,

    /// Whether cookies carry the Secure attribute
    pub secure_cookies: bool,

    /// Browser destination after a successful login
    pub success_redirect: String,

    /// Browser destination after a failed login
    pub failure_redirect: String,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or
    /// have values that do not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let production = env::var("APP_ENV")
            .map(|v| v == "production")
            .unwrap_or(false);

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let client_id = env::var("GOOGLE_CLIENT_ID")
            .map_err(|_| anyhow::anyhow!("GOOGLE_CLIENT_ID environment variable is required"))?;

        let client_secret = env::var("GOOGLE_CLIENT_SECRET").map_err(|_| {
            anyhow::anyhow!("GOOGLE_CLIENT_SECRET environment variable is required")
        })?;

        let redirect_url = env::var("GOOGLE_REDIRECT_URL").map_err(|_| {
            anyhow::anyhow!("GOOGLE_REDIRECT_URL environment variable is required")
        })?;

        let ttl_hours = env::var("SESSION_TTL_HOURS")
            .unwrap_or_else(|_| "168".to_string())
            .parse::<i64>()?;

        if ttl_hours <= 0 {
            anyhow::bail!("SESSION_TTL_HOURS must be positive");
        }

        let secure_cookies = env::var("SECURE_COOKIES")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(production);

        let success_redirect =
            env::var("LOGIN_SUCCESS_REDIRECT").unwrap_or_else(|_| "/dashboard".to_string());
        let failure_redirect =
            env::var("LOGIN_FAILURE_REDIRECT").unwrap_or_else(|_| "/login".to_string());

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            google: GoogleConfig {
                client_id,
                client_secret,
                redirect_url,
            },
            session: SessionConfig {
                ttl_hours,
                secure_cookies,
                success_redirect,
                failure_redirect,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            google: GoogleConfig {
                client_id: "client-id".to_string(),
                client_secret: "client-secret".to_string(),
                redirect_url: "http://localhost:8080/auth/google/callback".to_string(),
            },
            session: SessionConfig {
                ttl_hours: 168,
                secure_cookies: false,
                success_redirect: "/dashboard".to_string(),
                failure_redirect: "/login".to_string(),
            },
        }
    }

    #[test]
    fn test_bind_address() {
        assert_eq!(test_config().bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_config_clone() {
        let config = test_config();
        let cloned = config.clone();
        assert_eq!(config.session.ttl_hours, cloned.session.ttl_hours);
        assert_eq!(config.google.client_id, cloned.google.client_id);
    }
}
