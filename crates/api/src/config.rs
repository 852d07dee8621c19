use std::path::PathBuf;

use crate::auth::jwt::JwtConfig;

/// Minimum length for signing secrets.
pub const MIN_SECRET_LEN: usize = 32;

/// Runtime mode, from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
    Test,
}

impl AppEnv {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "development" => Some(AppEnv::Development),
            "production" => Some(AppEnv::Production),
            "test" => Some(AppEnv::Test),
            _ => None,
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// Required variables are validated eagerly so a misconfigured process
/// fails at startup, not on the first request.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Runtime mode (required: `APP_ENV`).
    pub app_env: AppEnv,
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Postgres connection string (required: `DATABASE_URL`).
    pub database_url: String,
    /// Public base URL of the deployment (required: `PUBLIC_BASE_URL`).
    pub public_base_url: String,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Root directory for uploaded proof files
    /// (default: `public/uploads/activities`).
    pub upload_dir: PathBuf,
    /// Secret keying the refresh-token HMAC (required: `SESSION_SECRET`,
    /// at least [`MIN_SECRET_LEN`] chars).
    pub session_secret: String,
    /// JWT access-token configuration (required: `JWT_SECRET`).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                | Required | Default                     |
    /// |------------------------|----------|-----------------------------|
    /// | `APP_ENV`              | **yes**  | --                          |
    /// | `DATABASE_URL`         | **yes**  | --                          |
    /// | `PUBLIC_BASE_URL`      | **yes**  | --                          |
    /// | `SESSION_SECRET`       | **yes**  | --                          |
    /// | `JWT_SECRET`           | **yes**  | --                          |
    /// | `HOST`                 | no       | `0.0.0.0`                   |
    /// | `PORT`                 | no       | `3000`                      |
    /// | `CORS_ORIGINS`         | no       | `http://localhost:3000`     |
    /// | `REQUEST_TIMEOUT_SECS` | no       | `30`                        |
    /// | `UPLOAD_DIR`           | no       | `public/uploads/activities` |
    ///
    /// # Panics
    ///
    /// Panics if any required variable is missing or malformed.
    pub fn from_env() -> Self {
        let app_env_raw = std::env::var("APP_ENV").expect("APP_ENV must be set");
        let app_env = AppEnv::parse(&app_env_raw).unwrap_or_else(|| {
            panic!("APP_ENV must be one of development, production, test (got '{app_env_raw}')")
        });

        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let public_base_url =
            std::env::var("PUBLIC_BASE_URL").expect("PUBLIC_BASE_URL must be set");
        assert!(
            public_base_url.starts_with("http://") || public_base_url.starts_with("https://"),
            "PUBLIC_BASE_URL must be an http(s) URL"
        );

        let session_secret = std::env::var("SESSION_SECRET").expect("SESSION_SECRET must be set");
        assert!(
            session_secret.len() >= MIN_SECRET_LEN,
            "SESSION_SECRET must be at least {MIN_SECRET_LEN} characters"
        );

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let upload_dir = std::env::var("UPLOAD_DIR")
            .unwrap_or_else(|_| "public/uploads/activities".into())
            .into();

        let jwt = JwtConfig::from_env();

        Self {
            app_env,
            host,
            port,
            database_url,
            public_base_url,
            cors_origins,
            request_timeout_secs,
            upload_dir,
            session_secret,
            jwt,
        }
    }
}
