//! Application configuration loaded from environment variables.

use std::env;

use blogicum_core::pagination::DEFAULT_PER_PAGE;
use blogicum_infra::JwtConfig;
use blogicum_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub jwt: JwtConfig,
    pub blog: BlogSettings,
}

/// Settings that shape the blog pages.
#[derive(Debug, Clone)]
pub struct BlogSettings {
    /// Posts per page on the index, category and profile pages.
    pub posts_per_page: u64,
    /// Where unauthenticated requests to protected actions are sent.
    pub login_url: String,
}

impl Default for BlogSettings {
    fn default() -> Self {
        Self {
            posts_per_page: DEFAULT_PER_PAGE,
            login_url: "/api/auth/login".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(100),
            min_connections: env::var("DB_MIN_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        });

        let defaults = BlogSettings::default();
        let blog = BlogSettings {
            posts_per_page: env::var("POSTS_PER_PAGE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.posts_per_page),
            login_url: env::var("LOGIN_URL").unwrap_or(defaults.login_url),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            database,
            jwt: JwtConfig::from_env(),
            blog,
        }
    }
}
