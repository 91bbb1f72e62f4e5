//! Application state - shared across all handlers.

use std::sync::Arc;

use blogicum_core::ports::{
    CategoryRepository, CommentRepository, LocationRepository, PostRepository, UserRepository,
};
use blogicum_infra::InMemoryStore;
use blogicum_infra::database::{DatabaseConfig, DatabaseConnections};

#[cfg(feature = "postgres")]
use blogicum_infra::database::{
    PostgresCategoryRepository, PostgresCommentRepository, PostgresLocationRepository,
    PostgresPostRepository, PostgresUserRepository,
};

use crate::config::BlogSettings;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub locations: Arc<dyn LocationRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub db: Option<Arc<DatabaseConnections>>,
    pub settings: BlogSettings,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>, settings: BlogSettings) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(config) = db_config {
                match DatabaseConnections::init(config).await {
                    Ok(connections) => {
                        tracing::info!("Application state initialized (postgres)");
                        return Self::postgres(Arc::new(connections), settings);
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        {
            let _ = db_config;
            tracing::info!("Running without postgres feature - using in-memory store");
        }

        tracing::info!("Application state initialized (in-memory)");
        Self::in_memory(settings)
    }

    #[cfg(feature = "postgres")]
    fn postgres(connections: Arc<DatabaseConnections>, settings: BlogSettings) -> Self {
        let conn = connections.main.clone();
        Self {
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            categories: Arc::new(PostgresCategoryRepository::new(conn.clone())),
            locations: Arc::new(PostgresLocationRepository::new(conn.clone())),
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn)),
            db: Some(connections),
            settings,
        }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(settings: BlogSettings) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            users: store.clone(),
            categories: store.clone(),
            locations: store.clone(),
            posts: store.clone(),
            comments: store,
            db: None,
            settings,
        }
    }
}
