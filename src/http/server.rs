//! Shuffle server implementation
//!
//! Hosts the read endpoint and, when enabled, the daily publish trigger in
//! the same process.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::scheduler::{PublishTrigger, ScheduledPublisher};
use crate::storage::SharedShuffleStore;

use super::api::create_router;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Process-wide store handle, safe for concurrent requests
    pub store: SharedShuffleStore,

    /// Server start time
    pub start_time: Instant,
}

// ============================================================================
// Shuffle Server
// ============================================================================

/// HTTP server plus optional in-process trigger
pub struct ShuffleServer {
    config: Config,
    state: AppState,
    trigger: Arc<PublishTrigger>,
}

impl ShuffleServer {
    /// Create a new shuffle server
    pub fn new(config: Config, store: SharedShuffleStore) -> Result<Self, ServerError> {
        config
            .validate()
            .map_err(|e| ServerError::ConfigError(e.to_string()))?;

        let publisher = ScheduledPublisher::new(store.clone(), config.schedule.timezone);
        let trigger = Arc::new(
            PublishTrigger::new(config.schedule.clone(), publisher)
                .map_err(|e| ServerError::InitError(e.to_string()))?,
        );

        let state = AppState {
            store,
            start_time: Instant::now(),
        };

        Ok(Self {
            config,
            state,
            trigger,
        })
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Get the publish trigger
    pub fn trigger(&self) -> Arc<PublishTrigger> {
        self.trigger.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        if self.config.server.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self
            .config
            .server
            .bind_address()
            .map_err(|e| ServerError::ConfigError(e.to_string()))?;

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(e.to_string()))?;

        tracing::info!("Starting shuffle server on {}", addr);

        // Start background tasks
        self.start_background_tasks();

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()));

        self.trigger.stop().await;
        tracing::info!("Shuffle server shutdown complete");
        served
    }

    /// Start background tasks
    fn start_background_tasks(&self) {
        if !self.config.schedule.enabled {
            tracing::info!("Publish trigger disabled; relying on external scheduler");
            return;
        }

        let trigger = self.trigger.clone();
        tokio::spawn(async move {
            if let Err(e) = trigger.start().await {
                tracing::error!(error = %e, "Publish trigger exited with error");
            }
        });
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.config.server.bind_address().ok(),
            store_backend: self.config.store.backend.to_string(),
            collection: self.config.store.collection.clone(),
            schedule_enabled: self.config.schedule.enabled,
            publish_time: self.config.schedule.publish_time.clone(),
            timezone: self.config.schedule.timezone.to_string(),
            request_logging_enabled: self.config.server.enable_request_logging,
        }
    }
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: Option<SocketAddr>,
    pub store_backend: String,
    pub collection: String,
    pub schedule_enabled: bool,
    pub publish_time: String,
    pub timezone: String,
    pub request_logging_enabled: bool,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        let bind = self
            .bind_address
            .map(|a| a.to_string())
            .unwrap_or_else(|| "invalid".to_string());
        let schedule = if self.schedule_enabled {
            format!("daily at {} ({})", self.publish_time, self.timezone)
        } else {
            "disabled".to_string()
        };

        format!(
            "Shuffle Server\n\
             {:-<40}\n\
             Bind Address: {}\n\
             Store: {} ({})\n\
             Schedule: {}\n\
             Request Logging: {}",
            "",
            bind,
            self.store_backend,
            self.collection,
            schedule,
            if self.request_logging_enabled { "enabled" } else { "disabled" }
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Clone)]
pub enum ServerError {
    /// Configuration error
    ConfigError(String),

    /// Initialization error
    InitError(String),

    /// Failed to bind to address
    BindError(String),

    /// Server error
    ServeError(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::InitError(msg) => write!(f, "Initialization error: {}", msg),
            Self::BindError(msg) => write!(f, "Failed to bind: {}", msg),
            Self::ServeError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryShuffleStore;

    fn memory_store() -> SharedShuffleStore {
        Arc::new(MemoryShuffleStore::new())
    }

    #[test]
    fn test_server_creation() {
        let server = ShuffleServer::new(Config::default(), memory_store());
        assert!(server.is_ok());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = Config::default();
        config.schedule.publish_time = "noon".to_string();

        let result = ShuffleServer::new(config, memory_store());
        assert!(matches!(result, Err(ServerError::ConfigError(_))));
    }

    #[test]
    fn test_server_info() {
        let mut config = Config::default();
        config.schedule.enabled = false;
        config.server.port = 9000;

        let server = ShuffleServer::new(config, memory_store()).unwrap();
        let info = server.info();

        assert_eq!(info.bind_address.unwrap().port(), 9000);
        assert!(!info.schedule_enabled);
        assert!(info.display().contains("Schedule: disabled"));
    }

    #[tokio::test]
    async fn test_trigger_not_running_before_start() {
        let server = ShuffleServer::new(Config::default(), memory_store()).unwrap();
        assert!(!server.trigger().is_running().await);
    }
}
