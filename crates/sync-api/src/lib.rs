//! # sync-api
//!
//! REST ingress and background worker for the CRM-to-telephony sync engine.
//! Built on Actix-web, it exposes endpoints for triggering sync runs,
//! checking process status, and receiving inbound telephony events, and
//! runs a background worker that drains the durable queue and dispatches
//! each message to its handler in `sync-core`.
//!
//! ## Configuration
//!
//! The server is configured through environment variables. See the
//! [`config`] module for available options.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sync_api::config::ApiConfig;
//! use sync_api::state::AppState;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ApiConfig::from_env()?;
//!     let app_state = AppState::new(config).await?;
//!
//!     // Server and worker setup would go here
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
pub mod workers;

pub use config::{ApiConfig, ConfigError};
pub use middleware::error_handler::{ApiError, ApiResult, ErrorResponse};
pub use state::{AppState, AppStateError, HealthCheckResult, HealthStatus};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const API_VERSION: &str = "v1";
pub const SERVICE_NAME: &str = "sync-api";

/// Build information (available at compile time).
pub mod build_info {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const GIT_COMMIT: Option<&str> = option_env!("GIT_COMMIT");
    pub const BUILD_DATE: Option<&str> = option_env!("BUILD_DATE");
}

/// Prelude module for common imports.
pub mod prelude {
    pub use crate::{
        config::{ApiConfig, ConfigError},
        middleware::error_handler::{ApiError, ApiResult},
        state::{AppState, AppStateError},
        API_VERSION, SERVICE_NAME, VERSION,
    };

    pub use actix_web::{
        middleware::{DefaultHeaders, Logger},
        web, App, HttpRequest, HttpResponse, HttpServer, Result as ActixResult,
    };

    pub use chrono::{DateTime, Utc};
    pub use serde::{Deserialize, Serialize};
    pub use serde_json;
    pub use tokio;
    pub use uuid::Uuid;
}
