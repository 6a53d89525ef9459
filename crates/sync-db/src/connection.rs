//! Database connection management: the one place a `sea_orm::DatabaseConnection`
//! gets built from a [`DatabaseConfig`], shared by every caller of this crate.

use crate::config::DatabaseConfig;
use crate::error::Result;
use sea_orm::{ConnectOptions, Database, DatabaseConnection as SeaOrmConnection};
use std::time::Duration;

pub type DatabaseConnection = SeaOrmConnection;

/// Establish a pooled connection per `config`.
pub async fn establish_connection(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    let mut connect_options = ConnectOptions::new(config.url.as_str());
    connect_options
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs));

    tracing::info!("establishing database connection");
    let connection = Database::connect(connect_options).await?;
    tracing::info!("database connection established");
    Ok(connection)
}

/// Connection health, measured with a round-trip ping.
#[derive(Debug, Clone)]
pub struct ConnectionHealth {
    pub is_connected: bool,
    pub response_time_ms: Option<u64>,
    pub error_message: Option<String>,
}

pub async fn check_connection_health(connection: &DatabaseConnection) -> ConnectionHealth {
    let start = std::time::Instant::now();
    match connection.ping().await {
        Ok(_) => ConnectionHealth {
            is_connected: true,
            response_time_ms: Some(start.elapsed().as_millis() as u64),
            error_message: None,
        },
        Err(e) => ConnectionHealth {
            is_connected: false,
            response_time_ms: None,
            error_message: Some(e.to_string()),
        },
    }
}
