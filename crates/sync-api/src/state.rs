use std::sync::Arc;

use sea_orm::DatabaseConnection as SeaOrmConnection;
use tokio::sync::RwLock;

use sync_core::crm::CrmAdapter;
use sync_core::queue::DurableQueue;
use sync_core::store::config_store::IntegrationConfigStore;
use sync_core::store::mapping_store::MappingStore;
use sync_core::store::process_store::ProcessStore;
use sync_core::sync::SyncContext;
use sync_core::telephony::TelephonyClient;
use sync_db::{SeaOrmConfigStore, SeaOrmMappingStore, SeaOrmProcessStore};
use sync_telephony::client::{QuoClient, QuoClientConfig};

use crate::services::{CrmAdapterRegistry, ReferenceCrmAdapter, SqsDurableQueue, StaticAdapterRegistry};

/// Application state shared across all request handlers and the background worker.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<crate::config::ApiConfig>,
    pub db: Arc<SeaOrmConnection>,
    pub process_store: Arc<dyn ProcessStore>,
    pub mapping_store: Arc<dyn MappingStore>,
    pub config_store: Arc<dyn IntegrationConfigStore>,
    pub telephony: Arc<dyn TelephonyClient>,
    pub queue: Arc<dyn DurableQueue>,
    /// Concrete handle to the same queue client, for the background worker's
    /// `receive`/`delete` calls, which aren't part of the `DurableQueue` trait.
    pub sqs_queue: Arc<SqsDurableQueue>,
    pub crm_registry: Arc<dyn CrmAdapterRegistry>,
    pub health: Arc<RwLock<HealthState>>,
}

/// Health state tracking.
#[derive(Debug, Clone)]
pub struct HealthState {
    pub database_healthy: bool,
    pub last_check: chrono::DateTime<chrono::Utc>,
    pub startup_time: chrono::DateTime<chrono::Utc>,
    pub version: String,
}

impl AppState {
    pub async fn new(config: crate::config::ApiConfig) -> Result<Self, AppStateError> {
        let db_config = sync_db::DatabaseConfig {
            url: config.database.url.clone(),
            max_connections: config.database.max_connections,
            min_connections: config.database.min_connections,
            connect_timeout_secs: config.database.connect_timeout_secs,
        };
        let db = sync_db::establish_connection(&db_config)
            .await
            .map_err(|e| AppStateError::DatabaseConnection(e.to_string()))?;
        let db = Arc::new(db);

        let process_store: Arc<dyn ProcessStore> =
            Arc::new(SeaOrmProcessStore::new((*db).clone()));
        let mapping_store: Arc<dyn MappingStore> =
            Arc::new(SeaOrmMappingStore::new((*db).clone()));
        let config_store: Arc<dyn IntegrationConfigStore> =
            Arc::new(SeaOrmConfigStore::new((*db).clone()));

        let telephony: Arc<dyn TelephonyClient> = Arc::new(
            QuoClient::new(QuoClientConfig {
                api_key: config.telephony.api_key.clone(),
                base_url: config.telephony.base_url.clone(),
            })
            .map_err(|e| AppStateError::Telephony(e.to_string()))?,
        );

        let sqs_queue = Arc::new(SqsDurableQueue::from_region(&config.queue.aws_region).await);
        let queue: Arc<dyn DurableQueue> = sqs_queue.clone();

        let crm_registry: Arc<dyn CrmAdapterRegistry> = Arc::new(StaticAdapterRegistry::new(
            Arc::new(ReferenceCrmAdapter::default()),
        ));

        let health_state = HealthState {
            database_healthy: true,
            last_check: chrono::Utc::now(),
            startup_time: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        };

        Ok(Self {
            config: Arc::new(config),
            db,
            process_store,
            mapping_store,
            config_store,
            telephony,
            queue,
            sqs_queue,
            crm_registry,
            health: Arc::new(RwLock::new(health_state)),
        })
    }

    /// Builds a `SyncContext` for a single queue message, resolving the CRM
    /// adapter for `integration_id` fresh each time (§9 "cyclic concerns →
    /// message passing" — the adapter is never cached on the context).
    pub async fn sync_context(
        &self,
        integration_id: sync_core::entities::EntityId,
    ) -> sync_core::errors::SyncResult<SyncContext> {
        let crm: Arc<dyn CrmAdapter> = self.crm_registry.resolve(integration_id).await?;
        Ok(SyncContext {
            queue: self.queue.clone(),
            queue_url: self.config.queue.queue_url.clone(),
            process_store: self.process_store.clone(),
            mapping_store: self.mapping_store.clone(),
            config_store: self.config_store.clone(),
            crm,
            telephony: self.telephony.clone(),
        })
    }

    /// Same as [`Self::sync_context`], but for the messages that only carry
    /// a `process_id`: looks the process up first to find its `integration_id`.
    pub async fn sync_context_for_process(
        &self,
        process_id: sync_core::entities::EntityId,
    ) -> sync_core::errors::SyncResult<SyncContext> {
        let process = self.process_store.get_by_id(process_id).await?;
        self.sync_context(process.integration_id).await
    }

    pub async fn health_check(&self) -> HealthCheckResult {
        let mut health = self.health.write().await;

        let db_health = sync_db::check_connection_health(&self.db).await;
        health.database_healthy = db_health.is_connected;
        health.last_check = chrono::Utc::now();

        let current_health = health.clone();
        drop(health);

        let queue_reachable = !self.config.queue.queue_url.is_empty();

        HealthCheckResult {
            healthy: db_health.is_connected && queue_reachable,
            checks: vec![
                HealthCheck {
                    name: "database".to_string(),
                    status: if db_health.is_connected {
                        HealthStatus::Healthy
                    } else {
                        HealthStatus::Unhealthy
                    },
                    message: match (&db_health.response_time_ms, &db_health.error_message) {
                        (Some(ms), _) => format!("connected ({ms}ms round trip)"),
                        (None, Some(err)) => format!("connection failed: {err}"),
                        (None, None) => "connection failed".to_string(),
                    },
                    last_checked: current_health.last_check,
                },
                HealthCheck {
                    name: "queue".to_string(),
                    status: if queue_reachable {
                        HealthStatus::Healthy
                    } else {
                        HealthStatus::Unhealthy
                    },
                    message: if queue_reachable {
                        "durable queue client configured".to_string()
                    } else {
                        "durable queue client not configured".to_string()
                    },
                    last_checked: current_health.last_check,
                },
                HealthCheck {
                    name: "telephony".to_string(),
                    status: if self.config.telephony.api_key.is_empty() {
                        HealthStatus::Degraded
                    } else {
                        HealthStatus::Healthy
                    },
                    message: if self.config.telephony.api_key.is_empty() {
                        "telephony client has no API key configured".to_string()
                    } else {
                        format!("telephony client targets {}", self.config.telephony.base_url)
                    },
                    last_checked: current_health.last_check,
                },
            ],
            uptime: chrono::Utc::now()
                .signed_duration_since(current_health.startup_time)
                .num_seconds(),
            version: current_health.version,
        }
    }

    pub fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    pub async fn uptime(&self) -> i64 {
        let health = self.health.read().await;
        chrono::Utc::now()
            .signed_duration_since(health.startup_time)
            .num_seconds()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppStateError {
    #[error("Failed to establish database connection: {0}")]
    DatabaseConnection(String),
    #[error("Failed to initialize telephony client: {0}")]
    Telephony(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthCheckResult {
    pub healthy: bool,
    pub checks: Vec<HealthCheck>,
    pub uptime: i64,
    pub version: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    pub message: String,
    pub last_checked: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub enum HealthStatus {
    #[serde(rename = "healthy")]
    Healthy,
    #[serde(rename = "unhealthy")]
    Unhealthy,
    #[serde(rename = "degraded")]
    Degraded,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            database_healthy: false,
            last_check: chrono::Utc::now(),
            startup_time: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_state_creation() {
        let health_state = HealthState::default();
        assert_eq!(health_state.version, env!("CARGO_PKG_VERSION"));
        assert!(!health_state.database_healthy);
    }

    #[test]
    fn test_app_state_error_display() {
        let error = AppStateError::Configuration("test error".to_string());
        assert!(error.to_string().contains("Configuration error: test error"));
    }

    #[test]
    fn test_health_status_serialization() {
        let status = HealthStatus::Healthy;
        let serialized = serde_json::to_string(&status).unwrap();
        assert_eq!(serialized, "\"healthy\"");

        let status = HealthStatus::Unhealthy;
        let serialized = serde_json::to_string(&status).unwrap();
        assert_eq!(serialized, "\"unhealthy\"");

        let status = HealthStatus::Degraded;
        let serialized = serde_json::to_string(&status).unwrap();
        assert_eq!(serialized, "\"degraded\"");
    }
}
