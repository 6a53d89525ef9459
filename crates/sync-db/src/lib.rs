//! Sync Database Layer
//!
//! Persistence for the sync engine's three durable stores — Process,
//! contact mapping, and integration config — backed by SeaORM over
//! PostgreSQL. Schema is managed externally (plain SQL migrations run
//! ahead of deploy); this crate only reads and writes.

pub mod config;
pub mod connection;
pub mod entities;
pub mod repositories;
pub mod error;

// Re-export commonly used types
pub use config::DatabaseConfig;
pub use connection::{check_connection_health, establish_connection, ConnectionHealth, DatabaseConnection};
pub use error::{DatabaseError, Result};
pub use repositories::{SeaOrmConfigStore, SeaOrmMappingStore, SeaOrmProcessStore};

// Re-export SeaORM types for convenience
pub use sea_orm::{
    Database, DatabaseConnection as SeaOrmConnection, EntityTrait, QueryFilter,
    QuerySelect, QueryOrder, PaginatorTrait, Condition, Set, ActiveModelTrait,
    ConnectionTrait, TransactionTrait, Statement, Value, JsonValue
};