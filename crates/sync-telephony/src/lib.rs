//! # sync-telephony
//!
//! HTTP client for the downstream telephony platform's opaque RPC surface.
//! Implements `sync_core::telephony::TelephonyClient` over the platform's
//! REST API: contact upsert (single and bulk), phone number listing, and
//! webhook subscription management.

pub mod client;
pub mod error;
pub mod types;

pub use client::{QuoClient, QuoClientConfig};
pub use error::QuoApiError;
