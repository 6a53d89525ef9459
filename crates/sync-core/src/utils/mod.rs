//! Small framework-agnostic helpers shared across the sync engine.

pub mod serialization;
pub mod time;

pub use serialization::*;
pub use time::*;