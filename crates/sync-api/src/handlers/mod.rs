pub mod health;
pub mod sync;
pub mod webhooks;

pub use health::*;
