//! Time helpers used by the pagination engine (poll cadence) and the bulk
//! upsert loop (read-back delay).

use chrono::Duration;

use crate::entities::Timestamp;

pub fn now() -> Timestamp {
    Timestamp::now()
}

/// Async sleep, tolerant of a negative or absurd duration (treated as a no-op
/// rather than panicking — callers pass config-derived values).
pub async fn sleep(duration: Duration) {
    if let Ok(std_duration) = duration.to_std() {
        tokio::time::sleep(std_duration).await;
    }
}

pub async fn timeout<T>(
    duration: Duration,
    future: impl std::future::Future<Output = T>,
) -> Result<T, tokio::time::error::Elapsed> {
    match duration.to_std() {
        Ok(std_duration) => tokio::time::timeout(std_duration, future).await,
        Err(_) => Ok(future.await),
    }
}
