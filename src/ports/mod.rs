//! Outbound ports for the migration driver.

use crate::domain::error::Error;
use async_trait::async_trait;
use serde_json::Value;

/// JSON-RPC transport seam.
///
/// Every RPC namespace is generic over this trait so tests can substitute a
/// scripted double for the HTTP client.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform a single JSON-RPC request and return the `result` member.
    async fn request(&self, method: &str, params: Value) -> Result<Value, Error>;
}

/// Time source trait for testability
pub trait TimeSource: Send + Sync {
    /// Wall-clock seconds since the Unix epoch.
    fn now(&self) -> u64;
}

/// System time implementation
#[derive(Debug, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs())
            // Clock before Unix epoch - return 0 rather than panic
            .unwrap_or(0)
    }
}
