//! # Storage Traits
//!
//! The family store only ever needs a string-to-string key-value collaborator:
//! each logical collection is written back wholesale as a JSON snapshot.

use anyhow::Result;
use async_trait::async_trait;

/// Trait defining the interface for the key-value persistence collaborator
///
/// Implementations must make `put_value` overwrite any existing value for the
/// same key.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Retrieve a value by its key, `None` if it was never stored
    async fn get_value(&self, key: &str) -> Result<Option<String>>;

    /// Store a value, replacing whatever was stored under the key
    async fn put_value(&self, key: &str, value: &str) -> Result<()>;
}
