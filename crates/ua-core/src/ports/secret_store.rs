use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretStoreError {
    #[error("secret store failed: {0}")]
    Store(String),
}

/// Platform secret storage for the persisted account blob.
///
/// The manager owns exactly one entry under a fixed key; the key choice
/// belongs to the implementation.
#[async_trait]
pub trait SecretStorePort: Send + Sync {
    /// Load the stored blob, if any.
    async fn read(&self) -> Result<Option<String>, SecretStoreError>;

    /// Store the blob. Must be idempotent (overwrite if exists).
    async fn write(&self, blob: &str) -> Result<(), SecretStoreError>;

    /// Remove the entry. Removing a missing entry is not an error.
    async fn clear(&self) -> Result<(), SecretStoreError>;
}
