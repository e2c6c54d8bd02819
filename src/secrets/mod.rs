//! Secret store access for connection credentials.

/// Azure Key Vault backed secret store.
pub mod keyvault;

use async_trait::async_trait;

use crate::error::Result;

/// Named-secret lookup capability.
///
/// Injected so the pipeline can be exercised without contacting a real
/// vault.
#[async_trait]
pub trait SecretStore {
    /// Resolve a named secret to its string value.
    async fn resolve(&self, name: &str) -> Result<String>;
}
