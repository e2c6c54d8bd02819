use async_trait::async_trait;
use reqwest::Client;

use crate::auth::credentials::{VAULT_SCOPE, fetch_client_credentials_token};
use crate::error::{Error, Result};
use crate::secrets::SecretStore;

/// Vault holding the warehouse connection string.
pub const DEFAULT_VAULT_URL: &str = "https://qvh-keyvault.vault.azure.net/";

const SECRETS_API_VERSION: &str = "7.4";

/// Secret bundle returned by the vault secrets endpoint.
#[derive(Debug, serde::Deserialize)]
struct SecretBundle {
    value: Option<String>,
}

/// Azure Key Vault secret store.
///
/// Authenticates with ambient environment credentials (`AZURE_CLIENT_ID`,
/// `AZURE_CLIENT_SECRET`, `AZURE_TENANT_ID`); nothing is passed explicitly.
pub struct KeyVault {
    client: Client,
    vault_url: String,
}

impl KeyVault {
    /// Create a store for the given vault endpoint.
    pub fn new(vault_url: &str) -> Self {
        Self {
            client: Client::new(),
            vault_url: vault_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SecretStore for KeyVault {
    async fn resolve(&self, name: &str) -> Result<String> {
        let token = ambient_token().await?;
        let url = format!(
            "{}/secrets/{}?api-version={}",
            self.vault_url, name, SECRETS_API_VERSION
        );

        tracing::debug!(secret = name, "resolving vault secret");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::Credential(format!("vault request failed: {e}")))?;

        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Credential(format!(
                "vault returned {status} for secret {name}: {body}"
            )));
        }

        let bundle: SecretBundle = resp
            .json()
            .await
            .map_err(|e| Error::Protocol(format!("failed to parse vault response: {e}")))?;

        secret_value(name, bundle)
    }
}

/// Exchange the ambient environment credentials for a vault-scoped token.
async fn ambient_token() -> Result<String> {
    let client_id = ambient_var("AZURE_CLIENT_ID")?;
    let client_secret = ambient_var("AZURE_CLIENT_SECRET")?;
    let tenant_id = ambient_var("AZURE_TENANT_ID")?;

    fetch_client_credentials_token(&client_id, &client_secret, &tenant_id, VAULT_SCOPE).await
}

fn ambient_var(name: &'static str) -> Result<String> {
    std::env::var(name).map_err(|_| Error::Config(name))
}

/// Reject missing or empty secret values.
fn secret_value(name: &str, bundle: SecretBundle) -> Result<String> {
    match bundle.value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(Error::Credential(format!(
            "secret {name} not found or empty, check the vault"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn bundle(body: serde_json::Value) -> SecretBundle {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn extracts_secret_value() {
        let body = json!({
            "value": "Server=db;Database=dw;Uid=loader;Pwd=hunter2",
            "id": "https://qvh-keyvault.vault.azure.net/secrets/public-dataflow-connectionstring/1"
        });

        let value = secret_value("public-dataflow-connectionstring", bundle(body)).unwrap();
        assert_eq!(value, "Server=db;Database=dw;Uid=loader;Pwd=hunter2");
    }

    #[test]
    fn empty_secret_is_a_credential_error() {
        let err =
            secret_value("public-dataflow-connectionstring", bundle(json!({"value": ""})))
                .unwrap_err();
        assert!(matches!(err, Error::Credential(_)));
    }

    #[test]
    fn null_secret_is_a_credential_error() {
        let err =
            secret_value("public-dataflow-connectionstring", bundle(json!({"value": null})))
                .unwrap_err();
        assert!(matches!(err, Error::Credential(_)));
    }

    #[test]
    fn missing_value_field_is_a_credential_error() {
        let err = secret_value("public-dataflow-connectionstring", bundle(json!({}))).unwrap_err();
        assert!(matches!(err, Error::Credential(_)));
    }
}
