use std::collections::HashMap;

use reqwest::Client;
use serde_json::Value;

use crate::error::{Error, Result};

/// OAuth2 scope granting access to the Power BI REST API.
pub const POWERBI_SCOPE: &str = "https://analysis.windows.net/powerbi/api/.default";

/// OAuth2 scope granting access to Azure Key Vault.
pub const VAULT_SCOPE: &str = "https://vault.azure.net/.default";

/// Default Azure AD authority host.
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Fetch a bearer token via the client-credentials grant.
///
/// The token is used exactly once per run; no caching, no refresh.
pub async fn fetch_client_credentials_token(
    client_id: &str,
    client_secret: &str,
    tenant_id: &str,
    scope: &str,
) -> Result<String> {
    fetch_client_credentials_token_from(
        DEFAULT_AUTHORITY,
        client_id,
        client_secret,
        tenant_id,
        scope,
    )
    .await
}

/// Same as [`fetch_client_credentials_token`] with an explicit authority host.
pub async fn fetch_client_credentials_token_from(
    authority: &str,
    client_id: &str,
    client_secret: &str,
    tenant_id: &str,
    scope: &str,
) -> Result<String> {
    let client = Client::new();
    let token_url = format!(
        "{}/{}/oauth2/v2.0/token",
        authority.trim_end_matches('/'),
        tenant_id
    );

    let mut params = HashMap::new();
    params.insert("client_id", client_id);
    params.insert("client_secret", client_secret);
    params.insert("scope", scope);
    params.insert("grant_type", "client_credentials");

    let resp = client
        .post(&token_url)
        .form(&params)
        .send()
        .await
        .map_err(|e| Error::Auth(format!("token request failed: {e}")))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Auth(format!(
            "token endpoint returned {status}: {body}"
        )));
    }

    let json: Value = resp
        .json()
        .await
        .map_err(|e| Error::Protocol(format!("failed to parse token response: {e}")))?;

    extract_access_token(&json)
}

/// Pull the `access_token` field out of a token endpoint response.
pub(crate) fn extract_access_token(json: &Value) -> Result<String> {
    let access_token = json
        .get("access_token")
        .and_then(|v| v.as_str())
        .ok_or_else(|| Error::Protocol("no access_token in token response".to_string()))?;

    if access_token.trim().is_empty() {
        return Err(Error::Protocol("access token was empty".to_string()));
    }

    Ok(access_token.to_string())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extracts_token_from_provider_response() {
        let body = json!({
            "token_type": "Bearer",
            "expires_in": 3599,
            "access_token": "tok123"
        });

        assert_eq!(extract_access_token(&body).unwrap(), "tok123");
    }

    #[test]
    fn missing_access_token_is_a_protocol_error() {
        let body = json!({"token_type": "Bearer"});
        let err = extract_access_token(&body).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn blank_access_token_is_a_protocol_error() {
        let body = json!({"access_token": "   "});
        let err = extract_access_token(&body).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}
