use reqwest::Client;
use serde_json::Value;

use crate::config::ReportInstance;
use crate::error::{Error, Result};

/// Default Power BI REST API host.
pub const DEFAULT_API_BASE: &str = "https://api.powerbi.com";

/// HTTP client for Power BI REST API operations.
pub struct ServiceClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ServiceClient {
    /// Create a new client for the given base URL and access token.
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    /// List the pages of a report, returning the raw decoded JSON body.
    pub async fn list_pages(&self, instance: &ReportInstance) -> Result<Value> {
        let url = format!(
            "{}/v1.0/myorg/groups/{}/reports/{}/pages",
            self.base_url, instance.workspace_id, instance.report_id
        );

        tracing::debug!(%url, "listing report pages");

        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::Api(format!("request failed: {e}")))?;

        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api(format!(
                "pages endpoint returned {status}: {body}"
            )));
        }

        resp.json()
            .await
            .map_err(|e| Error::Protocol(format!("failed to parse pages response: {e}")))
    }
}
