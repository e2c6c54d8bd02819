//! The end-to-end sync run.
//!
//! Token, page list, sort, secret, replace-write, in that order. The first
//! error aborts the run; upstream failures never touch the table because the
//! write comes last.

use tracing::info;

use crate::auth::credentials::{POWERBI_SCOPE, fetch_client_credentials_token};
use crate::config::ReportInstance;
use crate::error::Result;
use crate::powerbi::page::{parse_pages_from_response, sort_pages_by_order_desc};
use crate::powerbi::serviceclient::{DEFAULT_API_BASE, ServiceClient};
use crate::secrets::SecretStore;
use crate::secrets::keyvault::{DEFAULT_VAULT_URL, KeyVault};
use crate::storage::connstring::engine_url;
use crate::storage::postgres::PagesStore;

/// Vault secret holding the warehouse connection string.
pub const CONNECTION_STRING_SECRET: &str = "public-dataflow-connectionstring";

/// Run one sync: fetch the report's pages and replace the config table.
pub async fn run(instance: &ReportInstance) -> Result<()> {
    let token = fetch_client_credentials_token(
        &instance.client_id,
        &instance.client_secret,
        &instance.tenant_id,
        POWERBI_SCOPE,
    )
    .await?;
    info!("acquired Power BI access token");

    let client = ServiceClient::new(DEFAULT_API_BASE, &token);
    let body = client.list_pages(instance).await?;

    let mut pages = parse_pages_from_response(&body)?;
    sort_pages_by_order_desc(&mut pages);
    info!(pages = pages.len(), "fetched report pages");

    let store = connect_store(&KeyVault::new(DEFAULT_VAULT_URL)).await?;
    let written = store.replace_pages(&pages).await;
    store.close().await;
    written
}

/// Acquire the store from the vault-resolved connection string.
pub async fn connect_store(secrets: &dyn SecretStore) -> Result<PagesStore> {
    let connstr = secrets.resolve(CONNECTION_STRING_SECRET).await?;
    PagesStore::connect(&engine_url(&connstr)?).await
}
