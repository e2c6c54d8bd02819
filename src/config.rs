//! Run configuration loaded from environment variables.

use crate::error::{Error, Result};

/// Configuration for one report sync, grouped once per run.
///
/// All fields are required and have no defaults; a missing variable is a
/// fatal startup error raised before any network call.
#[derive(Debug, Clone)]
pub struct ReportInstance {
    /// Azure AD application (client) id.
    pub client_id: String,
    /// Azure AD application secret.
    pub client_secret: String,
    /// Azure AD tenant id.
    pub tenant_id: String,
    /// Power BI workspace (group) id containing the report.
    pub workspace_id: String,
    /// Power BI report id whose pages are synced.
    pub report_id: String,
}

impl ReportInstance {
    /// Load the instance from the process environment.
    ///
    /// Environment variables:
    /// - `AZURE_CLIENT_ID`: client id for Azure AD authentication
    /// - `AZURE_CLIENT_SECRET`: client secret for Azure AD authentication
    /// - `AZURE_TENANT_ID`: tenant id for Azure AD authentication
    /// - `WORKSPACE_ID`: Power BI workspace containing the report
    /// - `REPORT_ID`: Power BI report whose pages are listed
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |name: &'static str| lookup(name).ok_or(Error::Config(name));

        Ok(Self {
            client_id: require("AZURE_CLIENT_ID")?,
            client_secret: require("AZURE_CLIENT_SECRET")?,
            tenant_id: require("AZURE_TENANT_ID")?,
            workspace_id: require("WORKSPACE_ID")?,
            report_id: require("REPORT_ID")?,
        })
    }
}
