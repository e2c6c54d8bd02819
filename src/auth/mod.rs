/// Client-credentials token acquisition against Azure AD.
pub mod credentials;
