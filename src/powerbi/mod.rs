/// Report page records and ordering helpers.
pub mod page;
/// HTTP client for the Power BI REST API.
pub mod serviceclient;
