//! Relational storage for the page configuration table.

/// Connection string to engine URL conversion.
pub mod connstring;
/// PostgreSQL store performing the full-replace write.
pub mod postgres;
