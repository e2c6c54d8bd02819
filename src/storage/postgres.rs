use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::info;

use crate::error::{Error, Result};
use crate::powerbi::page::Page;

/// Schema holding the destination table.
pub const PAGES_CONFIG_SCHEMA: &str = "scd";

/// Destination table for the page configuration.
pub const PAGES_CONFIG_TABLE: &str = "PBIPagesConfig";

/// PostgreSQL store for the page configuration table.
#[derive(Debug)]
pub struct PagesStore {
    pool: PgPool,
}

impl PagesStore {
    /// Connect to the database behind the given engine URL.
    ///
    /// The run is sequential; a single connection is enough.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .map_err(|e| Error::Storage(format!("failed to connect: {e}")))?;

        Ok(Self { pool })
    }

    /// Replace the destination table's contents with the given pages.
    ///
    /// Drop, recreate, and insert run in one transaction. The column set is
    /// data-driven: whatever fields the page records carry, in first-seen
    /// order. Zero pages still recreate the table, leaving it empty.
    pub async fn replace_pages(&self, pages: &[Page]) -> Result<()> {
        let columns = infer_columns(pages);
        let table = qualified_table();

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {table}"))
            .execute(&mut *tx)
            .await?;

        sqlx::query(&create_table_sql(&table, &columns))
            .execute(&mut *tx)
            .await?;

        if !pages.is_empty() && !columns.is_empty() {
            let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(insert_prefix(&table, &columns));

            qb.push_values(pages, |mut b, page| {
                for column in &columns {
                    let value = page.get(&column.name).unwrap_or(&Value::Null);
                    match column.ty {
                        ColumnType::BigInt => b.push_bind(value.as_i64()),
                        ColumnType::Double => b.push_bind(value.as_f64()),
                        ColumnType::Boolean => b.push_bind(value.as_bool()),
                        ColumnType::Text => b.push_bind(value.as_str().map(str::to_string)),
                        ColumnType::Json => b.push_bind(if value.is_null() {
                            None
                        } else {
                            Some(value.clone())
                        }),
                    };
                }
            });

            qb.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;

        info!(rows = pages.len(), %table, "replaced page configuration");
        Ok(())
    }

    /// Close the pool, waiting for the connection to be released.
    pub async fn close(self) {
        self.pool.close().await;
    }
}

/// SQL column type inferred from the values a page field carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnType {
    BigInt,
    Double,
    Boolean,
    Text,
    Json,
}

impl ColumnType {
    fn sql(self) -> &'static str {
        match self {
            ColumnType::BigInt => "BIGINT",
            ColumnType::Double => "DOUBLE PRECISION",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Text => "TEXT",
            ColumnType::Json => "JSONB",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Column {
    name: String,
    ty: ColumnType,
}

/// Union of page fields in first-seen order, with inferred types.
///
/// Fields holding only nulls fall back to TEXT.
fn infer_columns(pages: &[Page]) -> Vec<Column> {
    let mut names: Vec<String> = Vec::new();
    let mut types: Vec<Option<ColumnType>> = Vec::new();

    for page in pages {
        for (name, value) in page {
            let index = match names.iter().position(|n| n == name) {
                Some(index) => index,
                None => {
                    names.push(name.clone());
                    types.push(None);
                    names.len() - 1
                }
            };

            if let Some(ty) = value_type(value) {
                types[index] = Some(match types[index] {
                    Some(existing) => merge(existing, ty),
                    None => ty,
                });
            }
        }
    }

    names
        .into_iter()
        .zip(types)
        .map(|(name, ty)| Column {
            name,
            ty: ty.unwrap_or(ColumnType::Text),
        })
        .collect()
}

fn value_type(value: &Value) -> Option<ColumnType> {
    match value {
        Value::Null => None,
        Value::Bool(_) => Some(ColumnType::Boolean),
        Value::Number(n) if n.is_i64() => Some(ColumnType::BigInt),
        Value::Number(_) => Some(ColumnType::Double),
        Value::String(_) => Some(ColumnType::Text),
        Value::Array(_) | Value::Object(_) => Some(ColumnType::Json),
    }
}

fn merge(a: ColumnType, b: ColumnType) -> ColumnType {
    match (a, b) {
        (a, b) if a == b => a,
        (ColumnType::BigInt, ColumnType::Double) | (ColumnType::Double, ColumnType::BigInt) => {
            ColumnType::Double
        }
        _ => ColumnType::Json,
    }
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn qualified_table() -> String {
    format!(
        "{}.{}",
        quote_ident(PAGES_CONFIG_SCHEMA),
        quote_ident(PAGES_CONFIG_TABLE)
    )
}

fn create_table_sql(table: &str, columns: &[Column]) -> String {
    let definitions: Vec<String> = columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), c.ty.sql()))
        .collect();

    format!("CREATE TABLE {} ({})", table, definitions.join(", "))
}

fn insert_prefix(table: &str, columns: &[Column]) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_ident(&c.name)).collect();
    format!("INSERT INTO {} ({}) ", table, names.join(", "))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn pages(body: Value) -> Vec<Page> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_object().unwrap().clone())
            .collect()
    }

    #[test]
    fn columns_follow_first_seen_order() {
        let pages = pages(json!([
            {"name": "Page1", "order": 2},
            {"name": "Page2", "order": 5, "displayName": "Detail"}
        ]));

        let columns = infer_columns(&pages);
        let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["name", "order", "displayName"]);
    }

    #[test]
    fn types_are_inferred_from_values() {
        let pages = pages(json!([
            {"name": "p", "order": 1, "weight": 0.5, "hidden": false, "tags": ["a"]}
        ]));

        let columns = infer_columns(&pages);
        let types: Vec<ColumnType> = columns.iter().map(|c| c.ty).collect();
        assert_eq!(
            types,
            vec![
                ColumnType::Text,
                ColumnType::BigInt,
                ColumnType::Double,
                ColumnType::Boolean,
                ColumnType::Json,
            ]
        );
    }

    #[test]
    fn mixed_integer_and_float_widen_to_double() {
        let pages = pages(json!([{"order": 1}, {"order": 1.5}]));
        assert_eq!(infer_columns(&pages)[0].ty, ColumnType::Double);
    }

    #[test]
    fn conflicting_types_fall_back_to_jsonb() {
        let pages = pages(json!([{"order": 1}, {"order": "first"}]));
        assert_eq!(infer_columns(&pages)[0].ty, ColumnType::Json);
    }

    #[test]
    fn all_null_fields_fall_back_to_text() {
        let pages = pages(json!([{"note": null}, {"note": null}]));
        assert_eq!(infer_columns(&pages)[0].ty, ColumnType::Text);
    }

    #[test]
    fn create_table_quotes_reserved_identifiers() {
        let pages = pages(json!([{"name": "Page1", "order": 2}]));
        let sql = create_table_sql(&qualified_table(), &infer_columns(&pages));
        assert_eq!(
            sql,
            "CREATE TABLE \"scd\".\"PBIPagesConfig\" (\"name\" TEXT, \"order\" BIGINT)"
        );
    }

    #[test]
    fn zero_pages_produce_a_zero_column_table() {
        let sql = create_table_sql(&qualified_table(), &infer_columns(&[]));
        assert_eq!(sql, "CREATE TABLE \"scd\".\"PBIPagesConfig\" ()");
    }

    #[test]
    fn insert_prefix_lists_quoted_columns() {
        let pages = pages(json!([{"name": "Page1", "order": 2}]));
        let prefix = insert_prefix(&qualified_table(), &infer_columns(&pages));
        assert_eq!(
            prefix,
            "INSERT INTO \"scd\".\"PBIPagesConfig\" (\"name\", \"order\") "
        );
    }
}
