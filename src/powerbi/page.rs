use std::cmp::Ordering;

use serde_json::{Map, Value};

use crate::error::{Error, Result};

/// One report page as returned by the API, passed through unmodified.
pub type Page = Map<String, Value>;

/// Field the API uses for a page's position within its report.
pub const ORDER_FIELD: &str = "order";

/// Parse page records from a Power BI list response.
///
/// The body is `{"value": [ ... ]}`; each element is kept as-is, no field
/// validation beyond the object shape.
pub fn parse_pages_from_response(json: &Value) -> Result<Vec<Page>> {
    let response_object = json
        .as_object()
        .ok_or_else(|| Error::Protocol("response body is not a JSON object".to_string()))?;

    let response_array = response_object
        .get("value")
        .ok_or_else(|| Error::Protocol("no value array in pages response".to_string()))?
        .as_array()
        .ok_or_else(|| Error::Protocol("value is not an array".to_string()))?;

    let mut pages: Vec<Page> = Vec::with_capacity(response_array.len());

    for record_value in response_array {
        let record = record_value
            .as_object()
            .ok_or_else(|| Error::Protocol("page record is not a JSON object".to_string()))?;

        pages.push(record.clone());
    }

    Ok(pages)
}

/// Sort pages by descending `order`.
///
/// The sort is stable; pages without a numeric `order` sort after every
/// ordered page.
pub fn sort_pages_by_order_desc(pages: &mut [Page]) {
    pages.sort_by(|a, b| match (order_key(a), order_key(b)) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
}

fn order_key(page: &Page) -> Option<f64> {
    page.get(ORDER_FIELD).and_then(Value::as_f64)
}
