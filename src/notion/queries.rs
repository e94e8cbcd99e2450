//! Request bodies for the database query and page update endpoints.

use serde_json::{json, Value};

/// Filter matching records whose date property is empty and whose status is
/// any of `complete_selects`.
pub fn completion_filter(
    datetime_field: &str,
    status_column: &str,
    complete_selects: &[String],
) -> Value {
    let any_status: Vec<Value> = complete_selects
        .iter()
        .map(|value| json!({"property": status_column, "select": {"equals": value}}))
        .collect();
    json!({
        "and": [
            {"property": datetime_field, "date": {"is_empty": true}},
            {"or": any_status},
        ]
    })
}

/// Body for `POST /v1/databases/{id}/query`. `start_cursor` is only sent
/// when continuing a paginated result.
pub fn query_body(filter: &Value, start_cursor: Option<&str>) -> Value {
    match start_cursor {
        Some(cursor) => json!({"filter": filter, "start_cursor": cursor}),
        None => json!({"filter": filter}),
    }
}

/// Body for `PATCH /v1/pages/{id}` setting the date property's start.
pub fn completion_patch(datetime_field: &str, start: &str) -> Value {
    json!({
        "properties": {
            datetime_field: {"date": {"start": start}}
        }
    })
}
