//! Pagination state and list responses

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::model::Row;

/// Page position. `page_index` is 0-based; the backend sees it 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page_index: usize,
    pub page_size: usize,
}

impl Pagination {
    pub fn new(page_index: usize, page_size: usize) -> Self {
        Self {
            page_index,
            page_size,
        }
    }

    /// Number of pages needed for `count` rows.
    pub fn page_count(&self, count: usize) -> usize {
        if self.page_size == 0 {
            return 0;
        }
        count.div_ceil(self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(0, 10)
    }
}

/// One page of rows plus the total row count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResponse {
    pub results: Vec<Row>,
    pub count: usize,
}

impl PageResponse {
    pub fn new(results: Vec<Row>, count: usize) -> Self {
        Self { results, count }
    }

    /// Normalizes a list response.
    ///
    /// Accepts either a bare array of rows (count is its length) or a
    /// `{results, count}` envelope (count falls back to the results length).
    pub fn from_json(value: Value) -> Result<Self, ApiError> {
        match value {
            Value::Array(items) => {
                let results = rows_from(items)?;
                let count = results.len();
                Ok(Self { results, count })
            }
            Value::Object(mut object) => {
                let items = match object.remove("results") {
                    Some(Value::Array(items)) => items,
                    Some(other) => {
                        return Err(ApiError::parse_with_body(
                            "`results` is not an array",
                            other.to_string(),
                        ));
                    }
                    None => {
                        return Err(ApiError::parse_with_body(
                            "list response has no `results`",
                            Value::Object(object).to_string(),
                        ));
                    }
                };
                let results = rows_from(items)?;
                let count = object
                    .get("count")
                    .and_then(Value::as_u64)
                    .map_or(results.len(), |c| c as usize);
                Ok(Self { results, count })
            }
            other => Err(ApiError::parse_with_body(
                "list response is neither an array nor an object",
                other.to_string(),
            )),
        }
    }
}

fn rows_from(items: Vec<Value>) -> Result<Vec<Row>, ApiError> {
    items
        .into_iter()
        .map(|item| Row::from_value(item).map_err(|e| ApiError::parse(e.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bare_array() {
        let page = PageResponse::from_json(json!([{"id": 1}, {"id": 2}])).unwrap();
        assert_eq!(page.count, 2);
        assert_eq!(page.results.len(), 2);
    }

    #[test]
    fn test_envelope() {
        let page = PageResponse::from_json(json!({"results": [{"id": 1}], "count": 37})).unwrap();
        assert_eq!(page.count, 37);
        assert_eq!(page.results[0].id().unwrap().as_str(), "1");
    }

    #[test]
    fn test_rejects_scalars() {
        assert!(PageResponse::from_json(json!("nope")).is_err());
        assert!(PageResponse::from_json(json!({"items": []})).is_err());
        assert!(PageResponse::from_json(json!([1, 2])).is_err());
    }

    #[test]
    fn test_page_count() {
        assert_eq!(Pagination::new(0, 10).page_count(37), 4);
        assert_eq!(Pagination::new(0, 10).page_count(0), 0);
    }
}
