//! OptionSource for GridClient

use async_stream::try_stream;
use async_trait::async_trait;
use futures::Stream;
use futures::StreamExt;
use futures::pin_mut;
use serde_json::Value;

use super::OptionSource;
use crate::GridClient;
use crate::error::Error;
use crate::model::ScopedOption;
use crate::model::value_as_string;
use crate::query::PageResponse;
use crate::query::QueryParams;

/// Pages through an option endpoint until it is exhausted.
///
/// Each item is one page of options. Paging stops when the envelope's
/// `next` link is null, when a page comes back short, or when `count`
/// options have been seen.
///
/// # Example
///
/// ```ignore
/// let pages = option_pages(&client, "/api/kilns/");
/// pin_mut!(pages);
/// while let Some(page) = pages.next().await {
///     for option in page? {
///         println!("{} {}", option.id, option.label);
///     }
/// }
/// ```
pub fn option_pages<'a>(
    client: &'a GridClient,
    endpoint: &'a str,
) -> impl Stream<Item = Result<Vec<ScopedOption>, Error>> + 'a {
    try_stream! {
        let page_size = client.option_page_size();
        let mut page = 1usize;
        let mut seen = 0usize;

        loop {
            let mut params = QueryParams::new();
            params.push("page", page.to_string());
            params.push("page_size", page_size.to_string());

            let body = client.get_json(endpoint, &params).await?;
            let has_next = body.get("next").map(|next| !next.is_null());
            let response = PageResponse::from_json(body)?;
            let fetched = response.results.len();
            seen += fetched;

            let options: Vec<ScopedOption> = response
                .results
                .into_iter()
                .filter_map(|row| ScopedOption::from_value(&Value::Object(row.into_map())))
                .collect();
            yield options;

            let exhausted = match has_next {
                Some(next) => !next,
                None => fetched < page_size || seen >= response.count,
            };
            if exhausted || fetched == 0 {
                break;
            }
            page += 1;
        }
    }
}

#[async_trait]
impl OptionSource for GridClient {
    async fn fetch_options(&self, endpoint: &str) -> Result<Vec<ScopedOption>, Error> {
        let pages = option_pages(self, endpoint);
        pin_mut!(pages);

        let mut options = Vec::new();
        while let Some(page) = pages.next().await {
            options.extend(page?);
        }
        log::debug!("loaded {} options from {endpoint}", options.len());
        Ok(options)
    }

    async fn fetch_tag_suggestions(
        &self,
        endpoint: &str,
        scope_id: &str,
        model_name: &str,
    ) -> Result<Vec<String>, Error> {
        let mut params = QueryParams::new();
        params.push("scope", scope_id);
        params.push("model", model_name);

        let body = self.get_json(endpoint, &params).await?;
        let items = match body {
            Value::Object(mut object) => match object.remove("results") {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            Value::Array(items) => items,
            _ => Vec::new(),
        };

        Ok(items.iter().filter_map(tag_name).collect())
    }
}

/// A tag is a bare string or an object with a `name`.
fn tag_name(item: &Value) -> Option<String> {
    match item {
        Value::Object(object) => object.get("name").and_then(value_as_string),
        other => value_as_string(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tag_name_forms() {
        assert_eq!(tag_name(&json!("urgent")).as_deref(), Some("urgent"));
        assert_eq!(tag_name(&json!({"id": 1, "name": "rework"})).as_deref(), Some("rework"));
        assert_eq!(tag_name(&json!({"id": 1})), None);
    }
}
