//! RowBackend for GridClient

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Map;
use serde_json::Value;

use super::RowBackend;
use crate::GridClient;
use crate::client::collection_path;
use crate::client::record_path;
use crate::error::ApiError;
use crate::error::Error;
use crate::model::Row;
use crate::model::RowId;
use crate::query::PageResponse;
use crate::query::QueryParams;

#[async_trait]
impl RowBackend for GridClient {
    async fn list(&self, endpoint: &str, params: &QueryParams) -> Result<PageResponse, Error> {
        let body = self.get_json(endpoint, params).await?;
        Ok(PageResponse::from_json(body)?)
    }

    async fn create(&self, endpoint: &str, fields: &Map<String, Value>) -> Result<Row, Error> {
        let body = Value::Object(fields.clone());
        let created = self
            .send_json(Method::POST, &collection_path(endpoint), Some(&body))
            .await?;
        Row::from_value(created).map_err(|e| ApiError::parse(e.to_string()).into())
    }

    async fn patch(
        &self,
        endpoint: &str,
        id: &RowId,
        fields: &Map<String, Value>,
    ) -> Result<Option<Row>, Error> {
        let body = Value::Object(fields.clone());
        let updated = self
            .send_json(Method::PATCH, &record_path(endpoint, id.as_str()), Some(&body))
            .await?;
        match updated {
            Value::Object(map) => Ok(Some(Row::from_map(map))),
            _ => Ok(None),
        }
    }

    async fn delete(&self, endpoint: &str, id: &RowId) -> Result<(), Error> {
        self.send_json(Method::DELETE, &record_path(endpoint, id.as_str()), None)
            .await?;
        Ok(())
    }
}
