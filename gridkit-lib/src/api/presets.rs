//! PresetBackend for GridClient

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::GridClient;
use crate::error::ApiError;
use crate::error::Error;
use crate::presets::PresetBackend;
use crate::presets::PresetKind;
use crate::presets::SavedPreset;
use crate::query::QueryParams;

#[async_trait]
impl PresetBackend for GridClient {
    async fn list(&self, kind: PresetKind) -> Result<Vec<SavedPreset>, Error> {
        let body = self.get_json(&kind.path(), &QueryParams::new()).await?;
        let items = match body {
            Value::Array(items) => items,
            Value::Object(mut object) => match object.remove("results") {
                Some(Value::Array(items)) => items,
                _ => return Err(ApiError::parse("preset list has no `results`").into()),
            },
            other => {
                return Err(ApiError::parse_with_body("unexpected preset list", other.to_string()).into());
            }
        };

        // one malformed entry must not hide the rest
        Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<SavedPreset>(item) {
                Ok(preset) => Some(preset),
                Err(e) => {
                    log::warn!("skipping malformed {} preset: {e}", kind.as_str());
                    None
                }
            })
            .collect())
    }

    async fn save(&self, kind: PresetKind, preset: &SavedPreset) -> Result<(), Error> {
        let body = serde_json::to_value(preset)?;
        self.send_json(Method::POST, &kind.path(), Some(&body)).await?;
        Ok(())
    }

    async fn delete(&self, kind: PresetKind, name: &str, storage_key: &str) -> Result<(), Error> {
        let mut params = QueryParams::new();
        params.push("name", name);
        params.push("storage_key", storage_key);
        let path = format!("{}?{}", kind.path(), params.to_query_string());
        self.send_json(Method::DELETE, &path, None).await?;
        Ok(())
    }
}
