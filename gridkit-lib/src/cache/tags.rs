//! Tag suggestion cache

use std::sync::Arc;
use std::sync::RwLock;

use dashmap::DashMap;
use tokio::sync::OnceCell;

use crate::api::OptionSource;
use crate::error::Error;

type TagKey = (String, String);

/// Tag suggestions keyed by `(scope id, model name)`.
///
/// Tags created through a tag editor are appended to the cached list so
/// they are suggested right away.
#[derive(Debug, Default)]
pub struct TagSuggestionCache {
    entries: DashMap<TagKey, Arc<OnceCell<RwLock<Vec<String>>>>>,
}

impl TagSuggestionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the suggestions, fetching them on first use.
    pub async fn get(
        &self,
        scope_id: &str,
        model_name: &str,
        source: &dyn OptionSource,
        endpoint: &str,
    ) -> Result<Vec<String>, Error> {
        let key = (scope_id.to_string(), model_name.to_string());
        let cell = self.entries.entry(key).or_default().clone();

        let tags = cell
            .get_or_try_init(|| async {
                let tags = source
                    .fetch_tag_suggestions(endpoint, scope_id, model_name)
                    .await?;
                Ok::<_, Error>(RwLock::new(tags))
            })
            .await?;

        Ok(tags.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    /// Returns the cached suggestions without fetching.
    pub fn peek(&self, scope_id: &str, model_name: &str) -> Option<Vec<String>> {
        let key = (scope_id.to_string(), model_name.to_string());
        let cell = self.entries.get(&key)?;
        let tags = cell.get()?;
        Some(tags.read().unwrap_or_else(|e| e.into_inner()).clone())
    }

    /// Appends a newly created tag to a loaded list.
    ///
    /// Returns `false` if the list is not loaded or already has the tag.
    pub fn add(&self, scope_id: &str, model_name: &str, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() {
            return false;
        }
        let key = (scope_id.to_string(), model_name.to_string());
        let Some(cell) = self.entries.get(&key) else {
            return false;
        };
        let Some(tags) = cell.get() else {
            return false;
        };

        let mut tags = tags.write().unwrap_or_else(|e| e.into_inner());
        if tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
            return false;
        }
        tags.push(tag.to_string());
        true
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ScopedOption;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use std::sync::atomic::Ordering;

    #[derive(Default)]
    struct TagSource {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl OptionSource for TagSource {
        async fn fetch_options(&self, _: &str) -> Result<Vec<ScopedOption>, Error> {
            Ok(Vec::new())
        }

        async fn fetch_tag_suggestions(
            &self,
            _endpoint: &str,
            scope_id: &str,
            model_name: &str,
        ) -> Result<Vec<String>, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![format!("{scope_id}-{model_name}")])
        }
    }

    #[tokio::test]
    async fn test_keyed_by_scope_and_model() {
        let cache = TagSuggestionCache::new();
        let source = TagSource::default();

        let a = cache.get("f1", "pit", &source, "/api/tags/").await.unwrap();
        let b = cache.get("f2", "pit", &source, "/api/tags/").await.unwrap();
        let again = cache.get("f1", "pit", &source, "/api/tags/").await.unwrap();

        assert_eq!(a, ["f1-pit"]);
        assert_eq!(b, ["f2-pit"]);
        assert_eq!(again, a);
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_add_appends_once() {
        let cache = TagSuggestionCache::new();
        assert!(!cache.add("f1", "pit", "rework"));

        cache.get("f1", "pit", &TagSource::default(), "/api/tags/").await.unwrap();
        assert!(cache.add("f1", "pit", "rework"));
        assert!(!cache.add("f1", "pit", "Rework"));
        assert_eq!(cache.peek("f1", "pit").unwrap(), ["f1-pit", "rework"]);
    }
}
