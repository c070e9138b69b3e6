//! In-memory filter and sort state

use serde::Deserialize;
use serde::Serialize;

use super::FilterType;

/// A `{min, max}` numeric range. Either bound may be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NumberRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// A `{from, to}` ISO date range. Either bound may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DateRange {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

/// The value of one column filter. Its shape depends on the filter type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// A scalar, used by text filters.
    Text(String),
    /// A list of ids or boolean strings, used by multiselect and boolean filters.
    Ids(Vec<String>),
    Range(NumberRange),
    DateRange(DateRange),
}

impl FilterValue {
    /// Returns `true` if the value would emit no query parameter.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Ids(ids) => ids.iter().all(|id| id.trim().is_empty()),
            Self::Range(range) => {
                !range.min.is_some_and(|v| !v.is_nan()) && !range.max.is_some_and(|v| !v.is_nan())
            }
            Self::DateRange(range) => {
                range.from.as_deref().is_none_or(|d| d.trim().is_empty())
                    && range.to.as_deref().is_none_or(|d| d.trim().is_empty())
            }
        }
    }
}

/// One actively filtered field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFilter {
    pub field_key: String,
    pub filter_type: FilterType,
    pub value: FilterValue,
}

impl ColumnFilter {
    pub fn text(field: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            field_key: field.into(),
            filter_type: FilterType::Text,
            value: FilterValue::Text(text.into()),
        }
    }

    pub fn multiselect<I, S>(field: impl Into<String>, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            field_key: field.into(),
            filter_type: FilterType::Multiselect,
            value: FilterValue::Ids(ids.into_iter().map(Into::into).collect()),
        }
    }

    /// A boolean filter over the selected subset of `true` / `false`.
    pub fn boolean(field: impl Into<String>, selected: &[bool]) -> Self {
        Self {
            field_key: field.into(),
            filter_type: FilterType::Boolean,
            value: FilterValue::Ids(selected.iter().map(|b| b.to_string()).collect()),
        }
    }

    pub fn range(field: impl Into<String>, min: Option<f64>, max: Option<f64>) -> Self {
        Self {
            field_key: field.into(),
            filter_type: FilterType::Range,
            value: FilterValue::Range(NumberRange { min, max }),
        }
    }

    pub fn date_range(
        field: impl Into<String>,
        from: Option<impl Into<String>>,
        to: Option<impl Into<String>>,
    ) -> Self {
        Self {
            field_key: field.into(),
            filter_type: FilterType::Daterange,
            value: FilterValue::DateRange(DateRange {
                from: from.map(Into::into),
                to: to.map(Into::into),
            }),
        }
    }
}

/// Ordered column filters, at most one per field.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState(Vec<ColumnFilter>);

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter for its field, replacing any previous one in place.
    ///
    /// An empty value removes the field's filter instead.
    pub fn set(&mut self, filter: ColumnFilter) {
        if filter.value.is_empty() {
            self.remove(&filter.field_key);
            return;
        }
        match self.0.iter_mut().find(|f| f.field_key == filter.field_key) {
            Some(existing) => *existing = filter,
            None => self.0.push(filter),
        }
    }

    /// Removes the filter for a field, returning it if present.
    pub fn remove(&mut self, field: &str) -> Option<ColumnFilter> {
        let index = self.0.iter().position(|f| f.field_key == field)?;
        Some(self.0.remove(index))
    }

    pub fn get(&self, field: &str) -> Option<&ColumnFilter> {
        self.0.iter().find(|f| f.field_key == field)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnFilter> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<ColumnFilter> for FilterState {
    fn from_iter<T: IntoIterator<Item = ColumnFilter>>(iter: T) -> Self {
        let mut state = Self::new();
        for filter in iter {
            state.set(filter);
        }
        state
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// Single-column sort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sort {
    pub field: String,
    pub direction: Direction,
}

impl Sort {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Desc,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_shapes_deserialize() {
        let text: FilterValue = serde_json::from_value(json!("kiln")).unwrap();
        let ids: FilterValue = serde_json::from_value(json!(["1", "2"])).unwrap();
        let range: FilterValue = serde_json::from_value(json!({"min": 10, "max": 20})).unwrap();
        let dates: FilterValue = serde_json::from_value(json!({"from": "2024-01-01"})).unwrap();

        assert_eq!(text, FilterValue::Text("kiln".into()));
        assert_eq!(ids, FilterValue::Ids(vec!["1".into(), "2".into()]));
        assert_eq!(
            range,
            FilterValue::Range(NumberRange {
                min: Some(10.0),
                max: Some(20.0)
            })
        );
        assert!(matches!(dates, FilterValue::DateRange(DateRange { from: Some(_), to: None })));
    }

    #[test]
    fn test_set_replaces_and_empty_removes() {
        let mut state = FilterState::new();
        state.set(ColumnFilter::text("name", "pit"));
        state.set(ColumnFilter::range("depth", Some(1.0), None));
        state.set(ColumnFilter::text("name", "kiln"));

        assert_eq!(state.len(), 2);
        assert_eq!(state.iter().next().unwrap().value, FilterValue::Text("kiln".into()));

        state.set(ColumnFilter::text("name", "   "));
        assert_eq!(state.len(), 1);
        assert!(state.get("name").is_none());

        state.set(ColumnFilter::range("depth", Some(f64::NAN), None));
        assert!(state.is_empty());
    }
}
