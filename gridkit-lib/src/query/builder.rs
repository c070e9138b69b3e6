//! Filter, sort, search and page state to query parameters

use std::collections::BTreeMap;

use super::Pagination;
use super::QueryParams;
use super::params::format_number;
use crate::model::ColumnFilter;
use crate::model::Direction;
use crate::model::FieldType;
use crate::model::FilterState;
use crate::model::FilterType;
use crate::model::FilterValue;
use crate::model::SearchMode;
use crate::model::Sort;
use crate::model::TableConfig;

/// What the builder needs to know about the table's fields.
#[derive(Debug, Clone, Default)]
pub struct FieldMeta {
    pub field_types: BTreeMap<String, FieldType>,
    pub ownership_field: Option<String>,
    pub search_mode: SearchMode,
    pub approximate_search: bool,
}

impl FieldMeta {
    pub fn from_config(config: &TableConfig) -> Self {
        Self {
            field_types: config
                .fields
                .iter()
                .map(|(key, descriptor)| (key.clone(), descriptor.field_type))
                .collect(),
            ownership_field: config.ownership_field.clone(),
            search_mode: config.search_mode,
            approximate_search: config.approximate_search,
        }
    }

    fn is_ownership_fk(&self, key: &str) -> bool {
        self.ownership_field.as_deref() == Some(key)
            && self.field_types.get(key) == Some(&FieldType::Fk)
    }
}

/// Builds the list request parameters.
///
/// Emission order: `page`, `page_size`, `ordering`, search, then one group
/// per column filter in filter order. Empty values never appear.
///
/// # Example
///
/// ```
/// use gridkit_lib::model::{ColumnFilter, FilterState};
/// use gridkit_lib::query::{build_query_params, FieldMeta, Pagination};
///
/// let filters: FilterState = [ColumnFilter::range("age", Some(10.0), Some(20.0))]
///     .into_iter()
///     .collect();
/// let params = build_query_params(
///     &Pagination::new(0, 10),
///     None,
///     "",
///     &filters,
///     &FieldMeta::default(),
/// );
///
/// assert_eq!(params.to_query_string(), "page=1&page_size=10&age_min=10&age_max=20");
/// ```
pub fn build_query_params(
    pagination: &Pagination,
    sorting: Option<&Sort>,
    global_filter: &str,
    filters: &FilterState,
    meta: &FieldMeta,
) -> QueryParams {
    let mut params = QueryParams::new();
    params.push("page", (pagination.page_index + 1).to_string());
    params.push("page_size", pagination.page_size.to_string());

    if let Some(sort) = sorting {
        let prefix = match sort.direction {
            Direction::Asc => "",
            Direction::Desc => "-",
        };
        params.push("ordering", format!("{prefix}{}", sort.field));
    }

    let search = global_filter.trim();
    if !search.is_empty() {
        match meta.search_mode {
            SearchMode::Plain => params.push("search", search),
            SearchMode::Advanced | SearchMode::Simple => {
                params.push("q", search);
                let mode = if meta.search_mode == SearchMode::Advanced {
                    "advanced"
                } else {
                    "simple"
                };
                params.push("mode", mode);
                params.push("approximate", meta.approximate_search.to_string());
            }
        }
    }

    for filter in filters.iter() {
        push_filter(&mut params, filter, meta);
    }

    params
}

fn push_filter(params: &mut QueryParams, filter: &ColumnFilter, meta: &FieldMeta) {
    let key = filter.field_key.as_str();
    match (filter.filter_type, &filter.value) {
        (FilterType::Multiselect, value) => {
            if let Some(joined) = joined_ids(value) {
                if meta.is_ownership_fk(key) {
                    params.push(key, joined);
                } else {
                    params.push(format!("{key}_in"), joined);
                }
            }
        }
        (FilterType::Boolean, value) => {
            if let Some(joined) = joined_ids(value) {
                params.push(format!("{key}_in"), joined);
            }
        }
        (FilterType::Text, FilterValue::Text(text)) => {
            let text = text.trim();
            if !text.is_empty() {
                params.push(format!("{key}_icontains"), text);
            }
        }
        (FilterType::Daterange, FilterValue::DateRange(range)) => {
            if let Some(from) = non_empty(range.from.as_deref()) {
                params.push(format!("{key}_after"), from);
            }
            if let Some(to) = non_empty(range.to.as_deref()) {
                params.push(format!("{key}_before"), to);
            }
        }
        (FilterType::Range, FilterValue::Range(range)) => {
            if let Some(min) = range.min.filter(|v| !v.is_nan()) {
                params.push(format!("{key}_min"), format_number(min));
            }
            if let Some(max) = range.max.filter(|v| !v.is_nan()) {
                params.push(format!("{key}_max"), format_number(max));
            }
        }
        (filter_type, value) => {
            log::debug!("ignoring {filter_type:?} filter on '{key}' with mismatched value {value:?}");
        }
    }
}

fn joined_ids(value: &FilterValue) -> Option<String> {
    let ids: Vec<&str> = match value {
        FilterValue::Ids(ids) => ids.iter().map(|id| id.trim()).filter(|id| !id.is_empty()).collect(),
        FilterValue::Text(text) => non_empty(Some(text)).into_iter().collect(),
        _ => Vec::new(),
    };
    if ids.is_empty() {
        None
    } else {
        Some(ids.join(","))
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldDescriptor;

    fn meta() -> FieldMeta {
        let config = TableConfig::new("/api/pits", "pitsTable")
            .field("factory", FieldDescriptor::new(FieldType::Fk))
            .field("kiln", FieldDescriptor::new(FieldType::Fk))
            .field("status", FieldDescriptor::new(FieldType::Select))
            .ownership_field("factory");
        FieldMeta::from_config(&config)
    }

    fn build(filters: Vec<ColumnFilter>) -> QueryParams {
        let state: FilterState = filters.into_iter().collect();
        build_query_params(&Pagination::default(), None, "", &state, &meta())
    }

    #[test]
    fn test_page_is_one_based() {
        let params = build_query_params(
            &Pagination::new(3, 10),
            None,
            "",
            &FilterState::new(),
            &meta(),
        );
        assert_eq!(params.get("page"), Some("4"));
        assert_eq!(params.get("page_size"), Some("10"));
    }

    #[test]
    fn test_multiselect_ownership_vs_other() {
        let params = build(vec![
            ColumnFilter::multiselect("factory", ["1", "2"]),
            ColumnFilter::multiselect("kiln", ["7"]),
            ColumnFilter::multiselect("status", ["open", "closed"]),
        ]);
        assert_eq!(params.get("factory"), Some("1,2"));
        assert_eq!(params.get("kiln_in"), Some("7"));
        assert_eq!(params.get("status_in"), Some("open,closed"));
        assert!(!params.contains("factory_in"));
    }

    #[test]
    fn test_boolean_subset() {
        let params = build(vec![ColumnFilter::boolean("active", &[true])]);
        assert_eq!(params.get("active_in"), Some("true"));
    }

    #[test]
    fn test_range_mapping() {
        let params = build(vec![ColumnFilter::range("age", Some(10.0), Some(20.0))]);
        assert!(params.to_query_string().ends_with("age_min=10&age_max=20"));

        let params = build(vec![ColumnFilter::range("age", Some(f64::NAN), Some(20.5))]);
        assert!(!params.contains("age_min"));
        assert_eq!(params.get("age_max"), Some("20.5"));
    }

    #[test]
    fn test_text_trimmed_and_empty_omitted() {
        let params = build(vec![ColumnFilter::text("name", "  north ")]);
        assert_eq!(params.get("name_icontains"), Some("north"));

        // empty values are dropped by the filter state, and again here
        let mut state = FilterState::new();
        state.set(ColumnFilter::text("name", ""));
        let params = build_query_params(&Pagination::default(), None, "", &state, &meta());
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_date_range_halves() {
        let params = build(vec![ColumnFilter::date_range(
            "fired_on",
            Some("2024-01-01"),
            None::<String>,
        )]);
        assert_eq!(params.get("fired_on_after"), Some("2024-01-01"));
        assert!(!params.contains("fired_on_before"));
    }

    #[test]
    fn test_ordering() {
        let sort = Sort::desc("name");
        let params = build_query_params(
            &Pagination::default(),
            Some(&sort),
            "",
            &FilterState::new(),
            &meta(),
        );
        assert_eq!(params.get("ordering"), Some("-name"));
    }

    #[test]
    fn test_search_modes() {
        let mut meta = meta();
        let plain = build_query_params(&Pagination::default(), None, " kiln ", &FilterState::new(), &meta);
        assert_eq!(plain.get("search"), Some("kiln"));
        assert!(!plain.contains("q"));

        meta.search_mode = SearchMode::Advanced;
        meta.approximate_search = true;
        let advanced = build_query_params(&Pagination::default(), None, "kiln", &FilterState::new(), &meta);
        assert_eq!(advanced.get("q"), Some("kiln"));
        assert_eq!(advanced.get("mode"), Some("advanced"));
        assert_eq!(advanced.get("approximate"), Some("true"));
        assert!(!advanced.contains("search"));
    }
}
