//! The compiler functions

use std::collections::BTreeMap;

use super::config::*;
use crate::model::EditPermissions;
use crate::model::FieldDescriptor;
use crate::model::FieldDescriptorMap;
use crate::model::FieldType;

/// Order assumed for descriptors that do not set one.
pub const DEFAULT_ORDER: i32 = 999;

/// Default lower bound for temperature fields (absolute zero, °C).
pub const ABSOLUTE_ZERO: f64 = -273.15;

/// Column id of the row-selection checkbox column.
pub const SELECTION_COLUMN: &str = "__select";

/// Column id of the row-actions column.
pub const ACTIONS_COLUMN: &str = "__actions";

/// Column panel flags for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnVisibility {
    /// Listed in the column chooser.
    pub in_panel: bool,
    /// Shown before the user changes anything.
    pub default_visible: bool,
}

/// Everything derived from one field matrix.
#[derive(Debug, Clone)]
pub struct CompiledMatrix {
    pub field_configs: Vec<FieldConfig>,
    pub column_visibility: BTreeMap<String, ColumnVisibility>,
    pub filter_membership: BTreeMap<String, bool>,
    pub column_order: Vec<String>,
}

impl CompiledMatrix {
    /// Compiles a field matrix in one pass.
    pub fn compile(fields: &FieldDescriptorMap) -> Self {
        Self {
            field_configs: to_field_configs(fields),
            column_visibility: to_column_visibility(fields),
            filter_membership: to_filter_membership(fields),
            column_order: to_column_order(fields),
        }
    }

    /// Looks up a compiled field by key.
    pub fn field(&self, key: &str) -> Option<&FieldConfig> {
        self.field_configs.iter().find(|config| config.key == key)
    }

    /// Returns `true` if the field appears in the filter panel.
    pub fn is_filterable(&self, key: &str) -> bool {
        self.filter_membership.get(key).copied().unwrap_or(false)
    }

    /// The full column order with display columns prepended.
    ///
    /// The selection column comes first, then the actions column, then the
    /// data columns. This prefix order is fixed.
    pub fn column_order_with(&self, selection: bool, actions: bool) -> Vec<String> {
        let mut order = Vec::with_capacity(self.column_order.len() + 2);
        if selection {
            order.push(SELECTION_COLUMN.to_string());
        }
        if actions {
            order.push(ACTIONS_COLUMN.to_string());
        }
        order.extend(self.column_order.iter().cloned());
        order
    }
}

/// Descriptors sorted by `(order ?? 999, key)`.
fn sorted(fields: &FieldDescriptorMap) -> Vec<(&String, &FieldDescriptor)> {
    let mut entries: Vec<_> = fields.iter().collect();
    entries.sort_by(|(a_key, a), (b_key, b)| {
        let a_order = a.order.unwrap_or(DEFAULT_ORDER);
        let b_order = b.order.unwrap_or(DEFAULT_ORDER);
        a_order.cmp(&b_order).then_with(|| a_key.cmp(b_key))
    });
    entries
}

/// Sorted, normalized field configs.
pub fn to_field_configs(fields: &FieldDescriptorMap) -> Vec<FieldConfig> {
    sorted(fields)
        .into_iter()
        .map(|(key, descriptor)| normalize(key, descriptor))
        .collect()
}

/// `(isInColumnPanel ?? true, defaultVisible ?? true)` for every key.
pub fn to_column_visibility(fields: &FieldDescriptorMap) -> BTreeMap<String, ColumnVisibility> {
    fields
        .iter()
        .map(|(key, descriptor)| {
            (
                key.clone(),
                ColumnVisibility {
                    in_panel: descriptor.is_in_column_panel.unwrap_or(true),
                    default_visible: descriptor.default_visible.unwrap_or(true),
                },
            )
        })
        .collect()
}

/// Sorted bare keys.
pub fn to_column_order(fields: &FieldDescriptorMap) -> Vec<String> {
    sorted(fields).into_iter().map(|(key, _)| key.clone()).collect()
}

/// `key -> true` for descriptors explicitly placed in the filter panel.
pub fn to_filter_membership(fields: &FieldDescriptorMap) -> BTreeMap<String, bool> {
    fields
        .iter()
        .filter(|(_, descriptor)| descriptor.is_in_filter_panel == Some(true))
        .map(|(key, _)| (key.clone(), true))
        .collect()
}

fn normalize(key: &str, d: &FieldDescriptor) -> FieldConfig {
    let number = |default_min: Option<f64>| NumberField {
        min: d.min.or(default_min),
        max: d.max,
        step: d.step.filter(|step| *step > 0.0),
        step_base: d.min,
        decimals: d.decimals.unwrap_or(1),
        unit: d.unit.clone(),
    };

    let kind = match d.field_type {
        FieldType::Text => FieldKind::Text(TextField {
            multiline: d.multiline.unwrap_or(false),
        }),
        FieldType::Number => FieldKind::Number(number(None)),
        FieldType::Temperature => FieldKind::Temperature(NumberField {
            unit: d.unit.clone().or_else(|| Some("°C".to_string())),
            ..number(Some(ABSOLUTE_ZERO))
        }),
        FieldType::Date => FieldKind::Date,
        FieldType::Time => FieldKind::Time,
        FieldType::Boolean => FieldKind::Boolean(BooleanField {
            style: d.display_style.unwrap_or_default(),
            interaction: if d.quick_toggle.unwrap_or(false) {
                BooleanInteraction::QuickToggle
            } else {
                BooleanInteraction::Dropdown
            },
            true_label: d.true_label.clone().unwrap_or_else(|| "Yes".to_string()),
            false_label: d.false_label.clone().unwrap_or_else(|| "No".to_string()),
        }),
        FieldType::Select => FieldKind::Select(SelectField {
            options: match &d.dynamic_options {
                Some(f) => SelectOptions::Dynamic(f.clone()),
                None => SelectOptions::Static(d.options.clone()),
            },
        }),
        FieldType::Fk => FieldKind::ForeignKey(ForeignKeyField {
            endpoint: d.api_endpoint.clone(),
            label_template: d.label_template.clone().filter(|t| t.contains('{')),
            display_field: d.display_field.clone(),
            scoped: d.scoped.unwrap_or(false),
        }),
        FieldType::Tag => FieldKind::Tag(TagField {
            suggestions: d.suggestions.clone(),
            endpoint: d.api_endpoint.clone(),
            model_name: d.model_name.clone(),
        }),
        FieldType::Json => FieldKind::Json(JsonField {
            copyable: d.copyable.unwrap_or(false),
        }),
    };

    // json cells are a read-only dump
    let edit = if d.field_type == FieldType::Json {
        EditPermissions::none()
    } else {
        d.editable
    };

    FieldConfig {
        key: key.to_string(),
        header: d.header.clone().unwrap_or_else(|| humanize(key)),
        order: d.order.unwrap_or(DEFAULT_ORDER),
        kind,
        edit,
        filter_type: d.filter_type,
    }
}

/// `"kiln_temp"` -> `"Kiln temp"`.
fn humanize(key: &str) -> String {
    let spaced = key.replace('_', " ");
    let mut chars = spaced.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
