//! Normalized per-field configuration

use crate::model::BooleanStyle;
use crate::model::DynamicOptions;
use crate::model::EditPermissions;
use crate::model::FieldType;
use crate::model::FilterType;
use crate::model::Row;
use crate::model::SelectOption;
use crate::model::Surface;

/// A compiled field: identity, presentation and a typed variant.
#[derive(Debug, Clone)]
pub struct FieldConfig {
    pub key: String,
    pub header: String,
    pub order: i32,
    pub kind: FieldKind,
    pub edit: EditPermissions,
    pub filter_type: Option<FilterType>,
}

impl FieldConfig {
    /// Returns the declarative type this config was compiled from.
    pub fn field_type(&self) -> FieldType {
        self.kind.field_type()
    }

    /// Returns whether the field may be edited on the given surface.
    pub fn editable_on(&self, surface: Surface) -> bool {
        self.edit.allows(surface)
    }
}

/// One variant per field type, each carrying only the properties it uses.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Text(TextField),
    Number(NumberField),
    Temperature(NumberField),
    Date,
    Time,
    Boolean(BooleanField),
    Select(SelectField),
    ForeignKey(ForeignKeyField),
    Tag(TagField),
    Json(JsonField),
}

impl FieldKind {
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Text(_) => FieldType::Text,
            Self::Number(_) => FieldType::Number,
            Self::Temperature(_) => FieldType::Temperature,
            Self::Date => FieldType::Date,
            Self::Time => FieldType::Time,
            Self::Boolean(_) => FieldType::Boolean,
            Self::Select(_) => FieldType::Select,
            Self::ForeignKey(_) => FieldType::Fk,
            Self::Tag(_) => FieldType::Tag,
            Self::Json(_) => FieldType::Json,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct TextField {
    pub multiline: bool,
}

#[derive(Debug, Clone)]
pub struct NumberField {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    /// Where steps are counted from: the configured minimum, never an
    /// implied one.
    pub step_base: Option<f64>,
    pub decimals: u8,
    pub unit: Option<String>,
}

/// How a boolean cell reacts to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanInteraction {
    /// A single click flips the value and saves immediately.
    QuickToggle,
    /// A double click opens a two-option selector.
    Dropdown,
}

#[derive(Debug, Clone)]
pub struct BooleanField {
    pub style: BooleanStyle,
    pub interaction: BooleanInteraction,
    pub true_label: String,
    pub false_label: String,
}

/// Select options: a static list or a function of the row.
#[derive(Debug, Clone)]
pub enum SelectOptions {
    Static(Vec<SelectOption>),
    Dynamic(DynamicOptions),
}

impl SelectOptions {
    pub fn for_row(&self, row: &Row) -> Vec<SelectOption> {
        match self {
            Self::Static(options) => options.clone(),
            Self::Dynamic(f) => f.options_for(row),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectField {
    pub options: SelectOptions,
}

#[derive(Debug, Clone)]
pub struct ForeignKeyField {
    /// Option source endpoint.
    pub endpoint: Option<String>,
    /// Label template with `{field}` placeholders.
    pub label_template: Option<String>,
    /// Server-computed display label field.
    pub display_field: Option<String>,
    /// Options depend on the ambient scope and load through the scoped cache.
    pub scoped: bool,
}

#[derive(Debug, Clone, Default)]
pub struct TagField {
    pub suggestions: Vec<String>,
    pub endpoint: Option<String>,
    pub model_name: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct JsonField {
    pub copyable: bool,
}
