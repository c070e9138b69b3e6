//! Declarative field descriptors (the field matrix)

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;

use super::Row;
use super::value_as_string;

/// The data type of a field, which selects its column variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    Text,
    Number,
    Temperature,
    Date,
    Time,
    Boolean,
    Select,
    Fk,
    Tag,
    Json,
}

impl FieldType {
    /// Returns the wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Temperature => "temperature",
            Self::Date => "date",
            Self::Time => "time",
            Self::Boolean => "boolean",
            Self::Select => "select",
            Self::Fk => "fk",
            Self::Tag => "tag",
            Self::Json => "json",
        }
    }
}

/// How a field is filtered in the filter panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    Multiselect,
    Boolean,
    Text,
    Daterange,
    Range,
}

/// The surfaces a field can be edited on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// Inline, directly in the grid cell.
    Inline,
    /// The create-record modal.
    AddModal,
    /// The edit-record modal.
    EditModal,
}

/// Edit permissions per surface. Every surface is allowed unless disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditPermissions {
    pub inline: bool,
    pub add_modal: bool,
    pub edit_modal: bool,
}

impl Default for EditPermissions {
    fn default() -> Self {
        Self::all()
    }
}

impl EditPermissions {
    /// Editable everywhere.
    pub const fn all() -> Self {
        Self {
            inline: true,
            add_modal: true,
            edit_modal: true,
        }
    }

    /// Editable nowhere.
    pub const fn none() -> Self {
        Self {
            inline: false,
            add_modal: false,
            edit_modal: false,
        }
    }

    /// Returns whether the field may be edited on the given surface.
    pub fn allows(&self, surface: Surface) -> bool {
        match surface {
            Surface::Inline => self.inline,
            Surface::AddModal => self.add_modal,
            Surface::EditModal => self.edit_modal,
        }
    }
}

/// Display style for boolean cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanStyle {
    #[default]
    Badge,
    Icon,
    Text,
}

/// One entry of a select field's option list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// The stored value, always compared in string form.
    #[serde(deserialize_with = "de_stringish")]
    pub value: String,
    /// The label shown to the user.
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

fn de_stringish<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    value_as_string(&value)
        .ok_or_else(|| serde::de::Error::custom("option value must be a string, number or bool"))
}

/// Row-dependent option list for select fields.
#[derive(Clone)]
pub struct DynamicOptions(Arc<dyn Fn(&Row) -> Vec<SelectOption> + Send + Sync>);

impl DynamicOptions {
    pub fn new(f: impl Fn(&Row) -> Vec<SelectOption> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Computes the options for one row.
    pub fn options_for(&self, row: &Row) -> Vec<SelectOption> {
        (self.0)(row)
    }
}

impl std::fmt::Debug for DynamicOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("DynamicOptions(..)")
    }
}

/// Declarative description of one field.
///
/// The key is not part of the descriptor; it is the key of the
/// [`FieldDescriptorMap`] entry. Every property except the type is optional
/// and defaults safely during compilation.
///
/// # Example
///
/// ```
/// use gridkit_lib::model::{FieldDescriptor, FieldType, FilterType};
///
/// let temp = FieldDescriptor::new(FieldType::Temperature)
///     .header("Kiln temperature")
///     .order(3)
///     .filter(FilterType::Range)
///     .range(Some(0.0), Some(1500.0));
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldDescriptor {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub header: Option<String>,
    pub order: Option<i32>,

    // visibility
    pub is_in_column_panel: Option<bool>,
    pub default_visible: Option<bool>,
    pub is_in_filter_panel: Option<bool>,
    pub filter_type: Option<FilterType>,

    pub editable: EditPermissions,

    // text
    pub multiline: Option<bool>,

    // number / temperature
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub decimals: Option<u8>,
    pub unit: Option<String>,

    // boolean
    pub quick_toggle: Option<bool>,
    pub display_style: Option<BooleanStyle>,
    pub true_label: Option<String>,
    pub false_label: Option<String>,

    // select
    pub options: Vec<SelectOption>,
    #[serde(skip)]
    pub dynamic_options: Option<DynamicOptions>,

    // fk / tag
    pub api_endpoint: Option<String>,
    pub label_template: Option<String>,
    pub display_field: Option<String>,
    pub scoped: Option<bool>,
    pub suggestions: Vec<String>,
    pub model_name: Option<String>,

    // json
    pub copyable: Option<bool>,
}

/// The field matrix: field key to descriptor.
pub type FieldDescriptorMap = BTreeMap<String, FieldDescriptor>;

impl FieldDescriptor {
    /// Creates a descriptor of the given type with every other property unset.
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            ..Self::default()
        }
    }

    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn order(mut self, order: i32) -> Self {
        self.order = Some(order);
        self
    }

    /// Puts the field in the filter panel with the given filter type.
    pub fn filter(mut self, filter_type: FilterType) -> Self {
        self.is_in_filter_panel = Some(true);
        self.filter_type = Some(filter_type);
        self
    }

    pub fn hidden_by_default(mut self) -> Self {
        self.default_visible = Some(false);
        self
    }

    pub fn not_in_column_panel(mut self) -> Self {
        self.is_in_column_panel = Some(false);
        self
    }

    pub fn editable(mut self, editable: EditPermissions) -> Self {
        self.editable = editable;
        self
    }

    pub fn read_only(self) -> Self {
        self.editable(EditPermissions::none())
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = Some(true);
        self
    }

    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn step(mut self, step: f64) -> Self {
        self.step = Some(step);
        self
    }

    pub fn decimals(mut self, decimals: u8) -> Self {
        self.decimals = Some(decimals);
        self
    }

    pub fn quick_toggle(mut self) -> Self {
        self.quick_toggle = Some(true);
        self
    }

    pub fn display_style(mut self, style: BooleanStyle) -> Self {
        self.display_style = Some(style);
        self
    }

    pub fn options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn dynamic_options(
        mut self,
        f: impl Fn(&Row) -> Vec<SelectOption> + Send + Sync + 'static,
    ) -> Self {
        self.dynamic_options = Some(DynamicOptions::new(f));
        self
    }

    pub fn api_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.api_endpoint = Some(endpoint.into());
        self
    }

    pub fn label_template(mut self, template: impl Into<String>) -> Self {
        self.label_template = Some(template.into());
        self
    }

    pub fn display_field(mut self, field: impl Into<String>) -> Self {
        self.display_field = Some(field.into());
        self
    }

    pub fn scoped(mut self) -> Self {
        self.scoped = Some(true);
        self
    }

    pub fn suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn model_name(mut self, model: impl Into<String>) -> Self {
        self.model_name = Some(model.into());
        self
    }

    pub fn copyable(mut self) -> Self {
        self.copyable = Some(true);
        self
    }
}
