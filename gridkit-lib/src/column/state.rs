//! Column visibility and order as the user changes them

use std::collections::BTreeMap;

use crate::compile::ACTIONS_COLUMN;
use crate::compile::CompiledMatrix;
use crate::compile::SELECTION_COLUMN;

fn is_display_column(id: &str) -> bool {
    id == SELECTION_COLUMN || id == ACTIONS_COLUMN
}

/// Visibility and order of every column of one table.
///
/// Display columns (selection, actions) are pinned to the front in a fixed
/// order and are always visible. Columns outside the column panel can not be
/// toggled by the user.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnState {
    prefix: Vec<String>,
    order: Vec<String>,
    visibility: BTreeMap<String, bool>,
    in_panel: BTreeMap<String, bool>,
    default_order: Vec<String>,
    default_visibility: BTreeMap<String, bool>,
}

impl ColumnState {
    /// The initial state of a compiled matrix.
    pub fn new(matrix: &CompiledMatrix, selection: bool, actions: bool) -> Self {
        let prefix: Vec<String> = matrix
            .column_order_with(selection, actions)
            .into_iter()
            .filter(|id| is_display_column(id))
            .collect();
        let visibility: BTreeMap<String, bool> = matrix
            .column_visibility
            .iter()
            .map(|(key, v)| (key.clone(), v.default_visible))
            .collect();
        let in_panel = matrix
            .column_visibility
            .iter()
            .map(|(key, v)| (key.clone(), v.in_panel))
            .collect();

        Self {
            prefix,
            order: matrix.column_order.clone(),
            visibility: visibility.clone(),
            in_panel,
            default_order: matrix.column_order.clone(),
            default_visibility: visibility,
        }
    }

    pub fn is_visible(&self, id: &str) -> bool {
        if is_display_column(id) {
            return self.prefix.iter().any(|p| p == id);
        }
        self.visibility.get(id).copied().unwrap_or(false)
    }

    /// Shows or hides a data column. Returns `false` if the column is unknown
    /// or not in the column panel.
    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        if !self.in_panel.get(id).copied().unwrap_or(false) {
            return false;
        }
        self.visibility.insert(id.to_string(), visible);
        true
    }

    /// Moves a data column to `index` among the data columns.
    pub fn move_column(&mut self, id: &str, index: usize) -> bool {
        let Some(from) = self.order.iter().position(|key| key == id) else {
            return false;
        };
        let key = self.order.remove(from);
        let index = index.min(self.order.len());
        self.order.insert(index, key);
        true
    }

    /// Every column in display order, display columns first.
    pub fn order(&self) -> Vec<String> {
        self.prefix.iter().chain(&self.order).cloned().collect()
    }

    /// Data column order only.
    pub fn data_order(&self) -> &[String] {
        &self.order
    }

    /// Visible columns in display order.
    pub fn visible_columns(&self) -> Vec<String> {
        self.order().into_iter().filter(|id| self.is_visible(id)).collect()
    }

    /// The column chooser entries: `(key, visible)` in display order.
    pub fn panel_columns(&self) -> Vec<(String, bool)> {
        self.order
            .iter()
            .filter(|key| self.in_panel.get(*key).copied().unwrap_or(false))
            .map(|key| (key.clone(), self.is_visible(key)))
            .collect()
    }

    pub fn visibility(&self) -> &BTreeMap<String, bool> {
        &self.visibility
    }

    /// Back to the compiled defaults.
    pub fn reset(&mut self) {
        self.order = self.default_order.clone();
        self.visibility = self.default_visibility.clone();
    }

    /// Applies a saved visibility map and order.
    ///
    /// Unknown keys are ignored. Known keys missing from `order` keep their
    /// default relative order after the saved ones.
    pub fn restore(&mut self, visibility: &BTreeMap<String, bool>, order: &[String]) {
        for (key, visible) in visibility {
            if self.visibility.contains_key(key) {
                self.visibility.insert(key.clone(), *visible);
            }
        }
        if order.is_empty() {
            return;
        }
        let mut restored: Vec<String> = Vec::with_capacity(self.default_order.len());
        for key in order {
            if self.default_order.contains(key) && !restored.contains(key) {
                restored.push(key.clone());
            }
        }
        for key in &self.default_order {
            if !restored.contains(key) {
                restored.push(key.clone());
            }
        }
        self.order = restored;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::FieldDescriptor;
    use crate::model::FieldDescriptorMap;
    use crate::model::FieldType;

    fn state() -> ColumnState {
        let mut fields = FieldDescriptorMap::new();
        fields.insert("name".into(), FieldDescriptor::new(FieldType::Text).order(1));
        fields.insert("depth".into(), FieldDescriptor::new(FieldType::Number).order(2));
        fields.insert(
            "meta".into(),
            FieldDescriptor::new(FieldType::Json).order(3).hidden_by_default(),
        );
        fields.insert(
            "id".into(),
            FieldDescriptor::new(FieldType::Text).order(0).not_in_column_panel(),
        );
        ColumnState::new(&CompiledMatrix::compile(&fields), true, true)
    }

    #[test]
    fn test_initial_state() {
        let state = state();
        assert_eq!(state.order(), ["__select", "__actions", "id", "name", "depth", "meta"]);
        assert_eq!(state.visible_columns(), ["__select", "__actions", "id", "name", "depth"]);
        assert_eq!(state.panel_columns().len(), 3);
    }

    #[test]
    fn test_toggle_and_move() {
        let mut state = state();
        assert!(state.set_visible("meta", true));
        assert!(!state.set_visible("id", false));
        assert!(!state.set_visible("__select", false));
        assert!(state.move_column("depth", 0));

        assert_eq!(state.order(), ["__select", "__actions", "depth", "id", "name", "meta"]);
        assert!(state.is_visible("meta"));

        state.reset();
        assert_eq!(state.data_order(), ["id", "name", "depth", "meta"]);
        assert!(!state.is_visible("meta"));
    }

    #[test]
    fn test_restore_ignores_unknown_keys() {
        let mut state = state();
        let visibility = BTreeMap::from([("meta".to_string(), true), ("gone".to_string(), false)]);
        state.restore(&visibility, &["meta".into(), "gone".into(), "name".into()]);

        assert_eq!(state.data_order(), ["meta", "name", "id", "depth"]);
        assert!(state.is_visible("meta"));
        assert!(!state.visibility().contains_key("gone"));
    }
}
