//! What a column renders

use serde_json::Value;

use crate::model::RowId;
use crate::model::SelectOption;

/// A piece of text, split into plain and search-highlighted segments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HighlightedText {
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

impl HighlightedText {
    /// Plain text without highlights.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            segments: vec![Segment {
                text: text.into(),
                highlighted: false,
            }],
        }
    }

    /// Splits `text` around case-insensitive matches of `term`.
    pub fn highlight(text: &str, term: Option<&str>) -> Self {
        let term = term.map(str::trim).filter(|t| !t.is_empty());
        let Some(term) = term else {
            return Self::plain(text);
        };

        let haystack = text.to_lowercase();
        let needle = term.to_lowercase();
        // lowercasing can change byte lengths; only highlight when it does not
        if haystack.len() != text.len() {
            return Self::plain(text);
        }

        let mut segments = Vec::new();
        let mut start = 0;
        for (index, _) in haystack.match_indices(&needle) {
            if index > start {
                segments.push(Segment {
                    text: text[start..index].to_string(),
                    highlighted: false,
                });
            }
            segments.push(Segment {
                text: text[index..index + needle.len()].to_string(),
                highlighted: true,
            });
            start = index + needle.len();
        }
        if start < text.len() || segments.is_empty() {
            segments.push(Segment {
                text: text[start..].to_string(),
                highlighted: false,
            });
        }
        Self { segments }
    }

    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn has_highlight(&self) -> bool {
        self.segments.iter().any(|s| s.highlighted)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeTone {
    Positive,
    Negative,
}

/// A button in the actions column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
    Expand { expanded: bool },
    Share,
    Custom(String),
}

/// Read-mode output of a cell.
///
/// This is also what the expanded-row detail view shows, so a field looks
/// the same everywhere.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Empty,
    Text(HighlightedText),
    Badge { label: String, tone: BadgeTone },
    Icon { checked: bool, label: String },
    Tags(Vec<String>),
    Checkbox { checked: bool },
    Actions(Vec<RowAction>),
    Json { pretty: String, copyable: bool },
}

impl CellContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(HighlightedText::plain(text))
    }

    /// The content as plain text, e.g. for clipboard copies or CLI output.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Empty => String::new(),
            Self::Text(text) => text.text(),
            Self::Badge { label, .. } | Self::Icon { label, .. } => label.clone(),
            Self::Tags(tags) => tags.join(", "),
            Self::Checkbox { checked } => if *checked { "[x]" } else { "[ ]" }.to_string(),
            Self::Actions(actions) => actions
                .iter()
                .map(|action| match action {
                    RowAction::Edit => "edit".to_string(),
                    RowAction::Delete => "delete".to_string(),
                    RowAction::Expand { expanded: true } => "collapse".to_string(),
                    RowAction::Expand { expanded: false } => "expand".to_string(),
                    RowAction::Share => "share".to_string(),
                    RowAction::Custom(name) => name.clone(),
                })
                .collect::<Vec<_>>()
                .join(" "),
            Self::Json { pretty, .. } => pretty.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

/// Edit-mode input surface of a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum Editor {
    Text {
        value: String,
        multiline: bool,
    },
    Number {
        value: String,
        min: Option<f64>,
        max: Option<f64>,
        step: Option<f64>,
        unit: Option<String>,
    },
    /// `value` is in display form; `iso` feeds a date picker.
    Date {
        value: String,
        iso: Option<String>,
    },
    Time {
        value: String,
    },
    /// Select, foreign-key and boolean dropdowns.
    ///
    /// `selected` is `None` when the current value matches no option.
    Choice {
        options: Vec<SelectOption>,
        selected: Option<String>,
        clearable: bool,
    },
    /// Delegated to a tag-editing surface.
    Tags {
        value: Vec<String>,
        suggestions: Vec<String>,
    },
}

/// What the user entered in an editor.
#[derive(Debug, Clone, PartialEq)]
pub enum EditInput {
    /// Free text, in display form.
    Text(String),
    /// A picked value (date picker, option id, tag list, checkbox).
    Value(Value),
    /// The value was explicitly cleared.
    Clear,
}

/// A rendered cell: read mode or edit mode.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Read(CellContent),
    Edit(Editor),
}

/// What the engine should do after a click.
#[derive(Debug, Clone, PartialEq)]
pub enum CellAction {
    None,
    /// Enter edit mode for this cell.
    BeginEdit,
    /// Save this value right away (quick toggles).
    Save(Value),
    ToggleSelection(RowId),
    ToggleExpand(RowId),
    Invoke { row: RowId, action: RowAction },
}
