//! Field-type registry
//!
//! Maps a column's declared type to three things the rest of the engine
//! needs: how a value is displayed, which editor widget edits it (and what
//! value that widget is seeded with), and how raw editor input is normalized
//! into the value sent to the backend.

mod display;
mod id_number;
mod normalize;

use orgdesk_core::{ColumnDescriptor, FieldType, SelectOption};
use orgdesk_settings::GridSettings;
use serde_json::Value;

pub use display::{is_truthy, parse_multi_values, value_to_text};
pub use id_number::is_valid_id_number;

/// Accessor name of the organization-specific ID number convention
pub const ID_NUMBER_FIELD: &str = "idNumber";

/// Result of normalizing editor input
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    /// Commit this value
    Set(Value),
    /// Clear the field
    Unset,
}

impl Normalized {
    /// Value as sent to the backend (`null` for a cleared field)
    pub fn to_value(&self) -> Value {
        match self {
            Self::Set(v) => v.clone(),
            Self::Unset => Value::Null,
        }
    }
}

/// Editor widget contract for a column
#[derive(Debug, Clone, PartialEq)]
pub enum EditorKind {
    Text,
    Email,
    Phone,
    Link,
    Image,
    Address,
    Number,
    Money { currency_symbol: String },
    Date { format: String },
    /// `HH:MM`, 24h
    Time,
    /// Commits on toggle, no editing state
    Toggle,
    Select {
        options: Vec<SelectOption>,
        multiple: bool,
        /// Relationship fields render their values as chips
        chips: bool,
    },
}

/// Display, edit and normalization rules for every field type
#[derive(Debug, Clone)]
pub struct FieldRegistry {
    currency_symbol: String,
    date_format: String,
}

impl Default for FieldRegistry {
    fn default() -> Self {
        Self::from_settings(&GridSettings::default())
    }
}

impl FieldRegistry {
    pub fn from_settings(settings: &GridSettings) -> Self {
        Self {
            currency_symbol: settings.currency_symbol.clone(),
            date_format: settings.date_format.clone(),
        }
    }

    pub fn currency_symbol(&self) -> &str {
        &self.currency_symbol
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    /// Editor widget for a column. Also used for advanced-search inputs.
    pub fn editor(&self, column: &ColumnDescriptor) -> EditorKind {
        if column.is_relationship() || column.is_multi_choice() || column.is_single_choice() {
            return EditorKind::Select {
                options: column.choice_options().to_vec(),
                multiple: column.is_multi_choice(),
                chips: column.is_relationship(),
            };
        }

        match column.field_type {
            FieldType::Checkbox => EditorKind::Toggle,
            FieldType::Date => EditorKind::Date {
                format: self.date_format.clone(),
            },
            FieldType::Time => EditorKind::Time,
            FieldType::Money => EditorKind::Money {
                currency_symbol: self.currency_symbol.clone(),
            },
            FieldType::Number => EditorKind::Number,
            FieldType::Email => EditorKind::Email,
            FieldType::Phone => EditorKind::Phone,
            FieldType::Link => EditorKind::Link,
            FieldType::Image => EditorKind::Image,
            FieldType::Address => EditorKind::Address,
            FieldType::Text | FieldType::Select | FieldType::MultiSelect => EditorKind::Text,
        }
    }

    /// Whether the column uses the reduced toggle lifecycle
    pub fn commits_on_toggle(&self, column: &ColumnDescriptor) -> bool {
        column.field_type == FieldType::Checkbox && !column.is_relationship()
    }
}
