//! Field types and column declarations
//!
//! A screen declares its columns as `ColumnDecl`s (usually deserialized from
//! JSON, merged with the organization's dynamic fields). The grid's column
//! model normalizes them into `ColumnDescriptor`s with stable ids.

use serde::{Deserialize, Serialize};

use crate::types::DYNAMIC_FIELDS_KEY;

/// Id of the row-selection control column
pub const SELECT_COLUMN_ID: &str = "select";

/// Id of the row-actions control column
pub const ACTIONS_COLUMN_ID: &str = "actions";

/// Semantic kind of a column's value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    #[default]
    Text,
    Select,
    MultiSelect,
    Checkbox,
    Date,
    Time,
    Money,
    Number,
    Email,
    Phone,
    Address,
    Image,
    Link,
}

impl FieldType {
    /// Parse a declared type name. Unknown names fall back to `Text`.
    pub fn parse(name: &str) -> Self {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && *c != ' ')
            .collect::<String>()
            .to_lowercase();

        match normalized.as_str() {
            "select" | "dropdown" => Self::Select,
            "multiselect" => Self::MultiSelect,
            "checkbox" | "boolean" | "bool" => Self::Checkbox,
            "date" => Self::Date,
            "time" => Self::Time,
            "money" | "currency" => Self::Money,
            "number" | "numeric" => Self::Number,
            "email" => Self::Email,
            "phone" | "tel" => Self::Phone,
            "address" => Self::Address,
            "image" => Self::Image,
            "link" | "url" => Self::Link,
            _ => Self::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Select => "SELECT",
            Self::MultiSelect => "MULTI_SELECT",
            Self::Checkbox => "CHECKBOX",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Money => "MONEY",
            Self::Number => "NUMBER",
            Self::Email => "EMAIL",
            Self::Phone => "PHONE",
            Self::Address => "ADDRESS",
            Self::Image => "IMAGE",
            Self::Link => "LINK",
        }
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of a select / multi-select / relationship field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
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

/// A column as declared by a screen, before normalization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDecl {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(alias = "accessorKey", alias = "accessor")]
    pub accessor_path: String,
    #[serde(default)]
    pub header: Option<String>,
    #[serde(default, rename = "type", alias = "fieldType")]
    pub field_type: Option<FieldType>,
    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub relationship_options: Option<Vec<SelectOption>>,
    #[serde(default)]
    pub relationship_multiple: bool,
    #[serde(default)]
    pub editable: Option<bool>,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub exclude_from_search: bool,
}

impl ColumnDecl {
    pub fn new(accessor_path: impl Into<String>) -> Self {
        Self {
            accessor_path: accessor_path.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn with_header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_relationship(mut self, options: Vec<SelectOption>, multiple: bool) -> Self {
        self.relationship_options = Some(options);
        self.relationship_multiple = multiple;
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = Some(false);
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn exclude_from_search(mut self) -> Self {
        self.exclude_from_search = true;
        self
    }

    /// Declaration for an organization-defined field stored under `dynamicFields`
    pub fn dynamic(field_name: &str) -> Self {
        Self::new(format!("{}.{}", DYNAMIC_FIELDS_KEY, field_name))
    }
}

/// A reference field's options and cardinality
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub options: Vec<SelectOption>,
    pub multiple: bool,
}

/// A normalized column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    pub id: String,
    pub accessor_path: String,
    pub header: String,
    pub field_type: FieldType,
    pub options: Vec<SelectOption>,
    pub relationship: Option<Relationship>,
    pub editable: bool,
    pub hidden: bool,
    pub exclude_from_search: bool,
    pub dynamic: bool,
}

impl ColumnDescriptor {
    /// A selection or actions column: never editable, searchable, or draggable
    pub fn control(id: &str) -> Self {
        Self {
            id: id.to_string(),
            accessor_path: String::new(),
            header: String::new(),
            field_type: FieldType::Text,
            options: Vec::new(),
            relationship: None,
            editable: false,
            hidden: false,
            exclude_from_search: true,
            dynamic: false,
        }
    }

    pub fn is_control(&self) -> bool {
        self.id == SELECT_COLUMN_ID || self.id == ACTIONS_COLUMN_ID
    }

    /// Field name inside `dynamicFields`, for dynamic columns
    pub fn dynamic_field_name(&self) -> Option<&str> {
        self.accessor_path
            .strip_prefix(DYNAMIC_FIELDS_KEY)
            .and_then(|rest| rest.strip_prefix('.'))
    }

    /// Last segment of the accessor path (`dynamicFields.idNumber` -> `idNumber`)
    pub fn field_name(&self) -> &str {
        self.accessor_path
            .rsplit('.')
            .next()
            .unwrap_or(self.accessor_path.as_str())
    }

    /// Options offered by the editor; relationship options win when present
    pub fn choice_options(&self) -> &[SelectOption] {
        match &self.relationship {
            Some(rel) => &rel.options,
            None => &self.options,
        }
    }

    pub fn is_relationship(&self) -> bool {
        self.relationship.is_some()
    }

    /// Whether committed values are arrays of option values
    pub fn is_multi_choice(&self) -> bool {
        match &self.relationship {
            Some(rel) => rel.multiple,
            None => self.field_type == FieldType::MultiSelect,
        }
    }

    /// Whether committed values are a single option value
    pub fn is_single_choice(&self) -> bool {
        match &self.relationship {
            Some(rel) => !rel.multiple,
            None => self.field_type == FieldType::Select,
        }
    }

    pub fn option_label(&self, value: &str) -> Option<&str> {
        self.choice_options()
            .iter()
            .find(|opt| opt.value == value)
            .map(|opt| opt.label.as_str())
    }

    /// Map a label (or value) typed by a user back to an option value
    pub fn option_value_for(&self, input: &str) -> Option<&str> {
        let options = self.choice_options();
        options
            .iter()
            .find(|opt| opt.value == input)
            .or_else(|| options.iter().find(|opt| opt.label == input))
            .map(|opt| opt.value.as_str())
    }

    /// Whether the column may enter edit mode at all
    pub fn can_edit(&self) -> bool {
        self.editable && !self.hidden && !self.is_control()
    }
}
