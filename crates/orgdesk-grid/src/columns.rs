//! Column model
//!
//! Merges a screen's base column declarations with the organization's
//! dynamic field declarations into one ordered list of `ColumnDescriptor`s.
//! Once built, base and dynamic columns are handled the same way everywhere
//! except the column order controller.

use std::collections::HashSet;

use orgdesk_core::{
    ACTIONS_COLUMN_ID, ColumnDecl, ColumnDescriptor, DYNAMIC_FIELDS_KEY, Relationship,
    SELECT_COLUMN_ID,
};

use crate::error::{GridError, GridResult};

/// Column id derived from an accessor path (`dynamicFields.shirt` -> `dynamicFields_shirt`)
pub fn column_id_for(accessor_path: &str) -> String {
    accessor_path.replace('.', "_")
}

/// Header label derived from a field name (`firstName` -> `First Name`)
fn header_for(field_name: &str) -> String {
    let mut header = String::with_capacity(field_name.len() + 4);
    let mut prev_lower = false;
    for ch in field_name.chars() {
        if ch == '_' || ch == '-' {
            header.push(' ');
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower {
            header.push(' ');
        }
        if header.is_empty() || header.ends_with(' ') {
            header.extend(ch.to_uppercase());
        } else {
            header.push(ch);
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
    }
    header
}

fn describe(decl: ColumnDecl) -> GridResult<ColumnDescriptor> {
    let accessor_path = decl.accessor_path.trim().to_string();
    if accessor_path.is_empty() {
        return Err(GridError::Configuration(
            "column declared without an accessor path".to_string(),
        ));
    }

    let id = decl
        .id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| column_id_for(&accessor_path));
    let field_name = accessor_path.rsplit('.').next().unwrap_or(&accessor_path);
    let header = decl.header.unwrap_or_else(|| header_for(field_name));
    let dynamic = accessor_path
        .strip_prefix(DYNAMIC_FIELDS_KEY)
        .is_some_and(|rest| rest.starts_with('.'));

    Ok(ColumnDescriptor {
        id,
        header,
        field_type: decl.field_type.unwrap_or_default(),
        options: decl.options,
        relationship: decl.relationship_options.map(|options| Relationship {
            options,
            multiple: decl.relationship_multiple,
        }),
        editable: decl.editable.unwrap_or(true),
        hidden: decl.hidden,
        exclude_from_search: decl.exclude_from_search,
        dynamic,
        accessor_path,
    })
}

/// Builder for a `ColumnModel`
#[derive(Debug, Default)]
pub struct ColumnModelBuilder {
    base: Vec<ColumnDecl>,
    dynamic: Vec<ColumnDecl>,
    selection_column: bool,
    actions_column: bool,
}

impl ColumnModelBuilder {
    pub fn base(mut self, decls: impl IntoIterator<Item = ColumnDecl>) -> Self {
        self.base.extend(decls);
        self
    }

    /// Organization-defined fields. Accessors without the `dynamicFields.`
    /// prefix are moved under it.
    pub fn dynamic(mut self, decls: impl IntoIterator<Item = ColumnDecl>) -> Self {
        let prefix = format!("{}.", DYNAMIC_FIELDS_KEY);
        self.dynamic.extend(decls.into_iter().map(|mut decl| {
            if !decl.accessor_path.starts_with(&prefix) {
                decl.accessor_path = format!("{}{}", prefix, decl.accessor_path);
            }
            decl
        }));
        self
    }

    pub fn with_selection_column(mut self) -> Self {
        self.selection_column = true;
        self
    }

    pub fn with_actions_column(mut self) -> Self {
        self.actions_column = true;
        self
    }

    pub fn build(self) -> GridResult<ColumnModel> {
        let mut columns = Vec::with_capacity(self.base.len() + self.dynamic.len() + 2);

        if self.selection_column {
            columns.push(ColumnDescriptor::control(SELECT_COLUMN_ID));
        }
        for decl in self.base.into_iter().chain(self.dynamic) {
            columns.push(describe(decl)?);
        }
        if self.actions_column {
            columns.push(ColumnDescriptor::control(ACTIONS_COLUMN_ID));
        }

        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if !seen.insert(column.id.as_str()) {
                return Err(GridError::Configuration(format!(
                    "duplicate column id '{}'",
                    column.id
                )));
            }
        }

        tracing::debug!(
            columns = columns.len(),
            dynamic = columns.iter().filter(|c| c.dynamic).count(),
            "Built column model"
        );

        Ok(ColumnModel { columns })
    }
}

/// Ordered, normalized columns of one grid instance
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnModel {
    columns: Vec<ColumnDescriptor>,
}

impl ColumnModel {
    pub fn builder() -> ColumnModelBuilder {
        ColumnModelBuilder::default()
    }

    /// Columns in display order, hidden ones included
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn require(&self, id: &str) -> GridResult<&ColumnDescriptor> {
        self.get(id)
            .ok_or_else(|| GridError::UnknownColumn(id.to_string()))
    }

    pub fn by_accessor(&self, accessor_path: &str) -> Option<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|c| !c.is_control() && c.accessor_path == accessor_path)
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == id)
    }

    pub fn visible(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| !c.hidden)
    }

    /// Visible data columns, the ones rendered and exported as values
    pub fn visible_data(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.visible().filter(|c| !c.is_control())
    }

    /// Columns offered by advanced search
    pub fn searchable(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns
            .iter()
            .filter(|c| !c.hidden && !c.exclude_from_search && !c.is_control())
    }

    pub fn dynamic_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns.iter().filter(|c| c.dynamic)
    }

    /// Field names of the dynamic columns in their current display order
    pub fn dynamic_field_names(&self) -> Vec<String> {
        self.dynamic_columns()
            .filter_map(|c| c.dynamic_field_name())
            .map(str::to_string)
            .collect()
    }

    /// Replace headers of dynamic columns with labels from a resolver
    pub fn resolve_dynamic_headers(&mut self, resolve: impl Fn(&str) -> Option<String>) {
        for column in self.columns.iter_mut().filter(|c| c.dynamic) {
            let Some(field_name) = column.dynamic_field_name() else {
                continue;
            };
            if let Some(label) = resolve(field_name).filter(|l| !l.trim().is_empty()) {
                column.header = label;
            }
        }
    }

    pub fn set_header(&mut self, id: &str, header: impl Into<String>) -> GridResult<()> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| GridError::UnknownColumn(id.to_string()))?;
        column.header = header.into();
        Ok(())
    }

    pub fn set_hidden(&mut self, id: &str, hidden: bool) -> GridResult<()> {
        let column = self
            .columns
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| GridError::UnknownColumn(id.to_string()))?;
        column.hidden = hidden;
        Ok(())
    }

    /// Replace the display order. The new order must hold the same columns.
    pub(crate) fn set_order(&mut self, columns: Vec<ColumnDescriptor>) {
        debug_assert_eq!(columns.len(), self.columns.len());
        self.columns = columns;
    }
}
