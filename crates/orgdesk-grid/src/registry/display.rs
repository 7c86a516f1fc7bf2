use chrono::{DateTime, NaiveDate, NaiveDateTime};
use orgdesk_core::{ColumnDescriptor, FieldType};
use serde_json::Value;

use super::FieldRegistry;

/// Address members in display order
const ADDRESS_PARTS: &[&str] = &[
    "street",
    "houseNumber",
    "apartment",
    "city",
    "zip",
    "zipCode",
    "country",
];

impl FieldRegistry {
    /// Display text for a cell. Missing and null values render empty.
    pub fn display_text(&self, column: &ColumnDescriptor, value: Option<&Value>) -> String {
        let Some(value) = value.filter(|v| !v.is_null()) else {
            return String::new();
        };

        if column.is_multi_choice() {
            return parse_multi_values(value)
                .iter()
                .map(|v| column.option_label(v).unwrap_or(v).to_string())
                .collect::<Vec<_>>()
                .join(", ");
        }

        if column.is_single_choice() {
            let raw = value_to_text(value);
            return column.option_label(&raw).map(str::to_string).unwrap_or(raw);
        }

        match column.field_type {
            FieldType::Checkbox => {
                if is_truthy(value) {
                    "Yes".to_string()
                } else {
                    "No".to_string()
                }
            }
            FieldType::Date => self.format_date(value),
            FieldType::Money => self.format_money(value),
            FieldType::Address => format_address(value),
            _ => value_to_text(value),
        }
    }

    /// Value an editor is seeded with when a cell enters edit mode
    ///
    /// This is the editable representation, not the display string: dates
    /// in the configured format, money without its glyph, multi-selects as
    /// arrays of option values.
    pub fn edit_value(&self, column: &ColumnDescriptor, value: Option<&Value>) -> Value {
        let value = value.unwrap_or(&Value::Null);

        if column.is_multi_choice() {
            return Value::Array(
                parse_multi_values(value)
                    .into_iter()
                    .map(Value::String)
                    .collect(),
            );
        }

        if column.field_type == FieldType::Checkbox && !column.is_relationship() {
            return Value::Bool(is_truthy(value));
        }

        if value.is_null() {
            return Value::String(String::new());
        }

        match column.field_type {
            FieldType::Date => Value::String(self.format_date(value)),
            FieldType::Address => Value::String(format_address(value)),
            _ => Value::String(value_to_text(value)),
        }
    }

    /// Labels of the options currently held by a multi-choice value
    pub fn selected_labels(&self, column: &ColumnDescriptor, value: &Value) -> Vec<String> {
        parse_multi_values(value)
            .iter()
            .map(|v| column.option_label(v).unwrap_or(v).to_string())
            .collect()
    }

    pub(super) fn parse_date(&self, text: &str) -> Option<NaiveDate> {
        let text = text.trim();
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
            .or_else(|| {
                NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
                    .ok()
                    .map(|dt| dt.date())
            })
            .or_else(|| NaiveDate::parse_from_str(text, &self.date_format).ok())
    }

    fn format_date(&self, value: &Value) -> String {
        let raw = value_to_text(value);
        match self.parse_date(&raw) {
            Some(date) => date.format(&self.date_format).to_string(),
            None => raw,
        }
    }

    fn format_money(&self, value: &Value) -> String {
        let amount = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => {
                let cleaned: String = s
                    .chars()
                    .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
                    .collect();
                cleaned.parse::<f64>().ok()
            }
            _ => None,
        };

        match amount {
            Some(amount) => {
                let grouped = group_thousands(amount.abs());
                let sign = if amount < 0.0 && grouped != "0.00" { "-" } else { "" };
                format!("{}{}{}", sign, self.currency_symbol, grouped)
            }
            None => value_to_text(value),
        }
    }
}

/// Plain text of a value. Arrays join with `, `, objects render as JSON.
pub fn value_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(_) => value.to_string(),
    }
}

/// Checkbox truthiness: `true`, `"true"`, `"1"` and `1`
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => {
            let s = s.trim();
            s.eq_ignore_ascii_case("true") || s == "1"
        }
        Value::Number(n) => n.as_f64() == Some(1.0),
        _ => false,
    }
}

/// Option values held by a multi-choice value
///
/// Accepts an array, a JSON-array string, or a comma-joined string, tried in
/// that order.
pub fn parse_multi_values(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .iter()
            .map(|item| value_to_text(item).trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Vec::new();
            }
            if trimmed.starts_with('[') {
                if let Ok(parsed @ Value::Array(_)) = serde_json::from_str::<Value>(trimmed) {
                    return parse_multi_values(&parsed);
                }
            }
            trimmed
                .split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect()
        }
        other => vec![value_to_text(other)],
    }
}

fn format_address(value: &Value) -> String {
    let Some(map) = value.as_object() else {
        return value_to_text(value);
    };

    let parts: Vec<String> = ADDRESS_PARTS
        .iter()
        .filter_map(|key| map.get(*key))
        .map(value_to_text)
        .filter(|s| !s.trim().is_empty())
        .collect();
    if !parts.is_empty() {
        return parts.join(", ");
    }

    for key in ["formattedAddress", "formatted"] {
        if let Some(Value::String(s)) = map.get(key) {
            return s.clone();
        }
    }

    map.values()
        .filter_map(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `1234567.5` -> `1,234,567.50`
/// Two decimals with comma thousands separators, for a non-negative amount
fn group_thousands(amount: f64) -> String {
    let formatted = format!("{:.2}", amount);
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((&formatted, "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!("{}.{}", grouped, frac_part)
}
