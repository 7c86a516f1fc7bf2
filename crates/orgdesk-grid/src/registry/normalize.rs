use once_cell::sync::Lazy;
use orgdesk_core::{ColumnDescriptor, FieldType};
use regex::Regex;
use serde_json::{Number, Value};

use super::display::{is_truthy, parse_multi_values, value_to_text};
use super::id_number::is_valid_id_number;
use super::{FieldRegistry, ID_NUMBER_FIELD, Normalized};
use crate::error::ValidationError;

static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-1][0-9]|2[0-3]):([0-5][0-9])$").expect("valid time pattern"));

impl FieldRegistry {
    /// Turn raw editor input into the value committed to the backend
    ///
    /// Normalizing an already-normalized value returns it unchanged.
    pub fn normalize(
        &self,
        column: &ColumnDescriptor,
        input: &Value,
    ) -> Result<Normalized, ValidationError> {
        if column.field_name() == ID_NUMBER_FIELD {
            let text = value_to_text(input).trim().to_string();
            if text.is_empty() {
                return Ok(Normalized::Unset);
            }
            if !is_valid_id_number(&text) {
                return Err(ValidationError::InvalidIdNumber(text));
            }
            return Ok(Normalized::Set(Value::String(text)));
        }

        if column.is_multi_choice() {
            let values = parse_multi_values(input)
                .into_iter()
                .map(|v| {
                    let value = column.option_value_for(&v).map(str::to_string).unwrap_or(v);
                    Value::String(value)
                })
                .collect();
            return Ok(Normalized::Set(Value::Array(values)));
        }

        if column.is_single_choice() {
            let text = value_to_text(input).trim().to_string();
            if text.is_empty() {
                return Ok(Normalized::Unset);
            }
            let value = column
                .option_value_for(&text)
                .map(str::to_string)
                .unwrap_or(text);
            return Ok(Normalized::Set(Value::String(value)));
        }

        match column.field_type {
            FieldType::Checkbox => Ok(Normalized::Set(Value::Bool(is_truthy(input)))),
            FieldType::Date => Ok(self.normalize_date(input)),
            FieldType::Time => normalize_time(input),
            FieldType::Money => normalize_money(input),
            FieldType::Number => normalize_number(input),
            FieldType::Address if input.is_object() => Ok(Normalized::Set(input.clone())),
            _ => {
                if input.is_null() {
                    return Ok(Normalized::Unset);
                }
                Ok(Normalized::Set(Value::String(
                    value_to_text(input).trim().to_string(),
                )))
            }
        }
    }

    /// Dates commit as ISO `YYYY-MM-DD`; text that does not parse is kept as typed
    fn normalize_date(&self, input: &Value) -> Normalized {
        let text = value_to_text(input).trim().to_string();
        if text.is_empty() {
            return Normalized::Unset;
        }
        match self.parse_date(&text) {
            Some(date) => Normalized::Set(Value::String(date.format("%Y-%m-%d").to_string())),
            None => {
                tracing::debug!(input = %text, "Unparsable date committed unchanged");
                Normalized::Set(Value::String(text))
            }
        }
    }
}

fn normalize_time(input: &Value) -> Result<Normalized, ValidationError> {
    let text = value_to_text(input).trim().to_string();
    if text.is_empty() {
        return Ok(Normalized::Unset);
    }
    if TIME_RE.is_match(&text) {
        Ok(Normalized::Set(Value::String(text)))
    } else {
        Err(ValidationError::InvalidTime(text))
    }
}

fn normalize_money(input: &Value) -> Result<Normalized, ValidationError> {
    if let Value::Number(_) = input {
        return Ok(Normalized::Set(input.clone()));
    }

    let raw = value_to_text(input);
    let stripped: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if stripped.is_empty() {
        return Ok(Normalized::Unset);
    }
    if stripped.parse::<f64>().is_err() {
        return Err(ValidationError::InvalidMoney(raw));
    }
    Ok(Normalized::Set(Value::String(stripped)))
}

fn normalize_number(input: &Value) -> Result<Normalized, ValidationError> {
    if let Value::Number(_) = input {
        return Ok(Normalized::Set(input.clone()));
    }

    let text = value_to_text(input).trim().to_string();
    if text.is_empty() {
        return Ok(Normalized::Unset);
    }
    if let Ok(int) = text.parse::<i64>() {
        return Ok(Normalized::Set(Value::Number(int.into())));
    }
    text.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(|n| Normalized::Set(Value::Number(n)))
        .ok_or(ValidationError::InvalidNumber(text))
}
