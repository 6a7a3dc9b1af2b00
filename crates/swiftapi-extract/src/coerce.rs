//! String-to-type coercion.
//!
//! Raw text from paths, query strings, headers and form fields is converted
//! to JSON values according to the target [`TypeDescriptor`]. Rules apply in
//! this order:
//!
//! 1. UUIDs are parsed directly.
//! 2. Nullable types unwrap; blank input is null, anything else recurses on
//!    the inner type.
//! 3. Primitives are parsed with width and format checks.
//! 4. Everything else falls back to JSON text, then to the raw string.
//!
//! Failures carry a human-readable reason; callers attach the parameter name
//! and source.

use chrono::{DateTime, NaiveDate};
use serde_json::{Number, Value};
use swiftapi_core::{IntegerWidth, TypeDescriptor};

/// Converts one raw string to `ty`.
///
/// # Errors
///
/// Returns the reason the text does not represent a `ty`.
///
/// # Example
///
/// ```rust
/// use swiftapi_core::TypeDescriptor;
/// use swiftapi_extract::coerce::coerce;
/// use serde_json::json;
///
/// assert_eq!(coerce(&TypeDescriptor::int32(), "42").unwrap(), json!(42));
/// assert_eq!(coerce(&TypeDescriptor::nullable(TypeDescriptor::int32()), " ").unwrap(), json!(null));
/// assert!(coerce(&TypeDescriptor::int32(), "forty-two").is_err());
/// ```
pub fn coerce(ty: &TypeDescriptor, raw: &str) -> Result<Value, String> {
    match ty {
        TypeDescriptor::Uuid => coerce_uuid(raw),
        TypeDescriptor::Nullable(inner) => {
            if raw.trim().is_empty() {
                Ok(Value::Null)
            } else {
                coerce(inner, raw)
            }
        }
        TypeDescriptor::String => Ok(Value::String(raw.to_string())),
        TypeDescriptor::Char => coerce_char(raw),
        TypeDescriptor::Boolean => coerce_bool(raw),
        TypeDescriptor::Integer(width) => coerce_integer(*width, raw),
        TypeDescriptor::Float => coerce_float(raw, true),
        TypeDescriptor::Double | TypeDescriptor::Decimal => coerce_float(raw, false),
        TypeDescriptor::DateTime => coerce_date_time(raw),
        TypeDescriptor::Array(items) => coerce_all(items, &split_list(raw)),
        TypeDescriptor::Unit => Ok(Value::Null),
        TypeDescriptor::File | TypeDescriptor::FileArray => {
            Err("files can only be read from form data".to_string())
        }
        TypeDescriptor::Object(_) | TypeDescriptor::Named(_) | TypeDescriptor::Any => {
            fallback(ty, raw)
        }
    }
}

/// Converts every occurrence of a repeated value.
///
/// Array targets take each occurrence as one item; a single occurrence is
/// split on commas. Scalar targets use the first occurrence.
///
/// # Errors
///
/// Returns the reason the first offending item is invalid.
pub fn coerce_values(ty: &TypeDescriptor, raw: &[&str]) -> Result<Value, String> {
    match (ty.unwrap_nullable(), raw) {
        (_, []) => Ok(Value::Null),
        (TypeDescriptor::Array(items), [single]) => {
            if ty.is_nullable() && single.trim().is_empty() {
                Ok(Value::Null)
            } else {
                coerce_all(items, &split_list(single))
            }
        }
        (TypeDescriptor::Array(items), many) => coerce_all(items, many),
        (_, [first, ..]) => coerce(ty, first),
    }
}

fn coerce_all(items: &TypeDescriptor, raw: &[&str]) -> Result<Value, String> {
    raw.iter()
        .map(|item| coerce(items, item))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

fn split_list(raw: &str) -> Vec<&str> {
    if raw.is_empty() {
        Vec::new()
    } else {
        raw.split(',').map(str::trim).collect()
    }
}

fn coerce_uuid(raw: &str) -> Result<Value, String> {
    uuid::Uuid::parse_str(raw.trim())
        .map(|id| Value::String(id.hyphenated().to_string()))
        .map_err(|e| format!("'{raw}' is not a valid UUID: {e}"))
}

fn coerce_char(raw: &str) -> Result<Value, String> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::String(c.to_string())),
        _ => Err(format!("'{raw}' is not a single character")),
    }
}

fn coerce_bool(raw: &str) -> Result<Value, String> {
    match raw.trim() {
        s if s.eq_ignore_ascii_case("true") || s == "1" => Ok(Value::Bool(true)),
        s if s.eq_ignore_ascii_case("false") || s == "0" => Ok(Value::Bool(false)),
        _ => Err(format!("'{raw}' is not a boolean")),
    }
}

fn coerce_integer(width: IntegerWidth, raw: &str) -> Result<Value, String> {
    let parsed: i128 = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not an integer"))?;
    let (min, max) = width.bounds();
    if parsed < min || parsed > max {
        return Err(format!("{parsed} is out of range [{min}, {max}]"));
    }
    let value = if width.is_signed() {
        i64::try_from(parsed).map(Value::from)
    } else {
        u64::try_from(parsed).map(Value::from)
    };
    value.map_err(|_| format!("{parsed} is out of range [{min}, {max}]"))
}

fn coerce_float(raw: &str, single: bool) -> Result<Value, String> {
    let trimmed = raw.trim();
    let parsed = if single {
        trimmed.parse::<f32>().map(f64::from)
    } else {
        trimmed.parse::<f64>()
    }
    .map_err(|_| format!("'{raw}' is not a number"))?;
    Number::from_f64(parsed)
        .map(Value::Number)
        .ok_or_else(|| format!("'{raw}' is not a finite number"))
}

fn coerce_date_time(raw: &str) -> Result<Value, String> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Value::String(parsed.to_rfc3339()));
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| Value::String(midnight.and_utc().to_rfc3339()))
        .ok_or_else(|| format!("'{raw}' is not an RFC 3339 date-time"))
}

fn fallback(ty: &TypeDescriptor, raw: &str) -> Result<Value, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(value) if matches!(ty, TypeDescriptor::Any) => Ok(value),
        Ok(Value::Null) => Ok(Value::Null),
        _ if matches!(ty, TypeDescriptor::Any) => Ok(Value::String(raw.to_string())),
        _ => Err(format!("'{raw}' cannot be converted to {ty}")),
    }
}
