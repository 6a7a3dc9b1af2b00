//! JSON body decoding.
//!
//! The body is parsed once and then conformed to the target type: object
//! keys are matched to model properties ignoring ASCII case, missing
//! properties take their type's default, unknown keys are dropped and every
//! value is checked against its declared type.
//!
//! A body that does not parse or does not fit the target yields
//! [`BoundValue::Null`] rather than an error. Actions that require a body
//! must check for null themselves.

use serde_json::{Map, Value};
use swiftapi_core::{BoundValue, ModelCatalog, TypeDescriptor};

/// Decodes `body` as JSON shaped like `ty`.
///
/// # Example
///
/// ```rust
/// use swiftapi_core::{BoundValue, Model, ModelCatalog, TypeDescriptor};
/// use swiftapi_extract::json::decode_json;
/// use serde_json::json;
///
/// let order = Model::new("Order")
///     .property("id", TypeDescriptor::int32())
///     .property("note", TypeDescriptor::String)
///     .into_type();
///
/// let bound = decode_json(br#"{"ID": 5, "extra": true}"#, &order, &ModelCatalog::new());
/// assert_eq!(bound, BoundValue::Json(json!({"id": 5, "note": null})));
///
/// let bad = decode_json(br#"{"id": "five"}"#, &order, &ModelCatalog::new());
/// assert_eq!(bad, BoundValue::Null);
/// ```
#[must_use]
pub fn decode_json(body: &[u8], ty: &TypeDescriptor, catalog: &ModelCatalog) -> BoundValue {
    let parsed = match serde_json::from_slice::<Value>(body) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "request body is not valid JSON");
            return BoundValue::Null;
        }
    };
    match conform(parsed, ty, catalog) {
        Some(value) => BoundValue::from(value),
        None => {
            tracing::debug!(target_type = %ty, "request body does not match the declared type");
            BoundValue::Null
        }
    }
}

/// Checks `value` against `ty` and rekeys objects to declared property names.
///
/// Returns `None` on any type mismatch.
#[must_use]
pub fn conform(value: Value, ty: &TypeDescriptor, catalog: &ModelCatalog) -> Option<Value> {
    match (ty, value) {
        (TypeDescriptor::Nullable(_), Value::Null) => Some(Value::Null),
        (TypeDescriptor::Nullable(inner), value) => conform(value, inner, catalog),
        (TypeDescriptor::Any, value) => Some(value),
        (TypeDescriptor::Unit, _) => Some(Value::Null),

        // Reference types accept null.
        (
            TypeDescriptor::String
            | TypeDescriptor::Array(_)
            | TypeDescriptor::Object(_)
            | TypeDescriptor::Named(_)
            | TypeDescriptor::File
            | TypeDescriptor::FileArray,
            Value::Null,
        ) => Some(Value::Null),

        (TypeDescriptor::String, value @ Value::String(_)) => Some(value),
        (TypeDescriptor::Char, Value::String(s)) if s.chars().count() == 1 => {
            Some(Value::String(s))
        }
        (TypeDescriptor::Boolean, value @ Value::Bool(_)) => Some(value),
        (TypeDescriptor::Integer(width), Value::Number(n)) => {
            let (min, max) = width.bounds();
            let as_wide = n
                .as_i64()
                .map(i128::from)
                .or_else(|| n.as_u64().map(i128::from))?;
            (min..=max).contains(&as_wide).then_some(Value::Number(n))
        }
        (
            TypeDescriptor::Float | TypeDescriptor::Double | TypeDescriptor::Decimal,
            value @ Value::Number(_),
        ) => Some(value),
        (TypeDescriptor::Uuid, Value::String(s)) => uuid::Uuid::parse_str(&s)
            .ok()
            .map(|id| Value::String(id.hyphenated().to_string())),
        (TypeDescriptor::DateTime, Value::String(s)) => chrono::DateTime::parse_from_rfc3339(&s)
            .ok()
            .map(|_| Value::String(s)),
        (TypeDescriptor::Array(items), Value::Array(elements)) => elements
            .into_iter()
            .map(|element| conform(element, items, catalog))
            .collect::<Option<Vec<_>>>()
            .map(Value::Array),
        (TypeDescriptor::Object(_) | TypeDescriptor::Named(_), Value::Object(map)) => {
            match catalog.resolve(ty) {
                Some(model) => {
                    let mut source = map;
                    let mut shaped = Map::new();
                    for property in &model.properties {
                        let value = take_ignore_case(&mut source, &property.name);
                        let value = match value {
                            Some(value) => conform(value, &property.ty, catalog)?,
                            None => property.ty.default_value(),
                        };
                        shaped.insert(property.name.clone(), value);
                    }
                    Some(Value::Object(shaped))
                }
                None => Some(Value::Object(map)),
            }
        }
        _ => None,
    }
}

fn take_ignore_case(map: &mut Map<String, Value>, name: &str) -> Option<Value> {
    if let Some(value) = map.remove(name) {
        return Some(value);
    }
    let key = map.keys().find(|k| k.eq_ignore_ascii_case(name))?.clone();
    map.remove(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use swiftapi_core::{IntegerWidth, Model};

    fn catalog() -> ModelCatalog {
        let mut catalog = ModelCatalog::new();
        catalog.insert(
            Model::new("Line")
                .property("sku", TypeDescriptor::String)
                .property("qty", TypeDescriptor::int32()),
        );
        catalog.insert(
            Model::new("Order")
                .property("orderId", TypeDescriptor::Uuid)
                .property("lines", TypeDescriptor::array(TypeDescriptor::named("Line")))
                .property("parent", TypeDescriptor::nullable(TypeDescriptor::named("Order"))),
        );
        catalog
    }

    #[test]
    fn test_case_insensitive_nested_models() {
        let body = br#"{
            "ORDERID": "A0EEBC99-9C0B-4EF8-BB6D-6BB9BD380A11",
            "Lines": [{"SKU": "x-1", "Qty": 2}, {"sku": "y-2"}]
        }"#;
        let bound = decode_json(body, &TypeDescriptor::named("Order"), &catalog());
        assert_eq!(
            bound,
            BoundValue::Json(json!({
                "orderId": "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11",
                "lines": [{"sku": "x-1", "qty": 2}, {"sku": "y-2", "qty": 0}],
                "parent": null
            }))
        );
    }

    #[test]
    fn test_recursive_model() {
        let body = br#"{"orderId": "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11", "lines": [],
                        "parent": {"orderId": "00000000-0000-0000-0000-000000000000", "lines": null}}"#;
        let bound = decode_json(body, &TypeDescriptor::named("Order"), &catalog());
        let value = bound.as_json().unwrap();
        assert_eq!(value["parent"]["lines"], Value::Null);
        assert_eq!(value["parent"]["parent"], Value::Null);
    }

    #[test]
    fn test_malformed_body_is_null() {
        let ty = TypeDescriptor::named("Order");
        assert_eq!(decode_json(b"{not json", &ty, &catalog()), BoundValue::Null);
        assert_eq!(decode_json(b"", &ty, &catalog()), BoundValue::Null);
    }

    #[test]
    fn test_type_mismatch_is_null() {
        let ty = TypeDescriptor::named("Line");
        assert_eq!(decode_json(br#"{"qty": "two"}"#, &ty, &catalog()), BoundValue::Null);
        assert_eq!(decode_json(br#"[1, 2]"#, &ty, &catalog()), BoundValue::Null);
    }

    #[test]
    fn test_integer_bounds() {
        let ty = TypeDescriptor::Integer(IntegerWidth::U8);
        assert_eq!(conform(json!(255), &ty, &ModelCatalog::new()), Some(json!(255)));
        assert_eq!(conform(json!(256), &ty, &ModelCatalog::new()), None);
        assert_eq!(conform(json!(-1), &ty, &ModelCatalog::new()), None);
        assert_eq!(conform(json!(1.5), &ty, &ModelCatalog::new()), None);
    }

    #[test]
    fn test_value_types_reject_null() {
        assert_eq!(conform(Value::Null, &TypeDescriptor::int32(), &ModelCatalog::new()), None);
        assert_eq!(
            conform(Value::Null, &TypeDescriptor::nullable(TypeDescriptor::int32()), &ModelCatalog::new()),
            Some(Value::Null)
        );
        assert_eq!(conform(Value::Null, &TypeDescriptor::String, &ModelCatalog::new()), Some(Value::Null));
    }

    #[test]
    fn test_scalar_body() {
        assert_eq!(
            decode_json(b"\"hello\"", &TypeDescriptor::String, &ModelCatalog::new()),
            BoundValue::Json(json!("hello"))
        );
        assert_eq!(
            decode_json(b"[1,2,3]", &TypeDescriptor::array(TypeDescriptor::int64()), &ModelCatalog::new()),
            BoundValue::Json(json!([1, 2, 3]))
        );
    }
}
