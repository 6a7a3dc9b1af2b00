//! Bound argument values.
//!
//! The parameter binder produces one [`BoundValue`] per action parameter and
//! collects them into [`Arguments`], keyed by parameter name in declaration
//! order. Structured values are held as JSON; uploaded files stay as raw
//! bytes.

use crate::error::{SwiftError, SwiftResult};
use bytes::Bytes;
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A file received in a form payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Form field name.
    pub field_name: String,
    /// Client-supplied file name.
    pub file_name: Option<String>,
    /// Declared content type.
    pub content_type: Option<String>,
    /// File contents.
    pub data: Bytes,
}

impl UploadedFile {
    /// Returns the size in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` for empty uploads.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// The value bound to a parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundValue {
    /// No value.
    Null,
    /// A structured or scalar value.
    Json(Value),
    /// One uploaded file.
    File(UploadedFile),
    /// Several uploaded files.
    Files(Vec<UploadedFile>),
    /// An object populated from form fields, possibly holding files.
    Form(IndexMap<String, BoundValue>),
}

impl BoundValue {
    /// Returns `true` for [`BoundValue::Null`] and JSON null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null | Self::Json(Value::Null))
    }

    /// Converts to JSON.
    ///
    /// File contents are not representable and become null.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null | Self::File(_) | Self::Files(_) => Value::Null,
            Self::Json(value) => value.clone(),
            Self::Form(fields) => {
                let map: Map<String, Value> = fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_json()))
                    .collect();
                Value::Object(map)
            }
        }
    }

    /// Returns the JSON value, if this is one.
    #[must_use]
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the single file, if this is one.
    #[must_use]
    pub fn as_file(&self) -> Option<&UploadedFile> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }

    /// Returns all files held directly by this value.
    #[must_use]
    pub fn files(&self) -> &[UploadedFile] {
        match self {
            Self::File(file) => std::slice::from_ref(file),
            Self::Files(files) => files,
            _ => &[],
        }
    }

    /// Returns a form field, if this is a form object.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&BoundValue> {
        match self {
            Self::Form(fields) => fields.get(name),
            _ => None,
        }
    }
}

impl From<Value> for BoundValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            other => Self::Json(other),
        }
    }
}

/// Resolved arguments for one invocation, in declaration order.
///
/// # Example
///
/// ```
/// use swiftapi_core::{Arguments, BoundValue};
/// use serde_json::json;
///
/// let mut args = Arguments::new();
/// args.insert("userId", BoundValue::Json(json!(7)));
///
/// let user_id: i32 = args.get("userId").unwrap();
/// assert_eq!(user_id, 7);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    values: IndexMap<String, BoundValue>,
}

impl Arguments {
    /// Creates an empty argument list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an argument.
    pub fn insert(&mut self, name: impl Into<String>, value: BoundValue) {
        self.values.insert(name.into(), value);
    }

    /// Returns the raw bound value.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&BoundValue> {
        self.values.get(name)
    }

    /// Deserializes an argument into `T`.
    ///
    /// A missing argument deserializes from null, so `Option<T>` targets
    /// yield `None`.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> SwiftResult<T> {
        let value = self
            .values
            .get(name)
            .map_or(Value::Null, BoundValue::to_json);
        serde_json::from_value(value).map_err(|e| {
            SwiftError::invalid_parameter(name, format!("Argument '{name}' has the wrong shape: {e}"))
        })
    }

    /// Returns the single file bound to `name`.
    #[must_use]
    pub fn file(&self, name: &str) -> Option<&UploadedFile> {
        self.values.get(name).and_then(BoundValue::as_file)
    }

    /// Returns every file bound to `name`.
    #[must_use]
    pub fn files(&self, name: &str) -> &[UploadedFile] {
        self.values.get(name).map_or(&[], BoundValue::files)
    }

    /// Returns `true` if the argument is absent or null.
    #[must_use]
    pub fn is_null(&self, name: &str) -> bool {
        self.values.get(name).map_or(true, BoundValue::is_null)
    }

    /// Iterates arguments in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BoundValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Filter {
        id: i32,
        name: Option<String>,
    }

    #[test]
    fn test_get_composite() {
        let mut args = Arguments::new();
        args.insert("filter", BoundValue::Json(json!({"id": 5, "name": "Bob"})));

        let filter: Filter = args.get("filter").unwrap();
        assert_eq!(
            filter,
            Filter {
                id: 5,
                name: Some("Bob".to_string())
            }
        );
    }

    #[test]
    fn test_missing_argument_is_null() {
        let args = Arguments::new();
        let value: Option<i32> = args.get("missing").unwrap();
        assert!(value.is_none());
        assert!(args.is_null("missing"));
    }

    #[test]
    fn test_wrong_shape_is_invalid_argument() {
        let mut args = Arguments::new();
        args.insert("id", BoundValue::Json(json!("abc")));
        let err = args.get::<i32>("id").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_form_with_files() {
        let file = UploadedFile {
            field_name: "avatar".to_string(),
            file_name: Some("me.png".to_string()),
            content_type: Some("image/png".to_string()),
            data: Bytes::from_static(b"\x89PNG"),
        };
        let mut fields = IndexMap::new();
        fields.insert("name".to_string(), BoundValue::Json(json!("Ann")));
        fields.insert("avatar".to_string(), BoundValue::File(file.clone()));

        let mut args = Arguments::new();
        args.insert("profile", BoundValue::Form(fields));

        let profile = args.value("profile").unwrap();
        assert_eq!(profile.field("avatar").and_then(BoundValue::as_file), Some(&file));
        assert_eq!(profile.to_json(), json!({"name": "Ann", "avatar": null}));
    }

    #[test]
    fn test_files_accessor() {
        let file = UploadedFile {
            field_name: "docs".to_string(),
            file_name: None,
            content_type: None,
            data: Bytes::from_static(b"abc"),
        };
        let mut args = Arguments::new();
        args.insert("docs", BoundValue::Files(vec![file.clone(), file]));
        assert_eq!(args.files("docs").len(), 2);
        assert!(args.file("docs").is_none());
    }
}
