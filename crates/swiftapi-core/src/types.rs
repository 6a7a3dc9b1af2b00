//! Semantic type descriptors.
//!
//! Parameters, return values and models are described by a
//! [`TypeDescriptor`]. The binder uses it to coerce raw request text and the
//! schema generator uses it to produce documentation schemas.
//!
//! Recursive shapes are expressed with [`TypeDescriptor::Named`], which refers
//! to a [`Model`] registered in a [`ModelCatalog`].

use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

/// Width and signedness of an integer type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntegerWidth {
    /// 8-bit signed.
    I8,
    /// 16-bit signed.
    I16,
    /// 32-bit signed.
    I32,
    /// 64-bit signed.
    I64,
    /// 8-bit unsigned.
    U8,
    /// 16-bit unsigned.
    U16,
    /// 32-bit unsigned.
    U32,
    /// 64-bit unsigned.
    U64,
}

impl IntegerWidth {
    /// Returns `true` for the 64-bit widths.
    #[must_use]
    pub const fn is_wide(&self) -> bool {
        matches!(self, Self::I64 | Self::U64)
    }

    /// Returns `true` for the signed widths.
    #[must_use]
    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::I8 | Self::I16 | Self::I32 | Self::I64)
    }

    /// Inclusive range of values this width can hold.
    #[must_use]
    pub const fn bounds(&self) -> (i128, i128) {
        match self {
            Self::I8 => (i8::MIN as i128, i8::MAX as i128),
            Self::I16 => (i16::MIN as i128, i16::MAX as i128),
            Self::I32 => (i32::MIN as i128, i32::MAX as i128),
            Self::I64 => (i64::MIN as i128, i64::MAX as i128),
            Self::U8 => (0, u8::MAX as i128),
            Self::U16 => (0, u16::MAX as i128),
            Self::U32 => (0, u32::MAX as i128),
            Self::U64 => (0, u64::MAX as i128),
        }
    }
}

/// A semantic description of a value's type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// UTF-8 text.
    String,
    /// A single character.
    Char,
    /// `true` / `false`.
    Boolean,
    /// An integer of the given width.
    Integer(IntegerWidth),
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Decimal number.
    Decimal,
    /// UUID identifier.
    Uuid,
    /// Timestamp.
    DateTime,
    /// One uploaded file.
    File,
    /// Several uploaded files.
    FileArray,
    /// A value that may be absent.
    Nullable(Box<TypeDescriptor>),
    /// A homogeneous list.
    Array(Box<TypeDescriptor>),
    /// An inline object shape.
    Object(Model),
    /// A reference to a registered model.
    Named(String),
    /// Any value.
    Any,
    /// No value.
    Unit,
}

impl TypeDescriptor {
    /// 32-bit signed integer.
    #[must_use]
    pub const fn int32() -> Self {
        Self::Integer(IntegerWidth::I32)
    }

    /// 64-bit signed integer.
    #[must_use]
    pub const fn int64() -> Self {
        Self::Integer(IntegerWidth::I64)
    }

    /// Wraps a type as nullable.
    #[must_use]
    pub fn nullable(inner: Self) -> Self {
        Self::Nullable(Box::new(inner))
    }

    /// A list of `items`.
    #[must_use]
    pub fn array(items: Self) -> Self {
        Self::Array(Box::new(items))
    }

    /// Reference to a registered model.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Returns `true` for nullable types.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        matches!(self, Self::Nullable(_))
    }

    /// Strips one nullable wrapper.
    #[must_use]
    pub fn unwrap_nullable(&self) -> &Self {
        match self {
            Self::Nullable(inner) => inner,
            other => other,
        }
    }

    /// Returns `true` for object shapes, inline or named.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(self.unwrap_nullable(), Self::Object(_) | Self::Named(_))
    }

    /// Returns `true` for file and file-array types.
    #[must_use]
    pub fn is_file(&self) -> bool {
        matches!(self.unwrap_nullable(), Self::File | Self::FileArray)
    }

    /// Returns `true` for types that always have a value when absent.
    ///
    /// Value types default to their zero value; everything else defaults to
    /// null.
    #[must_use]
    pub const fn is_value_type(&self) -> bool {
        matches!(
            self,
            Self::Char
                | Self::Boolean
                | Self::Integer(_)
                | Self::Float
                | Self::Double
                | Self::Decimal
                | Self::Uuid
                | Self::DateTime
        )
    }

    /// The value used when nothing was supplied for this type.
    #[must_use]
    pub fn default_value(&self) -> Value {
        match self {
            Self::Char => Value::String("\0".to_string()),
            Self::Boolean => Value::Bool(false),
            Self::Integer(_) => Value::from(0),
            Self::Float | Self::Double | Self::Decimal => Value::from(0.0),
            Self::Uuid => Value::String(uuid::Uuid::nil().to_string()),
            Self::DateTime => Value::String("0001-01-01T00:00:00Z".to_string()),
            _ => Value::Null,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Char => f.write_str("char"),
            Self::Boolean => f.write_str("boolean"),
            Self::Integer(w) => write!(f, "{}", format!("{w:?}").to_lowercase()),
            Self::Float => f.write_str("float"),
            Self::Double => f.write_str("double"),
            Self::Decimal => f.write_str("decimal"),
            Self::Uuid => f.write_str("uuid"),
            Self::DateTime => f.write_str("date-time"),
            Self::File => f.write_str("file"),
            Self::FileArray => f.write_str("file[]"),
            Self::Nullable(inner) => write!(f, "{inner}?"),
            Self::Array(items) => write!(f, "{items}[]"),
            Self::Object(model) => f.write_str(&model.name),
            Self::Named(name) => f.write_str(name),
            Self::Any => f.write_str("any"),
            Self::Unit => f.write_str("unit"),
        }
    }
}

/// One property of a model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Property {
    /// Property name as declared.
    pub name: String,
    /// Property type.
    pub ty: TypeDescriptor,
}

/// A named data shape.
///
/// # Example
///
/// ```
/// use swiftapi_core::{Model, TypeDescriptor};
///
/// let address = Model::new("Address")
///     .property("street", TypeDescriptor::String)
///     .property("zip", TypeDescriptor::nullable(TypeDescriptor::String));
///
/// assert_eq!(address.properties.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Model {
    /// Model name.
    pub name: String,
    /// Properties in declaration order.
    pub properties: Vec<Property>,
}

impl Model {
    /// Creates a model with no properties.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Adds a property.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, ty: TypeDescriptor) -> Self {
        self.properties.push(Property {
            name: name.into(),
            ty,
        });
        self
    }

    /// Wraps this model as an inline type.
    #[must_use]
    pub fn into_type(self) -> TypeDescriptor {
        TypeDescriptor::Object(self)
    }

    /// Finds a property by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// Finds a property ignoring ASCII case.
    #[must_use]
    pub fn get_ignore_case(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

/// Registered models, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct ModelCatalog {
    models: IndexMap<String, Model>,
}

impl ModelCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a model, replacing any previous model with the same name.
    pub fn insert(&mut self, model: Model) {
        self.models.insert(model.name.clone(), model);
    }

    /// Looks up a model by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    /// Returns `true` if a model with this name exists.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Resolves the object shape behind a type, if it has one.
    ///
    /// Inline objects resolve to themselves and named references are looked
    /// up. Nullable wrappers are ignored.
    #[must_use]
    pub fn resolve<'a>(&'a self, ty: &'a TypeDescriptor) -> Option<&'a Model> {
        match ty.unwrap_nullable() {
            TypeDescriptor::Object(model) => Some(model),
            TypeDescriptor::Named(name) => self.get(name),
            _ => None,
        }
    }

    /// Iterates models in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Model> {
        self.models.values()
    }

    /// Returns the number of models.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Returns `true` if no models are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
