//! Schema generation.
//!
//! [`SchemaGenerator`] maps a [`TypeDescriptor`] to a documentation
//! [`Schema`]:
//!
//! | Type | Schema |
//! |------|--------|
//! | string, char | `string` |
//! | uuid | `string` / `uuid` |
//! | date-time | `string` / `date-time` |
//! | boolean | `boolean` |
//! | 8 to 32-bit integers | `integer` / `int32` |
//! | 64-bit integers | `integer` / `int64` |
//! | float | `number` / `float` |
//! | double, decimal | `number` / `double` |
//! | array | `array` with `items` |
//! | object, named model, any | `object` |
//! | file, file array | `object` with one required binary string |
//!
//! Nullable types produce their inner schema marked `nullable`. A named
//! model that is already being expanded is emitted as a `$ref` to its
//! component schema, so recursive models terminate.

use std::collections::HashMap;

use parking_lot::RwLock;
use swiftapi_core::{IntegerWidth, Model, ModelCatalog, TypeDescriptor};

use crate::openapi::Schema;

/// Generates schemas for types, caching results per type.
#[derive(Debug)]
pub struct SchemaGenerator<'a> {
    catalog: &'a ModelCatalog,
    cache: RwLock<HashMap<TypeDescriptor, Schema>>,
}

impl<'a> SchemaGenerator<'a> {
    /// Creates a generator resolving named types through `catalog`.
    #[must_use]
    pub fn new(catalog: &'a ModelCatalog) -> Self {
        Self {
            catalog,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the schema for `ty`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use swiftapi_core::{Model, ModelCatalog, TypeDescriptor};
    /// use swiftapi_docs::{SchemaGenerator, SchemaType};
    ///
    /// let mut catalog = ModelCatalog::new();
    /// catalog.insert(
    ///     Model::new("Node")
    ///         .property("value", TypeDescriptor::int32())
    ///         .property("next", TypeDescriptor::nullable(TypeDescriptor::named("Node"))),
    /// );
    ///
    /// let generator = SchemaGenerator::new(&catalog);
    /// let schema = generator.generate(&TypeDescriptor::named("Node"));
    /// assert_eq!(schema.schema_type, Some(SchemaType::Object));
    /// assert_eq!(
    ///     schema.properties["next"].reference.as_deref(),
    ///     Some("#/components/schemas/Node")
    /// );
    /// ```
    #[must_use]
    pub fn generate(&self, ty: &TypeDescriptor) -> Schema {
        if let Some(schema) = self.cache.read().get(ty) {
            return schema.clone();
        }
        let schema = self.build(ty, &mut Vec::new());
        self.cache.write().insert(ty.clone(), schema.clone());
        schema
    }

    /// Returns the component schema for a registered model.
    ///
    /// References back to the model itself become `$ref`s.
    #[must_use]
    pub fn component(&self, model: &Model) -> Schema {
        let mut stack = vec![model.name.clone()];
        self.object(model, &mut stack)
    }

    /// Returns the number of cached schemas.
    #[must_use]
    pub fn cached(&self) -> usize {
        self.cache.read().len()
    }

    fn build(&self, ty: &TypeDescriptor, stack: &mut Vec<String>) -> Schema {
        match ty {
            TypeDescriptor::Nullable(inner) => self.build(inner, stack).nullable(),
            TypeDescriptor::String | TypeDescriptor::Char => Schema::string(),
            TypeDescriptor::Uuid => Schema::string_format("uuid"),
            TypeDescriptor::DateTime => Schema::string_format("date-time"),
            TypeDescriptor::Boolean => Schema::boolean(),
            TypeDescriptor::Integer(width) => Schema::integer(integer_format(*width)),
            TypeDescriptor::Float => Schema::number("float"),
            TypeDescriptor::Double | TypeDescriptor::Decimal => Schema::number("double"),
            TypeDescriptor::File => file_schema("file"),
            TypeDescriptor::FileArray => file_schema("files"),
            TypeDescriptor::Array(items) => Schema::array(self.build(items, stack)),
            TypeDescriptor::Object(model) => self.object(model, stack),
            TypeDescriptor::Named(name) => {
                if stack.iter().any(|n| n == name) {
                    return Schema::component_ref(name);
                }
                match self.catalog.get(name) {
                    Some(model) => {
                        stack.push(name.clone());
                        let schema = self.object(model, stack);
                        stack.pop();
                        schema
                    }
                    None => {
                        tracing::warn!(model = %name, "unregistered model documented as a plain object");
                        Schema::object()
                    }
                }
            }
            TypeDescriptor::Any | TypeDescriptor::Unit => Schema::object(),
        }
    }

    fn object(&self, model: &Model, stack: &mut Vec<String>) -> Schema {
        model.properties.iter().fold(Schema::object(), |schema, property| {
            schema.property(property.name.clone(), self.build(&property.ty, stack))
        })
    }
}

const fn integer_format(width: IntegerWidth) -> &'static str {
    if width.is_wide() {
        "int64"
    } else {
        "int32"
    }
}

fn file_schema(property: &str) -> Schema {
    Schema::object()
        .property(property, Schema::string_format("binary"))
        .required_property(property)
}
