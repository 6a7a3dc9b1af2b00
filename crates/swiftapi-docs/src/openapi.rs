//! OpenAPI document types.
//!
//! These types follow the OpenAPI 3.1 specification closely enough to
//! serialize a valid document for the routes SwiftAPI synthesizes:
//! <https://spec.openapis.org/oas/v3.1.0>

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use swiftapi_core::HttpVerb;

use crate::error::{DocsError, DocsResult};

/// OpenAPI document root object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApi {
    /// OpenAPI version (always "3.1.0").
    pub openapi: String,
    /// API metadata.
    pub info: Info,
    /// API paths and operations.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub paths: IndexMap<String, PathItem>,
    /// Reusable components (schemas, security schemes).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
    /// Tags for API grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
}

impl OpenApi {
    /// Finds the operation bound to `verb` at `path`.
    #[must_use]
    pub fn operation(&self, verb: HttpVerb, path: &str) -> Option<&Operation> {
        self.paths.get(path)?.operation(verb)
    }

    /// Iterates every operation in path order.
    pub fn operations(&self) -> impl Iterator<Item = (&str, HttpVerb, &Operation)> {
        self.paths.iter().flat_map(|(path, item)| {
            item.operations()
                .map(move |(verb, op)| (path.as_str(), verb, op))
        })
    }

    /// Serializes the document as pretty-printed JSON.
    pub fn to_json(&self) -> DocsResult<String> {
        serde_json::to_string_pretty(self).map_err(DocsError::from)
    }
}

/// API metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Info {
    /// API title.
    pub title: String,
    /// API version.
    pub version: String,
    /// API description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            title: "SwiftAPI".to_string(),
            version: "v1".to_string(),
            description: None,
        }
    }
}

/// Operations available on a single path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    /// GET operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    /// PUT operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    /// POST operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    /// DELETE operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
}

impl PathItem {
    /// Returns the operation for `verb`.
    #[must_use]
    pub fn operation(&self, verb: HttpVerb) -> Option<&Operation> {
        match verb {
            HttpVerb::Get => self.get.as_ref(),
            HttpVerb::Post => self.post.as_ref(),
            HttpVerb::Put => self.put.as_ref(),
            HttpVerb::Delete => self.delete.as_ref(),
        }
    }

    /// Sets the operation for `verb`.
    pub fn set_operation(&mut self, verb: HttpVerb, operation: Operation) {
        let slot = match verb {
            HttpVerb::Get => &mut self.get,
            HttpVerb::Post => &mut self.post,
            HttpVerb::Put => &mut self.put,
            HttpVerb::Delete => &mut self.delete,
        };
        *slot = Some(operation);
    }

    /// Iterates the bound operations.
    pub fn operations(&self) -> impl Iterator<Item = (HttpVerb, &Operation)> {
        [
            (HttpVerb::Get, &self.get),
            (HttpVerb::Put, &self.put),
            (HttpVerb::Post, &self.post),
            (HttpVerb::Delete, &self.delete),
        ]
        .into_iter()
        .filter_map(|(verb, op)| op.as_ref().map(|op| (verb, op)))
    }
}

/// An API operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    /// Unique operation identifier.
    #[serde(rename = "operationId")]
    pub operation_id: String,
    /// Short summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Tags for grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// Parameters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "requestBody")]
    pub request_body: Option<RequestBody>,
    /// Responses keyed by status code.
    pub responses: IndexMap<String, Response>,
    /// Security requirements; any one of them suffices.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
}

impl Operation {
    /// Finds a parameter by name and location.
    #[must_use]
    pub fn parameter(&self, name: &str, location: ParameterIn) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|p| p.name == name && p.location == location)
    }
}

/// Parameter location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterIn {
    /// Query string parameter.
    Query,
    /// URL path parameter.
    Path,
    /// HTTP header.
    Header,
}

/// An operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name.
    pub name: String,
    /// Parameter location.
    #[serde(rename = "in")]
    pub location: ParameterIn,
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Parameter schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Request body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Whether required.
    #[serde(default)]
    pub required: bool,
    /// Content by media type.
    pub content: IndexMap<String, MediaType>,
}

/// Media type content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    /// Schema for this media type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// Response definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Description (required).
    pub description: String,
    /// Response content by media type.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub content: IndexMap<String, MediaType>,
}

/// Reusable components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    /// Reusable schemas.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub schemas: IndexMap<String, Schema>,
    /// Security schemes.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    #[serde(rename = "securitySchemes")]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

/// Security scheme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityScheme {
    /// Security scheme type: `http`, `apiKey`, `oauth2` or `openIdConnect`.
    #[serde(rename = "type")]
    pub scheme_type: String,
    /// Description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// HTTP auth scheme name (for type=http).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    /// Bearer token format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "bearerFormat")]
    pub bearer_format: Option<String>,
    /// API key location (for type=apiKey).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "in")]
    pub location: Option<String>,
    /// API key name (for type=apiKey).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// OAuth2 flows (for type=oauth2).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flows: Option<OAuthFlows>,
    /// Discovery URL (for type=openIdConnect).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "openIdConnectUrl")]
    pub open_id_connect_url: Option<String>,
}

/// Supported OAuth2 flows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthFlows {
    /// Resource owner password flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<OAuthFlow>,
    /// Authorization code flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "authorizationCode")]
    pub authorization_code: Option<OAuthFlow>,
    /// Client credentials flow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "clientCredentials")]
    pub client_credentials: Option<OAuthFlow>,
}

/// One OAuth2 flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OAuthFlow {
    /// Authorization endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "authorizationUrl")]
    pub authorization_url: Option<String>,
    /// Token endpoint.
    #[serde(rename = "tokenUrl")]
    pub token_url: String,
    /// Scope name to description.
    pub scopes: IndexMap<String, String>,
}

/// Security requirement: scheme name to required scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// API tag for grouping operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name.
    pub name: String,
}

/// JSON Schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaType {
    /// String type.
    String,
    /// Number type.
    Number,
    /// Integer type.
    Integer,
    /// Boolean type.
    Boolean,
    /// Array type.
    Array,
    /// Object type.
    Object,
}

/// JSON Schema definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Schema type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "type")]
    pub schema_type: Option<SchemaType>,
    /// Schema format (e.g., "date-time", "uuid").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Reference to another schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(rename = "$ref")]
    pub reference: Option<String>,
    /// Object properties.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Schema>,
    /// Required properties.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    /// Array item schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Whether nullable.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
}

impl Schema {
    fn typed(schema_type: SchemaType, format: Option<&str>) -> Self {
        Self {
            schema_type: Some(schema_type),
            format: format.map(String::from),
            ..Default::default()
        }
    }

    /// Create a string schema.
    #[must_use]
    pub fn string() -> Self {
        Self::typed(SchemaType::String, None)
    }

    /// Create a string schema with a format.
    #[must_use]
    pub fn string_format(format: &str) -> Self {
        Self::typed(SchemaType::String, Some(format))
    }

    /// Create an integer schema.
    #[must_use]
    pub fn integer(format: &str) -> Self {
        Self::typed(SchemaType::Integer, Some(format))
    }

    /// Create a number schema.
    #[must_use]
    pub fn number(format: &str) -> Self {
        Self::typed(SchemaType::Number, Some(format))
    }

    /// Create a boolean schema.
    #[must_use]
    pub fn boolean() -> Self {
        Self::typed(SchemaType::Boolean, None)
    }

    /// Create an array schema with the given item schema.
    #[must_use]
    pub fn array(items: Schema) -> Self {
        Self {
            schema_type: Some(SchemaType::Array),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    /// Create an object schema.
    #[must_use]
    pub fn object() -> Self {
        Self::typed(SchemaType::Object, None)
    }

    /// Create a reference to a component schema.
    #[must_use]
    pub fn component_ref(name: &str) -> Self {
        Self {
            reference: Some(format!("#/components/schemas/{name}")),
            ..Default::default()
        }
    }

    /// Add a property to an object schema.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(name.into(), schema);
        self
    }

    /// Mark a property as required.
    #[must_use]
    pub fn required_property(mut self, name: impl Into<String>) -> Self {
        self.required.push(name.into());
        self
    }

    /// Mark the schema as nullable.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operation(id: &str) -> Operation {
        Operation {
            operation_id: id.to_string(),
            summary: None,
            tags: vec![],
            parameters: vec![],
            request_body: None,
            responses: IndexMap::new(),
            security: vec![],
        }
    }

    #[test]
    fn test_schema_builders() {
        let integer = Schema::integer("int32");
        assert_eq!(integer.schema_type, Some(SchemaType::Integer));
        assert_eq!(integer.format.as_deref(), Some("int32"));

        let array = Schema::array(Schema::string());
        assert_eq!(array.schema_type, Some(SchemaType::Array));
        assert!(array.items.is_some());

        let object = Schema::object()
            .property("name", Schema::string())
            .required_property("name");
        assert!(object.properties.contains_key("name"));
        assert_eq!(object.required, vec!["name"]);
    }

    #[test]
    fn test_component_ref_serialization() {
        let json = serde_json::to_value(Schema::component_ref("User")).unwrap();
        assert_eq!(json, serde_json::json!({"$ref": "#/components/schemas/User"}));
    }

    #[test]
    fn test_nullable_only_serialized_when_set() {
        let plain = serde_json::to_string(&Schema::string()).unwrap();
        assert!(!plain.contains("nullable"));
        let nullable = serde_json::to_string(&Schema::string().nullable()).unwrap();
        assert!(nullable.contains("\"nullable\":true"));
    }

    #[test]
    fn test_path_item_operations() {
        let mut item = PathItem::default();
        item.set_operation(HttpVerb::Post, operation("orders_create"));
        item.set_operation(HttpVerb::Get, operation("orders_list"));

        let verbs: Vec<_> = item.operations().map(|(verb, _)| verb).collect();
        assert_eq!(verbs, vec![HttpVerb::Get, HttpVerb::Post]);
        assert!(item.operation(HttpVerb::Delete).is_none());

        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("orders_create"));
        assert!(!json.contains("delete"));
    }

    #[test]
    fn test_parameter_in_serialization() {
        let param = Parameter {
            name: "id".to_string(),
            location: ParameterIn::Header,
            required: false,
            schema: None,
        };

        let json = serde_json::to_string(&param).unwrap();
        assert!(json.contains("\"in\":\"header\""));
    }

    #[test]
    fn test_security_scheme_serialization() {
        let scheme = SecurityScheme {
            scheme_type: "oauth2".to_string(),
            flows: Some(OAuthFlows {
                client_credentials: Some(OAuthFlow {
                    authorization_url: None,
                    token_url: "https://auth.example.com/token".to_string(),
                    scopes: IndexMap::from([("read".to_string(), "Read".to_string())]),
                }),
                ..Default::default()
            }),
            ..Default::default()
        };

        let json = serde_json::to_value(&scheme).unwrap();
        assert_eq!(json["type"], "oauth2");
        assert_eq!(json["flows"]["clientCredentials"]["tokenUrl"], "https://auth.example.com/token");
        assert!(json["flows"].get("password").is_none());
    }

    #[test]
    fn test_document_lookup_and_json() {
        let mut doc = OpenApi {
            openapi: "3.1.0".to_string(),
            info: Info::default(),
            paths: IndexMap::new(),
            components: None,
            tags: vec![],
        };
        doc.paths
            .entry("/api/orders/list".to_string())
            .or_default()
            .set_operation(HttpVerb::Get, operation("orders_list"));

        assert!(doc.operation(HttpVerb::Get, "/api/orders/list").is_some());
        assert!(doc.operation(HttpVerb::Post, "/api/orders/list").is_none());
        assert_eq!(doc.operations().count(), 1);

        let json = doc.to_json().unwrap();
        assert!(json.contains("3.1.0"));
        assert!(json.contains("SwiftAPI"));
    }
}
