//! Documentation emission.
//!
//! [`DocumentationEmitter`] walks every routed action and produces an
//! [`OpenApi`] document from the same metadata the dispatcher uses. Each
//! action becomes one operation:
//!
//! - operation id `{contract}_{action}` in lowercase, tagged with the
//!   upper-cased contract route name
//! - route and header parameters as `path` and `header` parameters
//! - scalar query parameters as-is, composite ones expanded per property
//! - body parameters as the request body
//! - `204 No Content` for unit returns, otherwise `200 Success`
//! - security requirements only when the action needs authorization

use indexmap::IndexMap;
use swiftapi_authz::AccessRule;
use swiftapi_core::{Action, BindingSource, Contract, ModelCatalog, SecurityOptions, TypeDescriptor};
use swiftapi_router::RouteTemplate;
use tracing::instrument;

use crate::error::DocsResult;
use crate::openapi::{
    Components, Info, MediaType, OpenApi, Operation, Parameter, ParameterIn, PathItem,
    RequestBody, Response, SecurityRequirement, Tag,
};
use crate::schema::SchemaGenerator;
use crate::security::{operation_security, security_schemes};

/// OpenAPI version written to every document.
pub const OPENAPI_VERSION: &str = "3.1.0";

const JSON: &str = "application/json";
const MULTIPART: &str = "multipart/form-data";

/// One routed action to document.
#[derive(Debug, Clone, Copy)]
pub struct DocumentedAction<'a> {
    /// Declaring contract.
    pub contract: &'a Contract,
    /// The action.
    pub action: &'a Action,
    /// Its synthesized route.
    pub route: &'a RouteTemplate,
    /// Its compiled access rule.
    pub access: &'a AccessRule,
}

/// Builds OpenAPI documents for routed actions.
#[derive(Debug)]
pub struct DocumentationEmitter<'a> {
    catalog: &'a ModelCatalog,
    security: &'a SecurityOptions,
    schemas: SchemaGenerator<'a>,
    info: Info,
}

impl<'a> DocumentationEmitter<'a> {
    /// Creates an emitter.
    #[must_use]
    pub fn new(catalog: &'a ModelCatalog, security: &'a SecurityOptions) -> Self {
        Self {
            catalog,
            security,
            schemas: SchemaGenerator::new(catalog),
            info: Info::default(),
        }
    }

    /// Sets the document metadata.
    #[must_use]
    pub fn info(mut self, info: Info) -> Self {
        self.info = info;
        self
    }

    /// Emits the document.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured security scheme lacks a required
    /// setting.
    #[instrument(level = "debug", skip_all, fields(title = %self.info.title))]
    pub fn emit<'b, I>(&self, actions: I) -> DocsResult<OpenApi>
    where
        I: IntoIterator<Item = DocumentedAction<'b>>,
    {
        let security_schemes = security_schemes(self.security)?;
        let security = operation_security(self.security, &security_schemes);

        let mut paths = IndexMap::<String, PathItem>::new();
        let mut tags: Vec<Tag> = Vec::new();
        for documented in actions {
            let operation = self.operation(&documented, &security);
            for tag in &operation.tags {
                if !tags.iter().any(|t| &t.name == tag) {
                    tags.push(Tag { name: tag.clone() });
                }
            }
            paths
                .entry(documented.route.documented_path())
                .or_default()
                .set_operation(documented.route.verb(), operation);
        }

        let schemas: IndexMap<_, _> = self
            .catalog
            .iter()
            .map(|model| (model.name.clone(), self.schemas.component(model)))
            .collect();
        let components = (!schemas.is_empty() || !security_schemes.is_empty()).then(|| Components {
            schemas,
            security_schemes,
        });

        tracing::debug!(paths = paths.len(), "documentation emitted");
        Ok(OpenApi {
            openapi: OPENAPI_VERSION.to_string(),
            info: self.info.clone(),
            paths,
            components,
            tags,
        })
    }

    /// Documents one action.
    ///
    /// `security` is attached only if the action requires authorization.
    #[must_use]
    pub fn operation(
        &self,
        documented: &DocumentedAction<'_>,
        security: &[SecurityRequirement],
    ) -> Operation {
        let DocumentedAction {
            contract, action, ..
        } = *documented;
        let contract_name = contract.route_name();

        let mut parameters = Vec::new();
        let mut request_body = None;
        for param in action.params() {
            match param.source {
                BindingSource::Route => {
                    parameters.push(self.parameter(&param.name, ParameterIn::Path, &param.ty, !param.optional));
                }
                BindingSource::Header => {
                    parameters.push(self.parameter(&param.name, ParameterIn::Header, &param.ty, !param.optional));
                }
                BindingSource::Query => match self.catalog.resolve(&param.ty) {
                    Some(model) => parameters.extend(model.properties.iter().map(|property| {
                        self.parameter(
                            &property.name,
                            ParameterIn::Query,
                            &property.ty,
                            property.ty.is_value_type(),
                        )
                    })),
                    None => parameters.push(self.parameter(
                        &param.name,
                        ParameterIn::Query,
                        &param.ty,
                        !param.optional && param.ty.is_value_type(),
                    )),
                },
                BindingSource::Body => {
                    let content_type = self.body_content_type(action, &param.ty);
                    request_body = Some(RequestBody {
                        required: !param.optional,
                        content: IndexMap::from([(
                            content_type.to_string(),
                            MediaType {
                                schema: Some(self.schemas.generate(&param.ty)),
                            },
                        )]),
                    });
                }
            }
        }

        Operation {
            operation_id: format!("{contract_name}_{}", action.method_name()).to_lowercase(),
            summary: Some(action.method_name().to_string()),
            tags: vec![contract_name.to_uppercase()],
            parameters,
            request_body,
            responses: self.responses(action.return_type()),
            security: if documented.access.requires_authorization() {
                security.to_vec()
            } else {
                Vec::new()
            },
        }
    }

    fn parameter(&self, name: &str, location: ParameterIn, ty: &TypeDescriptor, required: bool) -> Parameter {
        Parameter {
            name: name.to_string(),
            location,
            required,
            schema: Some(self.schemas.generate(ty)),
        }
    }

    fn body_content_type<'s>(&self, action: &'s Action, ty: &TypeDescriptor) -> &'s str {
        let declared = action.request_content_type();
        let has_files = ty.is_file()
            || self
                .catalog
                .resolve(ty)
                .is_some_and(|model| model.properties.iter().any(|p| p.ty.is_file()));
        if has_files && declared == JSON {
            MULTIPART
        } else {
            declared
        }
    }

    fn responses(&self, return_type: &TypeDescriptor) -> IndexMap<String, Response> {
        if matches!(return_type, TypeDescriptor::Unit) {
            return IndexMap::from([(
                "204".to_string(),
                Response {
                    description: "No Content".to_string(),
                    content: IndexMap::new(),
                },
            )]);
        }
        IndexMap::from([(
            "200".to_string(),
            Response {
                description: "Success".to_string(),
                content: IndexMap::from([(
                    JSON.to_string(),
                    MediaType {
                        schema: Some(self.schemas.generate(return_type)),
                    },
                )]),
            },
        )])
    }
}
