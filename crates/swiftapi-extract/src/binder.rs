//! Parameter binding.
//!
//! [`ParameterBinder`] resolves every parameter of an action, in declaration
//! order, from the request:
//!
//! | Source | Resolution |
//! |--------|------------|
//! | Body | form fields and files when the body is a form, otherwise JSON |
//! | Route | the same-named path segment |
//! | Query, Header | path segment, then query string (headers first for Header) |
//!
//! Composite query targets are populated property by property with the same
//! lookup. Anything not supplied takes its type's default value.

use indexmap::IndexMap;
use serde_json::{Map, Value};
use swiftapi_core::{
    Arguments, BindingSource, BoundValue, Model, ModelCatalog, Parameter, TypeDescriptor,
};

use crate::coerce::coerce_values;
use crate::form::FormData;
use crate::json::decode_json;
use crate::query::QueryString;
use crate::{ExtractionContext, ExtractionError, ExtractionSource};

/// Default maximum body size (1 MiB).
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

/// Resolves action arguments from a request.
///
/// # Example
///
/// ```rust
/// use swiftapi_core::{ModelCatalog, Parameter, TypeDescriptor};
/// use swiftapi_extract::{ExtractionContext, ParameterBinder};
/// use http::Uri;
///
/// # tokio_test::block_on(async {
/// let params = [
///     Parameter::query("userId", TypeDescriptor::int32()),
///     Parameter::route("page", TypeDescriptor::int32()),
/// ];
/// let ctx = ExtractionContext::builder()
///     .uri(Uri::from_static("/api/orders/get_user_orders/2?userId=7"))
///     .path_param("page", "2")
///     .build();
///
/// let catalog = ModelCatalog::new();
/// let args = ParameterBinder::new(&catalog).bind(&params, &ctx).await.unwrap();
/// assert_eq!(args.get::<i32>("userId").unwrap(), 7);
/// assert_eq!(args.get::<i32>("page").unwrap(), 2);
/// # });
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ParameterBinder<'a> {
    catalog: &'a ModelCatalog,
    max_body_size: usize,
}

impl<'a> ParameterBinder<'a> {
    /// Creates a binder resolving named types through `catalog`.
    #[must_use]
    pub fn new(catalog: &'a ModelCatalog) -> Self {
        Self {
            catalog,
            max_body_size: DEFAULT_MAX_BODY_SIZE,
        }
    }

    /// Sets the largest body accepted.
    #[must_use]
    pub fn max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }

    /// Binds every parameter.
    ///
    /// # Errors
    ///
    /// Returns an error if a supplied value cannot be coerced to its declared
    /// type, a route value is missing, the body exceeds the size limit or a
    /// form body is malformed. A JSON body that does not fit binds as null.
    pub async fn bind(
        &self,
        params: &[Parameter],
        ctx: &ExtractionContext,
    ) -> Result<Arguments, ExtractionError> {
        let mut query: Option<QueryString> = None;
        let mut form: Option<FormData> = None;
        let mut args = Arguments::new();

        for param in params {
            let value = match param.source {
                BindingSource::Body => self.bind_body(param, ctx, &mut form).await?,
                BindingSource::Route if !param.ty.is_composite() => bind_route(param, ctx)?,
                BindingSource::Route | BindingSource::Query | BindingSource::Header => {
                    if query.is_none() {
                        query = Some(ctx.query()?);
                    }
                    self.bind_lookup(param, ctx, query.as_ref())?
                }
            };
            tracing::trace!(parameter = %param.name, source = ?param.source, "parameter bound");
            args.insert(param.name.clone(), value);
        }

        Ok(args)
    }

    async fn bind_body(
        &self,
        param: &Parameter,
        ctx: &ExtractionContext,
        form: &mut Option<FormData>,
    ) -> Result<BoundValue, ExtractionError> {
        let size = ctx.body().len();
        if size > self.max_body_size {
            return Err(ExtractionError::payload_too_large(self.max_body_size, size));
        }

        if !ctx.has_form_content_type() {
            return Ok(decode_json(ctx.body(), &param.ty, self.catalog));
        }

        if form.is_none() {
            *form = Some(FormData::from_context(ctx).await?);
        }
        match form.as_ref() {
            Some(form) => self.bind_form(param, form),
            None => Ok(BoundValue::Null),
        }
    }

    fn bind_form(&self, param: &Parameter, form: &FormData) -> Result<BoundValue, ExtractionError> {
        if let Some(model) = self.catalog.resolve(&param.ty) {
            return form_object(model, form);
        }
        form_value(&param.name, &param.ty, form, true)
    }

    fn bind_lookup(
        &self,
        param: &Parameter,
        ctx: &ExtractionContext,
        query: Option<&QueryString>,
    ) -> Result<BoundValue, ExtractionError> {
        let lookup = Lookup {
            ctx,
            query,
            headers: param.source == BindingSource::Header,
        };

        let Some(model) = self.catalog.resolve(&param.ty) else {
            return lookup.scalar(&param.name, &param.ty).map(BoundValue::from);
        };

        let mut object = Map::new();
        for property in &model.properties {
            object.insert(property.name.clone(), lookup.scalar(&property.name, &property.ty)?);
        }
        Ok(BoundValue::Json(Value::Object(object)))
    }
}

fn bind_route(param: &Parameter, ctx: &ExtractionContext) -> Result<BoundValue, ExtractionError> {
    let raw = ctx
        .path_params()
        .get_ignore_case(&param.name)
        .ok_or_else(|| ExtractionError::missing(ExtractionSource::Path, &param.name))?;
    coerce_values(&param.ty, &[raw])
        .map(BoundValue::from)
        .map_err(|reason| ExtractionError::invalid_type(ExtractionSource::Path, &param.name, reason))
}

/// Where query-like values are looked up, in priority order.
struct Lookup<'r> {
    ctx: &'r ExtractionContext,
    query: Option<&'r QueryString>,
    headers: bool,
}

impl Lookup<'_> {
    fn scalar(&self, name: &str, ty: &TypeDescriptor) -> Result<Value, ExtractionError> {
        let (source, raw) = self.find(name);
        if raw.is_empty() {
            return Ok(ty.default_value());
        }
        coerce_values(ty, &raw).map_err(|reason| ExtractionError::invalid_type(source, name, reason))
    }

    fn find(&self, name: &str) -> (ExtractionSource, Vec<&str>) {
        if self.headers {
            let values = self.ctx.header_values(name);
            if !values.is_empty() {
                return (ExtractionSource::Header, values);
            }
        }
        if let Some(value) = self.ctx.path_params().get_ignore_case(name) {
            return (ExtractionSource::Path, vec![value]);
        }
        let values = self.query.map(|query| query.all(name)).unwrap_or_default();
        (ExtractionSource::Query, values)
    }
}

fn form_object(model: &Model, form: &FormData) -> Result<BoundValue, ExtractionError> {
    let has_files = model.properties.iter().any(|p| p.ty.is_file());
    let mut fields = IndexMap::new();
    for property in &model.properties {
        fields.insert(
            property.name.clone(),
            form_value(&property.name, &property.ty, form, false)?,
        );
    }

    if has_files {
        Ok(BoundValue::Form(fields))
    } else {
        let object = fields
            .into_iter()
            .map(|(name, value)| (name, value.to_json()))
            .collect();
        Ok(BoundValue::Json(Value::Object(object)))
    }
}

/// Reads one named value from a form. `top_level` lets a lone file-array
/// parameter take every uploaded file when none match its name.
fn form_value(
    name: &str,
    ty: &TypeDescriptor,
    form: &FormData,
    top_level: bool,
) -> Result<BoundValue, ExtractionError> {
    match ty.unwrap_nullable() {
        TypeDescriptor::File => Ok(form
            .files_named(name)
            .into_iter()
            .next()
            .map_or(BoundValue::Null, BoundValue::File)),
        TypeDescriptor::FileArray => {
            let mut files = form.files_named(name);
            if files.is_empty() && top_level {
                files = form.files().to_vec();
            }
            Ok(BoundValue::Files(files))
        }
        _ => {
            let raw = form.fields(name);
            if raw.is_empty() {
                return Ok(BoundValue::from(ty.default_value()));
            }
            coerce_values(ty, &raw)
                .map(BoundValue::from)
                .map_err(|reason| ExtractionError::invalid_type(ExtractionSource::Body, name, reason))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Method, Uri};
    use serde_json::json;
    use swiftapi_core::UploadedFile;

    fn catalog() -> ModelCatalog {
        let mut catalog = ModelCatalog::new();
        catalog.insert(
            Model::new("Person")
                .property("id", TypeDescriptor::int32())
                .property("name", TypeDescriptor::String),
        );
        catalog.insert(
            Model::new("Upload")
                .property("title", TypeDescriptor::String)
                .property("cover", TypeDescriptor::File)
                .property("pages", TypeDescriptor::FileArray),
        );
        catalog
    }

    async fn bind(params: &[Parameter], ctx: &ExtractionContext) -> Result<Arguments, ExtractionError> {
        let catalog = catalog();
        ParameterBinder::new(&catalog).bind(params, ctx).await
    }

    fn get(uri: &'static str) -> ExtractionContext {
        ExtractionContext::builder().uri(Uri::from_static(uri)).build()
    }

    #[tokio::test]
    async fn test_composite_query_binding() {
        let params = [Parameter::query("person", TypeDescriptor::named("Person"))];

        let args = bind(&params, &get("/x?id=5&name=Bob")).await.unwrap();
        assert_eq!(args.value("person"), Some(&BoundValue::Json(json!({"id": 5, "name": "Bob"}))));

        let args = bind(&params, &get("/x?id=5")).await.unwrap();
        assert_eq!(args.value("person"), Some(&BoundValue::Json(json!({"id": 5, "name": null}))));
    }

    #[tokio::test]
    async fn test_composite_prefers_route_over_query() {
        let params = [Parameter::query("person", TypeDescriptor::named("Person"))];
        let ctx = ExtractionContext::builder()
            .uri(Uri::from_static("/x?id=1&name=Q"))
            .path_param("Id", "9")
            .build();

        let args = bind(&params, &ctx).await.unwrap();
        assert_eq!(args.value("person"), Some(&BoundValue::Json(json!({"id": 9, "name": "Q"}))));
    }

    #[tokio::test]
    async fn test_absent_scalars_take_defaults() {
        let params = [
            Parameter::new("count", TypeDescriptor::int32()),
            Parameter::new("label", TypeDescriptor::String),
            Parameter::new("limit", TypeDescriptor::nullable(TypeDescriptor::int32())),
            Parameter::new("flag", TypeDescriptor::Boolean),
        ];

        let args = bind(&params, &get("/x")).await.unwrap();
        assert_eq!(args.get::<i32>("count").unwrap(), 0);
        assert!(args.is_null("label"));
        assert_eq!(args.get::<Option<i32>>("limit").unwrap(), None);
        assert!(!args.get::<bool>("flag").unwrap());
    }

    #[tokio::test]
    async fn test_query_keys_ignore_case_and_arrays_repeat() {
        let params = [
            Parameter::query("userId", TypeDescriptor::int64()),
            Parameter::query("tags", TypeDescriptor::array(TypeDescriptor::String)),
        ];

        let args = bind(&params, &get("/x?USERID=12&tags=a&tags=b")).await.unwrap();
        assert_eq!(args.get::<i64>("userId").unwrap(), 12);
        assert_eq!(args.get::<Vec<String>>("tags").unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_coercion_failure_is_invalid_argument() {
        let params = [Parameter::query("page", TypeDescriptor::int32())];

        let err = bind(&params, &get("/x?page=two")).await.unwrap_err();
        assert_eq!(err.field(), Some("page"));
        assert_eq!(err.extraction_source(), ExtractionSource::Query);
    }

    #[tokio::test]
    async fn test_query_not_read_without_query_parameters() {
        let params = [
            Parameter::route("page", TypeDescriptor::int32()),
            Parameter::body("person", TypeDescriptor::named("Person")),
        ];
        let ctx = ExtractionContext::builder()
            .method(Method::POST)
            .uri(Uri::from_static("/x/3?&&=&page=9"))
            .path_param("page", "3")
            .header("content-type", "application/json")
            .body(r#"{"id": 1, "name": "Ada"}"#)
            .build();

        let args = bind(&params, &ctx).await.unwrap();
        assert_eq!(args.get::<i32>("page").unwrap(), 3);
        assert_eq!(args.value("person"), Some(&BoundValue::Json(json!({"id": 1, "name": "Ada"}))));
    }

    #[tokio::test]
    async fn test_route_binding() {
        let params = [Parameter::route("id", TypeDescriptor::Uuid)];
        let ctx = ExtractionContext::builder()
            .path_param("id", "A0EEBC99-9C0B-4EF8-BB6D-6BB9BD380A11")
            .build();

        let args = bind(&params, &ctx).await.unwrap();
        assert_eq!(
            args.get::<String>("id").unwrap(),
            "a0eebc99-9c0b-4ef8-bb6d-6bb9bd380a11"
        );

        let err = bind(&params, &get("/x")).await.unwrap_err();
        assert_eq!(err.error_code(), "MISSING_PARAMETER");
    }

    #[tokio::test]
    async fn test_header_binding() {
        let params = [Parameter::header("x-tenant", TypeDescriptor::String)];
        let ctx = ExtractionContext::builder()
            .uri(Uri::from_static("/x?x-tenant=from-query"))
            .header("x-tenant", "acme")
            .build();

        let args = bind(&params, &ctx).await.unwrap();
        assert_eq!(args.get::<String>("x-tenant").unwrap(), "acme");
    }

    #[tokio::test]
    async fn test_json_body_binding() {
        let params = [
            Parameter::body("person", TypeDescriptor::named("Person")),
            Parameter::query("dryRun", TypeDescriptor::Boolean),
        ];
        let ctx = ExtractionContext::builder()
            .method(Method::POST)
            .uri(Uri::from_static("/x?dryRun=1"))
            .header("content-type", "application/json")
            .body(r#"{"Name": "Ada", "ID": 3}"#)
            .build();

        let args = bind(&params, &ctx).await.unwrap();
        assert_eq!(args.value("person"), Some(&BoundValue::Json(json!({"id": 3, "name": "Ada"}))));
        assert!(args.get::<bool>("dryRun").unwrap());
    }

    #[tokio::test]
    async fn test_malformed_json_body_binds_null() {
        let params = [Parameter::body("person", TypeDescriptor::named("Person"))];
        let ctx = ExtractionContext::builder()
            .method(Method::POST)
            .body("{oops")
            .build();

        let args = bind(&params, &ctx).await.unwrap();
        assert!(args.is_null("person"));
    }

    #[tokio::test]
    async fn test_body_too_large() {
        let params = [Parameter::body("payload", TypeDescriptor::Any)];
        let ctx = ExtractionContext::builder()
            .method(Method::POST)
            .body(Bytes::from(vec![b' '; 64]))
            .build();
        let catalog = catalog();

        let err = ParameterBinder::new(&catalog)
            .max_body_size(16)
            .bind(&params, &ctx)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_urlencoded_form_body() {
        let params = [Parameter::body("person", TypeDescriptor::named("Person"))];
        let ctx = ExtractionContext::builder()
            .method(Method::POST)
            .header("content-type", "application/x-www-form-urlencoded")
            .body("ID=4&name=Lin")
            .build();

        let args = bind(&params, &ctx).await.unwrap();
        assert_eq!(args.value("person"), Some(&BoundValue::Json(json!({"id": 4, "name": "Lin"}))));
    }

    #[test]
    fn test_form_object_with_files() {
        let mut form = FormData::new();
        form.push_field("title", "Atlas");
        let file = |field: &str, name: &str| UploadedFile {
            field_name: field.to_string(),
            file_name: Some(name.to_string()),
            content_type: Some("image/png".to_string()),
            data: Bytes::from_static(b"img"),
        };
        form.push_file(file("cover", "front.png"));
        form.push_file(file("pages", "p1.png"));
        form.push_file(file("pages", "p2.png"));

        let catalog = catalog();
        let model = catalog.get("Upload").unwrap();
        let bound = form_object(model, &form).unwrap();

        assert_eq!(bound.field("title"), Some(&BoundValue::Json(json!("Atlas"))));
        assert_eq!(
            bound.field("cover").and_then(BoundValue::as_file).and_then(|f| f.file_name.as_deref()),
            Some("front.png")
        );
        assert_eq!(bound.field("pages").map(|v| v.files().len()), Some(2));
    }

    #[test]
    fn test_top_level_file_array_takes_all_files() {
        let mut form = FormData::new();
        for name in ["a", "b"] {
            form.push_file(UploadedFile {
                field_name: name.to_string(),
                file_name: Some(format!("{name}.txt")),
                content_type: None,
                data: Bytes::new(),
            });
        }

        let bound = form_value("documents", &TypeDescriptor::FileArray, &form, true).unwrap();
        assert_eq!(bound.files().len(), 2);

        let single = form_value("documents", &TypeDescriptor::File, &form, true).unwrap();
        assert_eq!(single, BoundValue::Null);
    }
}
