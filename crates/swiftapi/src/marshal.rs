//! Response marshaling.
//!
//! [`marshal`] turns what a service returned into a wire response and
//! [`problem_response`] renders failures. Marshaling rules, after one level
//! of deferral is awaited:
//!
//! | Result | Response |
//! |--------|----------|
//! | empty, JSON null | `204 No Content`, empty body |
//! | pre-built response | passed through |
//! | existing file path | binary attachment named after the file |
//! | blob, stream | binary attachment |
//! | text | `text/plain; charset=utf-8` |
//! | anything else | JSON with camelCase keys and null fields omitted |
//!
//! When the action declares a return type, only keys naming declared model
//! properties are renamed. Values typed [`TypeDescriptor::Any`] and keys a
//! model does not declare are written as returned. Without a declared type
//! every object key is treated as a property name.

use std::path::Path;

use bytes::Bytes;
use http::header::{HeaderValue, ALLOW, CONTENT_DISPOSITION, CONTENT_TYPE};
use http::{Response, StatusCode};
use serde_json::{Map, Value};
use swiftapi_core::naming::camel_case;
use swiftapi_core::{ActionResult, ModelCatalog, ProblemDetails, SwiftError, SwiftResult, TypeDescriptor};
use tokio::io::AsyncReadExt;

/// Converts an invocation result into a response.
///
/// # Errors
///
/// Propagates the failure of a deferred result, and fails with
/// [`SwiftError::Internal`] if a file or stream cannot be read.
pub async fn marshal(result: ActionResult) -> SwiftResult<Response<Bytes>> {
    marshal_shaped(result, Shape::Untyped).await
}

/// Like [`marshal`], renaming only the properties `returns` declares.
///
/// # Errors
///
/// Same as [`marshal`].
pub async fn marshal_typed(
    result: ActionResult,
    returns: &TypeDescriptor,
    catalog: &ModelCatalog,
) -> SwiftResult<Response<Bytes>> {
    let shape = match returns {
        TypeDescriptor::Unit => Shape::Untyped,
        ty => Shape::Declared(ty, catalog),
    };
    marshal_shaped(result, shape).await
}

async fn marshal_shaped(result: ActionResult, shape: Shape<'_>) -> SwiftResult<Response<Bytes>> {
    let response = match result.resolve().await? {
        ActionResult::Empty | ActionResult::Json(Value::Null) => no_content(),
        ActionResult::Json(value) => json(&value, shape),
        ActionResult::Text(text) => with_content_type(
            Response::new(Bytes::from(text)),
            mime::TEXT_PLAIN_UTF_8.as_ref(),
        ),
        ActionResult::Blob {
            data,
            file_name,
            content_type,
        } => attachment(data, file_name.as_deref(), content_type.as_deref()),
        ActionResult::File(path) => file(&path).await?,
        ActionResult::Stream(mut reader) => {
            let mut buffer = Vec::new();
            reader
                .read_to_end(&mut buffer)
                .await
                .map_err(|e| SwiftError::internal_with_source("failed to read result stream", e))?;
            attachment(Bytes::from(buffer), None, None)
        }
        ActionResult::Response(response) => response,
        ActionResult::Deferred(_) => {
            return Err(SwiftError::internal("deferred result was not resolved"))
        }
    };
    Ok(response)
}

/// Renders an error as an `application/problem+json` response.
///
/// `405` responses carry an `Allow` header listing the bound verbs.
#[must_use]
pub fn problem_response(error: &SwiftError) -> Response<Bytes> {
    let problem = ProblemDetails::from_error(error);
    let mut response = with_content_type(
        Response::new(problem.to_json_bytes()),
        ProblemDetails::CONTENT_TYPE,
    );
    *response.status_mut() = error.status_code();

    if let SwiftError::MethodNotAllowed { allowed, .. } = error {
        if let Ok(value) = HeaderValue::from_str(&allowed.join(", ")) {
            response.headers_mut().insert(ALLOW, value);
        }
    }
    response
}

fn no_content() -> Response<Bytes> {
    let mut response = Response::new(Bytes::new());
    *response.status_mut() = StatusCode::NO_CONTENT;
    response
}

fn json(value: &Value, shape: Shape<'_>) -> Response<Bytes> {
    let body = serde_json::to_vec(&to_wire(value, shape)).map_or_else(|_| Bytes::new(), Bytes::from);
    with_content_type(Response::new(body), mime::APPLICATION_JSON.as_ref())
}

async fn file(path: &Path) -> SwiftResult<Response<Bytes>> {
    let is_file = tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false);
    if !is_file {
        return Ok(json(&Value::String(path.display().to_string()), Shape::Untyped));
    }

    let data = tokio::fs::read(path)
        .await
        .map_err(|e| SwiftError::internal_with_source("failed to read result file", e))?;
    let name = path.file_name().and_then(|n| n.to_str());
    Ok(attachment(Bytes::from(data), name, None))
}

fn attachment(data: Bytes, file_name: Option<&str>, content_type: Option<&str>) -> Response<Bytes> {
    let mut response = with_content_type(
        Response::new(data),
        content_type.unwrap_or(mime::APPLICATION_OCTET_STREAM.as_ref()),
    );
    let disposition = file_name.map_or_else(
        || "attachment".to_string(),
        |name| format!("attachment; filename=\"{}\"", name.replace('"', "")),
    );
    if let Ok(value) = HeaderValue::from_str(&disposition) {
        response.headers_mut().insert(CONTENT_DISPOSITION, value);
    }
    response
}

fn with_content_type(mut response: Response<Bytes>, content_type: &str) -> Response<Bytes> {
    if let Ok(value) = HeaderValue::from_str(content_type) {
        response.headers_mut().insert(CONTENT_TYPE, value);
    }
    response
}

/// What is known about a JSON value being written.
#[derive(Clone, Copy)]
enum Shape<'a> {
    /// No declared type: every key is a property name.
    Untyped,
    /// A declared type, resolved against the model catalog.
    Declared(&'a TypeDescriptor, &'a ModelCatalog),
    /// Opaque data, written unchanged.
    Verbatim,
}

/// Rewrites property names to camelCase and drops null properties,
/// recursively. Nulls inside arrays are kept.
fn to_wire(value: &Value, shape: Shape<'_>) -> Value {
    match (value, shape) {
        (_, Shape::Verbatim) => value.clone(),
        (Value::Object(map), Shape::Untyped) => Value::Object(
            map.iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (camel_case(k), to_wire(v, Shape::Untyped)))
                .collect::<Map<_, _>>(),
        ),
        (Value::Object(map), Shape::Declared(ty, catalog)) => match catalog.resolve(ty) {
            Some(model) => Value::Object(
                map.iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| match model.get_ignore_case(k) {
                        Some(prop) => (camel_case(k), to_wire(v, Shape::Declared(&prop.ty, catalog))),
                        None => (k.clone(), v.clone()),
                    })
                    .collect::<Map<_, _>>(),
            ),
            None => value.clone(),
        },
        (Value::Array(items), Shape::Untyped) => {
            Value::Array(items.iter().map(|v| to_wire(v, Shape::Untyped)).collect())
        }
        (Value::Array(items), Shape::Declared(ty, catalog)) => {
            let items_shape = match ty.unwrap_nullable() {
                TypeDescriptor::Array(inner) => Shape::Declared(inner, catalog),
                _ => Shape::Verbatim,
            };
            Value::Array(items.iter().map(|v| to_wire(v, items_shape)).collect())
        }
        (other, _) => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use swiftapi_core::Model;

    async fn body_json(response: Response<Bytes>) -> Value {
        serde_json::from_slice(response.body()).unwrap()
    }

    #[tokio::test]
    async fn test_empty_and_null_are_no_content() {
        for result in [ActionResult::Empty, ActionResult::Json(Value::Null)] {
            let response = marshal(result).await.unwrap();
            assert_eq!(response.status(), StatusCode::NO_CONTENT);
            assert!(response.body().is_empty());
        }
    }

    #[tokio::test]
    async fn test_json_is_camel_cased_without_nulls() {
        let value = json!({
            "order_id": 7,
            "shipping_address": null,
            "line_items": [{"unit_price": 2.5, "note": null}, null],
        });
        let response = marshal(ActionResult::Json(value)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(
            body_json(response).await,
            json!({"orderId": 7, "lineItems": [{"unitPrice": 2.5}, null]})
        );
    }

    #[tokio::test]
    async fn test_typed_json_renames_declared_properties_only() {
        let mut catalog = ModelCatalog::new();
        catalog.insert(
            Model::new("Account")
                .property("account_id", TypeDescriptor::int32())
                .property("owner", TypeDescriptor::named("Owner"))
                .property("labels", TypeDescriptor::Any),
        );
        catalog.insert(Model::new("Owner").property("display_name", TypeDescriptor::String));
        let returns = TypeDescriptor::array(TypeDescriptor::named("Account"));

        let value = json!([{
            "account_id": 1,
            "owner": {"display_name": "Ada", "extra_note": "x"},
            "labels": {"User_ID": "u-1", "cost_center": null},
            "legacy_code": "L1",
            "note": null,
        }]);
        let response = marshal_typed(ActionResult::Json(value), &returns, &catalog)
            .await
            .unwrap();
        assert_eq!(
            body_json(response).await,
            json!([{
                "accountId": 1,
                "owner": {"displayName": "Ada", "extra_note": "x"},
                "labels": {"User_ID": "u-1", "cost_center": null},
                "legacy_code": "L1",
            }])
        );
    }

    #[tokio::test]
    async fn test_undeclared_return_type_renames_every_key() {
        let value = json!({"order_total": 3});
        let response = marshal_typed(ActionResult::Json(value), &TypeDescriptor::Unit, &ModelCatalog::new())
            .await
            .unwrap();
        assert_eq!(body_json(response).await, json!({"orderTotal": 3}));
    }

    #[tokio::test]
    async fn test_text_is_utf8() {
        let response = marshal(ActionResult::text("héllo")).await.unwrap();
        assert_eq!(response.headers()[CONTENT_TYPE], "text/plain; charset=utf-8");
        assert_eq!(response.body(), "héllo".as_bytes());
    }

    #[tokio::test]
    async fn test_blob_is_attachment() {
        let result = ActionResult::Blob {
            data: Bytes::from_static(b"%PDF"),
            file_name: Some("report.pdf".to_string()),
            content_type: Some("application/pdf".to_string()),
        };
        let response = marshal(result).await.unwrap();
        assert_eq!(response.headers()[CONTENT_TYPE], "application/pdf");
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            "attachment; filename=\"report.pdf\""
        );

        let response = marshal(ActionResult::blob(vec![1u8, 2, 3])).await.unwrap();
        assert_eq!(response.headers()[CONTENT_TYPE], "application/octet-stream");
        assert_eq!(response.headers()[CONTENT_DISPOSITION], "attachment");
    }

    #[tokio::test]
    async fn test_stream_is_copied() {
        let response = marshal(ActionResult::stream(&b"streamed bytes"[..]))
            .await
            .unwrap();
        assert_eq!(response.body(), &b"streamed bytes"[..]);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/octet-stream");
    }

    #[tokio::test]
    async fn test_existing_file_is_attachment() {
        let mut file = tempfile::Builder::new()
            .prefix("invoice")
            .suffix(".txt")
            .tempfile()
            .unwrap();
        file.write_all(b"total: 12").unwrap();

        let response = marshal(ActionResult::file(file.path())).await.unwrap();
        let name = file.path().file_name().unwrap().to_str().unwrap();
        assert_eq!(
            response.headers()[CONTENT_DISPOSITION],
            format!("attachment; filename=\"{name}\"").as_str()
        );
        assert_eq!(response.body(), &b"total: 12"[..]);
    }

    #[tokio::test]
    async fn test_missing_file_is_serialized_as_json() {
        let response = marshal(ActionResult::file("/nonexistent/report.pdf"))
            .await
            .unwrap();
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(body_json(response).await, json!("/nonexistent/report.pdf"));
    }

    #[tokio::test]
    async fn test_prebuilt_response_passes_through() {
        let prebuilt = Response::builder()
            .status(StatusCode::CREATED)
            .header("location", "/api/orders/get/1")
            .body(Bytes::new())
            .unwrap();
        let response = marshal(ActionResult::Response(prebuilt)).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()["location"], "/api/orders/get/1");
    }

    #[tokio::test]
    async fn test_deferred_results() {
        let response = marshal(ActionResult::deferred(async { Ok(ActionResult::Empty) }))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let err = marshal(ActionResult::deferred(async {
            Err(SwiftError::conflict("order already shipped"))
        }))
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_problem_response() {
        let response = problem_response(&SwiftError::not_found("Order 9 does not exist"));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/problem+json");

        let problem: ProblemDetails = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(problem.status, 404);
        assert_eq!(problem.title, "Resource not found");
        assert_eq!(problem.detail.as_deref(), Some("Order 9 does not exist"));
    }

    #[test]
    fn test_problem_response_hides_internal_detail() {
        let response = problem_response(&SwiftError::internal("db password rejected"));
        let problem: ProblemDetails = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(problem.status, 500);
        assert!(!problem.detail.unwrap().contains("password"));
    }

    #[test]
    fn test_method_not_allowed_lists_verbs() {
        let err = SwiftError::method_not_allowed("PUT", vec!["GET".to_string(), "DELETE".to_string()]);
        let response = problem_response(&err);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers()[ALLOW], "GET, DELETE");
    }
}
