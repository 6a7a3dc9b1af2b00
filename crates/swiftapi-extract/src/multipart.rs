//! Multipart form data parsing for file uploads.
//!
//! A `multipart/form-data` body is read fully into a [`FormData`]: parts
//! with a file name become [`UploadedFile`]s, the rest become text fields.

use bytes::Bytes;
use http::{header, HeaderMap};
use std::io;
use swiftapi_core::UploadedFile;

use crate::form::FormData;
use crate::{ExtractionError, ExtractionSource};

/// Default maximum size per field (10 MB).
pub const DEFAULT_MAX_FIELD_SIZE: usize = 10 * 1024 * 1024;

/// Default maximum number of parts.
pub const DEFAULT_MAX_FIELDS: usize = 100;

/// Limits applied while parsing.
#[derive(Debug, Clone)]
pub struct MultipartConfig {
    /// Maximum size per field in bytes.
    pub max_field_size: usize,
    /// Maximum number of fields allowed.
    pub max_fields: usize,
}

impl Default for MultipartConfig {
    fn default() -> Self {
        Self {
            max_field_size: DEFAULT_MAX_FIELD_SIZE,
            max_fields: DEFAULT_MAX_FIELDS,
        }
    }
}

impl MultipartConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum field size.
    #[must_use]
    pub fn max_field_size(mut self, size: usize) -> Self {
        self.max_field_size = size;
        self
    }

    /// Set the maximum number of fields.
    #[must_use]
    pub fn max_fields(mut self, count: usize) -> Self {
        self.max_fields = count;
        self
    }
}

/// Parses a multipart body with default limits.
///
/// # Errors
///
/// See [`parse_multipart_with`].
pub async fn parse_multipart(headers: &HeaderMap, body: Bytes) -> Result<FormData, ExtractionError> {
    parse_multipart_with(headers, body, &MultipartConfig::default()).await
}

/// Parses a multipart body.
///
/// # Errors
///
/// Returns an error if:
/// - The Content-Type header is missing or has no boundary
/// - The body is malformed
/// - A part exceeds `max_field_size` or there are more than `max_fields` parts
pub async fn parse_multipart_with(
    headers: &HeaderMap,
    body: Bytes,
    config: &MultipartConfig,
) -> Result<FormData, ExtractionError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .ok_or_else(|| ExtractionError::invalid_content_type("missing Content-Type header"))?
        .to_str()
        .map_err(|_| ExtractionError::invalid_content_type("invalid UTF-8 in Content-Type header"))?;

    let boundary = multer::parse_boundary(content_type).map_err(|_| {
        ExtractionError::invalid_content_type("missing or invalid boundary in multipart Content-Type")
    })?;

    let stream = futures_util::stream::once(async move { Ok::<_, io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut form = FormData::new();
    let mut count = 0;
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        count += 1;
        if count > config.max_fields {
            return Err(ExtractionError::invalid_type(
                ExtractionSource::Body,
                "multipart",
                format!("too many fields (max {})", config.max_fields),
            ));
        }

        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(ToString::to_string);
        let data = field.bytes().await.map_err(malformed)?;
        if data.len() > config.max_field_size {
            return Err(ExtractionError::payload_too_large(config.max_field_size, data.len()));
        }

        if file_name.is_some() {
            form.push_file(UploadedFile {
                field_name: name,
                file_name,
                content_type,
                data,
            });
        } else {
            let text = String::from_utf8(data.to_vec()).map_err(|e| {
                ExtractionError::invalid_type(ExtractionSource::Body, name.clone(), e.to_string())
            })?;
            form.push_field(name, text);
        }
    }

    tracing::trace!(fields = count, files = form.files().len(), "multipart body parsed");
    Ok(form)
}

fn malformed(err: multer::Error) -> ExtractionError {
    ExtractionError::deserialization_failed(
        ExtractionSource::Body,
        format!("multipart parse error: {err}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_multipart_body(boundary: &str, parts: &[(&str, &str, Option<&str>, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();

        for (name, content_type, filename, data) in parts {
            body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());

            if let Some(fname) = filename {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{fname}\"\r\n"
                    )
                    .as_bytes(),
                );
            } else {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n").as_bytes(),
                );
            }

            body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }

        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
        body
    }

    fn headers_for(boundary: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}")
                .parse()
                .unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn test_multipart_fields_and_files() {
        let boundary = "----WebKitFormBoundary";
        let body = create_multipart_body(
            boundary,
            &[
                ("title", "text/plain", None, b"Report"),
                ("attachment", "application/pdf", Some("q1.pdf"), b"%PDF-1.7"),
                ("attachment", "application/pdf", Some("q2.pdf"), b"%PDF-1.7 second"),
            ],
        );

        let form = parse_multipart(&headers_for(boundary), Bytes::from(body))
            .await
            .unwrap();

        assert_eq!(form.field("title"), Some("Report"));
        let files = form.files_named("attachment");
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].file_name.as_deref(), Some("q1.pdf"));
        assert_eq!(files[0].content_type.as_deref(), Some("application/pdf"));
        assert_eq!(files[1].data, Bytes::from_static(b"%PDF-1.7 second"));
    }

    #[tokio::test]
    async fn test_multipart_missing_content_type() {
        let err = parse_multipart(&HeaderMap::new(), Bytes::new()).await.unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONTENT_TYPE");
    }

    #[tokio::test]
    async fn test_multipart_invalid_boundary() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, "multipart/form-data".parse().unwrap());
        let err = parse_multipart(&headers, Bytes::new()).await.unwrap_err();
        assert!(err.to_string().contains("boundary"));
    }

    #[tokio::test]
    async fn test_multipart_field_too_large() {
        let boundary = "----boundary";
        let body = create_multipart_body(boundary, &[("blob", "application/octet-stream", Some("b.bin"), &[0u8; 64])]);
        let config = MultipartConfig::new().max_field_size(16);

        let err = parse_multipart_with(&headers_for(boundary), Bytes::from(body), &config)
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_multipart_too_many_fields() {
        let boundary = "----boundary";
        let body = create_multipart_body(
            boundary,
            &[
                ("a", "text/plain", None, b"1"),
                ("b", "text/plain", None, b"2"),
                ("c", "text/plain", None, b"3"),
            ],
        );
        let config = MultipartConfig::new().max_fields(2);

        let err = parse_multipart_with(&headers_for(boundary), Bytes::from(body), &config)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("too many fields"));
    }
}
