//! Form payloads.
//!
//! Both URL-encoded and multipart bodies decode into [`FormData`]: ordered
//! text fields plus uploaded files. Field names match ignoring ASCII case.

use swiftapi_core::UploadedFile;

use crate::multipart::parse_multipart;
use crate::{ExtractionContext, ExtractionError, ExtractionSource};

/// Decoded form fields and files.
///
/// # Example
///
/// ```rust
/// use swiftapi_extract::form::FormData;
///
/// let form = FormData::from_urlencoded(b"name=Alice&tag=a&tag=b").unwrap();
/// assert_eq!(form.field("NAME"), Some("Alice"));
/// assert_eq!(form.fields("tag"), vec!["a", "b"]);
/// assert!(form.files().is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    fields: Vec<(String, String)>,
    files: Vec<UploadedFile>,
}

impl FormData {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an `application/x-www-form-urlencoded` body.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not valid URL encoding.
    pub fn from_urlencoded(body: &[u8]) -> Result<Self, ExtractionError> {
        let fields: Vec<(String, String)> = serde_urlencoded::from_bytes(body).map_err(|e| {
            ExtractionError::deserialization_failed(ExtractionSource::Body, e.to_string())
        })?;
        Ok(Self {
            fields,
            files: Vec::new(),
        })
    }

    /// Decodes the request body according to its content type.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is malformed or the multipart boundary is
    /// missing.
    pub async fn from_context(ctx: &ExtractionContext) -> Result<Self, ExtractionError> {
        let is_multipart = ctx
            .content_type()
            .and_then(|ct| ct.parse::<mime::Mime>().ok())
            .is_some_and(|m| m.type_() == mime::MULTIPART);
        if is_multipart {
            parse_multipart(ctx.headers(), ctx.body().clone()).await
        } else {
            Self::from_urlencoded(ctx.body())
        }
    }

    /// Adds a text field.
    pub fn push_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Adds a file.
    pub fn push_file(&mut self, file: UploadedFile) {
        self.files.push(file);
    }

    /// Returns the first text value for `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns every text value for `name`, in order.
    #[must_use]
    pub fn fields(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Returns every uploaded file.
    #[must_use]
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    /// Returns the files uploaded under `name`.
    #[must_use]
    pub fn files_named(&self, name: &str) -> Vec<UploadedFile> {
        self.files
            .iter()
            .filter(|f| f.field_name.eq_ignore_ascii_case(name))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_urlencoded_decoding() {
        let form = FormData::from_urlencoded(b"query=hello+world&x=%26").unwrap();
        assert_eq!(form.field("query"), Some("hello world"));
        assert_eq!(form.field("x"), Some("&"));
        assert_eq!(form.field("missing"), None);
    }

    #[test]
    fn test_empty_body() {
        let form = FormData::from_urlencoded(b"").unwrap();
        assert_eq!(form, FormData::new());
    }

    #[test]
    fn test_files_named_ignores_case() {
        let mut form = FormData::new();
        form.push_file(UploadedFile {
            field_name: "Avatar".to_string(),
            file_name: Some("me.png".to_string()),
            content_type: Some("image/png".to_string()),
            data: Bytes::from_static(b"png"),
        });
        form.push_file(UploadedFile {
            field_name: "other".to_string(),
            file_name: None,
            content_type: None,
            data: Bytes::new(),
        });

        let files = form.files_named("avatar");
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name.as_deref(), Some("me.png"));
        assert_eq!(form.files().len(), 2);
    }

    #[tokio::test]
    async fn test_from_context_urlencoded() {
        let ctx = ExtractionContext::builder()
            .header("content-type", "application/x-www-form-urlencoded")
            .body("a=1&b=2")
            .build();
        let form = FormData::from_context(&ctx).await.unwrap();
        assert_eq!(form.field("b"), Some("2"));
    }
}
