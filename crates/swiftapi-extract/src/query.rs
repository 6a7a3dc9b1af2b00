//! Query string access.
//!
//! Query keys are matched ignoring ASCII case. Repeated keys are kept in
//! order so array parameters can read every occurrence.

use crate::{ExtractionError, ExtractionSource};

/// A decoded query string.
///
/// # Example
///
/// ```rust
/// use swiftapi_extract::QueryString;
///
/// let query = QueryString::parse(Some("tag=a&Tag=b&name=rust+lang")).unwrap();
/// assert_eq!(query.first("NAME"), Some("rust lang"));
/// assert_eq!(query.all("tag"), vec!["a", "b"]);
/// assert_eq!(query.first("missing"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    /// Decodes a raw query string. `None` yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid URL encoding.
    pub fn parse(raw: Option<&str>) -> Result<Self, ExtractionError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(raw.unwrap_or(""))
            .map_err(|e| {
                ExtractionError::deserialization_failed(ExtractionSource::Query, e.to_string())
            })?;
        Ok(Self { pairs })
    }

    /// Returns the first value for `name`.
    #[must_use]
    pub fn first(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns every value for `name`, in order.
    #[must_use]
    pub fn all(&self, name: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Returns `true` if `name` occurs at least once.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.first(name).is_some()
    }

    /// Iterates all pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Returns `true` if there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
