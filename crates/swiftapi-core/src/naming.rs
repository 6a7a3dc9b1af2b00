//! Identifier normalization.
//!
//! Contract and action type names are turned into URL path segments by
//! inserting `_` at every lowercase-to-uppercase boundary and lowercasing the
//! result:
//!
//! ```
//! use swiftapi_core::naming::normalize;
//!
//! assert_eq!(normalize("GetUserOrders"), "get_user_orders");
//! assert_eq!(normalize("HTTPServer"), "httpserver");
//! ```

use regex::Regex;
use std::sync::OnceLock;

fn case_boundary() -> &'static Regex {
    static BOUNDARY: OnceLock<Regex> = OnceLock::new();
    BOUNDARY.get_or_init(|| Regex::new("([a-z])([A-Z])").expect("valid regex"))
}

/// Converts an identifier-style name into a path segment.
#[must_use]
pub fn normalize(name: &str) -> String {
    case_boundary()
        .replace_all(name, "${1}_${2}")
        .to_lowercase()
}

/// Converts a field name to camelCase.
///
/// Snake case words are joined with upper-cased initials, and a leading run of
/// capitals is lowered (`UserID` becomes `userID`, `URLPath` becomes `urlPath`).
#[must_use]
pub fn camel_case(name: &str) -> String {
    let mut joined = String::with_capacity(name.len());
    let mut upper_next = false;
    for ch in name.chars() {
        if ch == '_' {
            upper_next = !joined.is_empty();
            continue;
        }
        if upper_next {
            joined.extend(ch.to_uppercase());
            upper_next = false;
        } else {
            joined.push(ch);
        }
    }

    let chars: Vec<char> = joined.chars().collect();
    let mut out = String::with_capacity(joined.len());
    for (i, ch) in chars.iter().enumerate() {
        if !ch.is_uppercase() {
            out.extend(chars[i..].iter());
            break;
        }
        let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
        if i > 0 && next_is_lower {
            out.extend(chars[i..].iter());
            break;
        }
        out.extend(ch.to_lowercase());
    }
    out
}
