//! DOT format utilities for graph visualization.
//!
//! This module provides utilities for generating DOT format output,
//! which can be rendered using Graphviz tools.

/// Escapes a string for safe use in DOT format labels and identifiers.
///
/// Node and source labels come from caller-supplied `Display` implementations
/// (register names such as `%tid.x`, value ids, symbol names), so quotes,
/// backslashes, and embedded newlines must be neutralized before they are placed
/// inside a quoted DOT identifier.
///
/// # Arguments
///
/// * `s` - The string to escape
///
/// # Returns
///
/// A new string with all special characters properly escaped.
///
/// # Examples
///
/// ```rust
/// use warpscope::utils::escape_dot;
///
/// let escaped = escape_dot("value \"r1\"");
/// assert_eq!(escaped, "value \\\"r1\\\"");
/// ```
#[must_use]
pub fn escape_dot(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "")
}
