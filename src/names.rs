//! Statement name utilities
//!
//! Schema names are hyphenated (`service-class`); payloads may also use the
//! camelCase alias (`serviceClass`). This module converts between the two and
//! normalizes free text carried by `description`/`reference` statements.

use heck::{ToKebabCase, ToLowerCamelCase};
use once_cell::sync::Lazy;
use regex::Regex;

static LINE_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\n|\r").unwrap());

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Convert a schema name to its camelCase alias
pub fn camel_case(name: &str) -> String {
    name.to_lower_camel_case()
}

/// Convert a (possibly camelCased) name back to its hyphenated form
pub fn kebab_case(name: &str) -> String {
    name.to_kebab_case()
}

/// Render a name either verbatim or camelCased
pub fn display_name(name: &str, camel: bool) -> String {
    if camel {
        camel_case(name)
    } else {
        name.to_string()
    }
}

/// Split a prefixed name into prefix and local name
pub fn split_prefixed(name: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = name.rsplit_once(':') {
        (Some(prefix), local)
    } else {
        (None, name)
    }
}

/// Strip a module prefix from a name, keeping the last `:` segment
pub fn local_name(name: &str) -> &str {
    split_prefixed(name).1
}

/// Replace every line break with a single space
pub fn collapse_line_breaks(text: &str) -> String {
    LINE_BREAK.replace_all(text, " ").into_owned()
}

/// Split text on runs of whitespace, dropping empty tokens
pub fn split_whitespace_tokens(text: &str) -> Vec<String> {
    WHITESPACE
        .split(text.trim())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}
