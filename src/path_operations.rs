use std::path::MAIN_SEPARATOR;

use fancy_regex::Regex;
use lazy_static::lazy_static;

lazy_static! {
    static ref SEPARATOR_CHARS: Regex =
        Regex::new(r"(/|\\|:)").expect("Separator regex is not correct");
}

/// Rewrites `/`, `\` and `:` to the platform path separator. This is a
/// normalization step, not a security boundary.
pub(crate) fn escape_path(raw: &str) -> String {
    let sep = MAIN_SEPARATOR.to_string();
    SEPARATOR_CHARS.replace_all(raw, sep.as_str()).to_string()
}

/// Joins the server root and a relative path segment-wise. The literal
/// token `up` pops the previous segment instead of being appended; there
/// is no bounds check, so enough `up` segments walk past the root.
pub(crate) fn resolve_local_path(root: &str, relative: &str) -> String {
    let sep = MAIN_SEPARATOR.to_string();
    let mut resolved: Vec<&str> = Vec::new();
    for segment in root.split(MAIN_SEPARATOR).chain(relative.split(MAIN_SEPARATOR)) {
        if segment == "up" {
            resolved.pop();
        } else {
            resolved.push(segment);
        }
    }
    resolved.join(&sep)
}

pub(crate) fn strip_trailing_separator(folder: &str) -> &str {
    folder.strip_suffix(MAIN_SEPARATOR).unwrap_or(folder)
}
