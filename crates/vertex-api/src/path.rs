//! Mount path computation.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([a-zA-Z_.0-9]+)\}").expect("valid regex"))
}

/// Rewrites `{name}` placeholders into the router's `:name` syntax.
///
/// ```
/// assert_eq!(vertex_api::rewrite_placeholders("/user/{id}"), "/user/:id");
/// ```
pub fn rewrite_placeholders(path: &str) -> Cow<'_, str> {
    placeholder_regex().replace_all(path, ":$1")
}

/// Default root of an API: `/{name}/{version}`.
pub(crate) fn default_root(name: &str, version: &str) -> String {
    format!("/{name}/{version}")
}

/// Joins `root` and `rel` and cleans the result. Empty parts are ignored.
pub(crate) fn join(root: &str, rel: &str) -> String {
    let parts: Vec<&str> = [root, rel].into_iter().filter(|p| !p.is_empty()).collect();
    if parts.is_empty() {
        return String::new();
    }
    clean(&parts.join("/"))
}

/// Lexically cleans a slash-separated path: repeated slashes collapse,
/// `.` segments drop, `..` removes the previous segment and trailing
/// slashes go away.
pub(crate) fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if !rooted {
                    segments.push("..");
                }
            }
            s => segments.push(s),
        }
    }

    let joined = segments.join("/");
    if rooted {
        format!("/{joined}")
    } else if joined.is_empty() {
        ".".to_string()
    } else {
        joined
    }
}
