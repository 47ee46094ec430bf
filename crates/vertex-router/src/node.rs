//! Radix tree node.

use http::Method;

use crate::error::{RouterError, RouterResult};
use crate::method_router::MethodRouter;
use crate::params::Params;

/// Type of path segment in the radix tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Literal segment (e.g. "users")
    Static,
    /// Named single-segment placeholder (e.g. ":id")
    Param(String),
    /// Catch-all placeholder (e.g. "*path")
    Wildcard(String),
}

/// A node in the radix tree.
///
/// Nodes that terminate a registered path hold a [`MethodRouter`].
#[derive(Debug, Clone)]
pub struct Node<T> {
    /// The path segment this node represents
    pub segment: String,
    /// The kind of segment
    pub kind: SegmentKind,
    /// Method table, present on route endpoints
    pub methods: Option<MethodRouter<T>>,
    /// Static children, sorted by segment for binary search
    pub static_children: Vec<Node<T>>,
    /// Parameter child (at most one per node)
    pub param_child: Option<Box<Node<T>>>,
    /// Catch-all child (at most one per node, always a leaf)
    pub wildcard_child: Option<Box<Node<T>>>,
}

impl<T> Node<T> {
    fn with_kind(segment: String, kind: SegmentKind) -> Self {
        Self {
            segment,
            kind,
            methods: None,
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::with_kind(String::new(), SegmentKind::Static)
    }

    /// Inserts `value` for `method` at `path`.
    pub fn insert(&mut self, path: &str, method: Method, value: T) -> RouterResult<()> {
        let segments = parse_path(path)?;
        let target = self.descend(path, &segments)?;
        let methods = target.methods.get_or_insert_with(MethodRouter::new);
        methods
            .insert(method.clone(), value)
            .map_err(|_| RouterError::Duplicate {
                method,
                path: path.to_string(),
            })
    }

    /// Walks (and grows) the tree along `segments`, returning the endpoint node.
    fn descend(
        &mut self,
        path: &str,
        segments: &[(String, SegmentKind)],
    ) -> RouterResult<&mut Self> {
        let Some(((segment, kind), remaining)) = segments.split_first() else {
            return Ok(self);
        };

        match kind {
            SegmentKind::Static => {
                let idx = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                {
                    Ok(idx) => idx,
                    Err(idx) => {
                        let child = Self::with_kind(segment.clone(), SegmentKind::Static);
                        self.static_children.insert(idx, child);
                        idx
                    }
                };
                self.static_children[idx].descend(path, remaining)
            }
            SegmentKind::Param(name) => {
                let child = self.param_child.get_or_insert_with(|| {
                    Box::new(Self::with_kind(segment.clone(), kind.clone()))
                });
                if let SegmentKind::Param(existing) = &child.kind {
                    if existing != name {
                        return Err(RouterError::ConflictingParam {
                            path: path.to_string(),
                            existing: existing.clone(),
                            new: name.clone(),
                        });
                    }
                }
                child.descend(path, remaining)
            }
            SegmentKind::Wildcard(name) => {
                if !remaining.is_empty() {
                    return Err(RouterError::WildcardNotLast {
                        path: path.to_string(),
                    });
                }
                let child = self.wildcard_child.get_or_insert_with(|| {
                    Box::new(Self::with_kind(segment.clone(), kind.clone()))
                });
                if let SegmentKind::Wildcard(existing) = &child.kind {
                    if existing != name {
                        return Err(RouterError::ConflictingParam {
                            path: path.to_string(),
                            existing: existing.clone(),
                            new: name.clone(),
                        });
                    }
                }
                Ok(&mut **child)
            }
        }
    }

    /// Matches a concrete request path against the tree.
    ///
    /// Returns the endpoint's method table and the captured parameters.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter<T>, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut params = Params::new();
        let methods = self.match_segments(&segments, &mut params)?;
        Some((methods, params))
    }

    fn match_segments<'a>(
        &'a self,
        segments: &[&str],
        params: &mut Params,
    ) -> Option<&'a MethodRouter<T>> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.methods.as_ref();
        };

        if let Some(child) = self.find_static_child(segment) {
            if let Some(found) = child.match_segments(remaining, params) {
                return Some(found);
            }
        }

        if let Some(child) = &self.param_child {
            if let SegmentKind::Param(name) = &child.kind {
                let mark = params.len();
                params.push(name.as_str(), *segment);
                if let Some(found) = child.match_segments(remaining, params) {
                    return Some(found);
                }
                params.truncate(mark);
            }
        }

        if let Some(child) = &self.wildcard_child {
            if let SegmentKind::Wildcard(name) = &child.kind {
                params.push(name.as_str(), segments.join("/"));
                return child.methods.as_ref();
            }
        }

        None
    }

    fn find_static_child(&self, segment: &str) -> Option<&Self> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }
}

/// Splits a path pattern into typed segments.
fn parse_path(path: &str) -> RouterResult<Vec<(String, SegmentKind)>> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| {
            let kind = if let Some(name) = s.strip_prefix(':') {
                SegmentKind::Param(name.to_string())
            } else if let Some(name) = s.strip_prefix('*') {
                SegmentKind::Wildcard(name.to_string())
            } else {
                SegmentKind::Static
            };
            match &kind {
                SegmentKind::Param(name) | SegmentKind::Wildcard(name) if name.is_empty() => {
                    Err(RouterError::UnnamedPlaceholder {
                        path: path.to_string(),
                    })
                }
                _ => Ok((s.to_string(), kind)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_kinds() {
        let segments = parse_path("/files/:dir/*rest").unwrap();
        assert_eq!(segments[0], ("files".to_string(), SegmentKind::Static));
        assert_eq!(
            segments[1],
            (":dir".to_string(), SegmentKind::Param("dir".to_string()))
        );
        assert_eq!(
            segments[2],
            ("*rest".to_string(), SegmentKind::Wildcard("rest".to_string()))
        );
    }

    #[test]
    fn test_parse_path_unnamed_placeholder() {
        assert!(matches!(
            parse_path("/users/:"),
            Err(RouterError::UnnamedPlaceholder { .. })
        ));
    }

    #[test]
    fn test_insert_and_match_static() {
        let mut root = Node::root();
        root.insert("/users", Method::GET, "listUsers").unwrap();

        let (methods, params) = root.match_path("/users").unwrap();
        assert_eq!(methods.get(&Method::GET), Some(&"listUsers"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_insert_and_match_param() {
        let mut root = Node::root();
        root.insert("/users/:id", Method::GET, "getUser").unwrap();

        let (methods, params) = root.match_path("/users/123").unwrap();
        assert_eq!(methods.get(&Method::GET), Some(&"getUser"));
        assert_eq!(params.get("id"), Some("123"));
    }

    #[test]
    fn test_insert_and_match_wildcard() {
        let mut root = Node::root();
        root.insert("/files/*path", Method::GET, "serveFile").unwrap();

        let (_, params) = root.match_path("/files/images/logo.png").unwrap();
        assert_eq!(params.get("path"), Some("images/logo.png"));
    }

    #[test]
    fn test_static_priority_over_param() {
        let mut root = Node::root();
        root.insert("/users/me", Method::GET, "me").unwrap();
        root.insert("/users/:id", Method::GET, "getUser").unwrap();

        let (methods, _) = root.match_path("/users/me").unwrap();
        assert_eq!(methods.get(&Method::GET), Some(&"me"));

        let (methods, params) = root.match_path("/users/7").unwrap();
        assert_eq!(methods.get(&Method::GET), Some(&"getUser"));
        assert_eq!(params.get("id"), Some("7"));
    }

    #[test]
    fn test_backtracking_releases_params() {
        let mut root = Node::root();
        root.insert("/a/:x/b", Method::GET, "param").unwrap();
        root.insert("/a/*rest", Method::GET, "catchAll").unwrap();

        let (methods, params) = root.match_path("/a/1/c").unwrap();
        assert_eq!(methods.get(&Method::GET), Some(&"catchAll"));
        assert_eq!(params.get("x"), None);
        assert_eq!(params.get("rest"), Some("1/c"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_static_siblings_stay_sorted() {
        let mut root = Node::root();
        for seg in ["zeta", "alpha", "mid"] {
            root.insert(&format!("/{seg}"), Method::GET, seg).unwrap();
        }
        let order: Vec<_> = root
            .static_children
            .iter()
            .map(|c| c.segment.as_str())
            .collect();
        assert_eq!(order, vec!["alpha", "mid", "zeta"]);
        assert!(root.match_path("/mid").is_some());
    }

    #[test]
    fn test_conflicting_param_names() {
        let mut root = Node::root();
        root.insert("/users/:id", Method::GET, "a").unwrap();
        let err = root.insert("/users/:name", Method::POST, "b").unwrap_err();
        assert!(matches!(err, RouterError::ConflictingParam { .. }));
    }

    #[test]
    fn test_wildcard_must_be_last() {
        let mut root = Node::root();
        let err = root.insert("/files/*path/meta", Method::GET, "x").unwrap_err();
        assert!(matches!(err, RouterError::WildcardNotLast { .. }));
    }

    #[test]
    fn test_no_match() {
        let mut root = Node::root();
        root.insert("/users", Method::GET, "listUsers").unwrap();
        assert!(root.match_path("/posts").is_none());
        assert!(root.match_path("/users/1").is_none());
    }
}
