//! Per-path method table.

use http::Method;
use smallvec::SmallVec;

/// Maps HTTP methods to registered values for a single path.
///
/// Most paths carry one or two methods, so entries live inline.
///
/// # Example
///
/// ```rust
/// use vertex_router::MethodRouter;
/// use http::Method;
///
/// let mut methods = MethodRouter::new();
/// assert!(methods.insert(Method::GET, "listUsers").is_ok());
/// assert!(methods.insert(Method::GET, "again").is_err());
///
/// assert_eq!(methods.get(&Method::GET), Some(&"listUsers"));
/// assert_eq!(methods.get(&Method::DELETE), None);
/// ```
#[derive(Debug, Clone)]
pub struct MethodRouter<T> {
    entries: SmallVec<[(Method, T); 2]>,
}

impl<T> Default for MethodRouter<T> {
    fn default() -> Self {
        Self {
            entries: SmallVec::new(),
        }
    }
}

impl<T> MethodRouter<T> {
    /// Creates an empty method table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a value for `method`.
    ///
    /// Returns the value back if the method is already taken.
    pub fn insert(&mut self, method: Method, value: T) -> Result<(), T> {
        if self.entries.iter().any(|(m, _)| *m == method) {
            return Err(value);
        }
        self.entries.push((method, value));
        Ok(())
    }

    /// Returns the value registered for `method`.
    ///
    /// A HEAD request falls back to the GET registration.
    #[must_use]
    pub fn get(&self, method: &Method) -> Option<&T> {
        self.lookup(method).or_else(|| {
            if *method == Method::HEAD {
                self.lookup(&Method::GET)
            } else {
                None
            }
        })
    }

    fn lookup(&self, method: &Method) -> Option<&T> {
        self.entries
            .iter()
            .find(|(m, _)| m == method)
            .map(|(_, v)| v)
    }

    /// Returns true if any methods are registered.
    #[must_use]
    pub fn has_any_method(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Returns the registered methods in registration order.
    #[must_use]
    pub fn allowed_methods(&self) -> Vec<Method> {
        self.entries.iter().map(|(m, _)| m.clone()).collect()
    }

    /// Returns the number of registered methods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no methods are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_router_new() {
        let router: MethodRouter<&str> = MethodRouter::new();
        assert!(!router.has_any_method());
        assert!(router.is_empty());
    }

    #[test]
    fn test_method_router_insert_and_get() {
        let mut router = MethodRouter::new();
        router.insert(Method::GET, "getUser").unwrap();
        router.insert(Method::POST, "createUser").unwrap();
        router.insert(Method::PATCH, "patchUser").unwrap();

        assert_eq!(router.get(&Method::GET), Some(&"getUser"));
        assert_eq!(router.get(&Method::POST), Some(&"createUser"));
        assert_eq!(router.get(&Method::PATCH), Some(&"patchUser"));
        assert_eq!(router.get(&Method::PUT), None);
        assert_eq!(router.len(), 3);
    }

    #[test]
    fn test_method_router_duplicate_returns_value() {
        let mut router = MethodRouter::new();
        router.insert(Method::GET, "first").unwrap();
        assert_eq!(router.insert(Method::GET, "second"), Err("second"));
        assert_eq!(router.get(&Method::GET), Some(&"first"));
    }

    #[test]
    fn test_method_router_head_falls_back_to_get() {
        let mut router = MethodRouter::new();
        router.insert(Method::GET, "getUser").unwrap();
        assert_eq!(router.get(&Method::HEAD), Some(&"getUser"));

        router.insert(Method::HEAD, "headUser").unwrap();
        assert_eq!(router.get(&Method::HEAD), Some(&"headUser"));
    }

    #[test]
    fn test_method_router_allowed_methods() {
        let mut router = MethodRouter::new();
        router.insert(Method::GET, 1).unwrap();
        router.insert(Method::DELETE, 2).unwrap();
        router.insert(Method::POST, 3).unwrap();

        assert_eq!(
            router.allowed_methods(),
            vec![Method::GET, Method::DELETE, Method::POST]
        );
    }

    #[test]
    fn test_method_router_extension_method() {
        let purge = Method::from_bytes(b"PURGE").unwrap();
        let mut router = MethodRouter::new();
        router.insert(purge.clone(), "purge").unwrap();
        assert_eq!(router.get(&purge), Some(&"purge"));
    }
}
