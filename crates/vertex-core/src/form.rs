//! Merged request parameter values.

use indexmap::IndexMap;

/// Multi-valued parameter set built from the query string, a urlencoded
/// body, and the router's path parameters.
///
/// Insertion order is preserved so documentation and debug output stay
/// stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: IndexMap<String, Vec<String>>,
}

impl FormValues {
    /// Creates an empty value set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `application/x-www-form-urlencoded` text.
    ///
    /// Decoding is lenient: bad percent escapes are kept literally and invalid
    /// UTF-8 is replaced. Input that still cannot be deserialized yields an
    /// empty set and a debug log.
    #[must_use]
    pub fn parse(encoded: &str) -> Self {
        Self::parse_bytes(encoded.as_bytes())
    }

    /// Parses urlencoded bytes, such as a request body that is not UTF-8.
    #[must_use]
    pub fn parse_bytes(encoded: &[u8]) -> Self {
        let pairs: Vec<(String, String)> = match serde_urlencoded::from_bytes(encoded) {
            Ok(pairs) => pairs,
            Err(e) => {
                tracing::debug!(error = %e, "discarding malformed form data");
                Vec::new()
            }
        };
        let mut form = Self::new();
        for (k, v) in pairs {
            form.add(k, v);
        }
        form
    }

    /// Returns the first value for `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// Returns every value for `name`, empty if absent.
    #[must_use]
    pub fn get_all(&self, name: &str) -> &[String] {
        self.values
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Replaces all values for `name` with a single value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), vec![value.into()]);
    }

    /// Appends a value for `name`.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.entry(name.into()).or_default().push(value.into());
    }

    /// Appends every pair from `other`.
    pub fn extend(&mut self, other: Self) {
        for (name, values) in other.values {
            self.values.entry(name).or_default().extend(values);
        }
    }

    /// Removes `name`, returning its values.
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.values.shift_remove(name)
    }

    /// Returns true if `name` has at least one value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(|v| !v.is_empty())
    }

    /// Iterates over names and their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Returns the number of distinct names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns true if no names are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
