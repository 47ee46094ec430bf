//! Route method sets.

use std::ops::{BitOr, BitOrAssign};

use http::Method;

/// Bitmask of the HTTP methods a route answers.
///
/// ```
/// use vertex_core::Methods;
/// use http::Method;
///
/// let methods = Methods::GET | Methods::POST;
/// assert!(methods.contains(Methods::GET));
/// assert_eq!(methods.iter().collect::<Vec<_>>(), vec![Method::GET, Method::POST]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Methods(u8);

impl Methods {
    /// No methods.
    pub const NONE: Self = Self(0);
    /// GET
    pub const GET: Self = Self(1);
    /// POST
    pub const POST: Self = Self(1 << 1);
    /// PUT
    pub const PUT: Self = Self(1 << 2);
    /// DELETE
    pub const DELETE: Self = Self(1 << 3);
    /// PATCH
    pub const PATCH: Self = Self(1 << 4);

    const ALL: [(Self, Method); 5] = [
        (Self::GET, Method::GET),
        (Self::POST, Method::POST),
        (Self::PUT, Method::PUT),
        (Self::DELETE, Method::DELETE),
        (Self::PATCH, Method::PATCH),
    ];

    /// Returns true if every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if no bit is set.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// The bit for a single HTTP method, `NONE` if unsupported.
    #[must_use]
    pub fn from_method(method: &Method) -> Self {
        Self::ALL
            .iter()
            .find(|(_, m)| m == method)
            .map_or(Self::NONE, |(bit, _)| *bit)
    }

    /// Iterates the set methods in GET, POST, PUT, DELETE, PATCH order.
    pub fn iter(self) -> impl Iterator<Item = Method> {
        Self::ALL
            .into_iter()
            .filter(move |(bit, _)| !bit.is_empty() && self.contains(*bit))
            .map(|(_, m)| m)
    }
}

impl BitOr for Methods {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Methods {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}
