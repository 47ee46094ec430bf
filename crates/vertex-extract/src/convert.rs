//! Conversion from raw parameter text to typed field values.

use crate::info::ParamKind;

/// A type that can be parsed from a single raw parameter value.
///
/// Implement this for your own types to bind them directly:
///
/// ```rust
/// use vertex_extract::{FromParam, ParamKind};
///
/// struct Celsius(f64);
///
/// impl FromParam for Celsius {
///     fn kind() -> ParamKind {
///         ParamKind::Number
///     }
///
///     fn from_param(raw: &str) -> Result<Self, String> {
///         raw.trim_end_matches('C').parse().map(Celsius).map_err(|e| format!("{e}"))
///     }
/// }
///
/// assert_eq!(Celsius::from_param("21.5C").unwrap().0, 21.5);
/// ```
pub trait FromParam: Sized {
    /// Wire type reported in documentation.
    fn kind() -> ParamKind;

    /// Format hint reported in documentation.
    fn format() -> Option<&'static str> {
        None
    }

    /// Parses a raw value.
    fn from_param(raw: &str) -> Result<Self, String>;

    /// Numeric view used for `min`/`max` checks.
    fn numeric(&self) -> Option<f64> {
        None
    }
}

impl FromParam for String {
    fn kind() -> ParamKind {
        ParamKind::String
    }

    fn from_param(raw: &str) -> Result<Self, String> {
        Ok(raw.to_string())
    }
}

impl FromParam for char {
    fn kind() -> ParamKind {
        ParamKind::String
    }

    fn from_param(raw: &str) -> Result<Self, String> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err("expected a single character".to_string()),
        }
    }
}

impl FromParam for bool {
    fn kind() -> ParamKind {
        ParamKind::Boolean
    }

    fn from_param(raw: &str) -> Result<Self, String> {
        match raw {
            "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
            "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
            _ => Err(format!("'{raw}' is not a boolean")),
        }
    }
}

macro_rules! int_param {
    ($($ty:ty => $format:expr),* $(,)?) => {$(
        impl FromParam for $ty {
            fn kind() -> ParamKind {
                ParamKind::Integer
            }

            fn format() -> Option<&'static str> {
                $format
            }

            fn from_param(raw: &str) -> Result<Self, String> {
                raw.parse::<$ty>().map_err(|e| format!("'{raw}': {e}"))
            }

            #[allow(clippy::cast_lossless, clippy::cast_precision_loss)]
            fn numeric(&self) -> Option<f64> {
                Some(*self as f64)
            }
        }
    )*};
}

int_param! {
    i8 => None,
    i16 => None,
    i32 => Some("int32"),
    i64 => Some("int64"),
    i128 => None,
    isize => Some("int64"),
    u8 => None,
    u16 => None,
    u32 => Some("int32"),
    u64 => Some("int64"),
    u128 => None,
    usize => Some("int64"),
}

macro_rules! float_param {
    ($($ty:ty => $format:expr),* $(,)?) => {$(
        impl FromParam for $ty {
            fn kind() -> ParamKind {
                ParamKind::Number
            }

            fn format() -> Option<&'static str> {
                Some($format)
            }

            fn from_param(raw: &str) -> Result<Self, String> {
                raw.parse::<$ty>().map_err(|e| format!("'{raw}': {e}"))
            }

            fn numeric(&self) -> Option<f64> {
                Some(f64::from(*self))
            }
        }
    )*};
}

float_param! {
    f32 => "float",
    f64 => "double",
}
