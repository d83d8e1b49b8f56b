//! Typed conversion of argument values.
//!
//! Each supported type supplies its own parse strategy through [`ArgValue`].
//! Conversion never fails loudly: a value that does not parse yields `None`
//! and the parser substitutes the type's default.

use std::path::PathBuf;

/// A type that can be read from a raw argument value.
///
/// # Examples
///
/// ```
/// use argline_core::ArgValue;
///
/// assert_eq!(i32::parse_arg(" 12 "), Some(12));
/// assert_eq!(f64::parse_arg("12.34"), Some(12.34));
/// assert_eq!(bool::parse_arg("TRUE"), Some(true));
/// assert_eq!(u8::parse_arg("300"), None);
/// ```
pub trait ArgValue: Sized + Default {
    /// Parses `raw`, returning `None` when it is not a valid `Self`.
    fn parse_arg(raw: &str) -> Option<Self>;
}

macro_rules! impl_arg_value_from_str {
    ($($ty:ty),* $(,)?) => {
        $(
            impl ArgValue for $ty {
                fn parse_arg(raw: &str) -> Option<Self> {
                    raw.trim().parse().ok()
                }
            }
        )*
    };
}

impl_arg_value_from_str!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64
);

impl ArgValue for bool {
    fn parse_arg(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("true") {
            Some(true)
        } else if raw.eq_ignore_ascii_case("false") {
            Some(false)
        } else {
            None
        }
    }
}

impl ArgValue for char {
    fn parse_arg(raw: &str) -> Option<Self> {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Some(ch),
            _ => None,
        }
    }
}

impl ArgValue for String {
    fn parse_arg(raw: &str) -> Option<Self> {
        Some(raw.to_string())
    }
}

impl ArgValue for PathBuf {
    fn parse_arg(raw: &str) -> Option<Self> {
        Some(PathBuf::from(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_accept_surrounding_whitespace() {
        assert_eq!(i64::parse_arg("  -42\t"), Some(-42));
        assert_eq!(usize::parse_arg("7"), Some(7));
        assert_eq!(i32::parse_arg("12.5"), None);
        assert_eq!(u32::parse_arg("-1"), None);
    }

    #[test]
    fn test_floats() {
        assert_eq!(f32::parse_arg("1.5"), Some(1.5));
        assert_eq!(f64::parse_arg("abc"), None);
    }

    #[test]
    fn test_bool_is_case_insensitive() {
        assert_eq!(bool::parse_arg("False"), Some(false));
        assert_eq!(bool::parse_arg("yes"), None);
    }

    #[test]
    fn test_char_requires_exactly_one() {
        assert_eq!(char::parse_arg("x"), Some('x'));
        assert_eq!(char::parse_arg("xy"), None);
        assert_eq!(char::parse_arg(""), None);
    }

    #[test]
    fn test_string_and_path_always_succeed() {
        assert_eq!(String::parse_arg(" keep "), Some(" keep ".to_string()));
        assert_eq!(PathBuf::parse_arg("/tmp/x"), Some(PathBuf::from("/tmp/x")));
    }
}
