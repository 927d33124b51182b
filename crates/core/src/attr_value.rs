use serde::{Deserialize, Serialize};
use std::fmt;

/// Value of a single homolog attribute.
///
/// Attributes are schema-less: any name may hold any variant, and a later
/// import may replace a value with a different variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AttrValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.total_cmp(b).is_eq(),
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for AttrValue {}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttrValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            AttrValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Key under which this value is stored in a secondary index.
    /// Nulls are never indexed. Values of different variants can share a
    /// key, so index hits are compared against the stored value.
    pub fn index_key(&self) -> Option<String> {
        match self {
            AttrValue::Null => None,
            other => Some(other.to_string()),
        }
    }
}

/// Text rendering used by the delimited formats. Null renders empty.
impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => Ok(()),
            AttrValue::Text(s) => f.write_str(s),
            AttrValue::Integer(n) => write!(f, "{n}"),
            AttrValue::Float(x) => write!(f, "{x}"),
            AttrValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Integer(n)
    }
}

impl From<f64> for AttrValue {
    fn from(x: f64) -> Self {
        AttrValue::Float(x)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Boolean(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_equality_is_total() {
        assert_eq!(AttrValue::Float(f64::NAN), AttrValue::Float(f64::NAN));
        assert_ne!(AttrValue::Float(0.0), AttrValue::Float(-0.0));
    }

    #[test]
    fn variants_never_compare_equal_across_types() {
        assert_ne!(AttrValue::Integer(1), AttrValue::Text("1".into()));
        assert_ne!(AttrValue::Null, AttrValue::Text(String::new()));
    }

    #[test]
    fn display_matches_wire_text() {
        assert_eq!(AttrValue::Null.to_string(), "");
        assert_eq!(AttrValue::from("dog").to_string(), "dog");
        assert_eq!(AttrValue::from(7_i64).to_string(), "7");
        assert_eq!(AttrValue::from(true).to_string(), "true");
    }

    #[test]
    fn null_has_no_index_key() {
        assert_eq!(AttrValue::Null.index_key(), None);
        assert_eq!(AttrValue::from("ACC1").index_key().as_deref(), Some("ACC1"));
    }
}
