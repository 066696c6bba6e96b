//! Value type for document fields.
//!
//! `Value` is the dynamically typed cell of a `Document`. It carries a total
//! ordering so filter conditions can compare values deterministically, with
//! integers and floats comparing numerically across the two variants.

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};

/// A value that can be stored in a document field.
#[derive(Clone, Debug)]
pub enum Value {
    /// Null value
    Null,
    /// Boolean value
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit floating point
    Float(f64),
    /// UTF-8 string
    Str(String),
    /// Ordered list of values
    Array(Vec<Value>),
}

impl Value {
    /// Returns true if this value is Null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean value if this is a Bool, None otherwise.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the integer value if this is an Int, None otherwise.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the float value if this is a Float, None otherwise.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns a reference to the string if this is a Str, None otherwise.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }

    /// Returns a slice of the elements if this is an Array, None otherwise.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Returns the value as an f64 if it is numeric (Int or Float).
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Int(v) => Some(*v as f64),
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Compares two values of the same kind.
    ///
    /// Returns `Some` only when a comparison is meaningful: both values are
    /// numeric (Int/Float compare cross-variant), or both share a variant.
    /// Mixed-kind comparisons return `None` so filter conditions on a field
    /// holding an unexpected type never match.
    pub fn compare_same_kind(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => Some(total_float_cmp(*a, *b)),
            (Value::Int(a), Value::Float(b)) => Some(int_float_cmp(*a, *b)),
            (Value::Float(a), Value::Int(b)) => Some(int_float_cmp(*b, *a).reverse()),
            (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
            (Value::Array(a), Value::Array(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Returns a type ordering value for comparing across kinds.
    fn kind_order(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int(_) => 2,
            Value::Float(_) => 2,
            Value::Str(_) => 3,
            Value::Array(_) => 4,
        }
    }
}

/// Total order on f64 with NaN sorting above every other value.
fn total_float_cmp(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

// 2^63, exactly representable; the first double outside i64 range.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// True iff the float represents exactly the same number as the integer.
/// Going through `as f64` on both sides would merge integers above 2^53
/// with nearby floats; instead the float must be integral, inside i64
/// range, and convert back to precisely `a`.
fn int_float_eq(a: i64, b: f64) -> bool {
    if !b.is_finite() || b < -I64_BOUND || b >= I64_BOUND {
        return false;
    }
    let truncated = b as i64;
    truncated as f64 == b && truncated == a
}

/// Exact numeric order between an integer and a float.
fn int_float_cmp(a: i64, b: f64) -> Ordering {
    // NaN sorts above every number, matching total_float_cmp
    if b.is_nan() || b >= I64_BOUND {
        return Ordering::Less;
    }
    if b < -I64_BOUND {
        return Ordering::Greater;
    }
    let truncated = b as i64;
    match a.cmp(&truncated) {
        Ordering::Equal if truncated as f64 == b => Ordering::Equal,
        // a equals b's integer part, so b's fraction decides; truncation is
        // toward zero, hence the fraction carries b's sign
        Ordering::Equal if b > 0.0 => Ordering::Less,
        Ordering::Equal => Ordering::Greater,
        other => other,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => {
                // NaN equals NaN so distinct() and index keys behave
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                int_float_eq(*a, *b)
            }
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare_same_kind(other)
            .unwrap_or_else(|| self.kind_order().cmp(&other.kind_order()))
    }
}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => 0u8.hash(state),
            Value::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            // An Int that a double can represent exactly hashes through the
            // float bits, so Int(1) == Float(1.0) implies equal hashes; one
            // that cannot is never equal to any Float and hashes as an i64
            Value::Int(i) => {
                2u8.hash(state);
                if int_float_eq(*i, *i as f64) {
                    (*i as f64).to_bits().hash(state);
                } else {
                    i.hash(state);
                }
            }
            Value::Float(f) => {
                2u8.hash(state);
                if f.is_nan() {
                    f64::NAN.to_bits().hash(state);
                } else {
                    f.to_bits().hash(state);
                }
            }
            Value::Str(s) => {
                3u8.hash(state);
                s.hash(state);
            }
            Value::Array(a) => {
                4u8.hash(state);
                a.hash(state);
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Array(v)
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(100).as_int(), Some(100));
        assert_eq!(Value::Float(3.5).as_float(), Some(3.5));
        assert_eq!(Value::Str("hello".into()).as_str(), Some("hello"));
        assert!(Value::Null.is_null());
        assert_eq!(Value::Int(2).as_number(), Some(2.0));
        assert_eq!(Value::Float(2.5).as_number(), Some(2.5));
        assert_eq!(Value::Str("x".into()).as_number(), None);
    }

    #[test]
    fn test_value_equality() {
        assert_eq!(Value::Int(42), Value::Int(42));
        assert_eq!(Value::Int(42), Value::Float(42.0));
        assert_ne!(Value::Int(42), Value::Str("42".into()));
        assert_eq!(Value::Null, Value::Null);
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    }

    #[test]
    fn test_large_int_float_equality_is_exact() {
        // 2^53 + 1 rounds to 2^53 under `as f64`; the values differ
        let big = 9_007_199_254_740_993i64;
        let near = 9_007_199_254_740_992.0f64;
        assert_ne!(Value::Int(big), Value::Float(near));
        assert_eq!(Value::Int(big - 1), Value::Float(near));
        assert_eq!(
            Value::Int(big).compare_same_kind(&Value::Float(near)),
            Some(Ordering::Greater)
        );

        // i64::MAX as f64 is 2^63, outside i64 range entirely
        assert_ne!(Value::Int(i64::MAX), Value::Float(9_223_372_036_854_775_808.0));
        assert_eq!(
            Value::Int(i64::MAX).compare_same_kind(&Value::Float(9_223_372_036_854_775_808.0)),
            Some(Ordering::Less)
        );

        // Fractions and non-finite floats never equal an Int
        assert_ne!(Value::Int(2), Value::Float(2.5));
        assert_eq!(
            Value::Int(2).compare_same_kind(&Value::Float(2.5)),
            Some(Ordering::Less)
        );
        assert_ne!(Value::Int(0), Value::Float(f64::INFINITY));
        assert_eq!(
            Value::Int(0).compare_same_kind(&Value::Float(f64::NEG_INFINITY)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn test_value_ordering() {
        assert!(Value::Int(1) < Value::Int(2));
        assert!(Value::Int(1) < Value::Float(1.5));
        assert!(Value::Str("a".into()) < Value::Str("b".into()));
        assert!(Value::Null < Value::Int(0));
    }

    #[test]
    fn test_compare_same_kind() {
        assert_eq!(
            Value::Int(3).compare_same_kind(&Value::Float(3.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Value::Str("a".into()).compare_same_kind(&Value::Int(1)),
            None
        );
        assert_eq!(
            Value::Bool(false).compare_same_kind(&Value::Bool(true)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn test_value_from_impls() {
        let v: Value = 42i64.into();
        assert_eq!(v.as_int(), Some(42));

        let v: Value = "hello".into();
        assert_eq!(v.as_str(), Some("hello"));

        let v: Value = Some(1.5f64).into();
        assert_eq!(v.as_float(), Some(1.5));

        let v: Value = None::<i64>.into();
        assert!(v.is_null());

        let v: Value = vec![Value::Int(1), Value::Int(2)].into();
        assert_eq!(v.as_array().map(|a| a.len()), Some(2));
    }

    #[test]
    fn test_value_display() {
        use alloc::string::ToString;
        assert_eq!(Value::Int(1).to_string(), "1");
        assert_eq!(Value::Str("a".into()).to_string(), "\"a\"");
        assert_eq!(
            Value::Array(vec![Value::Int(1), Value::Null]).to_string(),
            "[1, null]"
        );
    }
}
