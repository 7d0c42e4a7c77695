//! Call Key Module
//!
//! Canonical, hashable representation of a call's positional and keyword arguments.
//!
//! Two calls map to the same key when their positional arguments are equal
//! in order and their keyword arguments are equal as a set of name/value
//! pairs. Arguments keep the form the caller passed (`2.0` stays a float)
//! while equality and hashing compare numbers by value, so `2.0` and `2`
//! still name the same call. Mutable composites (JSON arrays and objects)
//! have no stable identity and are rejected with [`MemoError::UncacheableKey`].

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde_json::{Map, Value};

use crate::error::{MemoError, Result};

/// Magnitude below which an integral float compares equal to an `Arg::Int`.
const I128_FLOAT_LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

// == Canonical Float ==
/// A non-NaN float compared by value, with `-0.0` folded into `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalFloat(u64);

impl CanonicalFloat {
    /// Returns None for NaN, which is not equal to itself.
    pub fn new(value: f64) -> Option<Self> {
        if value.is_nan() {
            return None;
        }
        let value = if value == 0.0 { 0.0 } else { value };
        Some(Self(value.to_bits()))
    }

    pub fn get(self) -> f64 {
        f64::from_bits(self.0)
    }

    /// The integer this float equals exactly, if any.
    fn as_integral(self) -> Option<i128> {
        let value = self.get();
        if value.fract() == 0.0 && value.abs() < I128_FLOAT_LIMIT {
            Some(value as i128)
        } else {
            None
        }
    }
}

// == Arg ==
/// A single hashable argument value.
///
/// `Int` and `Float` compare by numeric value: `Float(2.0) == Int(2)`.
#[derive(Debug, Clone)]
pub enum Arg {
    Null,
    Bool(bool),
    Int(i128),
    Float(CanonicalFloat),
    Str(String),
    /// Immutable sequence of arguments
    Tuple(Vec<Arg>),
}

impl Arg {
    // == Float ==
    /// Builds a float argument. NaN is uncacheable.
    pub fn float(value: f64) -> Result<Self> {
        CanonicalFloat::new(value)
            .map(Arg::Float)
            .ok_or_else(|| MemoError::UncacheableKey("NaN has no stable identity".to_string()))
    }

    // == From JSON ==
    /// Converts a dynamic value, naming `position` in the error message.
    pub fn from_json(value: &Value, position: &str) -> Result<Self> {
        match value {
            Value::Null => Ok(Arg::Null),
            Value::Bool(b) => Ok(Arg::Bool(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Arg::Int(i as i128))
                } else if let Some(u) = n.as_u64() {
                    Ok(Arg::Int(u as i128))
                } else {
                    let f = n.as_f64().ok_or_else(|| {
                        MemoError::UncacheableKey(format!("{} is not a finite number", position))
                    })?;
                    Arg::float(f).map_err(|_| {
                        MemoError::UncacheableKey(format!("{} is NaN", position))
                    })
                }
            }
            Value::String(s) => Ok(Arg::Str(s.clone())),
            Value::Array(_) => Err(MemoError::UncacheableKey(format!(
                "{} is an array (mutable composite)",
                position
            ))),
            Value::Object(_) => Err(MemoError::UncacheableKey(format!(
                "{} is an object (mutable composite)",
                position
            ))),
        }
    }

    // == Accessors ==
    /// Integer view, including floats that hold an exact integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Arg::Int(i) => i64::try_from(*i).ok(),
            Arg::Float(f) => f.as_integral().and_then(|i| i64::try_from(i).ok()),
            _ => None,
        }
    }

    /// Numeric view of `Int` and `Float` arguments.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Arg::Int(i) => Some(*i as f64),
            Arg::Float(f) => Some(f.get()),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Arg::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Arg::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl PartialEq for Arg {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Arg::Null, Arg::Null) => true,
            (Arg::Bool(a), Arg::Bool(b)) => a == b,
            (Arg::Int(a), Arg::Int(b)) => a == b,
            (Arg::Float(a), Arg::Float(b)) => a == b,
            (Arg::Int(i), Arg::Float(f)) | (Arg::Float(f), Arg::Int(i)) => {
                f.as_integral() == Some(*i)
            }
            (Arg::Str(a), Arg::Str(b)) => a == b,
            (Arg::Tuple(a), Arg::Tuple(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Arg {}

impl Hash for Arg {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Integral floats hash as the integer they equal
        match self {
            Arg::Null => 0u8.hash(state),
            Arg::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            Arg::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            Arg::Float(f) => match f.as_integral() {
                Some(i) => {
                    2u8.hash(state);
                    i.hash(state);
                }
                None => {
                    3u8.hash(state);
                    f.hash(state);
                }
            },
            Arg::Str(s) => {
                4u8.hash(state);
                s.hash(state);
            }
            Arg::Tuple(items) => {
                5u8.hash(state);
                items.hash(state);
            }
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Null => write!(f, "null"),
            Arg::Bool(b) => write!(f, "{}", b),
            Arg::Int(i) => write!(f, "{}", i),
            Arg::Float(x) => write!(f, "{:?}", x.get()),
            Arg::Str(s) => write!(f, "{:?}", s),
            Arg::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
        }
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<i32> for Arg {
    fn from(value: i32) -> Self {
        Arg::Int(value as i128)
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Arg::Int(value as i128)
    }
}

impl From<u64> for Arg {
    fn from(value: u64) -> Self {
        Arg::Int(value as i128)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Str(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Str(value)
    }
}

impl From<Vec<Arg>> for Arg {
    fn from(value: Vec<Arg>) -> Self {
        Arg::Tuple(value)
    }
}

impl TryFrom<f64> for Arg {
    type Error = MemoError;

    fn try_from(value: f64) -> Result<Self> {
        Arg::float(value)
    }
}

// == Call Key ==
/// Composite key: ordered positional arguments plus an order-independent
/// set of keyword arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CallKey {
    args: Vec<Arg>,
    kwargs: BTreeMap<String, Arg>,
}

impl CallKey {
    // == Constructor ==
    pub fn new(args: Vec<Arg>, kwargs: BTreeMap<String, Arg>) -> Self {
        Self { args, kwargs }
    }

    /// Builds a key with positional arguments only.
    pub fn positional<I, A>(args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        Self {
            args: args.into_iter().map(Into::into).collect(),
            kwargs: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) a keyword argument.
    pub fn with_kwarg(mut self, name: impl Into<String>, value: impl Into<Arg>) -> Self {
        self.kwargs.insert(name.into(), value.into());
        self
    }

    // == Canonicalize ==
    /// Builds a key from dynamic positional and keyword values.
    ///
    /// Fails with `UncacheableKey` on the first array, object or NaN found.
    pub fn canonicalize(args: &[Value], kwargs: &Map<String, Value>) -> Result<Self> {
        let args = args
            .iter()
            .enumerate()
            .map(|(i, value)| Arg::from_json(value, &format!("args[{}]", i)))
            .collect::<Result<Vec<_>>>()?;

        let kwargs = kwargs
            .iter()
            .map(|(name, value)| {
                Arg::from_json(value, &format!("kwargs[{:?}]", name)).map(|arg| (name.clone(), arg))
            })
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self { args, kwargs })
    }

    // == Accessors ==
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    pub fn arg(&self, index: usize) -> Option<&Arg> {
        self.args.get(index)
    }

    pub fn kwargs(&self) -> &BTreeMap<String, Arg> {
        &self.kwargs
    }

    pub fn kwarg(&self, name: &str) -> Option<&Arg> {
        self.kwargs.get(name)
    }
}

impl fmt::Display for CallKey {
    /// Renders as `(4, 5, b=2)`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        let positional = self.args.iter().map(|arg| arg.to_string());
        let named = self
            .kwargs
            .iter()
            .map(|(name, arg)| format!("{}={}", name, arg));
        for (i, part) in positional.chain(named).enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", part)?;
        }
        write!(f, ")")
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(key: &CallKey) -> u64 {
        let mut hasher = DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish()
    }

    fn object(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_positional_order_matters() {
        let a = CallKey::positional([1, 2]);
        let b = CallKey::positional([2, 1]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_kwargs_order_independent() {
        let a = CallKey::canonicalize(&[], &object(json!({"x": 1, "y": "two"}))).unwrap();
        let mut reversed = Map::new();
        reversed.insert("y".to_string(), json!("two"));
        reversed.insert("x".to_string(), json!(1));
        let b = CallKey::canonicalize(&[], &reversed).unwrap();

        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_positional_and_keyword_are_distinct() {
        let positional = CallKey::positional([4]);
        let keyword = CallKey::default().with_kwarg("a", 4);
        assert_ne!(positional, keyword);
    }

    #[test]
    fn test_canonicalize_scalars() {
        let key = CallKey::canonicalize(
            &[json!(null), json!(true), json!(7), json!(2.5), json!("s")],
            &Map::new(),
        )
        .unwrap();

        assert_eq!(key.arg(0), Some(&Arg::Null));
        assert_eq!(key.arg(1).and_then(Arg::as_bool), Some(true));
        assert_eq!(key.arg(2).and_then(Arg::as_i64), Some(7));
        assert_eq!(key.arg(3).and_then(Arg::as_f64), Some(2.5));
        assert_eq!(key.arg(4).and_then(Arg::as_str), Some("s"));
        assert_eq!(key.arg(5), None);
    }

    #[test]
    fn test_integral_float_equals_int() {
        let from_float = CallKey::canonicalize(&[json!(2.0)], &Map::new()).unwrap();
        let from_int = CallKey::positional([2]);
        assert_eq!(from_float, from_int);
        assert_eq!(hash_of(&from_float), hash_of(&from_int));
    }

    #[test]
    fn test_float_argument_keeps_original_form() {
        let key = CallKey::canonicalize(&[json!(2.0)], &object(json!({"scale": 0.5}))).unwrap();

        match key.arg(0) {
            Some(Arg::Float(f)) => assert_eq!(f.get(), 2.0),
            other => panic!("expected Float(2.0), got {:?}", other),
        }
        assert_eq!(key.arg(0).and_then(Arg::as_i64), Some(2));
        assert_eq!(key.to_string(), "(2.0, scale=0.5)");
    }

    #[test]
    fn test_fractional_float_differs_from_int() {
        assert_ne!(Arg::float(2.5).unwrap(), Arg::Int(2));
        assert_ne!(Arg::float(2.5).unwrap(), Arg::float(2.25).unwrap());
    }

    #[test]
    fn test_negative_zero_folds() {
        assert_eq!(Arg::float(-0.0).unwrap(), Arg::float(0.0).unwrap());
        assert_eq!(Arg::float(-0.0).unwrap(), Arg::Int(0));
        assert_eq!(CanonicalFloat::new(-0.0), CanonicalFloat::new(0.0));
    }

    #[test]
    fn test_large_unsigned_kept_exact() {
        let key = CallKey::canonicalize(&[json!(u64::MAX)], &Map::new()).unwrap();
        assert_eq!(key.arg(0), Some(&Arg::Int(u64::MAX as i128)));
    }

    #[test]
    fn test_nan_is_uncacheable() {
        assert!(matches!(Arg::float(f64::NAN), Err(MemoError::UncacheableKey(_))));
        assert!(Arg::try_from(f64::INFINITY).is_ok());
    }

    #[test]
    fn test_array_argument_is_uncacheable() {
        let result = CallKey::canonicalize(&[json!(1), json!([1, 2])], &Map::new());
        match result {
            Err(MemoError::UncacheableKey(msg)) => assert!(msg.contains("args[1]")),
            other => panic!("expected UncacheableKey, got {:?}", other),
        }
    }

    #[test]
    fn test_object_kwarg_is_uncacheable() {
        let result = CallKey::canonicalize(&[], &object(json!({"opts": {"deep": true}})));
        match result {
            Err(MemoError::UncacheableKey(msg)) => assert!(msg.contains("opts")),
            other => panic!("expected UncacheableKey, got {:?}", other),
        }
    }

    #[test]
    fn test_tuple_argument_is_hashable() {
        let a = CallKey::positional([Arg::Tuple(vec![Arg::from(1), Arg::from("a")])]);
        let b = CallKey::positional([Arg::from(vec![Arg::from(1), Arg::from("a")])]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn test_display() {
        let key = CallKey::positional([2, 4]).with_kwarg("unit", "cm");
        assert_eq!(key.to_string(), "(2, 4, unit=\"cm\")");

        let single = CallKey::positional([Arg::Tuple(vec![Arg::from(1)])]);
        assert_eq!(single.to_string(), "((1,))");

        assert_eq!(CallKey::default().to_string(), "()");
    }

    #[test]
    fn test_accessors() {
        let key = CallKey::positional([1]).with_kwarg("b", true);
        assert_eq!(key.args().len(), 1);
        assert_eq!(key.kwargs().len(), 1);
        assert_eq!(key.kwarg("b"), Some(&Arg::Bool(true)));
        assert_eq!(key.kwarg("c"), None);
    }
}
