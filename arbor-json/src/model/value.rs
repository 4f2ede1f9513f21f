use crate::error::{Error, Result};

/// A JSON scalar.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i32),
    Float(f32),
    Str(String),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    pub fn is_int(&self) -> bool {
        matches!(self, Value::Int(_))
    }

    pub fn is_float(&self) -> bool {
        matches!(self, Value::Float(_))
    }

    pub fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(Error::mismatch("bool", other.type_name())),
        }
    }

    /// Reads an integer. Floats are narrowed by truncation toward zero
    /// (saturating at the `i32` bounds).
    pub fn as_int(&self) -> Result<i32> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Float(f) => Ok(*f as i32),
            other => Err(Error::mismatch("int", other.type_name())),
        }
    }

    pub fn as_float(&self) -> Result<f32> {
        match self {
            Value::Float(f) => Ok(*f),
            other => Err(Error::mismatch("float", other.type_name())),
        }
    }

    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(Error::mismatch("string", other.type_name())),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i)
    }
}

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_narrows_to_int() {
        assert_eq!(Value::Float(3.9).as_int().unwrap(), 3);
        assert_eq!(Value::Float(-2.5).as_int().unwrap(), -2);
    }

    #[test]
    fn cross_type_reads_fail() {
        assert!(matches!(
            Value::Int(1).as_float(),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(Value::Null.as_bool().is_err());
        assert!(Value::Bool(true).as_str().is_err());
        assert!(Value::from("1").as_int().is_err());
    }

    #[test]
    fn int_and_float_are_distinct() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }
}
