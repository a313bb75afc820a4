//! Runtime JSON values
//!
//! Materialized subtrees and query results are represented as owned
//! [`Value`]s. Objects preserve insertion order for deterministic
//! iteration; keys are unique. Numbers with no fractional part or
//! exponent materialize as `Integer`, anything else as `Float`.

use indexmap::IndexMap;

/// An owned JSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// JSON null
    Null,
    /// JSON boolean
    Bool(bool),
    /// Whole number (no fractional part or exponent in the source)
    Integer(i64),
    /// Any other JSON number
    Float(f64),
    /// JSON string
    String(String),
    /// JSON array
    Array(Vec<Value>),
    /// JSON object; insertion order is preserved
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Check if this value is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert to a boolean, if possible.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Convert to an i64, if this is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Convert to an f64; integers promote.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Convert to a string reference, if possible.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to an array reference, if possible.
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Convert to an object reference, if possible.
    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a field on an object value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Get the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Integer(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Serialize to compact JSON.
    ///
    /// Floats keep a decimal point (`5.0`, not `5`) so a value that
    /// round-trips through an in-memory re-stream keeps its variant.
    pub fn to_json(&self) -> String {
        let mut out = String::new();
        self.write_json(&mut out);
        out
    }

    fn write_json(&self, out: &mut String) {
        match self {
            Value::Null => out.push_str("null"),
            Value::Bool(true) => out.push_str("true"),
            Value::Bool(false) => out.push_str("false"),
            Value::Integer(n) => out.push_str(&n.to_string()),
            Value::Float(f) => {
                if f.is_nan() || f.is_infinite() {
                    // JSON has no representation for these
                    out.push_str("null");
                } else {
                    out.push_str(&format!("{:?}", f));
                }
            }
            Value::String(s) => {
                out.push('"');
                escape_json_string(s, out);
                out.push('"');
            }
            Value::Array(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    item.write_json(out);
                }
                out.push(']');
            }
            Value::Object(map) => {
                out.push('{');
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push(',');
                    }
                    out.push('"');
                    escape_json_string(key, out);
                    out.push_str("\":");
                    value.write_json(out);
                }
                out.push('}');
            }
        }
    }
}

fn escape_json_string(s: &str, out: &mut String) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
}

/// Materialize a number lexeme: integer parse first, then float; a lexeme
/// that is neither is kept as a string.
pub(crate) fn parse_number(lexeme: &str) -> Value {
    if let Ok(n) = lexeme.parse::<i64>() {
        Value::Integer(n)
    } else if let Ok(f) = lexeme.parse::<f64>() {
        Value::Float(f)
    } else {
        Value::String(lexeme.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_materialization() {
        assert_eq!(parse_number("42"), Value::Integer(42));
        assert_eq!(parse_number("-7"), Value::Integer(-7));
        assert_eq!(parse_number("8.95"), Value::Float(8.95));
        assert_eq!(parse_number("1e3"), Value::Float(1000.0));
        assert_eq!(parse_number("nope"), Value::String("nope".into()));
    }

    #[test]
    fn test_float_keeps_decimal_point() {
        assert_eq!(Value::Float(5.0).to_json(), "5.0");
        assert_eq!(Value::Integer(5).to_json(), "5");
    }

    #[test]
    fn test_to_json_escaping() {
        assert_eq!(
            Value::String("a\"b\\c\nd".into()).to_json(),
            r#""a\"b\\c\nd""#
        );
        // Non-ASCII text passes through unescaped
        assert_eq!(Value::String("史记".into()).to_json(), "\"史记\"");
    }

    #[test]
    fn test_to_json_containers() {
        let mut map = IndexMap::new();
        map.insert("a".to_string(), Value::Integer(1));
        map.insert("b".to_string(), Value::Array(vec![Value::Bool(true), Value::Null]));
        assert_eq!(
            Value::Object(map).to_json(),
            r#"{"a":1,"b":[true,null]}"#
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
        assert_eq!(Value::Float(2.5).as_i64(), None);
        assert_eq!(Value::String("x".into()).as_str(), Some("x"));
        assert!(Value::Null.is_null());
        assert_eq!(Value::Bool(true).type_name(), "boolean");
    }
}
