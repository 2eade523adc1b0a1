//! Lenient coercion of loosely typed JSON request fields
//!
//! Desktop clients send ids, versions and keys as whatever JSON type they
//! happen to hold. These helpers turn such values into the numeric or string
//! form the API works with.

use serde_json::Value;

/// Numeric reading of a JSON value
///
/// `null` and absent values yield `None`. Booleans count as 0/1, strings are
/// trimmed and parsed (the empty string is 0), arrays and objects are not
/// numbers. The result may be non-finite.
pub fn json_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Null => None,
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Integer id from a JSON value, if it denotes a finite whole number
pub fn json_integer(value: Option<&Value>) -> Option<i64> {
    let n = json_number(value)?;
    if n.is_finite() && n.fract() == 0.0 && n.abs() <= i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

/// Text reading of a JSON scalar
///
/// Strings are used as-is, numbers and booleans are rendered, everything
/// else reads as the empty string.
pub fn json_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// True for values a client would consider "not provided"
pub fn is_falsy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map_or(true, |f| f == 0.0 || f.is_nan()),
        Some(Value::Array(_)) | Some(Value::Object(_)) => false,
    }
}
