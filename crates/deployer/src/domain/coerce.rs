//! Turns raw operator input into typed constructor values.
//!
//! Coercion is total: malformed input never fails, it degrades to the zero
//! value of the requested type (empty array, zero, `false`, empty string).
//! Whether a value is acceptable for its ABI type is decided later by the
//! encoder.

use num::{BigInt, Num, Zero};

/// Inputs that count as `true` for `bool` fields, after trimming and
/// lower-casing.
const TRUTHY: [&str; 4] = ["true", "1", "yes", "on"];

/// A constructor argument shaped after its ABI type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Value {
    Array(Vec<Value>),
    Int(BigInt),
    Bool(bool),
    /// `0x` prefixed hexadecimal string, or empty.
    Bytes(String),
    /// Passed to the encoder as is.
    Text(String),
}

/// Coerces `raw` into a value of ABI type `ty`. An absent value is treated
/// like an empty one.
///
/// Dynamic (`T[]`) and fixed-size (`T[N]`) arrays coerce alike. The length of
/// a fixed-size array is checked by the encoder.
pub fn coerce(ty: &str, raw: Option<&str>) -> Value {
    let raw = raw.unwrap_or_default();

    if let Some(element) = array_element(ty) {
        return Value::Array(
            elements(raw)
                .iter()
                .map(|element_raw| coerce(element, Some(element_raw)))
                .collect(),
        );
    }
    if ty.starts_with("uint") || ty.starts_with("int") {
        return Value::Int(integer(raw).unwrap_or_else(BigInt::zero));
    }
    if ty == "bool" {
        let normalized = raw.trim().to_lowercase();
        return Value::Bool(TRUTHY.contains(&normalized.as_str()));
    }
    if ty.starts_with("bytes") {
        return Value::Bytes(bytes(raw));
    }
    Value::Text(raw.trim().to_string())
}

/// The element type of `T[]` or `T[N]`.
fn array_element(ty: &str) -> Option<&str> {
    let (element, size) = ty.strip_suffix(']')?.rsplit_once('[')?;
    size.chars()
        .all(|c| c.is_ascii_digit())
        .then_some(element)
}

/// Splits array input. A JSON array is used element-wise, anything else is
/// split on newlines and commas.
fn elements(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    if let Ok(serde_json::Value::Array(items)) = serde_json::from_str(raw) {
        return items.into_iter().map(json_element).collect();
    }
    raw.split(['\n', ','])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

fn json_element(item: serde_json::Value) -> String {
    match item {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(string) => string,
        // Nested arrays and objects are handed down as JSON so that nested
        // array types can be parsed again one level deeper.
        other => other.to_string(),
    }
}

/// Parses decimal literals with an optional sign, or unsigned `0x`, `0o` and
/// `0b` prefixed literals.
fn integer(raw: &str) -> Option<BigInt> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Some(BigInt::zero());
    }

    let prefixed = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)]
        .into_iter()
        .find_map(|(prefix, radix)| Some((trimmed.strip_prefix(prefix)?, radix)));
    let (digits, radix) = match prefixed {
        Some(prefixed) => prefixed,
        None => (trimmed.strip_prefix('+').unwrap_or(trimmed), 10),
    };
    let unsigned = if radix == 10 {
        digits.strip_prefix('-').unwrap_or(digits)
    } else {
        digits
    };
    if unsigned.is_empty() || !unsigned.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    BigInt::from_str_radix(digits, radix).ok()
}

fn bytes(raw: &str) -> String {
    if raw.is_empty() || raw.starts_with("0x") {
        return raw.to_string();
    }
    const_hex::encode_prefixed(raw.as_bytes())
}
