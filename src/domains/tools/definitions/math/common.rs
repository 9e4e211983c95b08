//! Common helpers shared across math tools.
//!
//! Argument decoding follows lax numeric coercion: a JSON number is taken
//! as-is, a boolean becomes `1.0` or `0.0`, and a JSON string is accepted when
//! its trimmed contents parse as a float. Everything else is rejected before
//! the tool runs.

use serde::{Deserialize, Deserializer, de};

#[derive(Deserialize)]
#[serde(untagged)]
enum LaxNumber {
    Number(f64),
    Flag(bool),
    Text(String),
}

/// Deserialize an `f64` from either a JSON number or a numeric string.
pub fn deserialize_lax_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match LaxNumber::deserialize(deserializer) {
        Ok(LaxNumber::Number(value)) => Ok(value),
        Ok(LaxNumber::Flag(flag)) => Ok(if flag { 1.0 } else { 0.0 }),
        Ok(LaxNumber::Text(text)) => text.trim().parse::<f64>().map_err(|_| {
            de::Error::custom(format!("input should be a valid number, got {:?}", text))
        }),
        Err(_) => Err(de::Error::custom("input should be a valid number")),
    }
}

/// Render a float the way it appears in JSON (`5.0`, `-0.5`, `1e300`).
///
/// Non-finite values have no JSON form and fall back to Rust's formatting.
pub fn format_number(value: f64) -> String {
    serde_json::Number::from_f64(value)
        .map(|n| n.to_string())
        .unwrap_or_else(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "deserialize_lax_f64")]
        value: f64,
    }

    fn decode(value: serde_json::Value) -> Result<f64, serde_json::Error> {
        serde_json::from_value::<Holder>(serde_json::json!({ "value": value })).map(|p| p.value)
    }

    #[test]
    fn test_accepts_numbers() {
        assert_eq!(decode(serde_json::json!(2)).unwrap(), 2.0);
        assert_eq!(decode(serde_json::json!(-1.5)).unwrap(), -1.5);
    }

    #[test]
    fn test_accepts_numeric_strings() {
        assert_eq!(decode(serde_json::json!("3")).unwrap(), 3.0);
        assert_eq!(decode(serde_json::json!(" 0.25 ")).unwrap(), 0.25);
    }

    #[test]
    fn test_accepts_booleans() {
        assert_eq!(decode(serde_json::json!(true)).unwrap(), 1.0);
        assert_eq!(decode(serde_json::json!(false)).unwrap(), 0.0);
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert!(decode(serde_json::json!("three")).is_err());
        assert!(decode(serde_json::json!("true")).is_err());
        assert!(decode(serde_json::json!(null)).is_err());
        assert!(decode(serde_json::json!([1])).is_err());
        assert!(decode(serde_json::json!({ "nested": 1 })).is_err());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5.0), "5.0");
        assert_eq!(format_number(0.0), "0.0");
        assert_eq!(format_number(-2.5), "-2.5");
        assert_eq!(format_number(f64::INFINITY), "inf");
    }
}
