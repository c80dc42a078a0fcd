//! Conversion between host JSON property values and the tagged wire `Value`.
//!
//! Scalars map to dedicated tags; everything else (arrays, objects, null)
//! falls back to a JSON text tag, so round-trip fidelity for that branch is
//! only as good as the JSON representation of the input.

use crate::error::{GeobufError, Result};
use crate::proto::{self, ValueType};

/// Integers at or above this magnitude decode as doubles rather than as
/// native integer numbers (matching the 32-bit cutoff used by other readers).
const INT_DECODE_BOUND: u64 = 1 << 31;

pub(crate) fn encode_value(input: &serde_json::Value) -> Result<proto::Value> {
    let value_type = match input {
        serde_json::Value::Bool(b) => ValueType::BoolValue(*b),
        serde_json::Value::Number(n) => {
            // The tag reflects the input's declared type: 5.0 stays a double
            // even though it is numerically integral.
            if let Some(i) = n.as_i64() {
                if i < 0 {
                    ValueType::NegIntValue(i.unsigned_abs())
                } else {
                    ValueType::PosIntValue(i as u64)
                }
            } else if let Some(u) = n.as_u64() {
                ValueType::PosIntValue(u)
            } else {
                ValueType::DoubleValue(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_json::Value::String(s) => ValueType::StringValue(s.clone()),
        other => ValueType::JsonValue(serde_json::to_string(other)?),
    };
    Ok(proto::Value {
        value_type: Some(value_type),
    })
}

pub(crate) fn decode_value(value: &proto::Value) -> Result<serde_json::Value> {
    let value_type = value.value_type.as_ref().ok_or(GeobufError::EmptyValue)?;
    Ok(match value_type {
        ValueType::StringValue(s) => serde_json::Value::String(s.clone()),
        ValueType::DoubleValue(d) => serde_json::Value::from(*d),
        ValueType::PosIntValue(n) => {
            if *n < INT_DECODE_BOUND {
                serde_json::Value::from(*n as i64)
            } else {
                serde_json::Value::from(*n as f64)
            }
        }
        ValueType::NegIntValue(n) => {
            if *n < INT_DECODE_BOUND {
                serde_json::Value::from(-(*n as i64))
            } else {
                serde_json::Value::from(-(*n as f64))
            }
        }
        // Booleans come back as 0/1 numbers. Asymmetric, but this is what
        // existing geobuf consumers expect, so it stays.
        ValueType::BoolValue(b) => serde_json::Value::from(*b as i64),
        ValueType::JsonValue(s) => serde_json::from_str(s)?,
    })
}

#[cfg(test)]
mod tests {
    use super::{decode_value, encode_value};
    use crate::error::GeobufError;
    use crate::proto::{self, ValueType};
    use serde_json::json;

    fn tag_of(input: serde_json::Value) -> ValueType {
        encode_value(&input)
            .expect("encode value")
            .value_type
            .expect("tag set")
    }

    #[test]
    fn scalars_map_to_dedicated_tags() {
        assert_eq!(tag_of(json!(true)), ValueType::BoolValue(true));
        assert_eq!(tag_of(json!(7)), ValueType::PosIntValue(7));
        assert_eq!(tag_of(json!(-7)), ValueType::NegIntValue(7));
        assert_eq!(
            tag_of(json!("name")),
            ValueType::StringValue("name".to_string())
        );
    }

    #[test]
    fn integral_double_keeps_double_tag() {
        // 5.0 is declared floating, so the tag is double, not pos_int.
        assert_eq!(tag_of(json!(5.0)), ValueType::DoubleValue(5.0));
    }

    #[test]
    fn compound_values_use_json_fallback() {
        assert_eq!(
            tag_of(json!([1, 2, 3])),
            ValueType::JsonValue("[1,2,3]".to_string())
        );
        let decoded = decode_value(&proto::Value {
            value_type: Some(ValueType::JsonValue("{\"a\":[1,2]}".to_string())),
        })
        .expect("decode json value");
        assert_eq!(decoded, json!({"a": [1, 2]}));
    }

    #[test]
    fn bool_decodes_as_number() {
        let decoded = decode_value(&proto::Value {
            value_type: Some(ValueType::BoolValue(true)),
        })
        .expect("decode bool");
        assert_eq!(decoded, json!(1));
    }

    #[test]
    fn small_magnitudes_decode_as_integers() {
        let decoded = decode_value(&proto::Value {
            value_type: Some(ValueType::NegIntValue(42)),
        })
        .expect("decode neg int");
        assert_eq!(decoded, json!(-42));
    }

    #[test]
    fn large_magnitudes_widen_to_double() {
        let decoded = decode_value(&proto::Value {
            value_type: Some(ValueType::PosIntValue(1 << 32)),
        })
        .expect("decode large int");
        assert_eq!(decoded, json!((1u64 << 32) as f64));
    }

    #[test]
    fn untagged_value_is_an_error() {
        let err = decode_value(&proto::Value { value_type: None })
            .expect_err("untagged value should fail");
        assert!(matches!(err, GeobufError::EmptyValue));
    }
}
