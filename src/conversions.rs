use crate::error::GeobufError;
use crate::proto::GeometryType;

#[inline]
pub(crate) fn geometry_type_to_str(geometry_type: GeometryType) -> &'static str {
    match geometry_type {
        GeometryType::Point => "Point",
        GeometryType::MultiPoint => "MultiPoint",
        GeometryType::LineString => "LineString",
        GeometryType::MultiLineString => "MultiLineString",
        GeometryType::Polygon => "Polygon",
        GeometryType::MultiPolygon => "MultiPolygon",
        GeometryType::GeometryCollection => "GeometryCollection",
    }
}

#[inline]
pub(crate) fn geometry_type_from_str(
    geometry_type_str: &str,
) -> Result<GeometryType, GeobufError> {
    let s = geometry_type_str;
    if s.eq_ignore_ascii_case("POINT") {
        Ok(GeometryType::Point)
    } else if s.eq_ignore_ascii_case("MULTIPOINT") {
        Ok(GeometryType::MultiPoint)
    } else if s.eq_ignore_ascii_case("LINESTRING") {
        Ok(GeometryType::LineString)
    } else if s.eq_ignore_ascii_case("MULTILINESTRING") {
        Ok(GeometryType::MultiLineString)
    } else if s.eq_ignore_ascii_case("POLYGON") {
        Ok(GeometryType::Polygon)
    } else if s.eq_ignore_ascii_case("MULTIPOLYGON") {
        Ok(GeometryType::MultiPolygon)
    } else if s.eq_ignore_ascii_case("GEOMETRYCOLLECTION") {
        Ok(GeometryType::GeometryCollection)
    } else {
        Err(GeobufError::UnsupportedType(
            geometry_type_str.to_string(),
        ))
    }
}

/// Name of a JSON value's kind, for error messages.
#[inline]
pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::{geometry_type_from_str, geometry_type_to_str};
    use crate::error::GeobufError;
    use crate::proto::GeometryType;

    #[test]
    fn geometry_type_parse_is_case_insensitive() {
        for s in ["multipolygon", "MultiPolygon", "MULTIPOLYGON"] {
            assert_eq!(
                geometry_type_from_str(s).expect("valid type"),
                GeometryType::MultiPolygon
            );
        }
    }

    #[test]
    fn geometry_type_roundtrips_through_str() {
        for ty in [
            GeometryType::Point,
            GeometryType::MultiPoint,
            GeometryType::LineString,
            GeometryType::MultiLineString,
            GeometryType::Polygon,
            GeometryType::MultiPolygon,
            GeometryType::GeometryCollection,
        ] {
            assert_eq!(
                geometry_type_from_str(geometry_type_to_str(ty)).expect("valid type"),
                ty
            );
        }
    }

    #[test]
    fn geometry_type_rejects_unknown_string() {
        let err = geometry_type_from_str("Circle").expect_err("unknown type should fail");
        match err {
            GeobufError::UnsupportedType(ty) => assert_eq!(ty, "Circle"),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
