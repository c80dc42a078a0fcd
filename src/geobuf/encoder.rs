use crate::conversions::{geometry_type_from_str, json_kind};
use crate::error::{GeobufError, Result};
use crate::proto::{self, DataType, GeometryType, IdType};
use crate::value::encode_value;
use prost::Message;
use serde_json::{Map, Value};

/// Encode a GeoJSON-shaped tree into geobuf bytes.
///
/// `precision` is the number of decimal digits retained for coordinates; the
/// round trip is lossy to that precision. The root object's `type` member
/// selects the body: `"FeatureCollection"`, `"Feature"`, or any geometry type
/// name (case-insensitive).
pub fn to_geobuf(root: &Value, precision: u32) -> Result<Vec<u8>> {
    let data = Encoder::new(precision).encode(root)?;
    Ok(data.encode_to_vec())
}

/// Per-call encode state: the key table, the discovered dimension, and the
/// quantization multiplier. Never shared between calls, so concurrent encodes
/// cannot corrupt each other's key indices.
struct Encoder {
    keys: Vec<String>,
    dim: u32,
    precision: u32,
    multiplier: f64,
}

impl Encoder {
    fn new(precision: u32) -> Self {
        Self {
            keys: Vec::new(),
            dim: 0,
            precision,
            multiplier: 10f64.powi(precision as i32),
        }
    }

    fn encode(mut self, root: &Value) -> Result<proto::Data> {
        let object = as_object(root, "the document root")?;
        let type_str = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or(GeobufError::MissingType)?;
        let data_type = if type_str.eq_ignore_ascii_case("FEATURECOLLECTION") {
            DataType::FeatureCollection(self.feature_collection(object)?)
        } else if type_str.eq_ignore_ascii_case("FEATURE") {
            DataType::Feature(self.feature(object)?)
        } else {
            // Geometry roots carry their concrete type ("Point", ...); the
            // geometry parser rejects anything unrecognized.
            DataType::Geometry(self.geometry(object)?)
        };
        Ok(proto::Data {
            keys: self.keys,
            // The dimension is only known after the walk; it is always
            // written, staying 0 when the document had no coordinates.
            dimensions: Some(self.dim),
            precision: Some(self.precision),
            data_type: Some(data_type),
        })
    }

    fn feature_collection(&mut self, object: &Map<String, Value>) -> Result<proto::FeatureCollection> {
        let mut out = proto::FeatureCollection::default();
        if let Some(features) = object.get("features").and_then(Value::as_array) {
            for feature in features {
                out.features
                    .push(self.feature(as_object(feature, "a feature")?)?);
            }
        }
        for (position, (key, value)) in object.iter().enumerate() {
            if key == "features" || key == "type" {
                continue;
            }
            out.custom_properties.push(self.key_index(key));
            out.custom_properties.push(position as u32);
            out.values.push(encode_value(value)?);
        }
        Ok(out)
    }

    fn feature(&mut self, object: &Map<String, Value>) -> Result<proto::Feature> {
        let mut out = proto::Feature::default();
        let geometry = object.get("geometry").ok_or(GeobufError::MissingGeometry)?;
        out.geometry = Some(self.geometry(as_object(geometry, "a geometry")?)?);
        if let Some(properties) = object.get("properties").and_then(Value::as_object) {
            for (slot, (key, value)) in properties.iter().enumerate() {
                out.properties.push(self.key_index(key));
                out.properties.push(slot as u32);
                out.values.push(encode_value(value)?);
            }
        }
        if let Some(id) = object.get("id") {
            out.id_type = Some(feature_id(id)?);
        }
        for (position, (key, value)) in object.iter().enumerate() {
            if key == "geometry" || key == "type" || key == "properties" || key == "id" {
                continue;
            }
            out.custom_properties.push(self.key_index(key));
            out.custom_properties.push(position as u32);
            out.values.push(encode_value(value)?);
        }
        Ok(out)
    }

    fn geometry(&mut self, object: &Map<String, Value>) -> Result<proto::Geometry> {
        let type_str = object
            .get("type")
            .and_then(Value::as_str)
            .ok_or(GeobufError::MissingType)?;
        let geometry_type = geometry_type_from_str(type_str)?;
        let mut out = proto::Geometry {
            r#type: geometry_type as i32,
            ..Default::default()
        };
        for (position, (key, value)) in object.iter().enumerate() {
            if key == "type" || key == "coordinates" || key == "geometries" {
                continue;
            }
            out.custom_properties.push(self.key_index(key));
            out.custom_properties.push(position as u32);
            out.values.push(encode_value(value)?);
        }
        if geometry_type == GeometryType::GeometryCollection {
            let children = object
                .get("geometries")
                .and_then(Value::as_array)
                .ok_or(GeobufError::MissingGeometries)?;
            for child in children {
                out.geometries
                    .push(self.geometry(as_object(child, "a geometry")?)?);
            }
            return Ok(out);
        }
        let coordinates = object
            .get("coordinates")
            .ok_or(GeobufError::MissingCoordinates)?;
        match geometry_type {
            GeometryType::Point => self.coords_depth0(coordinates, &mut out)?,
            GeometryType::MultiPoint | GeometryType::LineString => {
                self.coords_depth1(coordinates, &mut out, false)?;
            }
            GeometryType::MultiLineString => self.coords_depth2(coordinates, &mut out, false)?,
            GeometryType::Polygon => self.coords_depth2(coordinates, &mut out, true)?,
            GeometryType::MultiPolygon => self.coords_depth3(coordinates, &mut out)?,
            GeometryType::GeometryCollection => unreachable!(),
        }
        Ok(out)
    }

    /// Depth 0: a single tuple, quantized with no delta.
    fn coords_depth0(&mut self, coordinates: &Value, out: &mut proto::Geometry) -> Result<()> {
        let tuple = as_tuple(coordinates)?;
        self.check_dim(tuple.len())?;
        for component in tuple {
            out.coords.push(self.quantize(component)?);
        }
        Ok(())
    }

    /// Depth 1: a run of tuples, each stored as the delta from the previous
    /// quantized tuple. The accumulator starts at zero, so the caller gets a
    /// fresh delta chain per group. When `closed`, the final (duplicate
    /// closing) tuple is dropped. Returns the number of tuples written.
    fn coords_depth1(
        &mut self,
        coordinates: &Value,
        out: &mut proto::Geometry,
        closed: bool,
    ) -> Result<u32> {
        let tuples = as_array(coordinates)?;
        let take = tuples.len().saturating_sub(closed as usize);
        let mut previous: Vec<i64> = Vec::new();
        for tuple in &tuples[..take] {
            let tuple = as_tuple(tuple)?;
            self.check_dim(tuple.len())?;
            if previous.is_empty() {
                previous = vec![0; self.dim as usize];
            }
            for (j, component) in tuple.iter().enumerate() {
                let quantized = self.quantize(component)?;
                out.coords.push(quantized - previous[j]);
                previous[j] = quantized;
            }
        }
        Ok(take as u32)
    }

    /// Depth 2: one lengths entry per group, each group a fresh delta chain.
    fn coords_depth2(
        &mut self,
        coordinates: &Value,
        out: &mut proto::Geometry,
        closed: bool,
    ) -> Result<()> {
        for group in as_array(coordinates)? {
            let len = self.coords_depth1(group, out, closed)?;
            out.lengths.push(len);
        }
        Ok(())
    }

    /// Depth 3: lengths carries a flattened pre-order traversal,
    /// `[setCount, set0.groupCount, set0.group0.len, ..., set1.groupCount, ...]`.
    fn coords_depth3(&mut self, coordinates: &Value, out: &mut proto::Geometry) -> Result<()> {
        let sets = as_array(coordinates)?;
        out.lengths.push(sets.len() as u32);
        for set in sets {
            let groups = as_array(set)?;
            out.lengths.push(groups.len() as u32);
            for group in groups {
                let len = self.coords_depth1(group, out, true)?;
                out.lengths.push(len);
            }
        }
        Ok(())
    }

    /// The first tuple anywhere in the document fixes the dimension; every
    /// later tuple must match it.
    fn check_dim(&mut self, arity: usize) -> Result<()> {
        let arity = arity as u32;
        if self.dim == 0 {
            self.dim = arity;
        } else if self.dim != arity {
            return Err(GeobufError::UnequalDimensions {
                expected: self.dim,
                got: arity,
            });
        }
        Ok(())
    }

    /// Ties round away from zero (`f64::round`).
    fn quantize(&self, component: &Value) -> Result<i64> {
        let number = component.as_f64().ok_or(GeobufError::InvalidCoordinates(
            "coordinate component is not a number",
        ))?;
        Ok((number * self.multiplier).round() as i64)
    }

    /// Intern a property key, returning its first-use index.
    fn key_index(&mut self, name: &str) -> u32 {
        match self.keys.iter().position(|key| key == name) {
            Some(index) => index as u32,
            None => {
                self.keys.push(name.to_string());
                (self.keys.len() - 1) as u32
            }
        }
    }
}

fn feature_id(id: &Value) -> Result<IdType> {
    match id {
        Value::String(s) => Ok(IdType::Id(s.clone())),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(IdType::IntId(i))
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                if f == f.round() {
                    Ok(IdType::IntId(f as i64))
                } else {
                    Err(GeobufError::NonIntegerId(f))
                }
            }
        }
        other => Err(GeobufError::InvalidIdType(json_kind(other))),
    }
}

fn as_object<'a>(value: &'a Value, context: &'static str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or(GeobufError::ExpectedObject(context))
}

fn as_array(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or(GeobufError::InvalidCoordinates(
        "coordinates must be an array",
    ))
}

fn as_tuple(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or(GeobufError::InvalidCoordinates(
        "coordinate tuple must be an array",
    ))
}

#[cfg(test)]
mod tests {
    use super::Encoder;
    use crate::error::GeobufError;
    use crate::proto::{DataType, GeometryType, IdType, ValueType};
    use serde_json::json;

    fn encode_geometry(input: serde_json::Value, precision: u32) -> crate::proto::Geometry {
        let data = Encoder::new(precision)
            .encode(&input)
            .expect("encode geometry");
        match data.data_type.expect("body set") {
            DataType::Geometry(geometry) => geometry,
            other_body => panic!("unexpected body: {other_body:?}"),
        }
    }

    #[test]
    fn point_quantizes_to_configured_precision() {
        let geometry = encode_geometry(
            json!({ "type": "Point", "coordinates": [1.23456789, 2.3456789] }),
            5,
        );
        assert_eq!(geometry.coords, vec![123457, 234568]);
        assert!(geometry.lengths.is_empty());
    }

    #[test]
    fn linestring_is_delta_coded() {
        let geometry = encode_geometry(
            json!({
                "type": "LineString",
                "coordinates": [[1.0, 1.0], [1.5, 0.5], [1.5, 2.0]]
            }),
            1,
        );
        assert_eq!(geometry.coords, vec![10, 10, 5, -5, 0, 15]);
    }

    #[test]
    fn closed_polygon_ring_drops_duplicate_point() {
        let geometry = encode_geometry(
            json!({
                "type": "Polygon",
                "coordinates": [
                    [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]]
                ]
            }),
            0,
        );
        assert_eq!(geometry.lengths, vec![3]);
        assert_eq!(geometry.coords, vec![0, 0, 1, 0, 0, 1]);
    }

    #[test]
    fn multipolygon_lengths_flatten_in_preorder() {
        // Set 0: one ring of 4 points; set 1: rings of 4 and 5 points (all
        // rings carry the closing duplicate, which is dropped on the wire).
        let ring4 = json!([[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]);
        let ring5 = json!([
            [5.0, 5.0],
            [6.0, 5.0],
            [6.0, 6.0],
            [5.5, 6.5],
            [5.0, 6.0],
            [5.0, 5.0]
        ]);
        let geometry = encode_geometry(
            json!({
                "type": "MultiPolygon",
                "coordinates": [[ring4], [ring4, ring5]]
            }),
            1,
        );
        assert_eq!(geometry.lengths, vec![2, 1, 4, 2, 4, 5]);
        assert_eq!(geometry.coords.len(), (4 + 4 + 5) * 2);
    }

    #[test]
    fn key_table_is_deterministic() {
        let input = json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [0.0, 0.0] },
            "properties": { "name": "a", "rank": 1 },
            "note": "extra"
        });
        let first = Encoder::new(6).encode(&input).expect("first encode");
        let second = Encoder::new(6).encode(&input).expect("second encode");
        assert_eq!(first.keys, vec!["name", "rank", "note"]);
        assert_eq!(first.keys, second.keys);
        assert_eq!(first, second);
    }

    #[test]
    fn coordinate_less_document_still_writes_dimension() {
        let data = Encoder::new(6)
            .encode(&json!({ "type": "FeatureCollection", "features": [] }))
            .expect("encode collection");
        assert_eq!(data.dimensions, Some(0));
    }

    #[test]
    fn mixed_dimensions_fail() {
        let err = Encoder::new(6)
            .encode(&json!({
                "type": "LineString",
                "coordinates": [[0.0, 0.0], [1.0, 1.0, 1.0]]
            }))
            .expect_err("mixed dimensions should fail");
        assert!(matches!(
            err,
            GeobufError::UnequalDimensions {
                expected: 2,
                got: 3
            }
        ));
    }

    #[test]
    fn three_dimensional_coordinates_are_supported() {
        let geometry = encode_geometry(
            json!({
                "type": "MultiPoint",
                "coordinates": [[1.0, 2.0, 3.0], [1.0, 2.0, 4.0]]
            }),
            0,
        );
        assert_eq!(geometry.coords, vec![1, 2, 3, 0, 0, 1]);
    }

    #[test]
    fn integral_float_id_coerces_to_int_id() {
        let input = json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [0.0, 0.0] },
            "id": 5.0
        });
        let data = Encoder::new(6).encode(&input).expect("encode feature");
        match data.data_type.expect("body set") {
            DataType::Feature(feature) => {
                assert_eq!(feature.id_type, Some(IdType::IntId(5)));
            }
            other_body => panic!("unexpected body: {other_body:?}"),
        }
    }

    #[test]
    fn fractional_id_fails() {
        let err = Encoder::new(6)
            .encode(&json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [0.0, 0.0] },
                "id": 5.5
            }))
            .expect_err("fractional id should fail");
        assert!(matches!(err, GeobufError::NonIntegerId(_)));
    }

    #[test]
    fn non_scalar_id_fails() {
        let err = Encoder::new(6)
            .encode(&json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [0.0, 0.0] },
                "id": [1, 2]
            }))
            .expect_err("array id should fail");
        assert!(matches!(err, GeobufError::InvalidIdType("array")));
    }

    #[test]
    fn feature_without_geometry_fails() {
        let err = Encoder::new(6)
            .encode(&json!({ "type": "Feature", "properties": {} }))
            .expect_err("missing geometry should fail");
        assert!(matches!(err, GeobufError::MissingGeometry));
    }

    #[test]
    fn geometry_custom_properties_record_field_positions() {
        let geometry = encode_geometry(
            json!({
                "type": "Point",
                "coordinates": [0.0, 0.0],
                "crs": "EPSG:4326"
            }),
            6,
        );
        // Key index 0, field position 2 (after "type" and "coordinates").
        assert_eq!(geometry.custom_properties, vec![0, 2]);
        assert_eq!(
            geometry.values[0].value_type,
            Some(ValueType::StringValue("EPSG:4326".to_string()))
        );
    }

    #[test]
    fn geometry_collection_rejects_coordinate_table() {
        let data = Encoder::new(6)
            .encode(&json!({
                "type": "GeometryCollection",
                "geometries": [
                    { "type": "Point", "coordinates": [1.0, 2.0] }
                ]
            }))
            .expect("encode collection");
        match data.data_type.expect("body set") {
            DataType::Geometry(geometry) => {
                assert_eq!(geometry.r#type, GeometryType::GeometryCollection as i32);
                assert!(geometry.coords.is_empty());
                assert!(geometry.lengths.is_empty());
                assert_eq!(geometry.geometries.len(), 1);
            }
            other_body => panic!("unexpected body: {other_body:?}"),
        }
    }

    #[test]
    fn root_without_recognized_type_fails() {
        let err = Encoder::new(6)
            .encode(&json!({ "type": "Landmark" }))
            .expect_err("unknown root type should fail");
        assert!(matches!(err, GeobufError::UnsupportedType(_)));
    }
}
