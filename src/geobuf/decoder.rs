use crate::conversions::geometry_type_to_str;
use crate::error::{GeobufError, Result};
use crate::proto::{self, DataType, GeometryType, IdType};
use crate::value::decode_value;
use prost::Message;
use serde_json::{Map, Value};

/// Decode geobuf bytes back into a GeoJSON-shaped tree.
///
/// The header (precision, dimension, key table) is read first so the
/// coordinate and value codecs are configured before the body is walked.
pub fn from_geobuf(bytes: &[u8]) -> Result<Value> {
    let data = proto::Data::decode(bytes)?;
    Decoder::new(&data).decode(&data)
}

/// Per-call decode state, mirroring the encoder's.
struct Decoder {
    keys: Vec<String>,
    dim: usize,
    multiplier: f64,
}

impl Decoder {
    fn new(data: &proto::Data) -> Self {
        let dim = match data.dimensions {
            Some(dim) if dim > 0 => dim as usize,
            // Schema default; also guards the degenerate zero on the wire.
            _ => 2,
        };
        Self {
            keys: data.keys.clone(),
            dim,
            multiplier: 10f64.powi(data.precision.unwrap_or(6) as i32),
        }
    }

    fn decode(&self, data: &proto::Data) -> Result<Value> {
        match data.data_type.as_ref().ok_or(GeobufError::NoDataTypeSet)? {
            DataType::FeatureCollection(collection) => self.feature_collection(collection),
            DataType::Feature(feature) => self.feature(feature),
            DataType::Geometry(geometry) => self.geometry(geometry),
        }
    }

    fn feature_collection(&self, collection: &proto::FeatureCollection) -> Result<Value> {
        let mut out = Map::new();
        out.insert("type".to_string(), Value::from("FeatureCollection"));
        let features = collection
            .features
            .iter()
            .map(|feature| self.feature(feature))
            .collect::<Result<Vec<_>>>()?;
        out.insert("features".to_string(), Value::Array(features));
        for i in 0..collection.custom_properties.len() / 2 {
            let key = self.key(collection.custom_properties[i * 2])?.to_string();
            let value = collection.values.get(i).ok_or(GeobufError::EmptyValue)?;
            out.insert(key, decode_value(value)?);
        }
        Ok(Value::Object(out))
    }

    fn feature(&self, feature: &proto::Feature) -> Result<Value> {
        let mut out = Map::new();
        out.insert("type".to_string(), Value::from("Feature"));
        if let Some(geometry) = &feature.geometry {
            out.insert("geometry".to_string(), self.geometry(geometry)?);
        }
        match &feature.id_type {
            Some(IdType::Id(id)) => {
                out.insert("id".to_string(), Value::from(id.clone()));
            }
            Some(IdType::IntId(id)) => {
                let id = if *id < 1i64 << 31 {
                    Value::from(*id)
                } else {
                    Value::from(*id as f64)
                };
                out.insert("id".to_string(), id);
            }
            None => {}
        }
        let property_pairs = feature.properties.len() / 2;
        if property_pairs > 0 {
            let mut properties = Map::new();
            for i in 0..property_pairs {
                let key = self.key(feature.properties[i * 2])?.to_string();
                let value = feature.values.get(i).ok_or(GeobufError::EmptyValue)?;
                properties.insert(key, decode_value(value)?);
            }
            out.insert("properties".to_string(), Value::Object(properties));
        }
        // Custom property values continue after the properties slots.
        for i in 0..feature.custom_properties.len() / 2 {
            let key = self.key(feature.custom_properties[i * 2])?.to_string();
            let value = feature
                .values
                .get(property_pairs + i)
                .ok_or(GeobufError::EmptyValue)?;
            out.insert(key, decode_value(value)?);
        }
        Ok(Value::Object(out))
    }

    fn geometry(&self, geometry: &proto::Geometry) -> Result<Value> {
        let geometry_type = GeometryType::try_from(geometry.r#type)
            .map_err(|_| GeobufError::UnsupportedType(geometry.r#type.to_string()))?;
        let mut out = Map::new();
        out.insert(
            "type".to_string(),
            Value::from(geometry_type_to_str(geometry_type)),
        );
        for i in 0..geometry.custom_properties.len() / 2 {
            let key = self.key(geometry.custom_properties[i * 2])?.to_string();
            let value = geometry.values.get(i).ok_or(GeobufError::EmptyValue)?;
            out.insert(key, decode_value(value)?);
        }
        if !geometry.geometries.is_empty() {
            let children = geometry
                .geometries
                .iter()
                .map(|child| self.geometry(child))
                .collect::<Result<Vec<_>>>()?;
            out.insert("geometries".to_string(), Value::Array(children));
        }
        if !geometry.coords.is_empty() {
            let coordinates = match geometry_type {
                GeometryType::Point => Some(self.coords_depth0(&geometry.coords)),
                GeometryType::MultiPoint | GeometryType::LineString => {
                    let count = geometry.coords.len() / self.dim;
                    Some(self.read_group(&geometry.coords, 0, count, false)?)
                }
                GeometryType::MultiLineString => Some(self.coords_depth2(geometry, false)?),
                GeometryType::Polygon => Some(self.coords_depth2(geometry, true)?),
                GeometryType::MultiPolygon => Some(self.coords_depth3(geometry)?),
                // Collections own child geometries; stray coords are ignored.
                GeometryType::GeometryCollection => None,
            };
            if let Some(coordinates) = coordinates {
                out.insert("coordinates".to_string(), coordinates);
            }
        }
        Ok(Value::Object(out))
    }

    /// Depth 0: raw quantized components, no delta to undo.
    fn coords_depth0(&self, coords: &[i64]) -> Value {
        Value::Array(
            coords
                .iter()
                .map(|&component| Value::from(component as f64 / self.multiplier))
                .collect(),
        )
    }

    /// Depth 2: one group per lengths entry; an absent lengths table means a
    /// single group spanning the whole coordinate buffer.
    fn coords_depth2(&self, geometry: &proto::Geometry, closed: bool) -> Result<Value> {
        let coords = &geometry.coords;
        if geometry.lengths.is_empty() {
            let count = coords.len() / self.dim;
            return Ok(Value::Array(vec![self.read_group(coords, 0, count, closed)?]));
        }
        let mut out = Vec::with_capacity(geometry.lengths.len());
        let mut offset = 0usize;
        for &len in &geometry.lengths {
            out.push(self.read_group(coords, offset, len as usize, closed)?);
            offset += len as usize;
        }
        Ok(Value::Array(out))
    }

    /// Depth 3: walk the flattened pre-order lengths table; an absent table
    /// means one set with one ring.
    fn coords_depth3(&self, geometry: &proto::Geometry) -> Result<Value> {
        let coords = &geometry.coords;
        if geometry.lengths.is_empty() {
            let count = coords.len() / self.dim;
            let ring = self.read_group(coords, 0, count, true)?;
            return Ok(Value::Array(vec![Value::Array(vec![ring])]));
        }
        let sets = geometry.lengths[0] as usize;
        let mut cursor = 1usize;
        let mut offset = 0usize;
        // The counts come from the wire; cap pre-allocation by what the
        // lengths table could actually describe and let the cursor checks
        // reject oversized counts.
        let mut out = Vec::with_capacity(sets.min(geometry.lengths.len()));
        for _ in 0..sets {
            let groups = self.length_at(geometry, &mut cursor)?;
            let mut set = Vec::with_capacity(groups.min(geometry.lengths.len()));
            for _ in 0..groups {
                let len = self.length_at(geometry, &mut cursor)?;
                set.push(self.read_group(coords, offset, len, true)?);
                offset += len;
            }
            out.push(Value::Array(set));
        }
        Ok(Value::Array(out))
    }

    fn length_at(&self, geometry: &proto::Geometry, cursor: &mut usize) -> Result<usize> {
        let len = geometry
            .lengths
            .get(*cursor)
            .copied()
            .ok_or(GeobufError::TruncatedLengths {
                index: *cursor,
                available: geometry.lengths.len(),
            })?;
        *cursor += 1;
        Ok(len as usize)
    }

    /// Undo the per-group delta chain for `tuples` tuples starting at tuple
    /// `offset`, re-appending the closing point for closed rings.
    fn read_group(&self, coords: &[i64], offset: usize, tuples: usize, closed: bool) -> Result<Value> {
        let end = (offset + tuples) * self.dim;
        if end > coords.len() {
            return Err(GeobufError::TruncatedCoords {
                needed: end,
                available: coords.len(),
            });
        }
        let mut sums = vec![0i64; self.dim];
        let mut group = Vec::with_capacity(tuples + closed as usize);
        for i in 0..tuples {
            let mut tuple = Vec::with_capacity(self.dim);
            for (j, sum) in sums.iter_mut().enumerate() {
                *sum += coords[(offset + i) * self.dim + j];
                tuple.push(Value::from(*sum as f64 / self.multiplier));
            }
            group.push(Value::Array(tuple));
        }
        if closed && tuples > 0 {
            let first = group[0].clone();
            group.push(first);
        }
        Ok(Value::Array(group))
    }

    fn key(&self, index: u32) -> Result<&str> {
        let index = index as usize;
        self.keys
            .get(index)
            .map(String::as_str)
            .ok_or(GeobufError::KeyIndexOutOfBounds {
                index,
                len: self.keys.len(),
            })
    }
}
