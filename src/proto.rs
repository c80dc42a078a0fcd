//! Hand-declared geobuf wire messages.
//!
//! These mirror the canonical geobuf schema so the output stays byte-compatible
//! with other geobuf implementations. The nested `Data.*` messages from the
//! schema are flattened to top-level structs here.
// cf. https://github.com/mapbox/geobuf/blob/master/geobuf.proto

/// Top-level wire message wrapping one geometry, feature, or collection.
///
/// `dimensions` and `precision` are optional so an explicitly written zero
/// survives the wire (proto2 presence semantics); readers fall back to the
/// schema defaults 2 and 6 when the fields are absent.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Data {
    #[prost(string, repeated, tag = "1")]
    pub keys: Vec<String>,
    #[prost(uint32, optional, tag = "2")]
    pub dimensions: Option<u32>,
    #[prost(uint32, optional, tag = "3")]
    pub precision: Option<u32>,
    #[prost(oneof = "DataType", tags = "4, 5, 6")]
    pub data_type: Option<DataType>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum DataType {
    #[prost(message, tag = "4")]
    FeatureCollection(FeatureCollection),
    #[prost(message, tag = "5")]
    Feature(Feature),
    #[prost(message, tag = "6")]
    Geometry(Geometry),
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct FeatureCollection {
    #[prost(message, repeated, tag = "1")]
    pub features: Vec<Feature>,
    #[prost(message, repeated, tag = "13")]
    pub values: Vec<Value>,
    #[prost(uint32, repeated, tag = "15")]
    pub custom_properties: Vec<u32>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct Feature {
    #[prost(message, optional, tag = "1")]
    pub geometry: Option<Geometry>,
    #[prost(message, repeated, tag = "13")]
    pub values: Vec<Value>,
    /// Flattened `(key index, slot index)` pairs for the properties object.
    #[prost(uint32, repeated, tag = "14")]
    pub properties: Vec<u32>,
    /// Flattened `(key index, slot index)` pairs for other top-level members.
    #[prost(uint32, repeated, tag = "15")]
    pub custom_properties: Vec<u32>,
    #[prost(oneof = "IdType", tags = "11, 12")]
    pub id_type: Option<IdType>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum IdType {
    #[prost(string, tag = "11")]
    Id(String),
    #[prost(sint64, tag = "12")]
    IntId(i64),
}

/// A geometry node: either delta-coded coordinates plus a nesting-lengths
/// table, or (for GeometryCollection) a list of child geometries.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Geometry {
    #[prost(enumeration = "GeometryType", tag = "1")]
    pub r#type: i32,
    #[prost(uint32, repeated, tag = "2")]
    pub lengths: Vec<u32>,
    #[prost(sint64, repeated, tag = "3")]
    pub coords: Vec<i64>,
    #[prost(message, repeated, tag = "4")]
    pub geometries: Vec<Geometry>,
    #[prost(message, repeated, tag = "13")]
    pub values: Vec<Value>,
    #[prost(uint32, repeated, tag = "15")]
    pub custom_properties: Vec<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum GeometryType {
    Point = 0,
    MultiPoint = 1,
    LineString = 2,
    MultiLineString = 3,
    Polygon = 4,
    MultiPolygon = 5,
    GeometryCollection = 6,
}

/// Tagged property value; a message with no tag set is a decode error.
#[derive(Clone, PartialEq, prost::Message)]
pub struct Value {
    #[prost(oneof = "ValueType", tags = "1, 2, 3, 4, 5, 6")]
    pub value_type: Option<ValueType>,
}

#[derive(Clone, PartialEq, prost::Oneof)]
pub enum ValueType {
    #[prost(string, tag = "1")]
    StringValue(String),
    #[prost(double, tag = "2")]
    DoubleValue(f64),
    /// Magnitude of a non-negative integer.
    #[prost(uint64, tag = "3")]
    PosIntValue(u64),
    /// Magnitude of a negative integer (the sign is implied by the tag).
    #[prost(uint64, tag = "4")]
    NegIntValue(u64),
    #[prost(bool, tag = "5")]
    BoolValue(bool),
    /// JSON text fallback for compound (array/object/null) values.
    #[prost(string, tag = "6")]
    JsonValue(String),
}
