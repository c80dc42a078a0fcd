use std::error::Error;
use std::fmt;

/// Crate error type for geobuf encode/decode operations.
#[derive(Debug)]
pub enum GeobufError {
    /// Wraps protobuf parse errors returned by `prost`.
    Decode(prost::DecodeError),
    /// Wraps errors returned by `serde_json` (JSON-fallback values).
    Json(serde_json::Error),
    /// The document or geometry object has no `type` member.
    MissingType,
    /// The `type` string is not a recognized geometry or document type.
    UnsupportedType(String),
    /// A value that must be a JSON object is something else.
    ExpectedObject(&'static str),
    /// A feature object has no `geometry` member.
    MissingGeometry,
    /// A GeometryCollection has no `geometries` array.
    MissingGeometries,
    /// A coordinate geometry has no `coordinates` member.
    MissingCoordinates,
    /// The `coordinates` tree is not shaped as nested arrays of numbers.
    InvalidCoordinates(&'static str),
    /// A coordinate tuple does not match the document dimension.
    UnequalDimensions { expected: u32, got: u32 },
    /// A floating-point feature id has a fractional part.
    NonIntegerId(f64),
    /// A feature id is neither a string nor a number.
    InvalidIdType(&'static str),
    /// A property key index points past the end of the key table.
    KeyIndexOutOfBounds { index: usize, len: usize },
    /// A property value has no tag set, or its values slot is missing.
    EmptyValue,
    /// The document has no geometry/feature/feature_collection body.
    NoDataTypeSet,
    /// The lengths table demands more coordinates than the buffer holds.
    TruncatedCoords { needed: usize, available: usize },
    /// The lengths table ends before the declared set/group counts are met.
    TruncatedLengths { index: usize, available: usize },
}

impl fmt::Display for GeobufError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(err) => write!(f, "{err}"),
            Self::Json(err) => write!(f, "{err}"),
            Self::MissingType => write!(f, "object does not have a 'type' member"),
            Self::UnsupportedType(ty) => write!(f, "unsupported type: {ty}"),
            Self::ExpectedObject(context) => {
                write!(f, "expected a JSON object for {context}")
            }
            Self::MissingGeometry => write!(f, "feature does not contain geometry"),
            Self::MissingGeometries => {
                write!(f, "GeometryCollection does not contain geometries")
            }
            Self::MissingCoordinates => write!(f, "geometry does not contain coordinates"),
            Self::InvalidCoordinates(detail) => write!(f, "invalid coordinates: {detail}"),
            Self::UnequalDimensions { expected, got } => {
                write!(
                    f,
                    "unequal coordinate dimensions: expected {expected}, got {got}"
                )
            }
            Self::NonIntegerId(id) => write!(f, "ID has non-integer number: {id}"),
            Self::InvalidIdType(kind) => {
                write!(f, "ID field must be string or number, got {kind}")
            }
            Self::KeyIndexOutOfBounds { index, len } => {
                write!(
                    f,
                    "property index out of bounds: index {index}, key table size {len}"
                )
            }
            Self::EmptyValue => write!(f, "empty value"),
            Self::NoDataTypeSet => write!(f, "no data type field set"),
            Self::TruncatedCoords { needed, available } => {
                write!(
                    f,
                    "coordinate buffer too short: need {needed} values, got {available}"
                )
            }
            Self::TruncatedLengths { index, available } => {
                write!(
                    f,
                    "lengths table too short: index {index}, got {available} entries"
                )
            }
        }
    }
}

impl Error for GeobufError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            Self::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<prost::DecodeError> for GeobufError {
    fn from(err: prost::DecodeError) -> Self {
        Self::Decode(err)
    }
}

impl From<serde_json::Error> for GeobufError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

pub type Result<T> = std::result::Result<T, GeobufError>;
