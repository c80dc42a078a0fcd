//! Geobuf document encode/decode.
//!
//! The encoder walks the GeoJSON tree depth-first, interning property keys and
//! quantizing coordinates as it goes, then finalizes the document header
//! (precision, dimension, key table) once the walk completes. The decoder
//! reads the header first and mirrors the walk.

mod decoder;
mod encoder;

pub use decoder::from_geobuf;
pub use encoder::to_geobuf;
