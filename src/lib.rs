//! Geobuf encoder/decoder built on top of prost.
//!
//! ## Overview
//!
//! Geobuf is a compact protobuf encoding of GeoJSON-shaped data. This crate
//! converts between [`serde_json::Value`] trees and geobuf bytes using three
//! size optimizations:
//!
//! - property keys are interned once per document and referenced by index,
//! - coordinates are quantized to a configured number of decimal digits and
//!   delta-coded within each ring or line,
//! - nested geometry structure is flattened into a single coordinate array
//!   plus a lengths table.
//!
//! The round trip is intentionally lossy: coordinates come back snapped to
//! the configured precision, not bit-identical to the input.
//!
//! ## Short usage
//!
//! ```
//! use prost_geobuf::{from_geobuf, to_geobuf};
//! use serde_json::json;
//!
//! let point = json!({ "type": "Point", "coordinates": [100.0, 0.5] });
//! let bytes = to_geobuf(&point, 6)?;
//! let decoded = from_geobuf(&bytes)?;
//! assert_eq!(decoded, point);
//! # Ok::<(), prost_geobuf::GeobufError>(())
//! ```
//!
//! Features and feature collections carry ids, a `properties` object, and any
//! other top-level members:
//!
//! ```
//! use prost_geobuf::{from_geobuf, to_geobuf};
//! use serde_json::json;
//!
//! let feature = json!({
//!     "type": "Feature",
//!     "geometry": { "type": "Point", "coordinates": [13.377, 52.516] },
//!     "id": 42,
//!     "properties": { "name": "Brandenburg Gate" }
//! });
//! let bytes = to_geobuf(&feature, 6)?;
//! assert_eq!(from_geobuf(&bytes)?, feature);
//! # Ok::<(), prost_geobuf::GeobufError>(())
//! ```
//!
//! The wire messages themselves are exposed under [`proto`] for callers that
//! want to inspect or construct documents directly.

mod conversions;
mod error;
mod geobuf;
pub mod proto;
mod value;

pub use error::{GeobufError, Result};
pub use geobuf::{from_geobuf, to_geobuf};
