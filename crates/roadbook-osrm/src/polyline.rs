//! Google encoded-polyline codec.
//!
//! Routing services ship geometries as encoded polylines; decoding happens
//! at this boundary and the core only ever sees coordinate sequences.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolylineError {
    #[error("encoded polyline ends in the middle of a value")]
    Truncated,
    #[error("invalid character {0:?} in encoded polyline")]
    InvalidCharacter(char),
}

/// Decode an encoded polyline into (lat, lng) pairs.
///
/// `precision` is the number of decimal digits the coordinates were scaled
/// by when encoded: 5 for the classic format, 6 for polyline6.
pub fn decode(encoded: &str, precision: u32) -> Result<Vec<(f64, f64)>, PolylineError> {
    let factor = 10f64.powi(precision as i32);
    let bytes = encoded.as_bytes();
    let mut coordinates = Vec::new();
    let mut index = 0;
    let mut lat = 0i64;
    let mut lng = 0i64;

    while index < bytes.len() {
        let (delta, next) = decode_value(bytes, index)?;
        lat += delta;
        let (delta, next) = decode_value(bytes, next)?;
        lng += delta;
        index = next;
        coordinates.push((lat as f64 / factor, lng as f64 / factor));
    }

    Ok(coordinates)
}

fn decode_value(bytes: &[u8], mut index: usize) -> Result<(i64, usize), PolylineError> {
    let mut result = 0i64;
    let mut shift = 0u32;
    loop {
        let Some(&byte) = bytes.get(index) else {
            return Err(PolylineError::Truncated);
        };
        if !(63..=126).contains(&byte) {
            return Err(PolylineError::InvalidCharacter(byte as char));
        }
        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        index += 1;
        if chunk & 0x20 == 0 {
            break;
        }
        if shift > 60 {
            return Err(PolylineError::Truncated);
        }
    }
    let value = if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    };
    Ok((value, index))
}

/// Encode (lat, lng) pairs into the polyline format.
pub fn encode(coordinates: &[(f64, f64)], precision: u32) -> String {
    let factor = 10f64.powi(precision as i32);
    let mut encoded = String::new();
    let mut previous_lat = 0i64;
    let mut previous_lng = 0i64;

    for (lat, lng) in coordinates {
        let lat = (lat * factor).round() as i64;
        let lng = (lng * factor).round() as i64;
        encode_value(lat - previous_lat, &mut encoded);
        encode_value(lng - previous_lng, &mut encoded);
        previous_lat = lat;
        previous_lng = lng;
    }

    encoded
}

fn encode_value(value: i64, out: &mut String) {
    let mut value = if value < 0 {
        !(value << 1)
    } else {
        value << 1
    };
    while value >= 0x20 {
        out.push((((value & 0x1f) | 0x20) as u8 + 63) as char);
        value >>= 5;
    }
    out.push((value as u8 + 63) as char);
}
