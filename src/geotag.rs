//! GPS coordinate extraction from EXIF metadata.

use std::io::Cursor;

use exif::{In, Tag, Value};
use log::debug;
use serde::Serialize;

/// A decimal-degree GPS position read from image metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Extracts the GPS position from an image's EXIF block, if present.
///
/// Returns `None` for images without EXIF data, without GPS tags, or with
/// malformed coordinate values; geotagging is best-effort and never blocks a
/// prediction.
pub fn extract_location(image_bytes: &[u8]) -> Option<Location> {
    let exif = match exif::Reader::new().read_from_container(&mut Cursor::new(image_bytes)) {
        Ok(exif) => exif,
        Err(e) => {
            debug!("no EXIF metadata: {}", e);
            return None;
        }
    };

    let latitude = read_coordinate(&exif, Tag::GPSLatitude)?;
    let longitude = read_coordinate(&exif, Tag::GPSLongitude)?;

    let latitude = apply_ref(&exif, Tag::GPSLatitudeRef, b'S', latitude);
    let longitude = apply_ref(&exif, Tag::GPSLongitudeRef, b'W', longitude);

    Some(Location {
        latitude,
        longitude,
    })
}

/// Converts a degrees/minutes/seconds rational triple to decimal degrees.
fn read_coordinate(exif: &exif::Exif, tag: Tag) -> Option<f64> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let Value::Rational(ref parts) = field.value else {
        return None;
    };
    if parts.len() < 3 || parts.iter().take(3).any(|r| r.denom == 0) {
        return None;
    }
    Some(parts[0].to_f64() + parts[1].to_f64() / 60.0 + parts[2].to_f64() / 3600.0)
}

/// Negates the coordinate when the hemisphere reference matches `negative`.
fn apply_ref(exif: &exif::Exif, tag: Tag, negative: u8, coordinate: f64) -> f64 {
    let hemisphere = exif
        .get_field(tag, In::PRIMARY)
        .and_then(|field| match field.value {
            Value::Ascii(ref v) => v.first().and_then(|s| s.first().copied()),
            _ => None,
        });
    if hemisphere == Some(negative) {
        -coordinate
    } else {
        coordinate
    }
}
