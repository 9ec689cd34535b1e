use crate::error::AppError;
use crate::metadata::GeoPoint;
use exif::{Exif, In, Reader, Tag, Value};
use std::io::Cursor;

/// Tag values read from an image's embedded metadata, before normalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTags {
    pub make: Option<String>,
    pub model: Option<String>,
    pub date_time_original: Option<String>,
    pub date_time: Option<String>,
    pub date_time_digitized: Option<String>,
    /// Signed decimal degrees, hemisphere reference already applied.
    pub gps_latitude: Option<f64>,
    pub gps_longitude: Option<f64>,
    pub orientation: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedMetadata {
    pub position: Option<GeoPoint>,
    pub date: String,
    pub camera: String,
    pub orientation: Option<u32>,
}

pub fn extract(bytes: &[u8]) -> Result<ExtractedMetadata, AppError> {
    Ok(normalize(&read_tags(bytes)?))
}

pub fn normalize(tags: &RawTags) -> ExtractedMetadata {
    ExtractedMetadata {
        position: parse_position(tags),
        date: parse_date(tags),
        camera: parse_camera(tags.make.as_deref(), tags.model.as_deref()),
        orientation: tags.orientation,
    }
}

/// Reads the embedded EXIF block. An image with no metadata block at all
/// yields empty tags; a block that is present but malformed is an error.
pub fn read_tags(bytes: &[u8]) -> Result<RawTags, AppError> {
    let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => {
            log::debug!("No EXIF block present");
            return Ok(RawTags::default());
        }
        Err(e) => return Err(e.into()),
    };

    let tags = RawTags {
        make: ascii(&exif, Tag::Make),
        model: ascii(&exif, Tag::Model),
        date_time_original: ascii(&exif, Tag::DateTimeOriginal),
        date_time: ascii(&exif, Tag::DateTime),
        date_time_digitized: ascii(&exif, Tag::DateTimeDigitized),
        gps_latitude: coordinate(&exif, Tag::GPSLatitude, Tag::GPSLatitudeRef),
        gps_longitude: coordinate(&exif, Tag::GPSLongitude, Tag::GPSLongitudeRef),
        orientation: exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|f| f.value.get_uint(0)),
    };
    log::trace!("Read tags: {:?}", tags);
    Ok(tags)
}

fn ascii(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(parts) => parts.first().map(|bytes| {
            String::from_utf8_lossy(bytes)
                .trim_matches(|c: char| c == '\0' || c.is_whitespace())
                .to_string()
        }),
        _ => None,
    }
}

/// Degrees/minutes/seconds rationals to signed decimal degrees.
fn coordinate(exif: &Exif, value_tag: Tag, ref_tag: Tag) -> Option<f64> {
    let field = exif.get_field(value_tag, In::PRIMARY)?;
    let degrees = match &field.value {
        Value::Rational(parts) if !parts.is_empty() => parts
            .iter()
            .take(3)
            .zip([1.0, 60.0, 3600.0])
            .map(|(part, divisor)| part.to_f64() / divisor)
            .sum::<f64>(),
        _ => return None,
    };
    if !degrees.is_finite() {
        return None;
    }

    let negative = ascii(exif, ref_tag)
        .map(|r| r.starts_with('S') || r.starts_with('W'))
        .unwrap_or(false);
    Some(if negative { -degrees } else { degrees })
}

/// Both coordinates are required; either one missing means no position.
pub fn parse_position(tags: &RawTags) -> Option<GeoPoint> {
    match (tags.gps_latitude, tags.gps_longitude) {
        (Some(lat), Some(lng)) => Some(GeoPoint::new(lat, lng)),
        _ => None,
    }
}

/// First non-empty of DateTimeOriginal, DateTime, DateTimeDigitized, with the
/// `YYYY:MM:DD` date separators rewritten to `-`. Empty when none is set.
pub fn parse_date(tags: &RawTags) -> String {
    [
        &tags.date_time_original,
        &tags.date_time,
        &tags.date_time_digitized,
    ]
    .into_iter()
    .flatten()
    .find(|s| !s.is_empty())
    .map(|s| reformat_exif_date(s))
    .unwrap_or_default()
}

/// `2024:03:15 12:30:45` -> `2024-03-15 12:30:45`. Anything that does not
/// start with a `YYYY:MM:DD` date is returned unchanged.
pub fn reformat_exif_date(s: &str) -> String {
    let b = s.as_bytes();
    let is_exif_date = b.len() >= 10
        && b[..4].iter().all(u8::is_ascii_digit)
        && b[4] == b':'
        && b[5..7].iter().all(u8::is_ascii_digit)
        && b[7] == b':'
        && b[8..10].iter().all(u8::is_ascii_digit);
    if !is_exif_date {
        return s.to_string();
    }
    format!("{}-{}-{}{}", &s[..4], &s[5..7], &s[8..10], &s[10..])
}

/// "Make Model", or just the model when it already starts with the make.
pub fn parse_camera(make: Option<&str>, model: Option<&str>) -> String {
    let make = make.unwrap_or("").trim();
    let model = model.unwrap_or("").trim();
    if make.is_empty() && model.is_empty() {
        return String::new();
    }
    if model.starts_with(make) {
        return model.to_string();
    }
    format!("{} {}", make, model).trim().to_string()
}
