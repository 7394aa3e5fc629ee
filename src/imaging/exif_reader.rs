//! EXIF extraction from in-memory image bytes.
//!
//! The container is identified by its signature (`image::guess_format`) and
//! then decoded in full, so a file with a valid header but broken pixel data
//! fails here instead of being copied. The EXIF block itself is parsed by
//! `kamadak-exif`. Containers that cannot carry EXIF (GIF, BMP, ...) extract
//! to empty metadata rather than failing.

use super::backend::BackendError;
use crate::metadata::{CameraMetadata, Extraction, TagIssue};
use exif::{Exif, Field, In, Reader, Tag, Value};
use image::ImageFormat;
use std::io::Cursor;

/// Containers `kamadak-exif` knows how to search for an EXIF block.
const EXIF_CONTAINERS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Tiff,
    ImageFormat::Png,
    ImageFormat::WebP,
];

/// Read camera metadata from raw image bytes.
pub fn read_exif(bytes: &[u8]) -> Result<Extraction, BackendError> {
    let format = image::guess_format(bytes)
        .map_err(|e| BackendError::Malformed(format!("unrecognised image data: {e}")))?;

    // Formats without a compiled-in decoder are left to the derivative step
    if format.reading_enabled() {
        image::load_from_memory_with_format(bytes, format)
            .map_err(|e| BackendError::Malformed(format!("undecodable {format:?} image: {e}")))?;
    }

    if !EXIF_CONTAINERS.contains(&format) {
        return Ok(Extraction::default());
    }

    let exif = match Reader::new().read_from_container(&mut Cursor::new(bytes)) {
        Ok(exif) => exif,
        Err(exif::Error::NotFound(_)) => {
            return Ok(Extraction::default());
        }
        Err(e) => {
            return Err(BackendError::Malformed(format!(
                "unreadable {format:?} container: {e}"
            )));
        }
    };

    Ok(extract_fields(&exif))
}

fn extract_fields(exif: &Exif) -> Extraction {
    let mut issues = Vec::new();
    let field = |tag: Tag| exif.get_field(tag, In::PRIMARY);

    let make = field(Tag::Make);
    let model = field(Tag::Model);
    let iso = field(Tag::PhotographicSensitivity);
    let f_stop = field(Tag::FNumber);
    let focal_length = field(Tag::FocalLength);
    let exposure_time = field(Tag::ExposureTime);

    let metadata = CameraMetadata {
        make: make.and_then(|f| record(&mut issues, "make", text(f))),
        model: model.and_then(|f| record(&mut issues, "model", text(f))),
        iso: iso.and_then(|f| record(&mut issues, "iso", integer(f))),
        f_stop: f_stop.and_then(|f| record(&mut issues, "f_stop", rational(f))),
        focal_length: focal_length
            .and_then(|f| record(&mut issues, "focal_length", rational(f))),
        exposure_time: exposure_time
            .and_then(|f| record(&mut issues, "exposure_time", rational(f))),
    };

    Extraction { metadata, issues }
}

/// Coercion outcome for one tag: a value, a blank (treated as absent), or a reason.
type Coerced<T> = Result<Option<T>, String>;

fn record<T>(issues: &mut Vec<TagIssue>, field: &'static str, coerced: Coerced<T>) -> Option<T> {
    match coerced {
        Ok(value) => value,
        Err(reason) => {
            issues.push(TagIssue { field, reason });
            None
        }
    }
}

fn text(field: &Field) -> Coerced<String> {
    match &field.value {
        Value::Ascii(parts) => Ok(parts
            .iter()
            .map(|p| {
                String::from_utf8_lossy(p)
                    .trim_matches(|c: char| c == '\0' || c.is_whitespace())
                    .to_string()
            })
            .find(|s| !s.is_empty())),
        other => Err(format!("expected ASCII text, found {}", value_kind(other))),
    }
}

fn integer(field: &Field) -> Coerced<u32> {
    match &field.value {
        Value::Byte(_) | Value::Short(_) | Value::Long(_) => field
            .value
            .get_uint(0)
            .map(Some)
            .ok_or_else(|| "integer tag has no values".to_string()),
        other => Err(format!("expected integer, found {}", value_kind(other))),
    }
}

fn rational(field: &Field) -> Coerced<f64> {
    let value = match &field.value {
        Value::Rational(v) => {
            let r = v.first().ok_or("rational tag has no values")?;
            if r.denom == 0 {
                return Err("zero denominator".to_string());
            }
            r.to_f64()
        }
        Value::SRational(v) => {
            let r = v.first().ok_or("rational tag has no values")?;
            if r.denom == 0 {
                return Err("zero denominator".to_string());
            }
            r.to_f64()
        }
        other => return Err(format!("expected rational, found {}", value_kind(other))),
    };

    if value.is_finite() {
        Ok(Some(value))
    } else {
        Err(format!("non-finite value {value}"))
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Byte(_) => "BYTE",
        Value::Ascii(_) => "ASCII",
        Value::Short(_) => "SHORT",
        Value::Long(_) => "LONG",
        Value::Rational(_) => "RATIONAL",
        Value::SByte(_) => "SBYTE",
        Value::Undefined(..) => "UNDEFINED",
        Value::SShort(_) => "SSHORT",
        Value::SLong(_) => "SLONG",
        Value::SRational(_) => "SRATIONAL",
        Value::Float(_) => "FLOAT",
        Value::Double(_) => "DOUBLE",
        _ => "unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{ExifTags, jpeg_bytes, jpeg_with_exif, png_bytes};
    use exif::Rational;

    #[test]
    fn full_exif_populates_every_field() {
        let bytes = jpeg_with_exif(64, 48, &ExifTags::fuji());
        let extraction = read_exif(&bytes).unwrap();

        let meta = extraction.metadata;
        assert_eq!(meta.make.as_deref(), Some("FUJIFILM"));
        assert_eq!(meta.model.as_deref(), Some("X100V"));
        assert_eq!(meta.iso, Some(160));
        assert_eq!(meta.f_stop, Some(5.6));
        assert_eq!(meta.focal_length, Some(23.0));
        assert_eq!(meta.exposure_time, Some(0.004));
        assert!(extraction.issues.is_empty());
    }

    #[test]
    fn missing_iso_leaves_others_populated() {
        let tags = ExifTags {
            iso: None,
            ..ExifTags::fuji()
        };
        let extraction = read_exif(&jpeg_with_exif(64, 48, &tags)).unwrap();

        assert_eq!(extraction.metadata.iso, None);
        assert_eq!(extraction.metadata.make.as_deref(), Some("FUJIFILM"));
        assert_eq!(extraction.metadata.model.as_deref(), Some("X100V"));
        assert!(extraction.issues.is_empty());
    }

    #[test]
    fn jpeg_without_exif_is_empty_not_error() {
        let extraction = read_exif(&jpeg_bytes(32, 32)).unwrap();
        assert_eq!(extraction, Extraction::default());
    }

    #[test]
    fn png_without_exif_is_empty() {
        let extraction = read_exif(&png_bytes(16, 16)).unwrap();
        assert_eq!(extraction, Extraction::default());
    }

    #[test]
    fn garbage_bytes_are_malformed() {
        let result = read_exif(b"definitely not an image");
        assert!(matches!(result, Err(BackendError::Malformed(_))));
    }

    #[test]
    fn jpeg_markers_without_image_data_are_malformed() {
        let result = read_exif(&[0xFF, 0xD8, 0xFF, 0xD9]);
        assert!(matches!(result, Err(BackendError::Malformed(_))));
    }

    #[test]
    fn empty_bytes_are_malformed() {
        assert!(matches!(read_exif(&[]), Err(BackendError::Malformed(_))));
    }

    // =========================================================================
    // Coercion tests (no image container required)
    // =========================================================================

    fn field(tag: Tag, value: Value) -> Field {
        Field {
            tag,
            ifd_num: In::PRIMARY,
            value,
        }
    }

    #[test]
    fn text_trims_nul_padding() {
        let f = field(Tag::Make, Value::Ascii(vec![b"Canon\0\0  ".to_vec()]));
        assert_eq!(text(&f), Ok(Some("Canon".to_string())));
    }

    #[test]
    fn blank_text_is_absent() {
        let f = field(Tag::Make, Value::Ascii(vec![b"   ".to_vec()]));
        assert_eq!(text(&f), Ok(None));
    }

    #[test]
    fn text_wrong_type_is_issue() {
        let f = field(Tag::Model, Value::Short(vec![7]));
        assert_eq!(text(&f), Err("expected ASCII text, found SHORT".to_string()));
    }

    #[test]
    fn integer_from_short_and_long() {
        let short = field(Tag::PhotographicSensitivity, Value::Short(vec![400]));
        let long = field(Tag::PhotographicSensitivity, Value::Long(vec![102_400]));
        assert_eq!(integer(&short), Ok(Some(400)));
        assert_eq!(integer(&long), Ok(Some(102_400)));
    }

    #[test]
    fn integer_from_text_is_issue() {
        let f = field(
            Tag::PhotographicSensitivity,
            Value::Ascii(vec![b"400".to_vec()]),
        );
        assert_eq!(integer(&f), Err("expected integer, found ASCII".to_string()));
    }

    #[test]
    fn rational_converts_to_decimal() {
        let f = field(
            Tag::FNumber,
            Value::Rational(vec![Rational { num: 28, denom: 10 }]),
        );
        assert_eq!(rational(&f), Ok(Some(2.8)));
    }

    #[test]
    fn rational_zero_denominator_is_issue() {
        let f = field(
            Tag::ExposureTime,
            Value::Rational(vec![Rational { num: 1, denom: 0 }]),
        );
        assert_eq!(rational(&f), Err("zero denominator".to_string()));
    }

    #[test]
    fn rational_empty_is_issue() {
        let f = field(Tag::FocalLength, Value::Rational(vec![]));
        assert!(rational(&f).is_err());
    }

    #[test]
    fn extract_fields_records_issue_and_keeps_others() {
        let tags = ExifTags {
            exposure_time: Some((1, 0)),
            ..ExifTags::fuji()
        };
        let extraction = read_exif(&jpeg_with_exif(32, 32, &tags)).unwrap();

        assert_eq!(extraction.metadata.exposure_time, None);
        assert_eq!(extraction.metadata.iso, Some(160));
        assert_eq!(extraction.issues.len(), 1);
        assert_eq!(extraction.issues[0].field, "exposure_time");
    }
}
