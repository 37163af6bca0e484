use chrono::NaiveDateTime;
use exif::{In, Reader, Tag, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Read EXIF `DateTimeOriginal` from an image or RAW file.
/// EXIF datetimes have no timezone info - they are local time as-is.
/// Any read or parse failure is reported as `None`.
pub fn read_date_time_original(path: &Path) -> Option<NaiveDateTime> {
    let file = File::open(path).ok()?;
    let exif = Reader::new()
        .read_from_container(&mut BufReader::new(file))
        .ok()?;

    let field = exif.get_field(Tag::DateTimeOriginal, In::PRIMARY)?;
    match &field.value {
        Value::Ascii(values) => {
            let raw = values.first()?;
            parse_exif_datetime(std::str::from_utf8(raw).ok()?)
        }
        _ => None,
    }
}

/// Parse the EXIF `YYYY:MM:DD HH:MM:SS` form.
pub fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let cleaned = s.trim_matches(|c: char| c == '\0' || c.is_whitespace());
    NaiveDateTime::parse_from_str(cleaned, "%Y:%m:%d %H:%M:%S").ok()
}

/// Minimal little-endian TIFF whose Exif IFD holds a single
/// `DateTimeOriginal` entry. `value` must be longer than 3 bytes so it is
/// stored out of line.
#[cfg(test)]
pub(crate) fn tiff_with_date_time_original(value: &str) -> Vec<u8> {
    assert!(value.len() > 3);
    let mut out = Vec::new();
    // Header: byte order, magic, IFD0 offset
    out.extend_from_slice(b"II");
    out.extend_from_slice(&42u16.to_le_bytes());
    out.extend_from_slice(&8u32.to_le_bytes());
    // IFD0 at 8: one entry pointing at the Exif IFD
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&0x8769u16.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes()); // LONG
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&26u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    // Exif IFD at 26: DateTimeOriginal, value at 44
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&0x9003u16.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes()); // ASCII
    out.extend_from_slice(&(value.len() as u32 + 1).to_le_bytes());
    out.extend_from_slice(&44u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    debug_assert_eq!(out.len(), 44);
    out.extend_from_slice(value.as_bytes());
    out.push(0);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use tempfile::tempdir;

    #[test]
    fn test_parse_exif_datetime() {
        let dt = parse_exif_datetime("2021:07:04 09:30:15").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2021, 7, 4));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (9, 30, 15));

        assert!(parse_exif_datetime(" 2021:07:04 09:30:15\0").is_some());
        assert!(parse_exif_datetime("0000:00:00 00:00:00").is_none());
        assert!(parse_exif_datetime("2021-07-04").is_none());
        assert!(parse_exif_datetime("").is_none());
    }

    #[test]
    fn test_read_from_tiff() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("IMG_7000.DNG");
        std::fs::write(&path, tiff_with_date_time_original("2019:12:31 23:59:58")).unwrap();

        let dt = read_date_time_original(&path).unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2019, 12, 31));
        assert_eq!(dt.second(), 58);
    }

    #[test]
    fn test_read_invalid_inputs() {
        let dir = tempdir().unwrap();

        let garbage = dir.path().join("IMG_001.CR2");
        std::fs::write(&garbage, b"fake raw data").unwrap();
        assert!(read_date_time_original(&garbage).is_none());

        let bad_value = dir.path().join("IMG_002.DNG");
        std::fs::write(&bad_value, tiff_with_date_time_original("not a date")).unwrap();
        assert!(read_date_time_original(&bad_value).is_none());

        assert!(read_date_time_original(&dir.path().join("missing.CR2")).is_none());
    }
}
