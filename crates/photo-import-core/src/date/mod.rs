pub mod exif;

use std::fs;
use std::io;
use std::path::Path;

use chrono::{DateTime, Datelike, Local, NaiveDateTime};
use serde::Serialize;
use tracing::debug;

/// Where a capture date came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// EXIF `DateTimeOriginal`
    Metadata,
    /// Filesystem modification time
    FilesystemTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CaptureDate {
    pub timestamp: NaiveDateTime,
    pub source: DateSource,
}

impl CaptureDate {
    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }

    pub fn month(&self) -> u32 {
        self.timestamp.month()
    }

    pub fn day(&self) -> u32 {
        self.timestamp.day()
    }
}

/// Resolve the capture date of `path`.
///
/// EXIF metadata is tried first; any failure there silently falls back to the
/// file's modification time in local time. The only error returned is the
/// filesystem refusing to stat the file at all.
pub fn resolve_capture_date(path: &Path) -> io::Result<CaptureDate> {
    if let Some(timestamp) = exif::read_date_time_original(path) {
        debug!(?path, %timestamp, "capture date from EXIF");
        return Ok(CaptureDate {
            timestamp,
            source: DateSource::Metadata,
        });
    }

    let modified = fs::metadata(path)?.modified()?;
    let timestamp = DateTime::<Local>::from(modified).naive_local();
    debug!(?path, %timestamp, "no usable EXIF date, using mtime");
    Ok(CaptureDate {
        timestamp,
        source: DateSource::FilesystemTime,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn set_local_mtime(path: &Path, dt: NaiveDateTime) {
        let local = dt.and_local_timezone(Local).single().unwrap();
        let ft = filetime::FileTime::from_unix_time(local.timestamp(), 0);
        filetime::set_file_mtime(path, ft).unwrap();
    }

    #[test]
    fn test_fallback_to_mtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("IMG_001.CR2");
        fs::write(&path, b"fake raw data").unwrap();
        let when = NaiveDate::from_ymd_opt(2023, 10, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        set_local_mtime(&path, when);

        let date = resolve_capture_date(&path).unwrap();
        assert_eq!(date.source, DateSource::FilesystemTime);
        assert_eq!(date.timestamp, when);
        assert_eq!((date.year(), date.month(), date.day()), (2023, 10, 15));
    }

    #[test]
    fn test_exif_wins_over_mtime() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("IMG_002.DNG");
        fs::write(&path, exif::tiff_with_date_time_original("2020:02:29 08:00:00")).unwrap();
        let when = NaiveDate::from_ymd_opt(2023, 10, 15)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        set_local_mtime(&path, when);

        let date = resolve_capture_date(&path).unwrap();
        assert_eq!(date.source, DateSource::Metadata);
        assert_eq!((date.year(), date.month(), date.day()), (2020, 2, 29));
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempdir().unwrap();
        assert!(resolve_capture_date(&dir.path().join("nope.CR2")).is_err());
    }
}
