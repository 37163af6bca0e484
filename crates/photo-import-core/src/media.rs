use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Full path inside the source tree
    pub path: PathBuf,
    /// Filename as stored on disk; destination names are built from it
    pub file_name: OsString,
    /// Extension, uppercased, without the dot
    pub extension: String,
    /// File size in bytes
    pub size: u64,
}

impl SourceFile {
    /// Stat `path` and capture what the import pipeline needs from it.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let meta = fs::metadata(path)?;
        if !meta.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        let file_name = path.file_name().map(|n| n.to_os_string()).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no file name", path.display()),
            )
        })?;
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_uppercase())
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            extension,
            size: meta.len(),
        })
    }
}

/// File name for log lines only; lossy for non-UTF-8 names.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_from_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("IMG_0042.nef");
        fs::File::create(&path)
            .unwrap()
            .write_all(b"fake raw data")
            .unwrap();

        let file = SourceFile::from_path(&path).unwrap();
        assert_eq!(file.file_name, "IMG_0042.nef");
        assert_eq!(file.extension, "NEF");
        assert_eq!(file.size, 13);
    }

    #[test]
    fn test_from_path_missing_or_dir() {
        let dir = tempdir().unwrap();
        assert!(SourceFile::from_path(&dir.path().join("gone.CR2")).is_err());
        assert!(SourceFile::from_path(dir.path()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_name_kept_verbatim() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = tempdir().unwrap();
        let name = OsStr::from_bytes(b"\xFF.CR2");
        let path = dir.path().join(name);
        fs::write(&path, b"aaaa").unwrap();

        let file = SourceFile::from_path(&path).unwrap();
        assert_eq!(file.file_name, name);
        assert_eq!(file.extension, "CR2");
        assert_eq!(display_name(&path), "\u{FFFD}.CR2");
    }
}
