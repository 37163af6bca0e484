use std::ffi::{OsStr, OsString};
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use filetime::FileTime;

use crate::date::CaptureDate;
use crate::media::SourceFile;

/// Where a source file goes, decided before anything is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// Target path is free.
    New(PathBuf),
    /// A file of the same size already sits at the target path.
    Duplicate,
    /// A different file holds the name; copy to `path` instead.
    Renamed(PathBuf),
}

/// `<dest>/YYYY/MM/DD` for a capture date.
pub fn target_dir(dest_root: &Path, date: &CaptureDate) -> PathBuf {
    dest_root
        .join(format!("{:04}", date.year()))
        .join(format!("{:02}", date.month()))
        .join(format!("{:02}", date.day()))
}

/// Decide the placement of `file` inside `dir`.
///
/// Size equality is the only duplicate test. On a real conflict the new name
/// carries `now_unix` as a suffix; an existing file is never chosen.
pub fn plan_placement(dir: &Path, file: &SourceFile, now_unix: i64) -> io::Result<Placement> {
    let base = dir.join(&file.file_name);
    match fs::metadata(&base) {
        Ok(existing) if existing.len() == file.size => Ok(Placement::Duplicate),
        Ok(_) => Ok(Placement::Renamed(conflict_path(dir, &file.file_name, now_unix))),
        // A dangling symlink still holds the name
        Err(e) if e.kind() == io::ErrorKind::NotFound && !is_taken(&base) => {
            Ok(Placement::New(base))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Ok(Placement::Renamed(conflict_path(dir, &file.file_name, now_unix)))
        }
        Err(e) => Err(e),
    }
}

fn is_taken(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// `<stem>_<ts>.<ext>`, or `<stem>_<ts>_<n>.<ext>` when that is taken too.
fn conflict_path(dir: &Path, file_name: &OsStr, now_unix: i64) -> PathBuf {
    let name = Path::new(file_name);
    let stem = name.file_stem().unwrap_or_else(|| OsStr::new("file"));
    let ext = name.extension();

    let mut counter = 0u32;
    loop {
        let mut candidate = OsString::from(stem);
        if counter == 0 {
            candidate.push(format!("_{}", now_unix));
        } else {
            candidate.push(format!("_{}_{}", now_unix, counter));
        }
        if let Some(ext) = ext {
            candidate.push(".");
            candidate.push(ext);
        }
        let path = dir.join(candidate);
        if !is_taken(&path) {
            return path;
        }
        counter += 1;
    }
}

/// Copy bytes into a new file at `dest`, then carry over permissions and
/// access/modification times. Fails with `AlreadyExists` rather than
/// replacing anything at `dest`.
pub fn copy_preserving_times(src: &Path, dest: &Path) -> io::Result<u64> {
    let meta = fs::metadata(src)?;
    let mut reader = File::open(src)?;
    let mut out = OpenOptions::new().write(true).create_new(true).open(dest)?;
    let bytes = io::copy(&mut reader, &mut out)?;

    let atime = FileTime::from_last_access_time(&meta);
    let mtime = FileTime::from_last_modification_time(&meta);
    filetime::set_file_handle_times(&out, Some(atime), Some(mtime))?;
    drop(out);
    fs::set_permissions(dest, meta.permissions())?;
    Ok(bytes)
}
