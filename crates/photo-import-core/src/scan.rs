use std::path::{Path, PathBuf};

use tracing::warn;
use walkdir::WalkDir;

use crate::extensions::RecognizedExtensionSet;

/// Recursively yield files (or symlinks to files) under `source` whose extension is in
/// `extensions`, in directory-walk order. Unreadable entries are skipped.
pub fn eligible_files<'a>(
    source: &Path,
    extensions: &'a RecognizedExtensionSet,
) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(source)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                None
            }
        })
        // Symlinked files count; symlinked directories are not descended into
        .filter(|entry| {
            entry.file_type().is_file() || (entry.path_is_symlink() && entry.path().is_file())
        })
        .filter(move |entry| extensions.matches(entry.path()))
        .map(|entry| entry.into_path())
}

/// Count the files [`eligible_files`] would yield. Used only for progress.
pub fn count_eligible(source: &Path, extensions: &RecognizedExtensionSet) -> u64 {
    eligible_files(source, extensions).count() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_walks_recursively_and_filters() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("DCIM/100CANON")).unwrap();
        fs::create_dir_all(root.join("MISC/raw.CR2")).unwrap();
        for name in [
            "IMG_001.CR2",
            "video.mp4",
            "DCIM/100CANON/IMG_002.cr2",
            "DCIM/100CANON/IMG_002.JPG",
            "DCIM/DSC_003.NEF",
            "MISC/notes.txt",
        ] {
            fs::write(root.join(name), b"x").unwrap();
        }

        let set = RecognizedExtensionSet::default();
        let mut found: Vec<String> = eligible_files(root, &set)
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        found.sort();
        assert_eq!(found, vec!["DSC_003.NEF", "IMG_001.CR2", "IMG_002.cr2"]);
        assert_eq!(count_eligible(root, &set), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks() {
        use std::os::unix::fs::symlink;

        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        let root = dir.path();
        fs::write(outside.path().join("real.CR2"), b"x").unwrap();
        fs::create_dir(outside.path().join("linked")).unwrap();
        fs::write(outside.path().join("linked/inner.CR2"), b"x").unwrap();

        symlink(outside.path().join("real.CR2"), root.join("IMG.CR2")).unwrap();
        symlink(outside.path().join("linked"), root.join("linked")).unwrap();
        symlink(outside.path().join("missing.CR2"), root.join("dangling.CR2")).unwrap();

        let found: Vec<PathBuf> = eligible_files(root, &RecognizedExtensionSet::default()).collect();
        assert_eq!(found, vec![root.join("IMG.CR2")]);
    }

    #[test]
    fn test_empty_tree() {
        let dir = tempdir().unwrap();
        assert_eq!(count_eligible(dir.path(), &RecognizedExtensionSet::default()), 0);
    }
}
