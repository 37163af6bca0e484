use std::collections::HashSet;
use std::path::Path;

/// Camera RAW formats imported when no other set is configured.
pub const DEFAULT_RAW_EXTENSIONS: &[&str] = &[
    "CR2", // Canon
    "CR3", // Canon (current)
    "NEF", // Nikon
    "ARW", // Sony
    "SR2", // Sony (older)
    "DNG", // Adobe / various
    "ORF", // Olympus
    "RW2", // Panasonic
    "RAF", // Fujifilm
];

/// Case-insensitive set of file extensions eligible for import.
///
/// Extensions are stored uppercased and without the leading dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedExtensionSet {
    extensions: HashSet<String>,
}

impl Default for RecognizedExtensionSet {
    fn default() -> Self {
        Self::new(DEFAULT_RAW_EXTENSIONS.iter().copied())
    }
}

impl RecognizedExtensionSet {
    /// Build a set from extensions given with or without a leading dot.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|ext| normalize(ext.as_ref()))
            .filter(|ext| !ext.is_empty())
            .collect();
        Self { extensions }
    }

    pub fn contains(&self, extension: &str) -> bool {
        self.extensions.contains(&normalize(extension))
    }

    /// Check whether a path's extension is in the set.
    pub fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map_or(false, |ext| self.contains(ext))
    }
}

fn normalize(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_uppercase()
}
