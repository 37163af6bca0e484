pub mod control;
pub mod date;
pub mod error;
pub mod extensions;
pub mod media;
pub mod scan;
pub mod writer;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::DirRole;
use crate::media::SourceFile;
use crate::writer::Placement;

pub use control::{CancellationToken, ImportControl};
pub use date::{resolve_capture_date, CaptureDate, DateSource};
pub use error::{ImportError, Result};
pub use extensions::{RecognizedExtensionSet, DEFAULT_RAW_EXTENSIONS};

/// Counters for one import run.
///
/// `processed` always equals `copied + skipped + failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub processed: u64,
    pub copied: u64,
    pub skipped: u64,
    pub failed: u64,
    pub cancelled: bool,
}

/// Something that happened during a run. `Display` renders the log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ImportEvent {
    Started {
        source: PathBuf,
        dest: PathBuf,
        total: u64,
    },
    Progress {
        current: u64,
        total: u64,
    },
    SkippedDuplicate {
        file_name: String,
    },
    Renamed {
        file_name: String,
        new_name: String,
    },
    Copied {
        file_name: String,
        year: i32,
        month: u32,
        day: u32,
    },
    Failed {
        file_name: String,
        message: String,
    },
    Cancelled {
        processed: u64,
    },
    Finished(ImportResult),
}

impl ImportEvent {
    pub fn is_progress(&self) -> bool {
        matches!(self, Self::Progress { .. })
    }
}

impl fmt::Display for ImportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { source, dest, total } => write!(
                f,
                "Starting import from {} to {} ({} files)...",
                source.display(),
                dest.display(),
                total
            ),
            Self::Progress { current, total } => write!(f, "[{}/{}]", current, total),
            Self::SkippedDuplicate { file_name } => write!(f, "Skipping duplicate: {}", file_name),
            Self::Renamed { new_name, .. } => write!(f, "Conflict found. Renaming to {}", new_name),
            Self::Copied {
                file_name,
                year,
                month,
                day,
            } => write!(f, "Copied: {} -> {:04}/{:02}/{:02}", file_name, year, month, day),
            Self::Failed { file_name, message } => {
                write!(f, "Error processing {}: {}", file_name, message)
            }
            Self::Cancelled { processed } => {
                write!(f, "Import cancelled after {} files.", processed)
            }
            Self::Finished(r) => {
                write!(
                    f,
                    "Import Finished. Processed {} files. Copied: {}. Skipped: {}.",
                    r.processed, r.copied, r.skipped
                )?;
                if r.failed > 0 {
                    write!(f, " Failed: {}.", r.failed)?;
                }
                Ok(())
            }
        }
    }
}

/// Type alias for the event callback. It may be invoked from any thread.
pub type EventCallback<'a> = dyn Fn(&ImportEvent) + Send + Sync + 'a;

enum FileOutcome {
    Copied(CaptureDate),
    Duplicate,
}

/// Copies recognized files into `YYYY/MM/DD` folders by capture date.
///
/// Holds no per-run state, so one importer can serve any number of runs.
#[derive(Debug, Clone, Default)]
pub struct Importer {
    extensions: RecognizedExtensionSet,
}

impl Importer {
    pub fn new(extensions: RecognizedExtensionSet) -> Self {
        Self { extensions }
    }

    /// Run one import from `source` into `dest`.
    ///
    /// Only invalid directories fail the call. Per-file failures are reported
    /// through `on_event` and counted in [`ImportResult::failed`]. A cancelled
    /// run still returns its counts.
    pub fn run(
        &self,
        source: &Path,
        dest: &Path,
        control: &ImportControl,
        on_event: &EventCallback<'_>,
    ) -> Result<ImportResult> {
        validate_dir(source, DirRole::Source)?;
        validate_dir(dest, DirRole::Destination)?;

        // The tree is assumed static between this pass and the next.
        let total = scan::count_eligible(source, &self.extensions);
        on_event(&ImportEvent::Started {
            source: source.to_path_buf(),
            dest: dest.to_path_buf(),
            total,
        });

        let mut result = ImportResult::default();
        for path in scan::eligible_files(source, &self.extensions) {
            if control.is_cancelled() {
                result.cancelled = true;
                on_event(&ImportEvent::Cancelled {
                    processed: result.processed,
                });
                break;
            }

            result.processed += 1;
            on_event(&ImportEvent::Progress {
                current: result.processed,
                total,
            });

            let file_name = media::display_name(&path);
            match self.import_file(&path, dest, on_event) {
                Ok(FileOutcome::Copied(date)) => {
                    result.copied += 1;
                    on_event(&ImportEvent::Copied {
                        file_name,
                        year: date.year(),
                        month: date.month(),
                        day: date.day(),
                    });
                }
                Ok(FileOutcome::Duplicate) => {
                    result.skipped += 1;
                    on_event(&ImportEvent::SkippedDuplicate { file_name });
                }
                Err(err) => {
                    result.failed += 1;
                    warn!(?path, error = %format!("{:#}", err), "import failed");
                    on_event(&ImportEvent::Failed {
                        file_name,
                        message: format!("{:#}", err),
                    });
                }
            }
        }

        info!(
            processed = result.processed,
            copied = result.copied,
            skipped = result.skipped,
            failed = result.failed,
            "import finished"
        );
        on_event(&ImportEvent::Finished(result.clone()));
        Ok(result)
    }

    fn import_file(
        &self,
        path: &Path,
        dest: &Path,
        on_event: &EventCallback<'_>,
    ) -> anyhow::Result<FileOutcome> {
        let file = SourceFile::from_path(path).context("cannot read source file")?;
        debug!(path = ?file.path, extension = %file.extension, size = file.size, "importing");
        let date = date::resolve_capture_date(&file.path).context("cannot resolve capture date")?;

        let dir = writer::target_dir(dest, &date);
        fs::create_dir_all(&dir)
            .with_context(|| format!("cannot create {}", dir.display()))?;

        let now = chrono::Utc::now().timestamp();
        let target = match writer::plan_placement(&dir, &file, now)
            .with_context(|| format!("cannot inspect {}", dir.display()))?
        {
            Placement::Duplicate => return Ok(FileOutcome::Duplicate),
            Placement::New(target) => target,
            Placement::Renamed(target) => {
                on_event(&ImportEvent::Renamed {
                    file_name: media::display_name(&file.path),
                    new_name: media::display_name(&target),
                });
                target
            }
        };

        // Fails, never overwrites, if the target was claimed since planning
        writer::copy_preserving_times(&file.path, &target).with_context(|| {
            format!("copy to {} failed", target.display())
        })?;
        Ok(FileOutcome::Copied(date))
    }
}

/// Import with the default RAW extension set and no cancellation.
pub fn run_import(
    source: &Path,
    dest: &Path,
    on_event: &EventCallback<'_>,
) -> Result<ImportResult> {
    Importer::default().run(source, dest, &ImportControl::default(), on_event)
}

fn validate_dir(path: &Path, role: DirRole) -> Result<()> {
    if path.is_dir() {
        Ok(())
    } else {
        Err(ImportError::InvalidDirectory {
            role,
            path: path.to_path_buf(),
        })
    }
}
