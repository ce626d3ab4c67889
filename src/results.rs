use std::time::Duration;

use crate::error::FindError;

/// The output of a completed traversal.
///
/// Matched entries are written to the caller's writer as they are found;
/// this is only the tally. `errors` is opt-in via `.collect_errors(true)`.
#[derive(Debug)]
pub struct Results {
    /// Lines emitted, counting every `-print`/`-ls` that fired and the
    /// default print.
    pub matches: usize,

    /// Traversal statistics.
    pub stats: ScanStats,

    /// Recoverable errors met during the walk (unreadable directories,
    /// entries that vanished, failed writes). Every one of them was
    /// already reported as a diagnostic.
    pub errors: Vec<FindError>,
}

/// Statistics for a completed walk.
#[derive(Debug, Clone, Copy)]
pub struct ScanStats {
    /// Non-directory entries visited (matched or not).
    pub files: usize,

    /// Directories visited, roots included.
    pub dirs: usize,

    /// Wall-clock time from the first root to the last.
    pub duration: Duration,

    /// `(files + dirs) / duration`, clamped to 0 on zero-duration runs.
    pub entries_per_sec: usize,
}

impl ScanStats {
    pub(crate) fn compute(files: usize, dirs: usize, duration: Duration) -> Self {
        let total = files + dirs;
        let eps = if duration.as_secs_f64() > 0.0 {
            (total as f64 / duration.as_secs_f64()) as usize
        } else {
            0
        };
        Self {
            files,
            dirs,
            duration,
            entries_per_sec: eps,
        }
    }

    pub fn total(&self) -> usize {
        self.files + self.dirs
    }
}
