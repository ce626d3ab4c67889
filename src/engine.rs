use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use ignore::WalkBuilder;
use tracing::{debug, trace, warn};

use crate::chain::Chain;
use crate::entry::{Entry, EntryKind};
use crate::error::FindError;
use crate::meta;
use crate::results::{Results, ScanStats};
use crate::traits::IdentityDb;

// ---------------------------------------------------------------------------
// WalkConfig
// ---------------------------------------------------------------------------

/// Traversal parameters passed from the builder to the engine.
#[derive(Debug, Clone, Default)]
pub struct WalkConfig {
    /// `0` evaluates the roots only. Unlimited when `None`.
    pub max_depth: Option<usize>,
}

// ---------------------------------------------------------------------------
// Engine options
// ---------------------------------------------------------------------------

/// Internal options passed from the builder to `run()`.
pub(crate) struct EngineOptions {
    pub config:         WalkConfig,
    pub roots:          Vec<PathBuf>,
    pub chain:          Chain,
    pub identity:       Box<dyn IdentityDb>,
    pub collect_errors: bool,
}

// ---------------------------------------------------------------------------
// run()
// ---------------------------------------------------------------------------

/// Walk every root in order, feeding each visited entry through the chain.
///
/// Single-threaded and depth-first: an entry is evaluated before anything
/// beneath it, and a directory's subtree is finished before its next
/// sibling is looked at.
pub(crate) fn run<W: Write + ?Sized>(opts: &EngineOptions, out: &mut W) -> Results {
    let mut state = WalkState {
        opts,
        matches: 0,
        files: 0,
        dirs: 0,
        errors: Vec::new(),
    };

    let start = Instant::now();
    for root in &opts.roots {
        debug!(root = %root.display(), "walking");
        state.walk_root(root, out);
    }
    let duration = start.elapsed();

    debug!(
        matches = state.matches,
        files = state.files,
        dirs = state.dirs,
        "walk finished"
    );

    Results {
        matches: state.matches,
        stats:   ScanStats::compute(state.files, state.dirs, duration),
        errors:  state.errors,
    }
}

struct WalkState<'a> {
    opts:    &'a EngineOptions,
    matches: usize,
    files:   usize,
    dirs:    usize,
    errors:  Vec<FindError>,
}

impl WalkState<'_> {
    fn walk_root<W: Write + ?Sized>(&mut self, root: &Path, out: &mut W) {
        // The root's own lstat decides whether to descend, so a symlink
        // given as a root is listed but never followed.
        let metadata = match meta::stat(root) {
            Ok(m) => m,
            Err(err) => {
                self.report(err);
                return;
            }
        };
        let entry = Entry::new(root.to_path_buf(), 0, metadata);
        self.visit(&entry, out);

        if !entry.kind.is_dir() || self.opts.config.max_depth == Some(0) {
            return;
        }

        let mut builder = WalkBuilder::new(root);
        builder
            .standard_filters(false)
            .ignore(false)
            .parents(false)
            .hidden(false)
            .follow_links(false)
            .same_file_system(false)
            .max_depth(self.opts.config.max_depth);

        // Set when a child could not be stat'ed. Nothing beneath it is
        // visited or reported; the walk is depth-first, so the first path
        // outside it ends the pruning.
        let mut pruned: Option<PathBuf> = None;

        for res in builder.build() {
            let inside = pruned.as_deref().is_some_and(|dir| match &res {
                Ok(dent) => dent.path().starts_with(dir),
                Err(e) => error_path(e).is_some_and(|p| p.starts_with(dir)),
            });
            if inside {
                continue;
            }
            pruned = None;

            let dent = match res {
                Ok(d) => d,
                Err(e) => {
                    self.report(map_ignore_error(e));
                    continue;
                }
            };

            // Already evaluated above
            if dent.depth() == 0 {
                continue;
            }

            let metadata = match meta::stat(dent.path()) {
                Ok(m) => m,
                Err(err) => {
                    self.report(err);
                    pruned = Some(dent.into_path());
                    continue;
                }
            };
            let depth = dent.depth();
            let entry = Entry::new(dent.into_path(), depth, metadata);
            self.visit(&entry, out);
        }
    }

    fn visit<W: Write + ?Sized>(&mut self, entry: &Entry, out: &mut W) {
        match entry.kind {
            EntryKind::Dir => self.dirs += 1,
            _ => self.files += 1,
        }

        let eval = self.opts.chain.evaluate(entry, self.opts.identity.as_ref(), out);
        trace!(
            path = %entry.path.display(),
            depth = entry.depth,
            matched = eval.matched,
            emitted = eval.emitted,
            "evaluated"
        );
        self.matches += eval.emitted;
        for err in eval.errors {
            self.report(err);
        }
    }

    /// Recoverable errors are always reported, and kept if asked for.
    fn report(&mut self, err: FindError) {
        match err.path() {
            Some(path) => warn!(path = %path.display(), "{err}"),
            None => warn!("{err}"),
        }
        if self.opts.collect_errors {
            self.errors.push(err);
        }
    }
}

// ---------------------------------------------------------------------------
// Map ignore::Error to FindError
// ---------------------------------------------------------------------------

/// `ignore` wraps its I/O errors in `WithPath` and `WithDepth` layers, in
/// either order. The outermost path names the entry.
fn map_ignore_error(e: ignore::Error) -> FindError {
    classify(e, None)
}

fn classify(e: ignore::Error, path: Option<PathBuf>) -> FindError {
    match e {
        ignore::Error::WithDepth { err, .. } => classify(*err, path),
        ignore::Error::WithPath { path: inner, err } => classify(*err, path.or(Some(inner))),
        ignore::Error::Io(io_err) => FindError::from_io(path.unwrap_or_default(), io_err),
        other => match path {
            Some(path) => FindError::Source(format!("{}: {}", path.display(), other)),
            None => FindError::Source(other.to_string()),
        },
    }
}

fn error_path(e: &ignore::Error) -> Option<&Path> {
    match e {
        ignore::Error::WithPath { path, .. } => Some(path.as_path()),
        ignore::Error::WithDepth { err, .. } => error_path(err),
        _ => None,
    }
}
