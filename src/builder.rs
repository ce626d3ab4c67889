use std::io::Write;
use std::path::PathBuf;

use crate::chain::Chain;
use crate::cli::Invocation;
use crate::engine::{EngineOptions, WalkConfig, run};
use crate::error::FindError;
use crate::meta::SystemIdentity;
use crate::results::Results;
use crate::traits::IdentityDb;

// ---------------------------------------------------------------------------
// SearchBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and executing a traversal.
///
/// Created via [`pfind::search()`](crate::search). Configure with chained
/// builder methods, then call [`run()`](SearchBuilder::run) with the writer
/// that should receive matched entries.
///
/// # Example
///
/// ```rust,ignore
/// let chain = pfind::Chain::parse(&["-type", "f", "-name", "*.rs"])?;
/// let results = pfind::search()
///     .root("src")
///     .chain(chain)
///     .collect_errors(true)
///     .run(&mut std::io::stdout().lock())?;
/// ```
pub struct SearchBuilder {
    roots:          Vec<PathBuf>,
    chain:          Chain,
    identity:       Box<dyn IdentityDb>,
    max_depth:      Option<usize>,
    collect_errors: bool,
}

impl Default for SearchBuilder {
    fn default() -> Self {
        Self {
            roots:          Vec::new(),
            chain:          Chain::default(),
            identity:       Box::new(SystemIdentity),
            max_depth:      None,
            collect_errors: false,
        }
    }
}

impl SearchBuilder {
    // ── Roots ─────────────────────────────────────────────────────────────

    /// Add a starting path. Roots are walked in the order they are added.
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.roots.push(path.into());
        self
    }

    /// Add several starting paths.
    pub fn roots<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.roots.extend(paths.into_iter().map(Into::into));
        self
    }

    // ── Chain ─────────────────────────────────────────────────────────────

    /// Set the predicate chain evaluated against every entry.
    ///
    /// Without one, every visited entry is printed.
    pub fn chain(mut self, chain: Chain) -> Self {
        self.chain = chain;
        self
    }

    /// Take both roots and chain from a parsed command line.
    pub fn invocation(self, inv: Invocation) -> Self {
        self.roots(inv.roots).chain(inv.chain)
    }

    // ── Options ───────────────────────────────────────────────────────────

    /// Use a different user/group database. Defaults to the system's.
    pub fn identity(mut self, db: impl IdentityDb + 'static) -> Self {
        self.identity = Box::new(db);
        self
    }

    /// Maximum traversal depth. `0` means the roots only, `1` means one
    /// level of children, and so on. Unlimited by default.
    pub fn max_depth(mut self, d: usize) -> Self {
        self.max_depth = Some(d);
        self
    }

    /// Collect recoverable errors into [`Results::errors`].
    ///
    /// They are reported through `tracing` either way.
    pub fn collect_errors(mut self, yes: bool) -> Self {
        self.collect_errors = yes;
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Walk all roots, writing matched entries to `out`.
    ///
    /// # Errors
    ///
    /// Returns `Err` only when no root was given. Problems with individual
    /// entries are reported and skipped.
    pub fn run<W: Write + ?Sized>(self, out: &mut W) -> Result<Results, FindError> {
        if self.roots.is_empty() {
            return Err(FindError::InvalidSource("no starting path provided".into()));
        }

        let opts = EngineOptions {
            config: WalkConfig {
                max_depth: self.max_depth,
            },
            roots:          self.roots,
            chain:          self.chain,
            identity:       self.identity,
            collect_errors: self.collect_errors,
        };

        Ok(run(&opts, out))
    }
}
