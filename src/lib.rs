//! # pfind
//!
//! Depth-first, find-style filesystem search driven by an ordered predicate
//! chain.
//!
//! Every visited entry (each starting path included) is stat'ed without
//! following symlinks and run through the chain. Filters (`-name`, `-path`,
//! `-type`, `-user`, `-group`, `-nouser`, `-nogroup`) overwrite a running
//! match value; actions (`-print`, `-ls`) write the entry where they stand
//! if that value is true. A chain with no action prints each entry whose
//! final value is true.
//!
//! # Quick Start
//!
//! ```rust
//! use pfind::Chain;
//!
//! let dir = tempfile::tempdir().unwrap();
//! std::fs::write(dir.path().join("a.txt"), "a").unwrap();
//! std::fs::write(dir.path().join("b.log"), "b").unwrap();
//!
//! let chain = Chain::parse(&["-type", "f", "-name", "*.txt", "-print"]).unwrap();
//! let mut out = Vec::new();
//! let results = pfind::search()
//!     .root(dir.path())
//!     .chain(chain)
//!     .run(&mut out)
//!     .unwrap();
//!
//! assert_eq!(results.matches, 1);
//! assert!(String::from_utf8(out).unwrap().ends_with("/a.txt\n"));
//! ```
//!
//! # Command lines
//!
//! [`Invocation::from_args`] turns `[path ...] [predicate ...]` into roots
//! and a chain, substituting `.` when no path is given:
//!
//! ```rust
//! use pfind::Invocation;
//!
//! let inv = Invocation::from_args(["-nouser", "-ls"]).unwrap();
//! assert_eq!(inv.roots, vec![std::path::PathBuf::from(".")]);
//! ```

#![forbid(unsafe_code)]

pub mod engine;
pub mod format;
pub mod meta;
pub mod predicate;

mod builder;
mod chain;
mod cli;
mod entry;
mod error;
mod results;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::SearchBuilder;
pub use chain::{Chain, Evaluation};
pub use cli::{CliArgs, Invocation};
pub use entry::{Entry, EntryKind, Metadata};
pub use error::FindError;
pub use meta::SystemIdentity;
pub use predicate::{Glob, Predicate};
pub use results::{Results, ScanStats};
pub use traits::IdentityDb;

// ── Entry point ───────────────────────────────────────────────────────────────

/// Create a new [`SearchBuilder`] to configure and run a traversal.
///
/// # Example
///
/// ```rust
/// let dir = tempfile::tempdir().unwrap();
/// let mut out = Vec::new();
/// let results = pfind::search().root(dir.path()).run(&mut out).unwrap();
///
/// // the root itself is a candidate entry
/// assert_eq!(results.matches, 1);
/// assert_eq!(results.stats.dirs, 1);
/// ```
pub fn search() -> SearchBuilder {
    SearchBuilder::default()
}
