use std::io::Write;

use crate::entry::Entry;
use crate::error::FindError;
use crate::format::{print_listing, print_path};
use crate::predicate::Predicate;
use crate::traits::IdentityDb;

/// The ordered predicates of one invocation.
///
/// Filters overwrite a running match value rather than AND-ing into it:
/// with `-name '*.txt' -type d`, only `-type d` decides the default print.
/// `-print` and `-ls` fire where they stand, gated by the value at that
/// point, and their presence anywhere suppresses the default print.
#[derive(Debug, Clone, Default)]
pub struct Chain {
    predicates: Vec<Predicate>,
}

/// What one pass of the chain over one entry did.
#[derive(Debug, Default)]
pub struct Evaluation {
    /// Final running match value.
    pub matched: bool,

    /// Lines written (bare paths and listings).
    pub emitted: usize,

    /// Writes that failed. Each is recoverable.
    pub errors: Vec<FindError>,
}

impl Chain {
    /// Build a chain from find-style tokens such as
    /// `["-type", "f", "-name", "*.rs", "-print"]`.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Self, FindError> {
        let mut predicates = Vec::new();
        let mut tokens = tokens.iter().map(AsRef::as_ref);
        while let Some(flag) = tokens.next() {
            let arg = if Predicate::takes_argument(flag) {
                tokens.next()
            } else {
                None
            };
            predicates.push(Predicate::parse(flag, arg)?);
        }
        Ok(Self { predicates })
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Run every predicate against `entry`, writing output to `out`.
    pub fn evaluate<W: Write + ?Sized>(
        &self,
        entry: &Entry,
        ids: &dyn IdentityDb,
        out: &mut W,
    ) -> Evaluation {
        let mut current = true;
        let mut explicit_output_seen = false;
        let mut eval = Evaluation::default();

        for predicate in &self.predicates {
            match predicate {
                Predicate::Print => {
                    explicit_output_seen = true;
                    if current {
                        eval.record(print_path(out, entry), entry);
                    }
                }
                Predicate::List => {
                    explicit_output_seen = true;
                    if current {
                        eval.record(print_listing(out, entry, ids), entry);
                    }
                }
                filter => {
                    if let Some(result) = filter.test(entry, ids) {
                        current = result;
                    }
                }
            }
        }

        if !explicit_output_seen && current {
            eval.record(print_path(out, entry), entry);
        }

        eval.matched = current;
        eval
    }
}

impl Evaluation {
    fn record(&mut self, res: std::io::Result<()>, entry: &Entry) {
        match res {
            Ok(()) => self.emitted += 1,
            Err(source) => self.errors.push(FindError::Write {
                path: entry.path.clone(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::path::PathBuf;

    use super::*;
    use crate::entry::Metadata;
    use crate::traits::fake::FakeIdentity;

    fn entry(path: &str, mode: u32) -> Entry {
        Entry::new(
            PathBuf::from(path),
            1,
            Metadata {
                mode,
                uid: 1000,
                gid: 100,
                nlink: 1,
                size: 4096,
                ino: 7,
                blocks: 8,
                mtime: 0,
            },
        )
    }

    fn txt() -> Entry {
        entry("root/a.txt", libc::S_IFREG as u32 | 0o644)
    }

    fn dir() -> Entry {
        entry("root/sub", libc::S_IFDIR as u32 | 0o755)
    }

    fn run(tokens: &[&str], e: &Entry) -> (String, Evaluation) {
        let chain = Chain::parse(tokens).unwrap();
        let mut out = Vec::new();
        let eval = chain.evaluate(e, &FakeIdentity::default(), &mut out);
        (String::from_utf8(out).unwrap(), eval)
    }

    #[test]
    fn empty_chain_prints_everything() {
        let (out, eval) = run(&[], &txt());
        assert_eq!(out, "root/a.txt\n");
        assert_eq!(eval.emitted, 1);
        assert!(eval.matched);
    }

    #[test]
    fn last_filter_wins_for_default_print() {
        // -name matches, -type d does not: overwritten to false
        let (out, _) = run(&["-name", "*.txt", "-type", "d"], &txt());
        assert_eq!(out, "");
        // -name misses, -type f matches: overwritten to true
        let (out, _) = run(&["-name", "*.log", "-type", "f"], &txt());
        assert_eq!(out, "root/a.txt\n");
    }

    #[test]
    fn explicit_print_suppresses_default() {
        let (out, eval) = run(&["-print"], &txt());
        assert_eq!(out, "root/a.txt\n");
        assert_eq!(eval.emitted, 1);
    }

    #[test]
    fn print_is_gated_by_value_at_its_position() {
        let (out, eval) = run(&["-type", "f", "-name", "*.txt", "-print"], &txt());
        assert_eq!(out, "root/a.txt\n");
        assert_eq!(eval.emitted, 1);

        let (out, _) = run(&["-type", "f", "-name", "*.txt", "-print"], &dir());
        assert_eq!(out, "");

        // a later failing filter cannot retract an earlier print
        let (out, eval) = run(&["-print", "-type", "d"], &txt());
        assert_eq!(out, "root/a.txt\n");
        assert!(!eval.matched);
    }

    #[test]
    fn print_twice_emits_twice() {
        let (out, eval) = run(&["-print", "-print"], &txt());
        assert_eq!(out, "root/a.txt\nroot/a.txt\n");
        assert_eq!(eval.emitted, 2);
    }

    #[test]
    fn ls_counts_as_explicit_output() {
        let (out, eval) = run(&["-ls"], &txt());
        assert_eq!(out.lines().count(), 1);
        assert!(out.contains("-rw-r--r--"));
        assert!(out.ends_with(" root/a.txt\n"));
        assert_eq!(eval.emitted, 1);

        let (out, _) = run(&["-type", "d", "-ls"], &txt());
        assert_eq!(out, "");
    }

    #[test]
    fn missing_argument_is_fatal() {
        assert!(matches!(
            Chain::parse(&["-name"]),
            Err(FindError::MissingArgument(f)) if f == "-name"
        ));
    }

    #[test]
    fn parse_preserves_order() {
        let chain = Chain::parse(&["-nouser", "-print", "-user", "x", "-ls"]).unwrap();
        let p = chain.predicates();
        assert_eq!(p.len(), 4);
        assert!(matches!(p[0], Predicate::NoUser));
        assert!(matches!(p[1], Predicate::Print));
        assert!(matches!(&p[2], Predicate::User(u) if u == "x"));
        assert!(matches!(p[3], Predicate::List));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_failures_are_collected_not_fatal() {
        let chain = Chain::parse(&["-print", "-print"]).unwrap();
        let eval = chain.evaluate(&txt(), &FakeIdentity::default(), &mut FailingWriter);
        assert_eq!(eval.emitted, 0);
        assert_eq!(eval.errors.len(), 2);
        assert!(eval.errors.iter().all(FindError::is_recoverable));
    }
}
