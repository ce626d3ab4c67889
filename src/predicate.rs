use std::fmt;

use glob::{MatchOptions, Pattern};
use tracing::warn;

use crate::entry::{Entry, EntryKind};
use crate::error::FindError;
use crate::traits::IdentityDb;

/// fnmatch(3) without flags: `*` and `?` may match `/` and a leading `.`,
/// and case matters. There is no escape character.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A compiled shell glob together with the text it came from.
#[derive(Clone)]
pub struct Glob {
    source: String,
    pattern: Pattern,
}

impl Glob {
    pub fn new(source: &str) -> Result<Self, FindError> {
        let pattern = Pattern::new(&fnmatch_compatible(source)).map_err(|e| FindError::InvalidPattern {
            pattern: source.to_string(),
            reason: e.msg.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            pattern,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, text: &str) -> bool {
        self.pattern.matches_with(text, MATCH_OPTIONS)
    }
}

impl fmt::Debug for Glob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Glob").field(&self.as_str()).finish()
    }
}

/// Rewrite fnmatch syntax that `glob::Pattern` refuses into an equivalent
/// it accepts: runs of `*` become one `*`, and a `[` that never closes is
/// a literal `[`.
fn fnmatch_compatible(source: &str) -> String {
    let chars: Vec<char> = source.chars().collect();
    let mut out = String::with_capacity(source.len());
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '*' => {
                out.push('*');
                while chars.get(i + 1) == Some(&'*') {
                    i += 1;
                }
            }
            '[' => match bracket_end(&chars, i) {
                Some(end) => {
                    out.extend(&chars[i..=end]);
                    i = end;
                }
                None => out.push_str("[[]"),
            },
            c => out.push(c),
        }
        i += 1;
    }
    out
}

/// Index of the `]` closing the bracket expression opened at `open`. The
/// first member (after an optional `!`) may itself be `]`.
fn bracket_end(chars: &[char], open: usize) -> Option<usize> {
    let mut start = open + 1;
    if chars.get(start) == Some(&'!') {
        start += 1;
    }
    start += 1;
    chars
        .get(start..)?
        .iter()
        .position(|&c| c == ']')
        .map(|k| start + k)
}

/// One step of a predicate chain, built once from the invocation.
#[derive(Debug, Clone)]
pub enum Predicate {
    /// `-name <glob>`
    Name(Glob),
    /// `-path <glob>`
    Path(Glob),
    /// `-type <c>`
    Type(EntryKind),
    /// `-user <name|uid>`
    User(String),
    /// `-group <name|gid>`
    Group(String),
    /// `-nouser`
    NoUser,
    /// `-nogroup`
    NoGroup,
    /// `-print`
    Print,
    /// `-ls`
    List,
}

impl Predicate {
    /// Build the predicate named by `flag`, pulling its argument from
    /// `arg` when it takes one.
    ///
    /// Every malformed argument is rejected here, before any entry is
    /// visited.
    pub fn parse(flag: &str, arg: Option<&str>) -> Result<Self, FindError> {
        let need = || arg.ok_or_else(|| FindError::MissingArgument(flag.to_string()));
        Ok(match flag {
            "-name" => Self::Name(Glob::new(need()?)?),
            "-path" => Self::Path(Glob::new(need()?)?),
            "-type" => {
                let code = need()?;
                let mut chars = code.chars();
                match (chars.next().and_then(EntryKind::from_type_code), chars.next()) {
                    (Some(kind), None) => Self::Type(kind),
                    _ => return Err(FindError::InvalidType(code.to_string())),
                }
            }
            "-user" => Self::User(need()?.to_string()),
            "-group" => Self::Group(need()?.to_string()),
            "-nouser" => Self::NoUser,
            "-nogroup" => Self::NoGroup,
            "-print" => Self::Print,
            "-ls" => Self::List,
            other => return Err(FindError::UnknownPredicate(other.to_string())),
        })
    }

    /// Whether this flag consumes the following token as its argument.
    pub fn takes_argument(flag: &str) -> bool {
        matches!(flag, "-name" | "-path" | "-type" | "-user" | "-group")
    }

    /// Evaluate a filtering predicate. Actions evaluate to `None`.
    pub fn test(&self, entry: &Entry, ids: &dyn IdentityDb) -> Option<bool> {
        Some(match self {
            Self::Name(glob) => match_name(entry, glob),
            Self::Path(glob) => match_path(entry, glob),
            Self::Type(kind) => match_type(entry, *kind),
            Self::User(arg) => match_user(entry, arg, ids),
            Self::Group(arg) => match_group(entry, arg, ids),
            Self::NoUser => match_nouser(entry, ids),
            Self::NoGroup => match_nogroup(entry, ids),
            Self::Print | Self::List => return None,
        })
    }
}

pub fn match_name(entry: &Entry, glob: &Glob) -> bool {
    glob.matches(&entry.name)
}

/// Same last-segment comparison as `-name`.
pub fn match_path(entry: &Entry, glob: &Glob) -> bool {
    glob.matches(&entry.name)
}

pub fn match_type(entry: &Entry, kind: EntryKind) -> bool {
    entry.kind == kind
}

/// True when the argument names the entry's owner, or reads as its
/// numeric id. Either reading is enough.
pub fn match_user(entry: &Entry, arg: &str, ids: &dyn IdentityDb) -> bool {
    let by_name = report(ids.user_id(arg)).flatten();
    owner_matches(entry.metadata.uid, by_name, arg)
}

pub fn match_group(entry: &Entry, arg: &str, ids: &dyn IdentityDb) -> bool {
    let by_name = report(ids.group_id(arg)).flatten();
    owner_matches(entry.metadata.gid, by_name, arg)
}

/// True when the uid has no user name. An unreadable database counts as
/// "has a name": the entry is not claimed to be orphaned.
pub fn match_nouser(entry: &Entry, ids: &dyn IdentityDb) -> bool {
    report(ids.user_name(entry.metadata.uid)).is_some_and(|name| name.is_none())
}

pub fn match_nogroup(entry: &Entry, ids: &dyn IdentityDb) -> bool {
    report(ids.group_name(entry.metadata.gid)).is_some_and(|name| name.is_none())
}

fn owner_matches(actual: u32, by_name: Option<u32>, arg: &str) -> bool {
    if by_name == Some(actual) {
        return true;
    }
    parse_id(arg) == Some(actual)
}

fn report<T>(res: Result<T, FindError>) -> Option<T> {
    match res {
        Ok(v) => Some(v),
        Err(err) => {
            warn!("{err}");
            None
        }
    }
}

/// Parse an id the way `strtol(s, NULL, 0)` reads a whole token: `0x`
/// prefix for hex, a leading `0` for octal, decimal otherwise. Trailing
/// junk, signs and overflow are rejected.
pub fn parse_id(s: &str) -> Option<u32> {
    let (digits, radix) = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        (hex, 16)
    } else if s.len() > 1 && s.starts_with('0') {
        (&s[1..], 8)
    } else {
        (s, 10)
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
        return None;
    }
    u32::from_str_radix(digits, radix).ok()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::entry::Metadata;
    use crate::traits::fake::FakeIdentity;

    fn entry(path: &str, mode: u32, uid: u32, gid: u32) -> Entry {
        Entry::new(
            PathBuf::from(path),
            0,
            Metadata {
                mode,
                uid,
                gid,
                nlink: 1,
                size: 0,
                ino: 1,
                blocks: 0,
                mtime: 0,
            },
        )
    }

    fn file(path: &str) -> Entry {
        entry(path, libc::S_IFREG as u32 | 0o644, 1000, 100)
    }

    fn ids() -> FakeIdentity {
        FakeIdentity {
            users: vec![(0, "root"), (1000, "alice")],
            groups: vec![(0, "wheel"), (100, "users")],
            broken: false,
        }
    }

    #[test]
    fn name_matches_last_segment_only() {
        let glob = Glob::new("*.txt").unwrap();
        assert!(match_name(&file("root/a.txt"), &glob));
        assert!(!match_name(&file("root.txt/a.log"), &glob));
        assert!(match_name(&file("a.txt"), &glob));
    }

    #[test]
    fn star_matches_any_non_empty_segment() {
        let glob = Glob::new("*").unwrap();
        for p in ["a", ".hidden", "dir/x y", "."] {
            assert!(match_name(&file(p), &glob), "{p}");
        }
    }

    #[test]
    fn question_mark_and_brackets() {
        assert!(Glob::new("b?.log").unwrap().matches("b1.log"));
        assert!(!Glob::new("b?.log").unwrap().matches("b.log"));
        assert!(Glob::new("[ab].txt").unwrap().matches("a.txt"));
        assert!(!Glob::new("[!ab].txt").unwrap().matches("a.txt"));
    }

    #[test]
    fn backslash_is_literal() {
        let glob = Glob::new(r"a\b").unwrap();
        assert!(glob.matches(r"a\b"));
        assert!(!glob.matches("ab"));
    }

    #[test]
    fn path_uses_last_segment_like_name() {
        let glob = Glob::new("b.log").unwrap();
        assert!(match_path(&file("root/sub/b.log"), &glob));
        assert!(!match_path(&file("root/sub/b.log"), &Glob::new("root/*").unwrap()));
    }

    #[test]
    fn repeated_stars_match_like_one() {
        let glob = Glob::new("a**b").unwrap();
        assert_eq!(glob.as_str(), "a**b");
        assert!(glob.matches("ab"));
        assert!(glob.matches("a-x-b"));
        assert!(!glob.matches("a-x-c"));
        assert!(Glob::new("***").unwrap().matches("anything"));
    }

    #[test]
    fn unclosed_bracket_is_literal() {
        let glob = Glob::new("[").unwrap();
        assert!(glob.matches("["));
        assert!(!glob.matches("a"));

        let glob = Glob::new("x[*").unwrap();
        assert!(glob.matches("x["));
        assert!(glob.matches("x[yz"));
        assert!(!glob.matches("xy"));

        assert!(Glob::new("[]").unwrap().matches("[]"));
        assert!(Glob::new("[!]").unwrap().matches("[!]"));
    }

    #[test]
    fn closed_brackets_are_kept() {
        assert_eq!(fnmatch_compatible("[[]"), "[[]");
        assert_eq!(fnmatch_compatible("[]]x"), "[]]x");
        assert_eq!(fnmatch_compatible("[!*]**"), "[!*]*");
        assert!(Glob::new("[]]").unwrap().matches("]"));
    }

    #[test]
    fn type_argument_must_be_a_single_known_code() {
        assert!(matches!(Predicate::parse("-type", Some("f")), Ok(Predicate::Type(EntryKind::File))));
        assert!(matches!(Predicate::parse("-type", Some("x")), Err(FindError::InvalidType(_))));
        assert!(matches!(Predicate::parse("-type", Some("fd")), Err(FindError::InvalidType(_))));
        assert!(matches!(Predicate::parse("-type", Some("")), Err(FindError::InvalidType(_))));
        assert!(matches!(Predicate::parse("-type", None), Err(FindError::MissingArgument(_))));
    }

    #[test]
    fn type_compares_type_bits() {
        let dir = entry("d", libc::S_IFDIR as u32 | 0o755, 0, 0);
        assert!(match_type(&dir, EntryKind::Dir));
        assert!(!match_type(&dir, EntryKind::File));
        assert!(match_type(&file("f"), EntryKind::File));
    }

    #[test]
    fn user_by_name_and_by_id_agree() {
        let db = ids();
        let e = file("f");
        assert!(match_user(&e, "alice", &db));
        assert!(match_user(&e, "1000", &db));
        assert!(match_user(&e, "01750", &db));
        assert!(match_user(&e, "0x3e8", &db));
        assert!(!match_user(&e, "root", &db));
        assert!(!match_user(&e, "0", &db));
    }

    #[test]
    fn unknown_non_numeric_owner_matches_nothing() {
        let db = ids();
        let root_owned = entry("f", libc::S_IFREG as u32, 0, 0);
        assert!(!match_user(&root_owned, "nobody-here", &db));
        assert!(!match_group(&root_owned, "nobody-here", &db));
    }

    #[test]
    fn group_by_name_and_by_id() {
        let db = ids();
        let e = file("f");
        assert!(match_group(&e, "users", &db));
        assert!(match_group(&e, "100", &db));
        assert!(!match_group(&e, "wheel", &db));
    }

    #[test]
    fn nouser_and_nogroup_detect_orphans() {
        let db = ids();
        let owned = file("f");
        let orphan = entry("g", libc::S_IFREG as u32, 4242, 4242);
        assert!(!match_nouser(&owned, &db));
        assert!(!match_nogroup(&owned, &db));
        assert!(match_nouser(&orphan, &db));
        assert!(match_nogroup(&orphan, &db));
    }

    #[test]
    fn broken_database_does_not_claim_orphans() {
        let db = FakeIdentity {
            broken: true,
            ..ids()
        };
        let e = file("f");
        assert!(!match_nouser(&e, &db));
        // numeric fallback still works without the database
        assert!(match_user(&e, "1000", &db));
    }

    #[test]
    fn parse_id_accepts_strtol_bases() {
        assert_eq!(parse_id("0"), Some(0));
        assert_eq!(parse_id("42"), Some(42));
        assert_eq!(parse_id("010"), Some(8));
        assert_eq!(parse_id("0x1F"), Some(31));
        assert_eq!(parse_id("09"), None);
        assert_eq!(parse_id("12abc"), None);
        assert_eq!(parse_id("-1"), None);
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("0x"), None);
    }

    #[test]
    fn actions_do_not_test() {
        let db = ids();
        assert_eq!(Predicate::Print.test(&file("f"), &db), None);
        assert_eq!(Predicate::List.test(&file("f"), &db), None);
        assert_eq!(Predicate::NoUser.test(&file("f"), &db), Some(false));
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(matches!(
            Predicate::parse("-mtime", Some("1")),
            Err(FindError::UnknownPredicate(_))
        ));
    }
}
