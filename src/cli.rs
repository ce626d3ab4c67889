//! Command-line surface: raw token capture and the split into starting
//! paths and predicate chain.

use std::ffi::OsString;
use std::os::unix::ffi::OsStrExt;
use std::path::PathBuf;

use clap::Parser;
use tracing::debug;

use crate::chain::Chain;
use crate::error::FindError;

/// `pfind [path ...] [expression]`
///
/// find-style single-dash predicates are not clap options, so clap only
/// captures the tokens; [`Invocation::from_args`] gives them meaning.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pfind",
    about = "Walk directory trees and print entries selected by a predicate chain",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct CliArgs {
    /// Starting paths, then predicates: -type c, -name pat, -path pat,
    /// -user u, -group g, -nouser, -nogroup, -print, -ls
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, num_args = 0..)]
    pub args: Vec<OsString>,
}

/// What one command line asks for.
#[derive(Debug, Clone)]
pub struct Invocation {
    pub roots: Vec<PathBuf>,
    pub chain: Chain,
}

impl Invocation {
    /// Split `args` into starting paths (every leading token that does not
    /// begin with `-`) and the predicate chain (everything after).
    ///
    /// With no starting path, `.` is used. A `--` just before or just after
    /// the paths is an end-of-options marker and is dropped.
    pub fn from_args<I, S>(args: I) -> Result<Self, FindError>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut args = args.into_iter().map(Into::into).peekable();

        let mut roots = Vec::new();
        args.next_if(is_end_of_options);
        while let Some(arg) = args.next_if(|a: &OsString| !a.as_bytes().starts_with(b"-")) {
            roots.push(PathBuf::from(arg));
        }
        if roots.is_empty() {
            debug!("no starting path given, using \".\"");
            roots.push(PathBuf::from("."));
        }
        args.next_if(is_end_of_options);

        let tokens = args
            .map(|a| {
                a.into_string()
                    .map_err(|a| FindError::NonUtf8Argument(a.to_string_lossy().into_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        let chain = Chain::parse(tokens.as_slice())?;
        debug!(?chain, "parsed expression");

        Ok(Self { roots, chain })
    }
}

fn is_end_of_options(arg: &OsString) -> bool {
    arg == "--"
}

impl TryFrom<CliArgs> for Invocation {
    type Error = FindError;

    fn try_from(cli: CliArgs) -> Result<Self, Self::Error> {
        Self::from_args(cli.args)
    }
}
