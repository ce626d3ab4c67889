//! Output lines: bare paths and the `-ls` extended listing.

use std::fmt;
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;

use chrono::{DateTime, Local, TimeZone};
use tracing::warn;

use crate::entry::{Entry, EntryKind};
use crate::error::FindError;
use crate::traits::IdentityDb;

const PERMISSION_BITS: [(u32, char); 9] = [
    (libc::S_IRUSR as u32, 'r'),
    (libc::S_IWUSR as u32, 'w'),
    (libc::S_IXUSR as u32, 'x'),
    (libc::S_IRGRP as u32, 'r'),
    (libc::S_IWGRP as u32, 'w'),
    (libc::S_IXGRP as u32, 'x'),
    (libc::S_IROTH as u32, 'r'),
    (libc::S_IWOTH as u32, 'w'),
    (libc::S_IXOTH as u32, 'x'),
];

/// Render the ten-character `drwxr-xr-x` style mode string.
///
/// Setuid, setgid and sticky bits are not shown.
pub fn permission_string(mode: u32) -> String {
    let mut s = String::with_capacity(10);
    s.push(EntryKind::from_mode(mode).mode_char());
    for (bit, glyph) in PERMISSION_BITS {
        s.push(if mode & bit != 0 { glyph } else { '-' });
    }
    s
}

/// `Mon DD HH:MM` in local time, day padded with a space.
pub fn format_mtime(secs: i64) -> String {
    match DateTime::from_timestamp(secs, 0) {
        Some(utc) => render_time(&utc.with_timezone(&Local)),
        None => secs.to_string(),
    }
}

fn render_time<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: fmt::Display,
{
    t.format("%b %e %H:%M").to_string()
}

/// Write the entry's path and a newline.
pub fn print_path<W: Write + ?Sized>(out: &mut W, entry: &Entry) -> io::Result<()> {
    out.write_all(entry.path.as_os_str().as_bytes())?;
    out.write_all(b"\n")
}

/// Write one extended listing line:
/// inode, 1K blocks, mode, links, owner, group, size, mtime, path.
///
/// Owners missing from the identity database are shown as numeric ids.
pub fn print_listing<W: Write + ?Sized>(
    out: &mut W,
    entry: &Entry,
    ids: &dyn IdentityDb,
) -> io::Result<()> {
    let m = &entry.metadata;
    let user = owner_name(ids.user_name(m.uid), m.uid);
    let group = owner_name(ids.group_name(m.gid), m.gid);

    write!(
        out,
        "{:>7} {:>5} {} {:>3} {:<8} {:<8} {:>12} {} ",
        m.ino,
        m.blocks / 2,
        permission_string(m.mode),
        m.nlink,
        user,
        group,
        m.size,
        format_mtime(m.mtime),
    )?;
    print_path(out, entry)
}

fn owner_name(lookup: Result<Option<String>, FindError>, id: u32) -> String {
    match lookup {
        Ok(Some(name)) => name,
        Ok(None) => id.to_string(),
        Err(err) => {
            warn!("{err}");
            id.to_string()
        }
    }
}
