use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};

const S_IFMT: u32 = libc::S_IFMT as u32;
const S_IFBLK: u32 = libc::S_IFBLK as u32;
const S_IFCHR: u32 = libc::S_IFCHR as u32;
const S_IFDIR: u32 = libc::S_IFDIR as u32;
const S_IFIFO: u32 = libc::S_IFIFO as u32;
const S_IFREG: u32 = libc::S_IFREG as u32;
const S_IFLNK: u32 = libc::S_IFLNK as u32;
const S_IFSOCK: u32 = libc::S_IFSOCK as u32;

/// A single filesystem object visited during traversal.
///
/// Built by the walker once per visit and dropped after the predicate chain
/// has run; nothing about it outlives one pass.
#[derive(Debug, Clone)]
pub struct Entry {
    /// The path as it will be printed: the root as given, children joined
    /// beneath it.
    pub path: PathBuf,

    /// Text after the last `/` of `path`, or the whole path if it has none.
    pub name: String,

    /// What kind of entry this is, decoded from the mode's type bits.
    pub kind: EntryKind,

    /// How deep in the traversal this entry was found. Root = 0.
    pub depth: usize,

    /// Link-aware metadata, fetched once when the entry was visited.
    pub metadata: Metadata,
}

impl Entry {
    pub fn new(path: PathBuf, depth: usize, metadata: Metadata) -> Self {
        let name = last_segment(&path);
        Self {
            kind: metadata.kind(),
            path,
            name,
            depth,
            metadata,
        }
    }
}

/// The final `/`-separated segment of a path, taken on raw bytes so that
/// `dir/` yields an empty segment and `.` yields `.`.
pub fn last_segment(path: &Path) -> String {
    let bytes = path.as_os_str().as_bytes();
    let tail = match bytes.iter().rposition(|&b| b == b'/') {
        Some(i) => &bytes[i + 1..],
        None => bytes,
    };
    String::from_utf8_lossy(tail).into_owned()
}

/// The POSIX file type of a traversed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    /// A regular file.
    File,

    /// A directory.
    Dir,

    /// A symbolic link (never followed).
    Symlink,

    /// A block special device.
    BlockDevice,

    /// A character special device.
    CharDevice,

    /// A named pipe.
    Fifo,

    /// A unix domain socket.
    Socket,

    /// Type bits that match none of the above.
    Unknown,
}

impl EntryKind {
    /// Decode the `S_IFMT` bits of a raw `st_mode`.
    pub fn from_mode(mode: u32) -> Self {
        match mode & S_IFMT {
            S_IFREG => Self::File,
            S_IFDIR => Self::Dir,
            S_IFLNK => Self::Symlink,
            S_IFBLK => Self::BlockDevice,
            S_IFCHR => Self::CharDevice,
            S_IFIFO => Self::Fifo,
            S_IFSOCK => Self::Socket,
            _ => Self::Unknown,
        }
    }

    /// Map a `-type` argument character to the kind it selects.
    pub fn from_type_code(code: char) -> Option<Self> {
        match code {
            'b' => Some(Self::BlockDevice),
            'c' => Some(Self::CharDevice),
            'd' => Some(Self::Dir),
            'p' => Some(Self::Fifo),
            'f' => Some(Self::File),
            'l' => Some(Self::Symlink),
            's' => Some(Self::Socket),
            _ => None,
        }
    }

    /// Leading character of the listing's permission string.
    pub fn mode_char(self) -> char {
        match self {
            Self::File | Self::Unknown => '-',
            Self::Dir => 'd',
            Self::Symlink => 'l',
            Self::BlockDevice => 'b',
            Self::CharDevice => 'c',
            Self::Fifo => 'p',
            Self::Socket => 's',
        }
    }

    pub fn is_dir(self) -> bool {
        self == Self::Dir
    }
}

/// The stat fields the predicates and the extended listing consume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Raw `st_mode`: type bits and permission bits.
    pub mode: u32,
    pub uid: u32,
    pub gid: u32,
    pub nlink: u64,
    /// Size in bytes.
    pub size: u64,
    pub ino: u64,
    /// Allocated blocks in 512-byte units.
    pub blocks: u64,
    /// Modification time, seconds since the epoch.
    pub mtime: i64,
}

impl Metadata {
    pub fn kind(&self) -> EntryKind {
        EntryKind::from_mode(self.mode)
    }
}

impl From<&std::fs::Metadata> for Metadata {
    fn from(m: &std::fs::Metadata) -> Self {
        Self {
            mode: m.mode(),
            uid: m.uid(),
            gid: m.gid(),
            nlink: m.nlink(),
            size: m.size(),
            ino: m.ino(),
            blocks: m.blocks(),
            mtime: m.mtime(),
        }
    }
}
