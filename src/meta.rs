//! Link-aware stat and the system user/group databases.

use std::path::Path;

use nix::unistd::{Gid, Group, Uid, User};

use crate::entry::Metadata;
use crate::error::FindError;
use crate::traits::IdentityDb;

/// Stat `path` without following a trailing symlink.
pub fn stat(path: &Path) -> Result<Metadata, FindError> {
    std::fs::symlink_metadata(path)
        .map(|m| Metadata::from(&m))
        .map_err(|e| FindError::from_io(path.to_path_buf(), e))
}

/// The host's passwd and group databases, via `getpw*_r`/`getgr*_r`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemIdentity;

fn lookup_error(what: &'static str, key: impl ToString, err: nix::Error) -> FindError {
    FindError::Lookup {
        what,
        key: key.to_string(),
        reason: err.desc().to_string(),
    }
}

impl IdentityDb for SystemIdentity {
    fn user_name(&self, uid: u32) -> Result<Option<String>, FindError> {
        User::from_uid(Uid::from_raw(uid))
            .map(|u| u.map(|u| u.name))
            .map_err(|e| lookup_error("user", uid, e))
    }

    fn user_id(&self, name: &str) -> Result<Option<u32>, FindError> {
        User::from_name(name)
            .map(|u| u.map(|u| u.uid.as_raw()))
            .map_err(|e| lookup_error("user", name, e))
    }

    fn group_name(&self, gid: u32) -> Result<Option<String>, FindError> {
        Group::from_gid(Gid::from_raw(gid))
            .map(|g| g.map(|g| g.name))
            .map_err(|e| lookup_error("group", gid, e))
    }

    fn group_id(&self, name: &str) -> Result<Option<u32>, FindError> {
        Group::from_name(name)
            .map(|g| g.map(|g| g.gid.as_raw()))
            .map_err(|e| lookup_error("group", name, e))
    }
}
