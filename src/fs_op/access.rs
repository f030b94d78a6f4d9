//! Permission, ownership and access checks on Unix.
//!
//! The `is_*` predicates ask the kernel via `access(2)` so they reflect the
//! effective rights of the calling process rather than just the mode bits.

use std::fs;
use std::os::unix::fs::{MetadataExt, PermissionsExt};
use std::path::Path;

use nix::unistd::{access, AccessFlags, Gid, Group, Uid, User};

use super::error::InspectError;

fn check(path: &Path, file_mode: AccessFlags, dir_mode: AccessFlags) -> bool {
    match fs::metadata(path) {
        Ok(md) if md.is_dir() => access(path, dir_mode).is_ok(),
        Ok(md) if md.is_file() => access(path, file_mode).is_ok(),
        _ => false,
    }
}

/// Readable file, or a directory that can be listed and entered.
pub fn is_readable<P: AsRef<Path>>(path: P) -> bool {
    check(
        path.as_ref(),
        AccessFlags::R_OK,
        AccessFlags::R_OK | AccessFlags::X_OK,
    )
}

pub fn is_writable<P: AsRef<Path>>(path: P) -> bool {
    check(
        path.as_ref(),
        AccessFlags::R_OK | AccessFlags::W_OK,
        AccessFlags::R_OK | AccessFlags::W_OK | AccessFlags::X_OK,
    )
}

/// Only regular files count as executable.
pub fn is_executable<P: AsRef<Path>>(path: P) -> bool {
    let p = path.as_ref();
    p.is_file() && access(p, AccessFlags::R_OK | AccessFlags::X_OK).is_ok()
}

/// Permission bits of a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permissions {
    /// Mode bits including setuid/setgid/sticky (`st_mode & 0o7777`).
    pub mode: u32,
}

impl Permissions {
    /// Owner/group/other bits as three octal digits, e.g. `"644"`.
    pub fn octal(&self) -> String {
        format!("{:03o}", self.mode & 0o777)
    }

    /// `ls`-style rendering of the owner/group/other bits, e.g. `"rw-r--r--"`.
    pub fn symbolic(&self) -> String {
        let mut out = String::with_capacity(9);
        for shift in [6u32, 3, 0] {
            let bits = (self.mode >> shift) & 0o7;
            out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
            out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
            out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
        }
        out
    }
}

pub fn permissions<P: AsRef<Path>>(path: P) -> Result<Permissions, InspectError> {
    let p = path.as_ref();
    let md = fs::metadata(p).map_err(|e| InspectError::from_io(p, e))?;
    Ok(Permissions {
        mode: md.permissions().mode() & 0o7777,
    })
}

/// Owner and group of a path. Names are `None` when the id has no entry in
/// the user/group database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ownership {
    pub uid: u32,
    pub gid: u32,
    pub user: Option<String>,
    pub group: Option<String>,
}

pub fn ownership<P: AsRef<Path>>(path: P) -> Result<Ownership, InspectError> {
    let p = path.as_ref();
    let md = fs::metadata(p).map_err(|e| InspectError::from_io(p, e))?;
    let (uid, gid) = (md.uid(), md.gid());
    let user = User::from_uid(Uid::from_raw(uid)).ok().flatten().map(|u| u.name);
    let group = Group::from_gid(Gid::from_raw(gid)).ok().flatten().map(|g| g.name);
    Ok(Ownership {
        uid,
        gid,
        user,
        group,
    })
}
