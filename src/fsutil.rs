//! Small filesystem helpers for writing backup files without ever exposing a
//! half-written file under its final name.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Hidden temporary sibling of `dest` in the same directory.
///
/// The name never ends in the artifact suffix, so partial files are not
/// mistaken for series members.
pub fn temp_sibling(dest: &Path) -> PathBuf {
    let file_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let temp_name = format!(".{}.{}.partial", file_name, uuid::Uuid::new_v4().simple());
    match dest.parent() {
        Some(parent) => parent.join(temp_name),
        None => PathBuf::from(temp_name),
    }
}

/// Move `tmp` to `dest`, failing with `AlreadyExists` instead of replacing an
/// existing file. `tmp` is gone afterwards on every path.
pub fn persist_no_clobber(tmp: &Path, dest: &Path) -> io::Result<()> {
    let result = match fs::hard_link(tmp, dest) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(e),
        // Filesystems without hard links: best effort check then rename.
        Err(_) => {
            if dest.exists() {
                Err(io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    format!("{} already exists", dest.display()),
                ))
            } else {
                fs::rename(tmp, dest)
            }
        }
    };

    let _ = fs::remove_file(tmp);
    result
}

/// Write `data` to a new file at `dest` via a temporary sibling.
pub fn write_new(dest: &Path, data: &[u8]) -> io::Result<()> {
    if dest.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", dest.display()),
        ));
    }

    let tmp = temp_sibling(dest);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
    }
    persist_no_clobber(&tmp, dest)
}
