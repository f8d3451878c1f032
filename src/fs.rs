//! @acp:module "Filesystem"
//! @acp:summary "Path removal helper used by the clean command"
//! @acp:domain cli
//! @acp:layer utility

use std::io;
use std::path::Path;

/// Remove `path` whatever it is.
///
/// Files and symlinks are unlinked (a symlink's target is left alone),
/// directories are removed recursively, a missing path is not an error.
pub fn remove_path(path: &Path) -> io::Result<()> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    let file_type = metadata.file_type();
    if file_type.is_file() || file_type.is_symlink() {
        std::fs::remove_file(path)
    } else if file_type.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a file or directory", path.display()),
        ))
    }
}
