//! Path normalization for cache keys

use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Replace a leading `~` with the home directory
pub fn expand_user(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match env::var_os("HOME").or_else(|| env::var_os("USERPROFILE")) {
        Some(home) => PathBuf::from(home).join(rest),
        None => path.to_path_buf(),
    }
}

/// Absolute, user-expanded, canonical form of a path
///
/// Fails with `NotFound` when the file does not exist.
pub fn normalize(path: &Path) -> io::Result<PathBuf> {
    let expanded = expand_user(path);
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        env::current_dir()?.join(expanded)
    };
    absolute.canonicalize()
}
