//! Path helpers shared by the parser adapter and the resolvers.

use std::path::{Component, Path, PathBuf};

/// Collapse `.`, `..`, and redundant separators without touching the
/// filesystem. Unlike `std::fs::canonicalize` this neither requires the
/// path to exist nor resolves symlinks, so normalized paths compare
/// consistently across parsed and folded sources.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = path.components().peekable();
    let mut ret = if let Some(c @ Component::Prefix(..)) = components.peek() {
        let buf = PathBuf::from(c.as_os_str());
        components.next();
        buf
    } else {
        PathBuf::new()
    };

    for component in components {
        match component {
            Component::Prefix(..) => unreachable!("prefix handled above"),
            Component::RootDir => ret.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                ret.pop();
            }
            Component::Normal(c) => ret.push(c),
        }
    }
    ret
}

/// Absolute, normalized form of `path`, resolved against the current
/// working directory when relative.
pub fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path(path)
    } else {
        match std::env::current_dir() {
            Ok(cwd) => normalize_path(&cwd.join(path)),
            Err(_) => normalize_path(path),
        }
    }
}
