//! Project-relative paths are always handled in POSIX form (`/` separated, case sensitive),
//! whatever the host platform. Source identities and ignore matching both rely on it.

/// Normalize a user supplied relative path: backslashes become `/`, `./` prefixes and
/// trailing separators are dropped, empty segments collapse.
pub fn normalize_relative(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Join a child name onto a POSIX relative directory path.
pub fn join_posix(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// Whether `path` lies strictly below `dir`.
pub fn is_descendant(path: &str, dir: &str) -> bool {
    if dir.is_empty() {
        return !path.is_empty();
    }
    path.len() > dir.len() && path.starts_with(dir) && path.as_bytes()[dir.len()] == b'/'
}
