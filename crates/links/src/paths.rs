use std::path::{Component, Path, PathBuf};

/// Resolve a link target written in `from_file`
pub(crate) fn resolve_target(from_file: &Path, target: &str) -> PathBuf {
    let target = target.trim();
    let target = target.strip_prefix("file:").unwrap_or(target);
    let path = Path::new(target);
    if path.is_absolute() {
        return normalize(path);
    }
    let base = from_file.parent().unwrap_or_else(|| Path::new(""));
    normalize(&base.join(path))
}

/// Lexically drop `.` and resolve `..`
pub(crate) fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// `path` relative to `root`, `/`-separated, for reports
pub(crate) fn display_relative(root: &Path, path: &Path) -> String {
    let shown = path.strip_prefix(root).unwrap_or(path);
    shown.to_string_lossy().replace('\\', "/")
}
