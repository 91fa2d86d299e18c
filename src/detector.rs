use std::path::{Path, PathBuf};

/// Walk up from `path` to the nearest directory that contains a `go.mod`.
pub fn find_module_root(path: &Path) -> Option<PathBuf> {
    let mut dir = path.to_path_buf();
    loop {
        if dir.join("go.mod").is_file() {
            return Some(dir);
        }
        if !dir.pop() {
            return None;
        }
    }
}
