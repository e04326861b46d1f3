use std::path::{Path, PathBuf};

/// Marker directory of a quad project.
pub const QUAD_DIR: &str = ".quad";

/// Walk upwards from `start` until a `.quad` directory is found.
#[must_use]
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(QUAD_DIR).is_dir() {
            return Some(current);
        }
        if !current.pop() {
            return None;
        }
    }
}
