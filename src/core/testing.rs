use std::fs::{self, Permissions};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// A directory holding one image with all permission bits cleared.
///
/// Permissions are restored on drop so the enclosing `TempDir` can be removed.
pub(crate) struct LockedDir {
    path: PathBuf,
}

impl LockedDir {
    /// Returns `None` when the process can still list the directory after
    /// locking it, which is the case when running as root.
    pub(crate) fn create(path: &Path) -> Option<Self> {
        fs::create_dir_all(path).unwrap();
        fs::write(path.join("hidden.png"), b"hidden").unwrap();
        fs::set_permissions(path, Permissions::from_mode(0o000)).unwrap();

        let locked = Self {
            path: path.to_path_buf(),
        };
        if fs::read_dir(path).is_ok() {
            return None;
        }
        Some(locked)
    }
}

impl Drop for LockedDir {
    fn drop(&mut self) {
        let _ = fs::set_permissions(&self.path, Permissions::from_mode(0o755));
    }
}
