//! Filesystem mutations behind a trait for dependency injection.
//!
//! Executors only ever create directories, create symlinks and remove
//! symlinks. Routing those three calls through [`FileSystemOps`] lets the
//! executors be unit-tested with `MockFileSystemOps`, including failure
//! paths that are awkward to provoke on a real filesystem. Production code
//! uses [`SystemFileSystemOps`].

use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::Path;

/// Mutating filesystem calls used by executors.
pub trait FileSystemOps: Debug {
    /// Create `path` and any missing parents with permission bits `mode`.
    ///
    /// Succeeds when the directory already exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a component cannot be created.
    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()>;

    /// Create a symbolic link at `link` pointing to `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if `link` already exists or cannot be created.
    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()>;

    /// Remove the symbolic link at `path` without touching its target.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is not a symlink or cannot be removed.
    fn remove_symlink(&self, path: &Path) -> io::Result<()>;
}

/// Production [`FileSystemOps`] implementation that delegates to [`std::fs`].
#[derive(Debug, Default)]
pub struct SystemFileSystemOps;

impl FileSystemOps for SystemFileSystemOps {
    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(mode);
        }
        #[cfg(not(unix))]
        let _ = mode;
        builder.create(path)
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(target, link)
        }

        #[cfg(windows)]
        {
            if target.is_dir() {
                std::os::windows::fs::symlink_dir(target, link)
            } else {
                std::os::windows::fs::symlink_file(target, link)
            }
        }
    }

    fn remove_symlink(&self, path: &Path) -> io::Result<()> {
        let meta = fs::symlink_metadata(path)?;
        if !meta.file_type().is_symlink() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing to remove non-symlink {}", path.display()),
            ));
        }
        if is_dir_like(&meta) {
            fs::remove_dir(path)
        } else {
            fs::remove_file(path)
        }
    }
}

/// Check if metadata represents a directory-like entry.
/// On Windows, directory symlinks carry the `FILE_ATTRIBUTE_DIRECTORY` bit
/// and must be removed with `remove_dir`.
fn is_dir_like(meta: &fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}

/// One call recorded by `MockFileSystemOps`.
#[cfg(test)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    /// `create_dir_all(path, mode)`
    CreateDirAll(std::path::PathBuf, u32),
    /// `symlink(target, link)`
    Symlink(std::path::PathBuf, std::path::PathBuf),
    /// `remove_symlink(path)`
    RemoveSymlink(std::path::PathBuf),
}

/// Mock [`FileSystemOps`] for unit tests.
///
/// Every call is recorded in order and succeeds unless its path was
/// registered with [`fail_on`](Self::fail_on).
///
/// # Example
///
/// ```ignore
/// let fs = MockFileSystemOps::new().fail_on("/dest/B");
/// // ... run an executor against `fs` ...
/// assert_eq!(fs.calls().len(), 2);
/// ```
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MockFileSystemOps {
    failing: std::collections::HashSet<std::path::PathBuf>,
    calls: std::sync::Mutex<Vec<Call>>,
}

#[cfg(test)]
#[allow(clippy::expect_used)]
impl MockFileSystemOps {
    /// Create a mock where every call succeeds.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make any call whose link or directory path is `path` fail.
    #[must_use]
    pub fn fail_on(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.failing.insert(path.into());
        self
    }

    /// Calls recorded so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("mock call log poisoned").clone()
    }

    fn record(&self, call: Call, path: &Path) -> io::Result<()> {
        self.calls.lock().expect("mock call log poisoned").push(call);
        if self.failing.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "mock: permission denied",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
impl FileSystemOps for MockFileSystemOps {
    fn create_dir_all(&self, path: &Path, mode: u32) -> io::Result<()> {
        self.record(Call::CreateDirAll(path.to_path_buf(), mode), path)
    }

    fn symlink(&self, target: &Path, link: &Path) -> io::Result<()> {
        self.record(Call::Symlink(target.to_path_buf(), link.to_path_buf()), link)
    }

    fn remove_symlink(&self, path: &Path) -> io::Result<()> {
        self.record(Call::RemoveSymlink(path.to_path_buf()), path)
    }
}
