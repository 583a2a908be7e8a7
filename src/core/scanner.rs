use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Extensions treated as images when no other list is configured.
pub const DEFAULT_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "webp", "bmp", "avif"];

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Invalid scan root {}: {reason}", path.display())]
    InvalidRoot { path: PathBuf, reason: String },

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// True if `path` carries one of the default image extensions (case-insensitive).
pub fn is_image(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| DEFAULT_EXTENSIONS.contains(&ext.as_str()))
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
}

/// Recursively enumerates image files below a root directory.
///
/// Symlinks are not followed, so link cycles cannot trap the walk. Entries
/// are visited in file-name order.
#[derive(Debug, Clone)]
pub struct Scanner {
    root: PathBuf,
    extensions: HashSet<String>,
}

impl Scanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }

    /// Replace the extension allow-list. Leading dots and case are ignored,
    /// and empty entries are dropped so `notes.` never counts as an image.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_supported_format(&self, path: &Path) -> bool {
        extension_of(path).is_some_and(|ext| self.extensions.contains(&ext))
    }

    /// Start a new traversal. Each call walks the tree again from scratch.
    pub fn scan(&self) -> ImagePaths<'_> {
        match absolute_root(&self.root) {
            Ok(root) => ImagePaths {
                scanner: self,
                walker: Some(
                    WalkDir::new(root)
                        .follow_links(false)
                        .sort_by_file_name()
                        .into_iter(),
                ),
                pending: None,
            },
            Err(e) => ImagePaths {
                scanner: self,
                walker: None,
                pending: Some(e),
            },
        }
    }
}

fn absolute_root(root: &Path) -> Result<PathBuf, ScanError> {
    let invalid = |reason: String| ScanError::InvalidRoot {
        path: root.to_path_buf(),
        reason,
    };

    let absolute = if root.is_absolute() {
        root.to_path_buf()
    } else {
        std::env::current_dir()
            .map_err(|e| invalid(e.to_string()))?
            .join(root)
    };

    if !absolute.exists() {
        return Err(invalid("does not exist".to_string()));
    }
    if !absolute.is_dir() {
        return Err(invalid("not a directory".to_string()));
    }
    Ok(absolute)
}

/// One lazy traversal produced by [`Scanner::scan`].
pub struct ImagePaths<'a> {
    scanner: &'a Scanner,
    walker: Option<walkdir::IntoIter>,
    pending: Option<ScanError>,
}

impl Iterator for ImagePaths<'_> {
    type Item = Result<PathBuf, ScanError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.pending.take() {
            return Some(Err(e));
        }

        let walker = self.walker.as_mut()?;
        loop {
            match walker.next()? {
                Ok(entry) => {
                    if entry.file_type().is_file() && self.scanner.is_supported_format(entry.path())
                    {
                        return Some(Ok(entry.into_path()));
                    }
                }
                Err(e) => return Some(Err(ScanError::Walk(e))),
            }
        }
    }
}
