//! ROM folder scanner
//!
//! Lists the regular files directly inside one folder (no recursion),
//! filtered by extension and sorted by name. Every requested folder is
//! resolved and confined to the configured base folder before anything is
//! read from disk.

use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Folder scanner errors
#[derive(Debug, Error)]
pub enum ScanError {
    /// Not an absolute, home-relative, drive or UNC path
    #[error("Invalid folder path format: {0}")]
    InvalidPath(String),

    /// Resolved path escapes the ROM base folder
    #[error("Access to the specified folder is not allowed: {0}")]
    AccessDenied(PathBuf),

    /// Specified path does not exist
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// Path exists but is not a directory
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// Directory could not be read
    #[error("Error scanning folder {0}: {1}")]
    Io(PathBuf, String),
}

/// Check the textual shape of a folder path
///
/// Accepts absolute Unix paths (`/…`), home-relative paths (`~…`), Windows
/// drive paths (`C:\…` or `C:/…`) and UNC shares (`\\server\share`).
pub fn is_valid_path_format(path: &str) -> bool {
    if path.starts_with('/') || path.starts_with('~') || path.starts_with("\\\\") {
        return true;
    }

    let bytes = path.as_bytes();
    bytes.len() >= 3
        && bytes[0].is_ascii_alphabetic()
        && bytes[1] == b':'
        && (bytes[2] == b'\\' || bytes[2] == b'/')
}

/// Trim, lowercase and strip one leading dot from each extension
///
/// Blank entries are dropped.
pub fn normalize_extensions<S: AsRef<str>>(extensions: &[S]) -> Vec<String> {
    extensions
        .iter()
        .map(|e| {
            let e = e.as_ref().trim().to_lowercase();
            e.strip_prefix('.').map(str::to_string).unwrap_or(e)
        })
        .filter(|e| !e.is_empty())
        .collect()
}

/// Collapse `.` and `..` without touching the filesystem
///
/// `..` never climbs above the root of an absolute path.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() && !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Folder scanner confined to one base folder
#[derive(Debug, Clone)]
pub struct FileScanner {
    base_root: PathBuf,
}

impl FileScanner {
    /// Create a scanner confined to `base_root`
    ///
    /// A relative base is taken against the current working directory.
    pub fn new(base_root: impl AsRef<Path>) -> Self {
        let base = base_root.as_ref();
        let absolute = if base.is_absolute() {
            base.to_path_buf()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(base))
                .unwrap_or_else(|_| base.to_path_buf())
        };

        Self {
            base_root: normalize_lexically(&absolute),
        }
    }

    pub fn base_root(&self) -> &Path {
        &self.base_root
    }

    /// Resolve a requested folder and enforce confinement
    ///
    /// `~` expands to the home directory, relative paths resolve against the
    /// base folder, and the result must sit at or below the base folder
    /// (component-wise, so `/roms2` is not inside `/roms`).
    pub fn resolve(&self, folder: &str) -> Result<PathBuf, ScanError> {
        let folder = folder.trim();
        if folder.is_empty() {
            return Err(ScanError::InvalidPath(folder.to_string()));
        }

        let requested = if folder == "~" || folder.starts_with("~/") || folder.starts_with("~\\") {
            let home = dirs::home_dir()
                .ok_or_else(|| ScanError::InvalidPath(folder.to_string()))?;
            let rest = folder[1..].trim_start_matches(['/', '\\']);
            home.join(rest)
        } else {
            let path = Path::new(folder);
            if path.is_absolute() {
                path.to_path_buf()
            } else {
                self.base_root.join(path)
            }
        };

        let resolved = normalize_lexically(&requested);
        if !resolved.starts_with(&self.base_root) {
            tracing::warn!(
                requested = %folder,
                resolved = %resolved.display(),
                base = %self.base_root.display(),
                "Rejected folder outside ROM base path"
            );
            return Err(ScanError::AccessDenied(resolved));
        }

        Ok(resolved)
    }

    /// List matching file names in `folder`
    ///
    /// `extensions` are normalised first; an empty set keeps every regular
    /// file. Output is sorted by file name so repeated scans are stable.
    pub fn scan<S: AsRef<str>>(&self, folder: &str, extensions: &[S]) -> Result<Vec<String>, ScanError> {
        let dir = self.resolve(folder)?;
        let extensions = normalize_extensions(extensions);

        if !dir.exists() {
            return Err(ScanError::PathNotFound(dir));
        }
        if !dir.is_dir() {
            return Err(ScanError::NotADirectory(dir));
        }

        let walker = WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(ScanError::Io(dir.clone(), e.to_string()));
                }
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if extensions.is_empty() || Self::has_extension(&name, &extensions) {
                files.push(name);
            }
        }

        tracing::debug!(folder = %dir.display(), files = files.len(), "Folder scanned");
        Ok(files)
    }

    fn has_extension(file_name: &str, extensions: &[String]) -> bool {
        Path::new(file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .map_or(false, |ext| extensions.iter().any(|e| *e == ext))
    }
}
