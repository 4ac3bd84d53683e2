//! Filesystem path utilities.
//!
//! Small helpers shared by the include and generation layers: glob
//! expansion, filename extension parsing, and the scoped working-directory
//! guard the write engine relies on for per-directory relative resolution.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Paths matching a glob pattern, evaluated against the current working
/// directory. Recursive `**` patterns are supported.
///
/// The returned iterator is lazy and finite; a fresh call re-evaluates the
/// filesystem. Unreadable entries are skipped.
pub fn paths(pattern: &str) -> Result<impl Iterator<Item = PathBuf>, glob::PatternError> {
    Ok(glob::glob(pattern)?.filter_map(Result::ok))
}

/// The extension of a file name, if it has one.
///
/// The substring after the last `.` counts as an extension only when both
/// sides of the split are non-empty: dotfiles like `.gitignore` and
/// trailing-dot names have no extension.
pub fn extension(file_name: &str) -> Option<&str> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        None
    } else {
        Some(ext)
    }
}

/// A file name with its extension removed, under the same rules as
/// [`extension`]: names without a real extension come back unchanged.
pub fn strip_extension(file_name: &str) -> &str {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => stem,
        _ => file_name,
    }
}

/// Write `content` to `path`, creating parent directories as needed.
pub fn create_file(path: impl AsRef<Path>, content: &str) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)
}

/// Scoped change of the process working directory.
///
/// The previous directory is restored when the guard drops, on every exit
/// path. The working directory is process-global state: hold at most one
/// guard at a time, which the write engine guarantees by running one
/// cwd-group after another.
#[must_use]
pub struct WorkingDir {
    previous: PathBuf,
}

impl WorkingDir {
    /// Change into `dir`, remembering the current directory.
    pub fn change(dir: impl AsRef<Path>) -> io::Result<Self> {
        let previous = std::env::current_dir()?;
        std::env::set_current_dir(dir)?;
        Ok(Self { previous })
    }
}

impl Drop for WorkingDir {
    fn drop(&mut self) {
        // Nothing sensible to do if the previous directory is gone.
        let _ = std::env::set_current_dir(&self.previous);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_of_regular_name() {
        assert_eq!(extension("style.css"), Some("css"));
        assert_eq!(extension("archive.tar.gz"), Some("gz"));
    }

    #[test]
    fn extension_of_dotfile_is_none() {
        assert_eq!(extension(".gitignore"), None);
    }

    #[test]
    fn extension_of_trailing_dot_is_none() {
        assert_eq!(extension("weird."), None);
    }

    #[test]
    fn extension_without_dot_is_none() {
        assert_eq!(extension("README"), None);
    }

    #[test]
    fn strip_extension_of_regular_name() {
        assert_eq!(strip_extension("index.html"), "index");
        assert_eq!(strip_extension("archive.tar.gz"), "archive.tar");
    }

    #[test]
    fn strip_extension_leaves_dotfiles_alone() {
        assert_eq!(strip_extension(".gitignore"), ".gitignore");
        assert_eq!(strip_extension("weird."), "weird.");
        assert_eq!(strip_extension("README"), "README");
    }

    #[test]
    fn paths_expands_recursive_patterns() {
        let tmp = tempfile::TempDir::new().unwrap();
        create_file(tmp.path().join("a.txt"), "a").unwrap();
        create_file(tmp.path().join("sub/b.txt"), "b").unwrap();
        create_file(tmp.path().join("sub/c.md"), "c").unwrap();

        let pattern = format!("{}/**/*.txt", tmp.path().display());
        let mut found: Vec<PathBuf> = paths(&pattern).unwrap().collect();
        found.sort();

        assert_eq!(
            found,
            vec![tmp.path().join("a.txt"), tmp.path().join("sub/b.txt")]
        );
    }

    #[test]
    fn paths_rejects_malformed_patterns() {
        assert!(paths("[").is_err());
    }

    #[test]
    fn create_file_builds_parent_directories() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("deeply/nested/file.txt");
        create_file(&path, "hello").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
    }
}
