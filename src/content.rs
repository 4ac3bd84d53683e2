//! The content capability and the built-in copy variants.
//!
//! Everything a site can emit goes through one narrow interface:
//! [`Content`]. The engine never inspects what a renderer does internally;
//! it only asks content to expand into write tasks and, later, to write
//! itself to a target path. [`FileCopy`] and [`DirectoryCopy`] are the two
//! copy-type variants the include layer produces for plain filesystem
//! sources; rendered documents and nested sites implement the same trait.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use walkdir::WalkDir;

use crate::generation::{GenContext, GenTask};

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("render failed: {0}")]
    Render(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ContentError {
    /// Wrap an opaque renderer error.
    pub fn render(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Render(Box::new(err))
    }
}

impl From<walkdir::Error> for ContentError {
    fn from(err: walkdir::Error) -> Self {
        Self::Io(err.into())
    }
}

/// A unit of output-producing logic: a copied file, a rendered document,
/// a nested site.
///
/// Implementations fall into two camps:
///
/// - leaf content expands to exactly one task targeting `out/<location>`;
/// - container content ([`DirectoryCopy`], a nested [`Site`]) expands to
///   one task per file it will produce.
///
/// [`write`] runs with the working directory set to the one captured when
/// the content was included, so relative source paths resolve the way they
/// did at include time.
///
/// [`write`]: Content::write
/// [`Site`]: crate::Site
pub trait Content: Send + Sync + 'static {
    /// Render this content to `path`. The parent directory already exists.
    fn write(&self, path: &Path, ctx: &GenContext<'_>) -> Result<(), ContentError>;

    /// Expand this content into concrete write tasks rooted at `target`.
    ///
    /// Leaf content returns `GenTask::single(self, target, cwd)`.
    fn make_tasks(
        self: Arc<Self>,
        target: PathBuf,
        cwd: &Path,
        ctx: &GenContext<'_>,
    ) -> Result<Vec<GenTask>, ContentError>;
}

/// Wrap a filesystem path in the matching copy content: directories become
/// a [`DirectoryCopy`], everything else a [`FileCopy`].
pub fn copy(source: impl Into<PathBuf>) -> Arc<dyn Content> {
    let source = source.into();
    if source.is_dir() {
        Arc::new(DirectoryCopy::new(source))
    } else {
        Arc::new(FileCopy::new(source))
    }
}

/// Copies a single file to its target location.
///
/// A relative source path stays relative and resolves against the
/// cwd-group's working directory at write time.
#[derive(Debug, Clone)]
pub struct FileCopy {
    source: PathBuf,
}

impl FileCopy {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl Content for FileCopy {
    fn write(&self, path: &Path, _ctx: &GenContext<'_>) -> Result<(), ContentError> {
        fs::copy(&self.source, path)?;
        Ok(())
    }

    fn make_tasks(
        self: Arc<Self>,
        target: PathBuf,
        cwd: &Path,
        _ctx: &GenContext<'_>,
    ) -> Result<Vec<GenTask>, ContentError> {
        Ok(GenTask::single(self, target, cwd))
    }
}

/// Recursively copies a directory, expanding into one task per file found
/// under the source tree. Subdirectory structure is preserved at the
/// target.
#[derive(Debug, Clone)]
pub struct DirectoryCopy {
    source: PathBuf,
}

impl DirectoryCopy {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }
}

impl Content for DirectoryCopy {
    /// Copy the whole tree in one go.
    ///
    /// The engine never calls this: planning expands a directory copy into
    /// per-file tasks via [`make_tasks`](Content::make_tasks). It exists so
    /// a directory copy used outside the engine still behaves.
    fn write(&self, path: &Path, _ctx: &GenContext<'_>) -> Result<(), ContentError> {
        for entry in WalkDir::new(&self.source) {
            let entry = entry?;
            let rel = entry
                .path()
                .strip_prefix(&self.source)
                .expect("walkdir yields paths under its root");
            let out = path.join(rel);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&out)?;
            } else {
                if let Some(parent) = out.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::copy(entry.path(), &out)?;
            }
        }
        Ok(())
    }

    fn make_tasks(
        self: Arc<Self>,
        target: PathBuf,
        cwd: &Path,
        _ctx: &GenContext<'_>,
    ) -> Result<Vec<GenTask>, ContentError> {
        // Walk under the include-time cwd so planning does not depend on
        // the process working directory.
        let root = if self.source.is_absolute() {
            self.source.clone()
        } else {
            cwd.join(&self.source)
        };
        let mut tasks = Vec::new();
        for entry in WalkDir::new(&root) {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let rel = entry
                .path()
                .strip_prefix(&root)
                .expect("walkdir yields paths under its root");
            tasks.push(GenTask::new(
                Arc::new(FileCopy::new(entry.path())),
                target.join(rel),
                cwd,
            ));
        }
        Ok(tasks)
    }
}
