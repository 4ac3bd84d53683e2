//! The include registry: an ordered, duplicate-checked mapping from
//! site-relative output locations to content.
//!
//! This module enforces the single most important invariant of the whole
//! engine: within one site, output locations are unique. Two different
//! source items can never be scheduled to write the same output path,
//! which is what lets the write phase run without any locking on the
//! output tree.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::content::Content;

#[derive(Error, Debug)]
pub enum IncludeError {
    /// Output locations are always site-relative.
    #[error("absolute paths cannot be included; locations are site-relative")]
    AbsolutePathIncluded,
    /// A second item was registered at an already-taken location.
    #[error("duplicate include at location: {0}")]
    Duplicate(String),
    /// An include pattern matched nothing, or a named source is missing.
    #[error("no files found at: {0}")]
    NotFound(String),
    #[error("invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A content item bound to its site-relative output location and the
/// working directory captured at the moment of inclusion.
///
/// The cwd matters because template and markdown sources resolve relative
/// to the caller's directory at include time, which can differ across
/// nested sub-sites. Immutable once created.
#[derive(Clone)]
pub struct IncludedContent {
    location: String,
    content: Arc<dyn Content>,
    cwd: PathBuf,
}

impl IncludedContent {
    pub(crate) fn new(location: String, content: Arc<dyn Content>, cwd: PathBuf) -> Self {
        Self {
            location,
            content,
            cwd,
        }
    }

    /// Site-relative output location, forward-slash separated.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn content(&self) -> &Arc<dyn Content> {
        &self.content
    }

    /// Working directory captured when this content was included.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }
}

impl fmt::Debug for IncludedContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncludedContent")
            .field("location", &self.location)
            .field("cwd", &self.cwd)
            .finish_non_exhaustive()
    }
}

/// Ordered mapping from location to included content, owned by exactly
/// one site. Iteration preserves insertion order.
#[derive(Default, Clone)]
pub struct Includes {
    entries: Vec<IncludedContent>,
}

impl Includes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item, rejecting locations that are already taken.
    pub fn add(&mut self, item: IncludedContent) -> Result<(), IncludeError> {
        if self.contains(item.location()) {
            return Err(IncludeError::Duplicate(item.location().to_string()));
        }
        self.entries.push(item);
        Ok(())
    }

    pub fn contains(&self, location: &str) -> bool {
        self.entries.iter().any(|e| e.location() == location)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IncludedContent> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Includes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|e| e.location()))
            .finish()
    }
}
