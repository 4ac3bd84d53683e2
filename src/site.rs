//! The root aggregate: a site is a collection of included content plus
//! the base URL it will be served from.
//!
//! A [`Site`] is itself a [`Content`], so sites nest: including a site
//! under a location renders its whole registry into that subdirectory,
//! flattened into the top-level generation run.

use std::fmt;
use std::fs;
use std::ops::Div;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;
use thiserror::Error;
use url::Url;

use crate::content::{self, Content, ContentError};
use crate::files;
use crate::generation::{self, GenContext, GenTask, GenerateError};
use crate::include::{IncludeError, IncludedContent, Includes};

#[derive(Error, Debug)]
pub enum SiteUrlError {
    /// Not an absolute URL, typically a missing scheme.
    #[error("invalid site URL: {0}")]
    Parse(#[from] url::ParseError),
    #[error("site URL ({0}) must end with a forward slash (/)")]
    MissingTrailingSlash(String),
}

/// A static site for generation: a base URL, an optional title, and an
/// ordered registry of included content.
///
/// ```no_run
/// use lightfold::{MarkdownPage, Site, Sitemap};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let mut site = Site::new("https://example.org/")?;
///     site.include_content("index.html", MarkdownPage::new("pages/index.md"))?;
///     site.include_content("sitemap.xml", Sitemap::new())?;
///     site.include("img")?;
///     site.generate("out")?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Site {
    url: Url,
    title: Option<String>,
    content: Includes,
}

impl Site {
    /// Create a site served from `url`.
    ///
    /// The URL must be absolute (scheme included) and end with a forward
    /// slash; both are checked here, not deferred to generation time.
    pub fn new(url: &str) -> Result<Self, SiteUrlError> {
        if !url.ends_with('/') {
            return Err(SiteUrlError::MissingTrailingSlash(url.to_string()));
        }
        let url = Url::parse(url)?;
        Ok(Self {
            url,
            title: None,
            content: Includes::new(),
        })
    }

    /// Set a display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Absolute base URL, always ending in `/`.
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// The include registry.
    pub fn content(&self) -> &Includes {
        &self.content
    }

    /// Include every filesystem path matching a glob pattern (`**`
    /// supported), evaluated against the current working directory. Each
    /// match is registered as a copy under its matched relative path.
    ///
    /// Fails with [`IncludeError::NotFound`] when nothing matches.
    pub fn include(&mut self, pattern: &str) -> Result<(), IncludeError> {
        check_location(pattern)?;
        let cwd = std::env::current_dir()?;
        let matches: Vec<PathBuf> = files::paths(pattern)?.collect();
        if matches.is_empty() {
            return Err(IncludeError::NotFound(pattern.to_string()));
        }
        for path in matches {
            let location = path.to_string_lossy().replace('\\', "/");
            self.register(location, content::copy(path), cwd.clone())?;
        }
        Ok(())
    }

    /// Include explicit content at a site-relative location.
    ///
    /// The write is deferred until [`generate`](Site::generate); the
    /// current working directory is captured now so the content's relative
    /// source paths resolve at write time the way they would here.
    pub fn include_content(
        &mut self,
        location: &str,
        content: impl Content,
    ) -> Result<(), IncludeError> {
        check_location(location)?;
        let cwd = std::env::current_dir()?;
        self.register(location.to_string(), Arc::new(content), cwd)
    }

    /// Include a copy of an existing file or directory under a location.
    ///
    /// Fails with [`IncludeError::NotFound`] when `source` does not exist.
    pub fn include_copy(
        &mut self,
        location: &str,
        source: impl AsRef<Path>,
    ) -> Result<(), IncludeError> {
        check_location(location)?;
        let cwd = std::env::current_dir()?;
        let source = source.as_ref();
        if !source.exists() {
            return Err(IncludeError::NotFound(source.display().to_string()));
        }
        self.register(location.to_string(), content::copy(source), cwd)
    }

    fn register(
        &mut self,
        location: String,
        content: Arc<dyn Content>,
        cwd: PathBuf,
    ) -> Result<(), IncludeError> {
        // Locations derived from glob matches go through here too.
        check_location(&location)?;
        self.content
            .add(IncludedContent::new(location, content, cwd))
    }

    /// Generate the site into `out`.
    ///
    /// `out` is resolved to an absolute path; if it already exists it is
    /// deleted recursively and recreated empty, so every run starts from a
    /// clean directory. That makes generation idempotent with respect to
    /// stale output, and destructive: never point `out` at a directory
    /// holding unrelated data.
    ///
    /// The write phase mutates the process working directory (one
    /// cwd-group at a time, restored afterwards), so two sites must not
    /// generate concurrently in the same process. A failed task fails the
    /// whole call after its group has drained.
    pub fn generate(&self, out: impl AsRef<Path>) -> Result<(), GenerateError> {
        let out = std::path::absolute(out.as_ref())?;
        if out.exists() {
            fs::remove_dir_all(&out)?;
        }
        fs::create_dir_all(&out)?;

        let ctx = GenContext::new(out.clone(), self);
        let tasks = generation::plan(&self.content, &out, &ctx)?;
        debug!("planned {} task(s) for {}", tasks.len(), self.url);
        ctx.set_tasks(tasks.clone());
        generation::execute(&tasks, &ctx)
    }

    /// Resolve a location against the base URL per RFC 3986.
    ///
    /// `url_for("a/b")` and `url_for("/a/b")` both yield
    /// `https://example.org/a/b` for a site at `https://example.org/`;
    /// an absolute-path location joins against the origin rather than
    /// concatenating.
    pub fn url_for(&self, location: &str) -> Result<Url, url::ParseError> {
        self.url.join(location)
    }
}

impl fmt::Debug for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Site")
            .field("url", &self.url.as_str())
            .field("title", &self.title)
            .field("content", &self.content)
            .finish()
    }
}

/// `&site / "a/b"`, the operator form of [`Site::url_for`].
///
/// # Panics
///
/// Panics when `location` is not a valid relative URL reference; use
/// [`Site::url_for`] for the checked form.
impl Div<&str> for &Site {
    type Output = Url;

    fn div(self, location: &str) -> Url {
        match self.url_for(location) {
            Ok(url) => url,
            Err(err) => panic!("invalid location {location:?} for {}: {err}", self.url),
        }
    }
}

fn check_location(location: &str) -> Result<(), IncludeError> {
    if location.starts_with('/') {
        return Err(IncludeError::AbsolutePathIncluded);
    }
    Ok(())
}

impl Content for Site {
    /// Render this site's registry under `path`, with its own cwd-grouped
    /// execution.
    ///
    /// The engine never calls this: nested sites are flattened into the
    /// top-level run by [`make_tasks`](Content::make_tasks). It exists so
    /// a site handled as plain content still behaves.
    fn write(&self, path: &Path, ctx: &GenContext<'_>) -> Result<(), ContentError> {
        let tasks = generation::plan(&self.content, path, ctx)?;
        generation::execute(&tasks, ctx).map_err(ContentError::render)
    }

    /// One task per entry of this site's own registry, rooted at
    /// `target`, recursively; arbitrarily deep nesting flattens into a
    /// single task list.
    fn make_tasks(
        self: Arc<Self>,
        target: PathBuf,
        _cwd: &Path,
        ctx: &GenContext<'_>,
    ) -> Result<Vec<GenTask>, ContentError> {
        // Each nested entry keeps its own include-time cwd; the outer
        // include's cwd does not govern this subtree.
        generation::plan(&self.content, &target, ctx)
    }
}
