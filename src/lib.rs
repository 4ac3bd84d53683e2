//! # Lightfold
//!
//! A code-over-configuration static site generation engine. There is no
//! config file format and no fixed content layout: the caller assembles a
//! [`Site`] from named content items in Rust code and asks the engine to
//! materialize them into an output directory.
//!
//! ```no_run
//! use lightfold::{MarkdownPage, Site, Sitemap};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut site = Site::new("https://example.org/")?.with_title("Example");
//!
//!     site.include_content("index.html", MarkdownPage::new("pages/index.md"))?;
//!     site.include_content("about.html", MarkdownPage::new("pages/about.md"))?;
//!     site.include_content("sitemap.xml", Sitemap::new())?;
//!     site.include("img")?;
//!     site.include("js/**/*.js")?;
//!
//!     site.generate("out")?;
//!     Ok(())
//! }
//! ```
//!
//! # Architecture: Include, Plan, Write
//!
//! A generation run moves through three phases:
//!
//! ```text
//! 1. Include   content registered under unique site-relative locations
//! 2. Plan      registry expanded into a flat list of write tasks
//! 3. Write     tasks executed concurrently, grouped by working directory
//! ```
//!
//! Include-time validation fails fast: absolute locations, duplicate
//! locations, missing sources, and malformed base URLs are all rejected
//! before any generation I/O happens. Planning flattens containers
//! (directory copies, nested sites) into per-file tasks; the write phase
//! then only ever deals with leaf work.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`site`] | The root aggregate: URL validation, `include*` operations, `generate` |
//! | [`include`] | Ordered, duplicate-rejecting registry of included content |
//! | [`content`] | The `Content` capability and the built-in copy variants |
//! | [`generation`] | Generation context, task expansion, the concurrent write engine |
//! | [`render`] | Built-in renderers: markdown pages, sitemap |
//! | [`files`] | Glob expansion, extension parsing, the working-directory guard |
//!
//! # Design Decisions
//!
//! ## One Narrow Content Interface
//!
//! Everything a site emits flows through the [`Content`] trait: two
//! methods, `make_tasks` (expand into concrete write work) and `write`
//! (produce one output file). Template engines, markdown parsers, and CSS
//! compilers stay behind that seam; the engine never learns what a
//! renderer does internally. A [`Site`] implements `Content` too, which
//! is all it takes for sites to nest arbitrarily deep.
//!
//! ## Unique Locations, Lock-Free Writes
//!
//! The registry rejects duplicate output locations at include time. That
//! single invariant is what allows the write phase to run fully
//! concurrently without locking the output tree: no two tasks can target
//! the same path.
//!
//! ## Working Directories Are Captured, Then Scoped
//!
//! `include` records the caller's current directory, because relative
//! source paths (a markdown file, a copied asset) mean whatever they
//! meant at the include call site, and nested sub-sites are typically
//! assembled from different directories. At write time, tasks are grouped
//! by that captured directory; the process working directory, being
//! global and non-reentrant, is switched per group through a scoped guard
//! and restored on every exit path. Groups run serially, tasks within a
//! group in parallel on the rayon pool.
//!
//! ## Clean Output, Always
//!
//! `generate` deletes and recreates the output directory, so a run is
//! idempotent with respect to stale output. The flip side is that the
//! operation is destructive by contract: the output directory belongs to
//! the engine and nothing else.

pub mod content;
pub mod files;
pub mod generation;
pub mod include;
pub mod render;
pub mod site;

pub use content::{Content, ContentError, DirectoryCopy, FileCopy};
pub use generation::{GenContext, GenTask, GenerateError};
pub use include::{IncludeError, IncludedContent, Includes};
pub use render::{MarkdownPage, Sitemap};
pub use site::{Site, SiteUrlError};

#[cfg(test)]
pub(crate) mod test_helpers;
