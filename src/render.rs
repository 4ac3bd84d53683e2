//! Built-in renderers consumed through the content interface.
//!
//! The engine treats these exactly like externally supplied renderers:
//! opaque values implementing [`Content`]. [`MarkdownPage`] turns a
//! markdown source file into a standalone HTML page; [`Sitemap`] emits a
//! `sitemap.xml` from the full task list the context exposes.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use maud::{DOCTYPE, Markup, PreEscaped, html};
use pulldown_cmark::{Parser, html as md_html};

use crate::content::{Content, ContentError};
use crate::files;
use crate::generation::{GenContext, GenTask};

/// Renders a markdown source file into a standalone HTML page.
///
/// The source path is read at write time, under the working directory
/// captured when the page was included: a relative path keeps meaning
/// what it meant at the include call site. The page title comes from an
/// explicit override, the first `#` heading in the source, or the file
/// stem, in that order.
#[derive(Debug, Clone)]
pub struct MarkdownPage {
    source: PathBuf,
    title: Option<String>,
}

impl MarkdownPage {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            title: None,
        }
    }

    /// Override the derived title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl Content for MarkdownPage {
    fn write(&self, path: &Path, ctx: &GenContext<'_>) -> Result<(), ContentError> {
        let markdown = fs::read_to_string(&self.source)?;
        let title = self
            .title
            .clone()
            .or_else(|| first_heading(&markdown))
            .unwrap_or_else(|| file_stem(&self.source));

        let mut body = String::new();
        md_html::push_html(&mut body, Parser::new(&markdown));

        let page = page_document(&title, ctx.site().title(), PreEscaped(body));
        fs::write(path, page.into_string())?;
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

/// Emits `sitemap.xml` listing every `.html` page of the generation run.
///
/// Reads the full task list from the context, which is why the engine
/// injects it only after planning completes: a sitemap has to see its
/// siblings, including pages flattened out of nested sites.
#[derive(Debug, Clone, Default)]
pub struct Sitemap;

impl Sitemap {
    pub fn new() -> Self {
        Self
    }
}

impl Content for Sitemap {
    fn write(&self, path: &Path, ctx: &GenContext<'_>) -> Result<(), ContentError> {
        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
        for task in ctx.tasks() {
            let Ok(rel) = task.path().strip_prefix(ctx.out()) else {
                continue;
            };
            let is_html = task
                .path()
                .file_name()
                .is_some_and(|name| files::extension(&name.to_string_lossy()) == Some("html"));
            if !is_html {
                continue;
            }
            let location = rel.to_string_lossy().replace('\\', "/");
            let url = ctx
                .site()
                .url_for(&location)
                .map_err(ContentError::render)?;
            xml.push_str("  <url><loc>");
            xml.push_str(url.as_str());
            xml.push_str("</loc></url>\n");
        }
        xml.push_str("</urlset>\n");
        fs::write(path, xml)?;
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

/// First `# heading` in the markdown source, if any.
fn first_heading(markdown: &str) -> Option<String> {
    markdown
        .lines()
        .find_map(|line| line.strip_prefix("# ").map(|h| h.trim().to_string()))
}

fn file_stem(source: &Path) -> String {
    source
        .file_name()
        .map(|name| files::strip_extension(&name.to_string_lossy()).to_string())
        .unwrap_or_default()
}

fn page_document(title: &str, site_title: Option<&str>, content: Markup) -> Markup {
    let full_title = match site_title {
        Some(site) => format!("{title} - {site}"),
        None => title.to_string(),
    };
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (full_title) }
            }
            body {
                main { (content) }
            }
        }
    }
}
