//! Task planning and the concurrent write engine.
//!
//! A generation run turns the include registry into a flat list of
//! [`GenTask`]s, injects that list into the [`GenContext`], then executes
//! the tasks grouped by working directory.
//!
//! The grouping exists because the process working directory is global,
//! non-reentrant state: renderers resolve their relative source paths
//! against it. Groups therefore run one after another; within a group,
//! where no shared state remains, tasks run concurrently on the rayon
//! pool. Target paths never collide thanks to the registry's uniqueness
//! invariant, so the output tree needs no locking.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use log::{debug, warn};
use rayon::prelude::*;
use thiserror::Error;

use crate::content::{Content, ContentError};
use crate::files::WorkingDir;
use crate::include::Includes;
use crate::site::Site;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to expand content into tasks: {0}")]
    Plan(#[from] ContentError),
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: ContentError },
}

/// Per-generation state threaded through every content write.
///
/// Created once per [`Site::generate`] call and dropped when it returns;
/// never persisted. The task list is injected after planning completes so
/// content can introspect sibling structure during its own render (a
/// sitemap has to see every page the run will produce).
pub struct GenContext<'s> {
    out: PathBuf,
    site: &'s Site,
    tasks: OnceLock<Vec<GenTask>>,
}

impl<'s> GenContext<'s> {
    pub(crate) fn new(out: PathBuf, site: &'s Site) -> Self {
        Self {
            out,
            site,
            tasks: OnceLock::new(),
        }
    }

    /// Absolute output root of this run.
    pub fn out(&self) -> &Path {
        &self.out
    }

    /// The site driving this generation.
    pub fn site(&self) -> &'s Site {
        self.site
    }

    /// Every task scheduled for this run, in planning order.
    ///
    /// Empty until planning completes; populated by the time any write
    /// executes.
    pub fn tasks(&self) -> &[GenTask] {
        self.tasks.get().map(Vec::as_slice).unwrap_or(&[])
    }

    pub(crate) fn set_tasks(&self, tasks: Vec<GenTask>) {
        // Planning runs exactly once per context.
        let _ = self.tasks.set(tasks);
    }
}

impl fmt::Debug for GenContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenContext")
            .field("out", &self.out)
            .field("tasks", &self.tasks().len())
            .finish_non_exhaustive()
    }
}

/// One concrete unit of write work: a content, its final target path, and
/// the working directory that governs its relative-path resolution.
#[derive(Clone)]
pub struct GenTask {
    content: Arc<dyn Content>,
    path: PathBuf,
    cwd: PathBuf,
}

impl GenTask {
    pub fn new(content: Arc<dyn Content>, path: PathBuf, cwd: &Path) -> Self {
        Self {
            content,
            path,
            cwd: cwd.to_path_buf(),
        }
    }

    /// The single-task expansion used by leaf content.
    pub fn single(content: Arc<dyn Content>, path: PathBuf, cwd: &Path) -> Vec<GenTask> {
        vec![Self::new(content, path, cwd)]
    }

    pub fn content(&self) -> &dyn Content {
        self.content.as_ref()
    }

    /// Final filesystem path this task writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Working directory active while this task writes.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }
}

impl fmt::Debug for GenTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenTask")
            .field("path", &self.path)
            .field("cwd", &self.cwd)
            .finish_non_exhaustive()
    }
}

/// Expand every registered include into tasks rooted at `root`.
///
/// Container content (directory copies, nested sites) fans out here;
/// nesting flattens recursively, each task keeping the cwd of its
/// originating include.
pub(crate) fn plan(
    includes: &Includes,
    root: &Path,
    ctx: &GenContext<'_>,
) -> Result<Vec<GenTask>, ContentError> {
    let mut tasks = Vec::new();
    for ic in includes.iter() {
        let target = root.join(ic.location());
        let expanded = Arc::clone(ic.content()).make_tasks(target, ic.cwd(), ctx)?;
        tasks.extend(expanded);
    }
    Ok(tasks)
}

/// Execute tasks grouped by working directory.
///
/// Groups run serially: the group's directory is set through a scoped
/// guard (restored on every exit path), all of its tasks run concurrently
/// on the rayon pool, and the group drains completely before any failure
/// surfaces. Remaining groups are skipped after a failed group; no
/// background work outlives this call.
pub(crate) fn execute(tasks: &[GenTask], ctx: &GenContext<'_>) -> Result<(), GenerateError> {
    for (cwd, group) in group_by_cwd(tasks) {
        debug!("writing {} task(s) under {}", group.len(), cwd.display());
        let _dir = WorkingDir::change(cwd)?;
        let mut failures: Vec<(PathBuf, ContentError)> = group
            .par_iter()
            .filter_map(|task| {
                run(task, ctx)
                    .err()
                    .map(|err| (task.path().to_path_buf(), err))
            })
            .collect();
        if !failures.is_empty() {
            for (path, err) in failures.iter().skip(1) {
                warn!("also failed to write {}: {err}", path.display());
            }
            let (path, source) = failures.swap_remove(0);
            return Err(GenerateError::Write { path, source });
        }
    }
    Ok(())
}

fn run(task: &GenTask, ctx: &GenContext<'_>) -> Result<(), ContentError> {
    if let Some(parent) = task.path().parent() {
        fs::create_dir_all(parent)?;
    }
    task.content().write(task.path(), ctx)
}

/// Group tasks by cwd, preserving first-seen order. The number of
/// distinct directories is small, so a linear scan beats a map here.
fn group_by_cwd(tasks: &[GenTask]) -> Vec<(&Path, Vec<&GenTask>)> {
    let mut groups: Vec<(&Path, Vec<&GenTask>)> = Vec::new();
    for task in tasks {
        match groups.iter_mut().find(|(cwd, _)| *cwd == task.cwd()) {
            Some((_, group)) => group.push(task),
            None => groups.push((task.cwd(), vec![task])),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{Failing, Text};

    fn task(path: &str, cwd: &str) -> GenTask {
        GenTask::new(Arc::new(Text("x")), PathBuf::from(path), Path::new(cwd))
    }

    #[test]
    fn groups_preserve_first_seen_order() {
        let tasks = vec![
            task("/out/a", "/work/one"),
            task("/out/b", "/work/two"),
            task("/out/c", "/work/one"),
        ];
        let groups = group_by_cwd(&tasks);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Path::new("/work/one"));
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, Path::new("/work/two"));
        assert_eq!(groups[1].1.len(), 1);
    }

    #[test]
    fn failed_task_drains_its_group_before_surfacing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("out");
        fs::create_dir_all(&out).unwrap();
        // Group cwd is the directory the test runner is already in, so
        // the guard's switch is a no-op for sibling tests.
        let cwd = std::env::current_dir().unwrap();

        let site = Site::new("https://example.org/").unwrap();
        let ctx = GenContext::new(out.clone(), &site);
        let tasks = vec![
            GenTask::new(Arc::new(Failing), out.join("bad.html"), &cwd),
            GenTask::new(Arc::new(Text("ok")), out.join("ok.html"), &cwd),
        ];

        let err = execute(&tasks, &ctx).unwrap_err();
        assert!(matches!(err, GenerateError::Write { .. }));
        // The sibling in the same group still ran to completion.
        assert_eq!(fs::read_to_string(out.join("ok.html")).unwrap(), "ok");
    }

    #[test]
    fn context_tasks_empty_before_injection() {
        let site = Site::new("https://example.org/").unwrap();
        let ctx = GenContext::new(PathBuf::from("/out"), &site);
        assert!(ctx.tasks().is_empty());

        ctx.set_tasks(vec![task("/out/a", "/work")]);
        assert_eq!(ctx.tasks().len(), 1);
        assert_eq!(ctx.tasks()[0].path(), Path::new("/out/a"));
    }
}
