//! Shared test-only content implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::content::{Content, ContentError};
use crate::generation::{GenContext, GenTask};

/// Content that writes a fixed string, enough to exercise the registry
/// and the engine without dragging in a renderer.
pub(crate) struct Text(pub &'static str);

impl Content for Text {
    fn write(&self, path: &Path, _ctx: &GenContext<'_>) -> Result<(), ContentError> {
        std::fs::write(path, self.0)?;
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

/// Content whose write always fails.
pub(crate) struct Failing;

impl Content for Failing {
    fn write(&self, _path: &Path, _ctx: &GenContext<'_>) -> Result<(), ContentError> {
        Err(ContentError::Io(std::io::Error::other("render exploded")))
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
