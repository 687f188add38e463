//! Preview: run the real encode path against a temporary location to
//! report resulting sizes and notes without committing to the
//! destination directory.

use std::path::Path;

use tempfile::TempDir;

use crate::convert::ItemReport;
use crate::error::{Error, Result};
use crate::orchestrator::{self, BatchOutcome, CancelToken};
use crate::request::ConversionRequest;

/// Outcome of a dry run. Temporary artifacts live until the preview is
/// dropped, so a frontend can render them.
pub struct Preview {
    pub outcome: BatchOutcome,
    scratch: TempDir,
}

impl Preview {
    /// Per-item reports paired with the temporary file backing each one
    pub fn items(&self) -> impl Iterator<Item = (&ItemReport, &Path)> {
        self.outcome
            .reports
            .iter()
            .zip(self.outcome.written.iter().map(|p| p.as_path()))
    }

    pub fn dir(&self) -> &Path {
        self.scratch.path()
    }
}

/// Convert the whole request into a scratch directory. Identical code
/// path to a real conversion; only the destination differs.
pub fn preview(request: &ConversionRequest) -> Result<Preview> {
    let scratch = TempDir::new().map_err(|e| Error::UnwritableDestination {
        path: std::env::temp_dir(),
        source: e,
    })?;

    let outcome = orchestrator::run_batch(request, scratch.path(), &CancelToken::new(), |_| {})?;

    log::debug!(
        "previewed {} sizes into {}",
        outcome.reports.len(),
        scratch.path().display()
    );

    Ok(Preview { outcome, scratch })
}
