//! Conversion orchestrator: sequences per-size encode operations on a
//! worker thread, publishing progress snapshots and honoring
//! cooperative cancellation at item boundaries.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use crate::convert::{self, ConvertedImage, ItemReport};
use crate::error::{Error, Result};
use crate::image::EncodeOptions;
use crate::output;
use crate::request::{BatchPolicy, ConversionRequest};
use crate::size::{ResolvedSize, SizeSpec};

/// Sizes above this per-axis threshold are skipped with a reported
/// reason instead of converted
pub const SKIP_DIMENSION: u32 = 8_000;

/// Lifecycle of a conversion run. Frontends hold `Idle` (the default)
/// until a batch is started; a run ends in exactly one of the last
/// three states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobState {
    #[default]
    Idle,
    Running,
    Completed,
    Cancelled,
    Failed,
}

/// Progress snapshots published by the worker. The frontend only reads
/// these; it never touches conversion state directly.
#[derive(Debug)]
pub enum ProgressEvent {
    BatchStarted {
        total: usize,
    },
    ItemStarted {
        index: usize,
        total: usize,
        label: String,
    },
    ItemCompleted {
        index: usize,
        report: ItemReport,
        path: PathBuf,
    },
    ItemSkipped {
        index: usize,
        reason: String,
    },
    ItemFailed {
        index: usize,
        error: String,
    },
    BatchFinished {
        state: JobState,
    },
}

/// Cooperative cancellation flag, checked between size iterations.
/// An in-flight encode is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Aggregate result of a batch run. Files already written when a run
/// is cancelled or fails are not rolled back.
#[derive(Debug)]
pub struct BatchOutcome {
    pub state: JobState,
    pub reports: Vec<ItemReport>,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<(usize, String)>,
    pub failures: Vec<(usize, Error)>,
}

enum ItemStep {
    Done(ConvertedImage),
    Skipped(String),
}

/// Run a conversion batch to completion on the calling thread, writing
/// outputs into `dest`.
///
/// Fatal conditions (destination unwritable) return `Err`; per-item
/// errors are recorded in the outcome according to the request's
/// `BatchPolicy`.
pub fn run_batch(
    request: &ConversionRequest,
    dest: &Path,
    token: &CancelToken,
    progress: impl Fn(ProgressEvent),
) -> Result<BatchOutcome> {
    request.validate()?;

    fs::create_dir_all(dest).map_err(|e| Error::UnwritableDestination {
        path: dest.to_path_buf(),
        source: e,
    })?;

    let total = request.sizes.len();
    let opts = EncodeOptions {
        format: request.format,
        quality: request.quality,
        dpi: request.dpi,
    };

    log::info!(
        "converting `{}` to {} ({} sizes) in {}",
        request.source.stem(),
        request.format,
        total,
        dest.display()
    );
    progress(ProgressEvent::BatchStarted { total });

    let mut outcome = BatchOutcome {
        state: JobState::Running,
        reports: Vec::new(),
        written: Vec::new(),
        skipped: Vec::new(),
        failures: Vec::new(),
    };

    for (index, spec) in request.sizes.iter().enumerate() {
        if token.is_cancelled() {
            log::info!("conversion cancelled after {index} of {total} sizes");
            outcome.state = JobState::Cancelled;
            break;
        }

        progress(ProgressEvent::ItemStarted {
            index,
            total,
            label: spec.to_string(),
        });

        match convert_item(request, spec, &opts) {
            Ok(ItemStep::Done(converted)) => {
                let path = output::unique_path(&dest.join(&converted.file_name));
                if let Err(e) = fs::write(&path, &converted.data) {
                    let error = Error::UnwritableDestination {
                        path: path.clone(),
                        source: e,
                    };
                    log::error!("{error}");
                    progress(ProgressEvent::ItemFailed {
                        index,
                        error: error.to_string(),
                    });
                    progress(ProgressEvent::BatchFinished {
                        state: JobState::Failed,
                    });
                    return Err(error);
                }

                let report = converted.report();
                outcome.reports.push(report.clone());
                outcome.written.push(path.clone());
                progress(ProgressEvent::ItemCompleted {
                    index,
                    report,
                    path,
                });
            }
            Ok(ItemStep::Skipped(reason)) => {
                log::warn!("skipping size {spec}: {reason}");
                outcome.skipped.push((index, reason.clone()));
                progress(ProgressEvent::ItemSkipped { index, reason });
            }
            Err(error) => {
                log::warn!("size {spec} failed: {error}");
                progress(ProgressEvent::ItemFailed {
                    index,
                    error: error.to_string(),
                });
                outcome.failures.push((index, error));
                if request.policy == BatchPolicy::FailFast {
                    outcome.state = JobState::Failed;
                    break;
                }
            }
        }
    }

    if outcome.state == JobState::Running {
        outcome.state = JobState::Completed;
    }
    progress(ProgressEvent::BatchFinished {
        state: outcome.state,
    });
    Ok(outcome)
}

/// Run a batch on a background worker, streaming progress over a
/// channel. The frontend thread never blocks on conversion work.
pub fn spawn_batch(
    request: ConversionRequest,
    dest: PathBuf,
    token: CancelToken,
    event_tx: mpsc::Sender<ProgressEvent>,
) -> thread::JoinHandle<Result<BatchOutcome>> {
    thread::spawn(move || {
        run_batch(&request, &dest, &token, move |event| {
            let _ = event_tx.send(event);
        })
    })
}

fn convert_item(
    request: &ConversionRequest,
    spec: &SizeSpec,
    opts: &EncodeOptions,
) -> Result<ItemStep> {
    let size = spec.resolve(request.dpi)?;

    if let ResolvedSize::Exact { width, height } = size {
        if width > SKIP_DIMENSION || height > SKIP_DIMENSION {
            return Ok(ItemStep::Skipped(format!(
                "{width}x{height} exceeds the {SKIP_DIMENSION} px conversion limit"
            )));
        }
    }

    convert::convert_one(&request.source, size, request.resize_mode, opts).map(ItemStep::Done)
}
