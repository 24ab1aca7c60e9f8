//! # Batch Processing
//!
//! Watermarks every eligible image under a directory with a fixed pool of
//! workers.
//!
//! ```text
//! discover ──► jobs (queued up front) ──► N workers ──► results ──► BatchResult
//!                                          (scope = join barrier)
//! ```
//!
//! - One file is one unit of work, processed start to finish by one worker.
//! - A file's failure lands in [`BatchResult::errors`]; it never stops the
//!   other workers and never fails the batch.
//! - Only directory-level problems (enumeration, zero files, output root)
//!   fail [`BatchProcessor::process_directory`].
//! - Result order across files is whatever order workers finish in.

mod discover;

pub use discover::discover_images;

use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{Dispatch, debug, error, info, warn};

use crate::error::{Result, WatermarkError};
use crate::pipeline;
use crate::watermark::{Renderer, WatermarkConfig};

/// Worker count used when none (or zero) is requested.
pub const DEFAULT_WORKERS: usize = 4;

/// Batch behaviour.
#[derive(Clone, Default)]
pub struct BatchOptions {
    /// Parallel workers; 0 means [`DEFAULT_WORKERS`]
    pub workers: usize,
    /// Descend into subdirectories
    pub recursive: bool,
    /// Log sink for batch and worker events. Falls back to the caller's
    /// current subscriber.
    pub dispatch: Option<Dispatch>,
}

impl BatchOptions {
    pub fn new(workers: usize, recursive: bool) -> Self {
        Self {
            workers,
            recursive,
            dispatch: None,
        }
    }

    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = Some(dispatch);
        self
    }
}

/// A file that could not be watermarked.
#[derive(Debug)]
pub struct BatchError {
    pub file_path: PathBuf,
    pub error: WatermarkError,
}

/// Outcome of a whole batch. Built only after every worker has finished.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub total_count: usize,
    pub success_count: usize,
    pub error_count: usize,
    pub errors: Vec<BatchError>,
}

impl BatchResult {
    fn record(&mut self, outcome: JobOutcome) {
        match outcome.result {
            Ok(()) => {
                self.success_count += 1;
                debug!(file = %outcome.input_path.display(), "processed image");
            }
            Err(e) => {
                self.error_count += 1;
                error!(file = %outcome.input_path.display(), error = %e, "failed to process image");
                self.errors.push(BatchError {
                    file_path: outcome.input_path,
                    error: e,
                });
            }
        }
    }
}

/// One input file and where its watermarked copy goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchJob {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
}

struct JobOutcome {
    input_path: PathBuf,
    result: Result<()>,
}

/// Fans watermark jobs out over a fixed worker pool.
pub struct BatchProcessor {
    renderer: Arc<Renderer>,
    workers: usize,
    recursive: bool,
    dispatch: Option<Dispatch>,
}

impl BatchProcessor {
    /// Validate `config` and prepare the shared renderer.
    pub fn new(config: WatermarkConfig, options: BatchOptions) -> Result<Self> {
        let renderer = Renderer::new(config)?;
        let workers = if options.workers == 0 {
            DEFAULT_WORKERS
        } else {
            options.workers
        };

        Ok(Self {
            renderer: Arc::new(renderer),
            workers,
            recursive: options.recursive,
            dispatch: options.dispatch,
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    /// Watermark every eligible image under `input_dir` into `output_dir`,
    /// mirroring the relative layout.
    pub fn process_directory(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchResult> {
        self.with_sink(|| self.run(input_dir, output_dir))
    }

    fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<BatchResult> {
        let images = discover_images(input_dir, self.recursive)?;
        if images.is_empty() {
            return Err(WatermarkError::Directory(format!(
                "no image files found in {}",
                input_dir.display()
            )));
        }

        info!(
            input_dir = %input_dir.display(),
            output_dir = %output_dir.display(),
            files = images.len(),
            workers = self.workers,
            recursive = self.recursive,
            "starting batch processing"
        );

        fs::create_dir_all(output_dir).map_err(|e| {
            WatermarkError::Directory(format!(
                "creating output directory {}: {}",
                output_dir.display(),
                e
            ))
        })?;

        let mut result = BatchResult {
            total_count: images.len(),
            ..Default::default()
        };

        let mut jobs = Vec::with_capacity(images.len());
        for input_path in images {
            match prepare_job(input_dir, output_dir, input_path) {
                Ok(job) => jobs.push(job),
                Err(outcome) => {
                    if let Err(e) = &outcome.result {
                        warn!(file = %outcome.input_path.display(), error = %e, "skipping file");
                    }
                    result.record(outcome);
                }
            }
        }

        for outcome in self.run_workers(jobs)? {
            result.record(outcome);
        }

        info!(
            success = result.success_count,
            errors = result.error_count,
            total = result.total_count,
            "batch processing completed"
        );
        Ok(result)
    }

    /// Drain `jobs` on the worker pool and return every outcome once all
    /// workers are done.
    fn run_workers(&self, jobs: Vec<BatchJob>) -> Result<Vec<JobOutcome>> {
        if jobs.is_empty() {
            return Ok(Vec::new());
        }

        // Capacity covers every job, so queueing never blocks
        let (job_tx, job_rx) = bounded::<BatchJob>(jobs.len());
        for job in jobs {
            job_tx
                .send(job)
                .map_err(|e| WatermarkError::WorkerPool(format!("queueing job: {}", e)))?;
        }
        drop(job_tx);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .thread_name(|i| format!("watermark-worker-{}", i))
            .build()
            .map_err(|e| WatermarkError::WorkerPool(e.to_string()))?;

        let (result_tx, result_rx) = unbounded::<JobOutcome>();
        pool.scope(|scope| {
            for worker_id in 0..self.workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move |_| {
                    self.with_sink(|| self.worker(worker_id, job_rx, result_tx));
                });
            }
        });
        drop(result_tx);

        Ok(result_rx.into_iter().collect())
    }

    fn worker(&self, worker_id: usize, jobs: Receiver<BatchJob>, results: Sender<JobOutcome>) {
        let mut handled = 0usize;
        for job in jobs {
            let result = run_isolated(|| {
                pipeline::process_file(&self.renderer, &job.input_path, &job.output_path)
            });
            handled += 1;
            if results
                .send(JobOutcome {
                    input_path: job.input_path,
                    result,
                })
                .is_err()
            {
                break;
            }
        }
        debug!(worker = worker_id, jobs = handled, "worker finished");
    }

    /// Run `f` with the injected log sink, if any.
    fn with_sink<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.dispatch {
            Some(dispatch) => tracing::dispatcher::with_default(dispatch, f),
            None => f(),
        }
    }
}

/// Run one job, turning a panic into a `Render` error for that file.
fn run_isolated(job: impl FnOnce() -> Result<()>) -> Result<()> {
    panic::catch_unwind(AssertUnwindSafe(job)).unwrap_or_else(|payload| {
        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("unknown panic");
        Err(WatermarkError::Render(format!("panicked: {}", message)))
    })
}

/// Map `input_path` under `output_dir` and make sure its parent exists.
///
/// On failure the file is returned as a failed outcome instead of a job.
fn prepare_job(
    input_dir: &Path,
    output_dir: &Path,
    input_path: PathBuf,
) -> std::result::Result<BatchJob, JobOutcome> {
    let output_path = output_path_for(input_dir, output_dir, &input_path);

    if let Some(parent) = output_path.parent() {
        // create_dir_all tolerates directories that already exist
        if let Err(e) = fs::create_dir_all(parent) {
            return Err(JobOutcome {
                result: Err(WatermarkError::Directory(format!(
                    "creating output directory {}: {}",
                    parent.display(),
                    e
                ))),
                input_path,
            });
        }
    }

    Ok(BatchJob {
        input_path,
        output_path,
    })
}

/// Re-root `input_path` from `input_dir` to `output_dir`.
pub fn output_path_for(input_dir: &Path, output_dir: &Path, input_path: &Path) -> PathBuf {
    match input_path.strip_prefix(input_dir) {
        Ok(relative) => output_dir.join(relative),
        Err(_) => output_dir.join(input_path.file_name().unwrap_or(input_path.as_os_str())),
    }
}
