use ndarray::{ArrayD, ArrayViewD, Axis};
use rayon::prelude::*;
use std::num::NonZeroUsize;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use super::assembler::ResultAssembler;
use super::error::PipelineError;
use super::task::{FrameResult, build_tasks};
use crate::normalize::DegeneratePolicy;
use crate::render::{FrameFormat, FrameRenderer, FrameSink};

/// Worker count used when none is configured: the host's available parallelism
#[must_use]
pub fn default_worker_count() -> NonZeroUsize {
    std::thread::available_parallelism().unwrap_or(NonZeroUsize::MIN)
}

/// Settings for a normalization run, resolved once before any work starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    workers: NonZeroUsize,
    degenerate: DegeneratePolicy,
    format: FrameFormat,
}

impl PipelineConfig {
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfiguration`] when `workers` is 0.
    pub fn new(workers: usize) -> Result<Self, PipelineError> {
        let workers = NonZeroUsize::new(workers).ok_or_else(|| {
            PipelineError::invalid_configuration("number of workers must be greater than 0")
        })?;
        Ok(Self::with_workers(workers))
    }

    #[must_use]
    pub fn with_workers(workers: NonZeroUsize) -> Self {
        Self {
            workers,
            degenerate: DegeneratePolicy::default(),
            format: FrameFormat::default(),
        }
    }

    #[must_use]
    pub fn with_degenerate_policy(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate = policy;
        self
    }

    #[must_use]
    pub fn with_frame_format(mut self, format: FrameFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn workers(&self) -> NonZeroUsize {
        self.workers
    }

    #[must_use]
    pub fn degenerate_policy(&self) -> DegeneratePolicy {
        self.degenerate
    }

    #[must_use]
    pub fn frame_format(&self) -> FrameFormat {
        self.format
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::with_workers(default_worker_count())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunStats {
    pub frames: usize,
    pub workers: usize,
    pub elapsed: Duration,
}

#[derive(Debug)]
pub struct RunOutput {
    /// Normalized frames, same shape as the input
    pub frames: ArrayD<u8>,
    pub stats: RunStats,
}

/// Normalizes every frame of a sequence on a fixed-size worker pool
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Normalize and render every frame of `frames`.
    ///
    /// Frames are dispatched one task at a time to a dedicated pool of
    /// `workers` threads. Results stream back over a channel and are placed
    /// by frame index on the calling thread, so the output does not depend
    /// on completion order or worker count. The first failing frame aborts
    /// the run; no partial output is returned.
    #[tracing::instrument(skip_all, fields(workers = self.config.workers.get()))]
    pub fn run(
        &self,
        frames: ArrayViewD<'_, f64>,
        sink: &dyn FrameSink,
    ) -> Result<RunOutput, PipelineError> {
        let started = Instant::now();
        if frames.ndim() < 3 {
            return Err(PipelineError::InvalidShape {
                shape: frames.shape().to_vec(),
            });
        }

        let total = frames.len_of(Axis(0));
        let workers = self.config.workers.get();
        tracing::info!(frames = total, workers, "starting normalization run");

        let mut assembler = ResultAssembler::new(frames.raw_dim())?;
        let tasks = build_tasks(frames);
        let pool = build_thread_pool(self.config.workers)?;
        let renderer = FrameRenderer::new(self.config.format);
        let policy = self.config.degenerate;
        let (tx, rx) = mpsc::channel::<FrameResult>();

        let outcome = std::thread::scope(|scope| -> Result<(), PipelineError> {
            // The pool lives on the dispatcher thread and is dropped when it exits
            let dispatcher = scope.spawn(move || {
                pool.install(|| {
                    tasks
                        .into_par_iter()
                        .with_max_len(1)
                        .try_for_each_with(tx, |tx, task| {
                            let result = task.run(policy, &renderer, sink)?;
                            tx.send(result).map_err(|_| {
                                PipelineError::worker_pool("result channel closed before the run ended")
                            })
                        })
                })
            });

            // Ends once every sender clone is dropped, i.e. dispatch finished
            for result in rx {
                assembler.place(result)?;
            }

            dispatcher
                .join()
                .map_err(|panic| PipelineError::worker_pool(panic_message(panic.as_ref())))?
        });

        // The caller reports the error itself
        if let Err(err) = outcome {
            tracing::debug!(frame = ?err.frame_index(), "normalization run aborted");
            return Err(err);
        }

        let output = assembler.finish()?;
        let stats = RunStats {
            frames: total,
            workers,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            frames = stats.frames,
            elapsed_ms = stats.elapsed.as_millis() as u64,
            "normalization run complete"
        );
        Ok(RunOutput {
            frames: output,
            stats,
        })
    }
}

fn build_thread_pool(workers: NonZeroUsize) -> Result<rayon::ThreadPool, PipelineError> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(workers.get())
        .thread_name(|i| format!("framenorm-worker-{i}"))
        .build()
        .map_err(|e| PipelineError::worker_pool(format!("failed to build thread pool: {e}")))
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        format!("worker panicked: {msg}")
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        format!("worker panicked: {msg}")
    } else {
        "worker panicked".to_string()
    }
}
