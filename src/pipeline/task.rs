use ndarray::{Array2, ArrayViewD, Axis};

use super::error::PipelineError;
use crate::normalize::{DegeneratePolicy, normalize_frame};
use crate::render::{FrameRenderer, FrameSink};

/// One unit of work: a single frame of the input sequence
#[derive(Debug, Clone)]
pub struct FrameTask<'a> {
    pub index: usize,
    pub frame: ArrayViewD<'a, f64>,
}

/// A normalized frame tagged with the index it came from
#[derive(Debug, Clone, PartialEq)]
pub struct FrameResult {
    pub index: usize,
    pub normalized: Array2<u8>,
}

/// Split `frames` along axis 0 into one task per frame
#[must_use]
pub fn build_tasks(frames: ArrayViewD<'_, f64>) -> Vec<FrameTask<'_>> {
    (0..frames.len_of(Axis(0)))
        .map(|index| FrameTask {
            index,
            // Views are cheap to clone; the task keeps the input's lifetime
            frame: frames.clone().index_axis_move(Axis(0), index),
        })
        .collect()
}

impl FrameTask<'_> {
    /// Normalize the frame, render it to `sink`, and return the result
    pub fn run(
        self,
        policy: DegeneratePolicy,
        renderer: &FrameRenderer,
        sink: &dyn FrameSink,
    ) -> Result<FrameResult, PipelineError> {
        let index = self.index;
        tracing::debug!(frame = index, "processing frame");

        let normalized = normalize_frame(self.frame, policy)
            .map_err(|cause| PipelineError::Frame { index, cause })?;
        renderer
            .render(index, &normalized, sink)
            .map_err(|cause| PipelineError::Output { index, cause })?;

        Ok(FrameResult { index, normalized })
    }
}
