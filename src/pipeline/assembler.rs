use ndarray::{ArrayD, Axis, Dimension, IxDyn};

use super::error::PipelineError;
use super::task::FrameResult;

/// Places results into a preallocated output array by frame index.
///
/// Results may arrive in any order. Every index must be written exactly once
/// before [`ResultAssembler::finish`] hands out the array.
#[derive(Debug)]
pub struct ResultAssembler {
    output: ArrayD<u8>,
    written: Vec<bool>,
    received: usize,
}

impl ResultAssembler {
    /// Preallocate an output of `shape`; axis 0 is the frame axis
    pub fn new(shape: IxDyn) -> Result<Self, PipelineError> {
        if shape.ndim() == 0 {
            return Err(PipelineError::InvalidShape { shape: Vec::new() });
        }
        let frames = shape[0];
        Ok(Self {
            output: ArrayD::zeros(shape),
            written: vec![false; frames],
            received: 0,
        })
    }

    #[must_use]
    pub fn expected(&self) -> usize {
        self.written.len()
    }

    #[must_use]
    pub fn received(&self) -> usize {
        self.received
    }

    pub fn place(&mut self, result: FrameResult) -> Result<(), PipelineError> {
        let FrameResult { index, normalized } = result;
        let expected = self.expected();

        if index >= expected {
            return Err(PipelineError::assembly(format!(
                "result for frame {index} is out of range for {expected} frames"
            )));
        }
        if self.written[index] {
            return Err(PipelineError::assembly(format!(
                "duplicate result for frame {index}"
            )));
        }

        let mut slot = self.output.index_axis_mut(Axis(0), index);
        if slot.shape() != normalized.shape() {
            return Err(PipelineError::assembly(format!(
                "frame {index} has shape {:?}, expected {:?}",
                normalized.shape(),
                slot.shape()
            )));
        }
        slot.assign(&normalized.into_dyn());

        self.written[index] = true;
        self.received += 1;
        Ok(())
    }

    /// Return the output array once every frame has been placed
    pub fn finish(self) -> Result<ArrayD<u8>, PipelineError> {
        if self.received != self.expected() {
            return Err(PipelineError::IncompleteRun {
                expected: self.expected(),
                received: self.received,
            });
        }
        Ok(self.output)
    }
}
