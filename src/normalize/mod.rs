//! Per-frame intensity normalization
//!
//! Linearly rescales a single-channel frame so that its minimum maps to 0 and
//! its maximum maps to 255. Values are rounded to the nearest integer, which
//! makes normalization idempotent on frames that already span `0..=255`.

mod normalization;

pub use normalization::{find_min_max, normalize_to_u8};

use ndarray::{Array2, ArrayView2, ArrayViewD, Ix2};

/// What to do with a frame whose values are all equal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DegeneratePolicy {
    /// Fail with [`FrameError::DegenerateFrame`]
    #[default]
    Reject,
    /// Emit an all-zero frame
    ZeroFill,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("invalid frame: {0}")]
    InvalidFrame(String),

    #[error("degenerate frame: every pixel equals {value}, cannot rescale a zero dynamic range")]
    DegenerateFrame { value: f64 },
}

impl FrameError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidFrame(msg.into())
    }
}

/// Normalize one frame of any rank, rejecting anything that is not 2-D.
///
/// # Errors
///
/// [`FrameError::InvalidFrame`] for frames that are not `rows x cols` (for
/// example frames with a trailing color-channel axis), empty frames, and
/// frames containing NaN or infinite values.
/// [`FrameError::DegenerateFrame`] for constant frames under
/// [`DegeneratePolicy::Reject`].
pub fn normalize_frame(
    frame: ArrayViewD<'_, f64>,
    policy: DegeneratePolicy,
) -> Result<Array2<u8>, FrameError> {
    if frame.ndim() != 2 {
        return Err(FrameError::invalid(format!(
            "expected a single-channel rows x cols frame, got {} axes with shape {:?}; \
             multi-channel frames are not supported",
            frame.ndim(),
            frame.shape()
        )));
    }
    let frame = frame
        .into_dimensionality::<Ix2>()
        .map_err(|e| FrameError::invalid(e.to_string()))?;
    normalize_frame_2d(frame, policy)
}

/// Normalize a 2-D frame to `u8`, preserving its shape
pub fn normalize_frame_2d(
    frame: ArrayView2<'_, f64>,
    policy: DegeneratePolicy,
) -> Result<Array2<u8>, FrameError> {
    if frame.is_empty() {
        return Err(FrameError::invalid(format!(
            "frame has no pixels (shape {:?})",
            frame.shape()
        )));
    }
    if let Some(bad) = frame.iter().find(|v| !v.is_finite()) {
        return Err(FrameError::invalid(format!("frame contains non-finite value {bad}")));
    }

    // First pass: value range
    let (min_val, max_val) = find_min_max(frame.iter());

    if max_val <= min_val {
        return match policy {
            DegeneratePolicy::Reject => Err(FrameError::DegenerateFrame { value: min_val }),
            DegeneratePolicy::ZeroFill => {
                tracing::warn!(value = min_val, "constant frame replaced with zeros");
                Ok(Array2::zeros(frame.raw_dim()))
            }
        };
    }

    // Second pass: rescale
    let range = max_val - min_val;
    if range.is_finite() {
        return Ok(frame.mapv(|v| normalize_to_u8(v, min_val, range)));
    }

    // max - min overflowed; halve everything so the differences stay finite
    let half_min = min_val * 0.5;
    let half_range = max_val * 0.5 - half_min;
    Ok(frame.mapv(|v| normalize_to_u8(v * 0.5, half_min, half_range)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use ndarray::{Array3, array};

    fn norm(frame: Array2<f64>) -> Result<Array2<u8>, FrameError> {
        normalize_frame(frame.view().into_dyn(), DegeneratePolicy::Reject)
    }

    #[test]
    fn test_small_ramp() {
        let out = norm(array![[0.0, 1.0], [2.0, 3.0]]).unwrap();
        assert_eq!(out, array![[0u8, 85], [170, 255]]);
    }

    #[test]
    fn test_unordered_values_with_negative_offset() {
        let out = norm(array![[5.0, 0.0], [10.0, 2.0]]).unwrap();
        assert_eq!(out, array![[128u8, 0], [255, 51]]);

        let out = norm(array![[-100.0, 0.0, 100.0]]).unwrap();
        assert_eq!(out, array![[0u8, 128, 255]]);
    }

    #[test]
    fn test_values_near_f64_max() {
        let out = norm(array![[0.0, 5e306, 1e307]]).unwrap();
        assert_eq!(out, array![[0u8, 128, 255]]);

        // max - min overflows to infinity
        let out = norm(array![[-1e308, 0.0, 1e308]]).unwrap();
        assert_eq!(out, array![[0u8, 128, 255]]);

        let out = norm(array![[-f64::MAX, f64::MAX], [0.0, f64::MAX]]).unwrap();
        assert_eq!(out, array![[0u8, 255], [128, 255]]);
    }

    #[test]
    fn test_output_spans_full_range() {
        let frame = Array2::from_shape_fn((17, 23), |(r, c)| ((r * 31 + c * 7) % 101) as f64 * 0.37 - 4.0);
        let out = norm(frame.clone()).unwrap();
        assert_eq!(out.shape(), frame.shape());
        assert_eq!(out.iter().copied().min(), Some(0));
        assert_eq!(out.iter().copied().max(), Some(255));
    }

    #[test]
    fn test_idempotent_on_full_range_frames() {
        let frame = Array2::from_shape_fn((16, 16), |(r, c)| (r * 16 + c) as f64);
        let once = norm(frame).unwrap();
        let twice = norm(once.mapv(f64::from)).unwrap();
        assert_eq!(once, twice);

        // An arbitrary frame: its normalized form spans [0, 255] and is a fixed point
        let frame = Array2::from_shape_fn((9, 11), |(r, c)| ((r * 13 + c * 5) % 17) as f64 / 3.0);
        let once = norm(frame).unwrap();
        assert_eq!(norm(once.mapv(f64::from)).unwrap(), once);
    }

    #[test]
    fn test_constant_frame_rejected() {
        let result = norm(array![[10.0, 10.0], [10.0, 10.0]]);
        assert_matches!(result, Err(FrameError::DegenerateFrame { value }) if value == 10.0);
    }

    #[test]
    fn test_constant_frame_zero_filled() {
        let frame = array![[7.0, 7.0, 7.0]];
        let out = normalize_frame(frame.view().into_dyn(), DegeneratePolicy::ZeroFill).unwrap();
        assert_eq!(out, array![[0u8, 0, 0]]);
    }

    #[test]
    fn test_multichannel_frame_rejected() {
        let frame = Array3::<f64>::zeros((4, 4, 3));
        let result = normalize_frame(frame.view().into_dyn(), DegeneratePolicy::Reject);
        assert_matches!(result, Err(FrameError::InvalidFrame(msg)) if msg.contains("multi-channel"));

        // A singleton channel axis is not silently squeezed either
        let frame = Array3::<f64>::zeros((4, 4, 1));
        let result = normalize_frame(frame.view().into_dyn(), DegeneratePolicy::ZeroFill);
        assert_matches!(result, Err(FrameError::InvalidFrame(_)));
    }

    #[test]
    fn test_non_finite_and_empty_rejected() {
        assert_matches!(norm(array![[0.0, f64::NAN]]), Err(FrameError::InvalidFrame(_)));
        assert_matches!(norm(array![[0.0, f64::INFINITY]]), Err(FrameError::InvalidFrame(_)));
        assert_matches!(norm(Array2::zeros((0, 5))), Err(FrameError::InvalidFrame(_)));
    }
}
