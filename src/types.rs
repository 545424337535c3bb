//! Domain-specific types for frame sequences

use std::fmt;

/// Height and width of a single frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub rows: usize,
    pub cols: usize,
}

impl Dimensions {
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    #[inline]
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.rows * self.cols
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{cols}x{rows}", cols = self.cols, rows = self.rows)
    }
}

/// Shape of a frame sequence: frame count plus per-frame dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceShape {
    pub frames: usize,
    pub frame: Dimensions,
}

impl SequenceShape {
    #[must_use]
    pub fn new(frames: usize, rows: usize, cols: usize) -> Self {
        Self {
            frames,
            frame: Dimensions::new(rows, cols),
        }
    }

    /// Interpret an array shape as `(frames, rows, cols)`.
    ///
    /// Returns `None` unless the shape has exactly three axes.
    #[must_use]
    pub fn from_slice(shape: &[usize]) -> Option<Self> {
        match *shape {
            [frames, rows, cols] => Some(Self::new(frames, rows, cols)),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.frames * self.frame.pixel_count()
    }
}

impl fmt::Display for SequenceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{frames} frames of {frame}", frames = self.frames, frame = self.frame)
    }
}

/// Format an arbitrary array shape the way NumPy prints it, e.g. `(3, 2, 2)`
#[must_use]
pub fn format_shape(shape: &[usize]) -> String {
    match shape {
        [single] => format!("({single},)"),
        _ => {
            let parts: Vec<String> = shape.iter().map(ToString::to_string).collect();
            format!("({})", parts.join(", "))
        }
    }
}
