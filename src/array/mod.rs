//! NumPy `.npy` frame sequence I/O
//!
//! This module loads dense numeric arrays of shape `(frames, rows, cols)` and
//! persists normalized `u8` sequences. Any supported element type is widened
//! to `f64` on load; the original type is kept for reporting.

mod decode;
mod dtype;
mod error;
mod header;
mod validation;

// Re-export public API
pub use decode::saturate_u8;
pub use dtype::{ByteOrder, Dtype, ElementType};
pub use error::ArrayError;
pub use header::Header;

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn, ShapeBuilder};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::types::SequenceShape;

/// A frame sequence loaded into memory, axis 0 indexing frames
#[derive(Debug, Clone)]
pub struct FrameStack {
    data: ArrayD<f64>,
    element_type: ElementType,
}

impl FrameStack {
    /// Wrap an array, rejecting anything with fewer than three axes
    pub fn new(data: ArrayD<f64>, element_type: ElementType) -> Result<Self, ArrayError> {
        validation::validate_rank(data.shape())?;
        Ok(Self { data, element_type })
    }

    #[must_use]
    pub fn view(&self) -> ArrayViewD<'_, f64> {
        self.data.view()
    }

    #[must_use]
    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// `Some` when the stack is exactly `(frames, rows, cols)`
    #[must_use]
    pub fn sequence_shape(&self) -> Option<SequenceShape> {
        SequenceShape::from_slice(self.shape())
    }

    #[must_use]
    pub fn frame_count(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    #[must_use]
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Cast every element to `u8`, saturating out-of-range values
    #[must_use]
    pub fn to_u8(&self) -> ArrayD<u8> {
        self.data.mapv(saturate_u8)
    }
}

/// Decode an in-memory `.npy` image into a frame stack
pub fn parse_npy(bytes: &[u8]) -> Result<FrameStack, ArrayError> {
    let (header, data_start) = header::parse_preamble(bytes)?;
    let data = &bytes[data_start..];
    validation::validate_data_len(&header, data.len())?;
    validation::validate_rank(&header.shape)?;

    let values = decode::decode_to_f64(&data[..header.data_len()], header.dtype);
    let shape = IxDyn(&header.shape);
    let array = if header.fortran_order {
        ArrayD::from_shape_vec(shape.f(), values)
    } else {
        ArrayD::from_shape_vec(shape, values)
    }
    .map_err(|e| ArrayError::header(format!("shape does not match data: {e}")))?;

    let array = if array.is_standard_layout() {
        array
    } else {
        array.as_standard_layout().into_owned()
    };
    FrameStack::new(array, header.dtype.element)
}

/// Load a frame sequence from a `.npy` file
#[tracing::instrument]
pub fn read_npy(path: &Path) -> Result<FrameStack, ArrayError> {
    let bytes = std::fs::read(path).map_err(|e| ArrayError::io(path, e))?;
    let stack = parse_npy(&bytes)?;
    match stack.sequence_shape() {
        Some(seq) => tracing::debug!(
            sequence = %seq,
            pixels = seq.element_count(),
            dtype = %stack.element_type(),
            "loaded frame sequence"
        ),
        None => tracing::debug!(
            shape = ?stack.shape(),
            dtype = %stack.element_type(),
            "loaded frame sequence with extra axes"
        ),
    }
    Ok(stack)
}

/// Serialize a `u8` array as a version 1.0 `.npy` image
#[must_use]
pub fn encode_npy_u8(array: ArrayViewD<'_, u8>) -> Vec<u8> {
    let header = Header {
        dtype: Dtype {
            element: ElementType::U8,
            order: ByteOrder::Little,
        },
        fortran_order: false,
        shape: array.shape().to_vec(),
    };
    let mut bytes = header.to_bytes();
    bytes.reserve(array.len());
    // Logical iteration order is C order regardless of memory layout
    bytes.extend(array.iter().copied());
    bytes
}

/// Write a `u8` array to `path`.
///
/// The file is written to a temporary sibling first and renamed into place,
/// so a failed write never leaves a partial array behind.
pub fn write_npy(path: &Path, array: ArrayViewD<'_, u8>) -> Result<(), ArrayError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| ArrayError::io(dir, e))?;
    tmp.write_all(&encode_npy_u8(array))
        .and_then(|()| tmp.flush())
        .map_err(|e| ArrayError::io(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| ArrayError::io(path, e.error))?;

    tracing::info!(path = %path.display(), "wrote output array");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use ndarray::{Array3, array};

    fn npy_bytes(descr: &str, fortran: bool, shape: &[usize], data: &[u8]) -> Vec<u8> {
        let header = Header {
            dtype: descr.parse().unwrap(),
            fortran_order: fortran,
            shape: shape.to_vec(),
        };
        let mut bytes = header.to_bytes();
        bytes.extend_from_slice(data);
        bytes
    }

    #[test]
    fn test_parse_f64_sequence() {
        let values = [0.0f64, 1.0, 2.0, 3.0, 10.0, 10.0, 10.0, 10.0];
        let data: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
        let stack = parse_npy(&npy_bytes("<f8", false, &[2, 2, 2], &data)).unwrap();

        assert_eq!(stack.shape(), &[2, 2, 2]);
        assert_eq!(stack.frame_count(), 2);
        assert_eq!(stack.element_type(), ElementType::F64);
        assert_eq!(stack.view()[[0, 1, 0]], 2.0);
        assert_eq!(stack.view()[[1, 1, 1]], 10.0);
        assert_eq!(stack.sequence_shape(), Some(SequenceShape::new(2, 2, 2)));
        assert!(stack.view().is_standard_layout());
    }

    #[test]
    fn test_parse_fortran_order() {
        // Column-major storage of [[[1, 2], [3, 4]]]
        let stack = parse_npy(&npy_bytes("|u1", true, &[1, 2, 2], &[1, 3, 2, 4])).unwrap();
        let view = stack.view();
        assert_eq!(view[[0, 0, 0]], 1.0);
        assert_eq!(view[[0, 0, 1]], 2.0);
        assert_eq!(view[[0, 1, 0]], 3.0);
        assert_eq!(view[[0, 1, 1]], 4.0);
        assert!(stack.view().is_standard_layout());
    }

    #[test]
    fn test_parse_rejects_rank_two() {
        let result = parse_npy(&npy_bytes("|u1", false, &[2, 2], &[0, 1, 2, 3]));
        assert_matches!(result, Err(ArrayError::Rank { shape }) if shape == vec![2, 2]);
    }

    #[test]
    fn test_parse_rejects_truncated_data() {
        let result = parse_npy(&npy_bytes("<u2", false, &[1, 2, 2], &[0; 7]));
        assert_matches!(result, Err(ArrayError::Truncated { expected: 8, found: 7 }));
    }

    #[test]
    fn test_to_u8_saturates() {
        let data = array![[[-4.0, 12.7], [255.0, 1000.0]]].into_dyn();
        let stack = FrameStack::new(data, ElementType::F64).unwrap();
        assert_eq!(stack.to_u8(), array![[[0u8, 12], [255, 255]]].into_dyn());
    }

    #[test]
    fn test_write_then_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.npy");
        let output = Array3::from_shape_fn((3, 4, 5), |(f, r, c)| (f * 20 + r * 5 + c) as u8);

        write_npy(&path, output.view().into_dyn()).unwrap();
        let loaded = read_npy(&path).unwrap();

        assert_eq!(loaded.element_type(), ElementType::U8);
        assert_eq!(loaded.to_u8(), output.into_dyn());
        // Only the target file remains, no temp leftovers
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_encode_transposed_view_uses_logical_order() {
        let base = array![[[1u8, 2], [3, 4]]];
        let transposed = base.view().reversed_axes();
        let bytes = encode_npy_u8(transposed.into_dyn());
        let stack = parse_npy(&bytes).unwrap();
        assert_eq!(stack.shape(), &[2, 2, 1]);
        assert_eq!(stack.to_u8().iter().copied().collect::<Vec<_>>(), vec![1, 3, 2, 4]);
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_npy(Path::new("/definitely/not/here.npy"));
        assert_matches!(result, Err(ArrayError::Io { .. }));
    }
}
