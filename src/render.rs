//! Frame rendering: encode a normalized frame as a grayscale image and hand
//! it to a [`FrameSink`].

use image::{GrayImage, ImageFormat};
use ndarray::Array2;
use std::io::Cursor;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum OutputWriteError {
    #[error("output directory {} does not exist", .0.display())]
    MissingDirectory(PathBuf),

    #[error("failed to encode frame image: {0}")]
    Encode(image::ImageError),

    #[error("frame of {rows}x{cols} pixels does not fit in an image")]
    Dimensions { rows: usize, cols: usize },

    #[error("failed to write {}: {cause}", .path.display())]
    Io { path: PathBuf, cause: std::io::Error },
}

/// Destination for rendered frame images
pub trait FrameSink: Sync {
    /// Store the encoded image for `frame_index`
    fn write(&self, frame_index: usize, rendered: &[u8]) -> Result<(), OutputWriteError>;
}

/// Image container used for rendered frames
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FrameFormat {
    #[default]
    Png,
    Tiff,
    Bmp,
}

impl FrameFormat {
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Tiff => "tiff",
            Self::Bmp => "bmp",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Tiff => ImageFormat::Tiff,
            Self::Bmp => ImageFormat::Bmp,
        }
    }
}

/// File name for a frame: index zero-padded to at least three digits
#[must_use]
pub fn frame_file_name(frame_index: usize, format: FrameFormat) -> String {
    format!("frame_{frame_index:03}.{}", format.extension())
}

/// Writes each frame to `<dir>/frame_NNN.<ext>`.
///
/// The directory must already exist; creating it is the caller's job.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    format: FrameFormat,
}

impl DirectorySink {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, format: FrameFormat) -> Self {
        Self {
            dir: dir.into(),
            format,
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, frame_index: usize) -> PathBuf {
        self.dir.join(frame_file_name(frame_index, self.format))
    }
}

impl FrameSink for DirectorySink {
    fn write(&self, frame_index: usize, rendered: &[u8]) -> Result<(), OutputWriteError> {
        if !self.dir.is_dir() {
            return Err(OutputWriteError::MissingDirectory(self.dir.clone()));
        }
        let path = self.path_for(frame_index);
        std::fs::write(&path, rendered).map_err(|cause| OutputWriteError::Io { path, cause })
    }
}

/// Encodes normalized frames as single-channel images
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameRenderer {
    format: FrameFormat,
}

impl FrameRenderer {
    #[must_use]
    pub fn new(format: FrameFormat) -> Self {
        Self { format }
    }

    #[must_use]
    pub fn format(&self) -> FrameFormat {
        self.format
    }

    /// Encode `frame` into an in-memory image file
    pub fn encode(&self, frame: &Array2<u8>) -> Result<Vec<u8>, OutputWriteError> {
        let (rows, cols) = frame.dim();
        let too_big = || OutputWriteError::Dimensions { rows, cols };
        let width = u32::try_from(cols).map_err(|_| too_big())?;
        let height = u32::try_from(rows).map_err(|_| too_big())?;

        // Array index [row, col] is image pixel (x = col, y = row)
        let pixels: Vec<u8> = frame.iter().copied().collect();
        let image = GrayImage::from_raw(width, height, pixels).ok_or_else(too_big)?;

        let mut encoded = Cursor::new(Vec::new());
        image
            .write_to(&mut encoded, self.format.image_format())
            .map_err(OutputWriteError::Encode)?;
        Ok(encoded.into_inner())
    }

    /// Encode `frame` and write it to `sink` under `frame_index`
    pub fn render(
        &self,
        frame_index: usize,
        frame: &Array2<u8>,
        sink: &dyn FrameSink,
    ) -> Result<(), OutputWriteError> {
        let encoded = self.encode(frame)?;
        sink.write(frame_index, &encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use ndarray::array;

    #[test]
    fn test_frame_file_names() {
        assert_eq!(frame_file_name(0, FrameFormat::Png), "frame_000.png");
        assert_eq!(frame_file_name(42, FrameFormat::Tiff), "frame_042.tiff");
        assert_eq!(frame_file_name(1234, FrameFormat::Bmp), "frame_1234.bmp");
    }

    #[test]
    fn test_render_png_decodes_to_same_pixels() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path(), FrameFormat::Png);
        let frame = array![[0u8, 85, 170], [255, 1, 2]];

        FrameRenderer::new(FrameFormat::Png).render(7, &frame, &sink).unwrap();

        let path = dir.path().join("frame_007.png");
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.color(), image::ColorType::L8);
        let gray = decoded.to_luma8();
        assert_eq!(gray.dimensions(), (3, 2));
        assert_eq!(gray.get_pixel(1, 0)[0], 85);
        assert_eq!(gray.get_pixel(0, 1)[0], 255);
        assert_eq!(gray.get_pixel(2, 1)[0], 2);
    }

    #[test]
    fn test_encode_other_formats() {
        let frame = array![[10u8, 20], [30, 40]];
        for format in [FrameFormat::Tiff, FrameFormat::Bmp] {
            let bytes = FrameRenderer::new(format).encode(&frame).unwrap();
            let decoded = image::load_from_memory(&bytes).unwrap().to_luma8();
            assert_eq!(decoded.get_pixel(1, 1)[0], 40);
        }
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not-created");
        let sink = DirectorySink::new(&missing, FrameFormat::Png);

        let result = sink.write(0, b"bytes");
        assert_matches!(result, Err(OutputWriteError::MissingDirectory(p)) if p == missing);
        assert!(!missing.exists());
    }

    #[test]
    fn test_unwritable_target_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path(), FrameFormat::Png);
        // A directory squatting on the target file name makes the write fail
        std::fs::create_dir(sink.path_for(3)).unwrap();

        let result = sink.write(3, b"bytes");
        assert_matches!(result, Err(OutputWriteError::Io { path, .. }) if path.ends_with("frame_003.png"));
    }
}
