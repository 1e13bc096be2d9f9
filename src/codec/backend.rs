//! Encoder capability traits and implementations.
//!
//! The [`Encoder`] trait abstracts the actual pixel work (decode, resize,
//! re-encode), allowing for different implementations (pure Rust, mock).
//! The [`PlatformCodec`] trait is the optional fast-path hook for an
//! environment-provided codec that encodes straight from a file.

use super::params::{OutputFormat, Quality};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
}

/// Trait for the pixel-work backend.
///
/// Implementations execute the actual image operations. This allows for:
/// - Different backends (the `image` crate, hardware codecs)
/// - Mock backends for testing the search without encoding pixels
///
/// All operations are pure: no I/O once the source bytes are in hand, and
/// `encode` is deterministic for a given `(image, quality, format)`. Encoded
/// size may still be non-monotonic in quality for pathological inputs; the
/// search layer must tolerate that.
pub trait Encoder: Send + Sync {
    /// Decoded pixel buffer. Opaque to the search layer.
    type Image: Send;

    /// Decode source bytes into an image.
    fn decode(&self, bytes: &[u8]) -> Result<Self::Image, EncoderError>;

    /// Width and height of a decoded image.
    fn dimensions(&self, image: &Self::Image) -> (u32, u32);

    /// Re-encode an image at the given quality.
    fn encode(
        &self,
        image: &Self::Image,
        quality: Quality,
        format: OutputFormat,
    ) -> Result<Vec<u8>, EncoderError>;

    /// Produce a new image scaled to exactly `width` x `height` with linear
    /// interpolation. The input is left untouched.
    fn resize(&self, image: &Self::Image, width: u32, height: u32) -> Self::Image;
}

/// Environment-provided codec that encodes directly from a file.
///
/// `None` signals "unavailable, try the next tier" — implementations must
/// never panic or error into the core. `keep_exif` only has semantics for
/// JPEG output.
pub trait PlatformCodec: Send + Sync {
    fn encode_file(
        &self,
        path: &Path,
        quality: Quality,
        format: OutputFormat,
        keep_exif: bool,
    ) -> Option<Vec<u8>>;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Size model for the mock: bytes produced for `(quality, width, height)`.
    pub type SizeCurve = Box<dyn Fn(u8, u32, u32) -> u64 + Send + Sync>;

    /// Mock encoder that fabricates outputs from a size curve instead of
    /// encoding pixels. Uses Mutex/atomics (not RefCell) so it is Sync and
    /// can be shared across worker threads.
    pub struct MockEncoder {
        pub source_dims: (u32, u32),
        curve: SizeCurve,
        pub encodes: AtomicUsize,
        pub decodes: AtomicUsize,
        pub operations: Mutex<Vec<RecordedOp>>,
        fail_decode: bool,
    }

    #[derive(Debug, Clone, PartialEq)]
    pub enum RecordedOp {
        Decode,
        Encode { quality: u8, width: u32, height: u32 },
        Resize { width: u32, height: u32 },
    }

    impl MockEncoder {
        /// A mock whose encoded size is linear in quality and proportional to
        /// pixel count: `pixels * (base + slope * q) / 10_000`.
        pub fn linear(source_dims: (u32, u32), base: f64, slope: f64) -> Self {
            Self::with_curve(
                source_dims,
                Box::new(move |q, w, h| {
                    let per_pixel = (base + slope * q as f64) / 10_000.0;
                    (w as f64 * h as f64 * per_pixel).max(0.0) as u64
                }),
            )
        }

        pub fn with_curve(source_dims: (u32, u32), curve: SizeCurve) -> Self {
            Self {
                source_dims,
                curve,
                encodes: AtomicUsize::new(0),
                decodes: AtomicUsize::new(0),
                operations: Mutex::new(Vec::new()),
                fail_decode: false,
            }
        }

        /// A mock whose `decode` always fails.
        pub fn undecodable() -> Self {
            let mut mock = Self::linear((1, 1), 0.0, 0.0);
            mock.fail_decode = true;
            mock
        }

        pub fn encode_count(&self) -> usize {
            self.encodes.load(Ordering::SeqCst)
        }

        pub fn get_operations(&self) -> Vec<RecordedOp> {
            self.operations.lock().unwrap().clone()
        }
    }

    impl Encoder for MockEncoder {
        type Image = (u32, u32);

        fn decode(&self, _bytes: &[u8]) -> Result<Self::Image, EncoderError> {
            self.decodes.fetch_add(1, Ordering::SeqCst);
            self.operations.lock().unwrap().push(RecordedOp::Decode);
            if self.fail_decode {
                return Err(EncoderError::Decode("mock refuses this input".into()));
            }
            Ok(self.source_dims)
        }

        fn dimensions(&self, image: &Self::Image) -> (u32, u32) {
            *image
        }

        fn encode(
            &self,
            image: &Self::Image,
            quality: Quality,
            _format: OutputFormat,
        ) -> Result<Vec<u8>, EncoderError> {
            self.encodes.fetch_add(1, Ordering::SeqCst);
            let (w, h) = *image;
            self.operations.lock().unwrap().push(RecordedOp::Encode {
                quality: quality.value(),
                width: w,
                height: h,
            });
            let size = (self.curve)(quality.value(), w, h);
            Ok(vec![0u8; size as usize])
        }

        fn resize(&self, _image: &Self::Image, width: u32, height: u32) -> Self::Image {
            self.operations
                .lock()
                .unwrap()
                .push(RecordedOp::Resize { width, height });
            (width, height)
        }
    }

    #[test]
    fn linear_mock_scales_with_quality_and_pixels() {
        let mock = MockEncoder::linear((100, 100), 0.0, 100.0);
        let img = mock.decode(b"whatever").unwrap();

        let at_50 = mock.encode(&img, Quality::new(50), OutputFormat::Jpeg).unwrap();
        let at_100 = mock.encode(&img, Quality::new(100), OutputFormat::Jpeg).unwrap();
        assert_eq!(at_50.len() * 2, at_100.len());

        let half = mock.resize(&img, 100, 50);
        let half_at_50 = mock.encode(&half, Quality::new(50), OutputFormat::Jpeg).unwrap();
        assert_eq!(half_at_50.len() * 2, at_50.len());
    }

    #[test]
    fn mock_records_operations() {
        let mock = MockEncoder::linear((640, 480), 100.0, 10.0);
        let img = mock.decode(b"x").unwrap();
        let small = mock.resize(&img, 320, 240);
        mock.encode(&small, Quality::new(75), OutputFormat::Jpeg).unwrap();

        let ops = mock.get_operations();
        assert_eq!(ops.len(), 3);
        assert!(matches!(ops[1], RecordedOp::Resize { width: 320, height: 240 }));
        assert!(matches!(
            ops[2],
            RecordedOp::Encode { quality: 75, width: 320, height: 240 }
        ));
        assert_eq!(mock.encode_count(), 1);
    }

    #[test]
    fn undecodable_mock_errors_on_decode() {
        let mock = MockEncoder::undecodable();
        assert!(mock.decode(b"x").is_err());
        assert_eq!(mock.decodes.load(Ordering::SeqCst), 1);
    }
}
