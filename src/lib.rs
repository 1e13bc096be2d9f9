//! # Bytefit
//!
//! Adaptive image recompression: given a source image and a byte budget,
//! produce an output whose encoded size is as close as possible to — but
//! never over — that budget, at the highest quality that still fits.
//!
//! # Architecture: Tiered Search
//!
//! Encoding is the expensive oracle here, so the engine is organized around
//! spending as few encodes as possible:
//!
//! ```text
//! 1. Passthrough   source already fits the target           (0 encodes)
//! 2. Fast path     platform codec, quality-only search      (at most 6)
//! 3. Adaptive      2-probe predictor + dimension ladder     (budgeted)
//! 4. Enforcement   quality-1 sweep down the ladder          (last resort)
//! ```
//!
//! The search space is two-dimensional — JPEG quality q ∈ [1,100] and
//! maximum pixel dimension — and the oracle is not even guaranteed
//! monotonic in q. Two accumulators keep the result well-defined anyway:
//! the largest candidate under the target (the answer we want) and the
//! smallest candidate overall (the answer of last resort).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`orchestrator`] | Entry point — tier sequencing, result selection, worker offload |
//! | [`search`] | Predictor, quality binary search, dimension ladders, accumulators |
//! | [`codec`] | The [`Encoder`] capability (pure Rust default) and platform fast-path hook |
//! | [`options`] | Per-request configuration with serde defaults and validation |
//! | [`gate`] | Process-wide fair semaphore bounding concurrent compressions |
//! | [`error`] | The two errors that can actually reach a caller |
//!
//! # Design Decisions
//!
//! ## Best-Effort, Never Worse
//!
//! Codec failures inside a tier are swallowed and the next tier runs. A
//! spent trial budget returns the best candidate seen so far. When nothing
//! fits, the caller gets the smallest candidate that still beats the source,
//! or the source unchanged. An error surfaces only for unreadable or
//! undecodable input.
//!
//! ## The Encoder Is a Capability
//!
//! All pixel work goes through the [`Encoder`] trait. The default
//! [`RustEncoder`] is fully statically linked (`image` + vendored libwebp);
//! tests drive the search with mock encoders whose size curves are chosen
//! per scenario, so search behavior is tested without encoding a single
//! pixel.
//!
//! ## Bounded Concurrency
//!
//! A decoded photo plus its working candidates costs real memory, so a
//! process-global fair semaphore caps concurrent requests at
//! `clamp(cores − 1, 1, 3)`. The CPU-heavy search runs on the blocking
//! pool; `compress` is async and never stalls its caller's event loop.
//!
//! # Example
//!
//! ```no_run
//! use bytefit::{Compressor, Options};
//!
//! # async fn example() -> Result<(), bytefit::CompressError> {
//! let compressor = Compressor::new();
//! let result = compressor
//!     .compress(std::path::PathBuf::from("photo.jpg"), Options::new(200))
//!     .await?;
//! assert!(result.bytes.len() <= 200 * 1024);
//! # Ok(())
//! # }
//! ```

pub mod codec;
pub mod error;
pub mod gate;
pub mod options;
pub mod orchestrator;
pub mod search;

pub use codec::{
    EncodedBlob, Encoder, EncoderError, OutputFormat, PlatformCodec, Quality, RustEncoder,
};
pub use error::CompressError;
pub use gate::ConcurrencyGate;
pub use options::{Options, OptionsError};
pub use orchestrator::{Compressed, Compressor, Input};
