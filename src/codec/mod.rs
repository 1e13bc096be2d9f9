//! Codec seam — the only place pixels are touched.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image::load_from_memory` |
//! | **Resize** | triangle filter (linear interpolation) |
//! | **JPEG / PNG** | `image` encoders |
//! | **Lossy WebP** | vendored libwebp via the `webp` crate |
//!
//! The module is split into:
//! - **Parameters**: data describing encode requests ([`Quality`], [`OutputFormat`], [`EncodedBlob`])
//! - **Backend**: [`Encoder`] capability trait + [`PlatformCodec`] fast-path hook
//! - **RustEncoder**: the default pure-Rust implementation

pub mod backend;
mod params;
pub mod rust_backend;

pub use backend::{Encoder, EncoderError, PlatformCodec};
pub use params::{EncodedBlob, OutputFormat, Quality};
pub use rust_backend::RustEncoder;
