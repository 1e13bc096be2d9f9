//! Top-level error type.
//!
//! The engine is best-effort: codec failures inside a tier are swallowed and
//! trigger fall-through, and a spent trial budget still yields the best
//! candidate seen. Only two conditions reach the caller — the source could
//! not be read at all, or nothing could decode it and there was nothing
//! sensible to return.

use crate::options::OptionsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("failed to read source: {0}")]
    Read(#[from] std::io::Error),
    #[error("no codec could decode the source image: {0}")]
    Decode(String),
    #[error(transparent)]
    InvalidOptions(#[from] OptionsError),
    #[error("compression was cancelled before completion")]
    Cancelled,
}
