//! Compression options.
//!
//! All knobs are optional except the byte target — construct with
//! [`Options::new`] and override what you need:
//!
//! ```
//! use bytefit::Options;
//!
//! let options = Options {
//!     min_quality: 50,
//!     ..Options::new(200) // fit into 200 KB
//! };
//! assert!(options.validate().is_ok());
//! ```
//!
//! The struct round-trips through serde with every field defaulted, so
//! callers can persist partial configurations.

use crate::codec::OutputFormat;
use crate::search::{QualityBounds, SizeBudget};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("invalid option '{field}': {reason}")]
pub struct OptionsError {
    pub field: &'static str,
    pub reason: String,
}

fn invalid(field: &'static str, reason: impl Into<String>) -> OptionsError {
    OptionsError {
        field,
        reason: reason.into(),
    }
}

/// Configuration for one compression request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Byte target in kilobytes; the engine aims for `target_size_kb * 1024`
    /// bytes from below. Required (> 0).
    pub target_size_kb: u32,
    /// Inclusive upper quality bound for every produced candidate.
    pub initial_quality: u8,
    /// Inclusive lower quality bound for non-fallback passes.
    pub min_quality: u8,
    /// Output format. Quality only varies for JPEG and WebP.
    pub format: OutputFormat,
    /// Ask the platform codec to carry EXIF over (JPEG only).
    pub keep_exif: bool,
    /// A candidate at or above `early_stop_ratio * safe_target` (and under
    /// the target) stops the search.
    pub early_stop_ratio: f64,
    /// Sources within `near_target_factor` of the target take a
    /// high-quality shortcut before the full search.
    pub near_target_factor: f64,
    /// Quality floor substituted during the near-target shortcut
    /// (`max(preferred_min_quality, min_quality)`).
    pub preferred_min_quality: u8,
    /// Binary-search attempts per ladder dimension.
    pub max_attempts_per_dim: u32,
    /// Total encoder-call budget for the adaptive search.
    pub max_total_trials: u32,
    /// Optional hard ceiling applied once, before any searching.
    pub max_width: Option<u32>,
    /// See `max_width`.
    pub max_height: Option<u32>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            target_size_kb: 0,
            initial_quality: 92,
            min_quality: 40,
            format: OutputFormat::Jpeg,
            keep_exif: false,
            early_stop_ratio: 0.95,
            near_target_factor: 1.2,
            preferred_min_quality: 80,
            max_attempts_per_dim: 5,
            max_total_trials: 24,
            max_width: None,
            max_height: None,
        }
    }
}

impl Options {
    pub fn new(target_size_kb: u32) -> Self {
        Self {
            target_size_kb,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.target_size_kb == 0 {
            return Err(invalid("target_size_kb", "must be greater than 0"));
        }
        if !(1..=100).contains(&self.initial_quality) {
            return Err(invalid("initial_quality", "must be in 1..=100"));
        }
        if self.min_quality == 0 || self.min_quality > self.initial_quality {
            return Err(invalid(
                "min_quality",
                format!("must be in 1..={}", self.initial_quality),
            ));
        }
        if self.early_stop_ratio.is_nan()
            || self.early_stop_ratio <= 0.0
            || self.early_stop_ratio > 1.0
        {
            return Err(invalid("early_stop_ratio", "must be in (0, 1]"));
        }
        if self.near_target_factor.is_nan() || self.near_target_factor < 1.0 {
            return Err(invalid("near_target_factor", "must be at least 1.0"));
        }
        if !(1..=100).contains(&self.preferred_min_quality) {
            return Err(invalid("preferred_min_quality", "must be in 1..=100"));
        }
        if self.max_attempts_per_dim == 0 {
            return Err(invalid("max_attempts_per_dim", "must be greater than 0"));
        }
        if self.max_total_trials == 0 {
            return Err(invalid("max_total_trials", "must be greater than 0"));
        }
        Ok(())
    }

    pub fn target_bytes(&self) -> u64 {
        self.target_size_kb as u64 * 1024
    }

    pub fn budget(&self) -> SizeBudget {
        SizeBudget::new(self.target_bytes(), self.early_stop_ratio)
    }

    /// A source this close to the target gets the high-quality shortcut.
    pub fn near_target_threshold(&self) -> u64 {
        (self.budget().safe_target() as f64 * self.near_target_factor).floor() as u64
    }

    /// Quality bounds for a pass; the near-target shortcut raises the floor
    /// to `preferred_min_quality`.
    pub fn quality_bounds(&self, near_target: bool) -> QualityBounds {
        let min = if near_target {
            self.preferred_min_quality.max(self.min_quality)
        } else {
            self.min_quality
        };
        QualityBounds::new(min, self.initial_quality)
    }
}
