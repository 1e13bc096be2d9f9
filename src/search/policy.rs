//! Search policy: dimension ladders, attempt caps, and the byte budget.
//!
//! Pure data. The ladders order maximum-longest-side caps from "no resize"
//! downward, so the engine always tries to meet the target at full
//! resolution (maximizing quality) before shrinking.

use crate::options::Options;

/// Primary dimension ladder; `0` means "no downscale".
pub const PRIMARY_LADDER: &[u32] = &[
    0, 3000, 2048, 1600, 1280, 1024, 800, 640, 480, 360, 320, 256, 224, 200, 180, 160, 128,
];

/// Ladder retried with widened quality bounds when the primary pass found
/// nothing under target.
pub const FALLBACK_LADDER: &[u32] = &[360, 320, 256, 224, 200, 180, 160, 128];

/// Last-resort ladder swept at quality 1.
pub const ENFORCEMENT_LADDER: &[u32] = &[
    640, 480, 360, 320, 256, 224, 200, 180, 160, 128, 112, 96, 80,
];

/// Quality floor used by the fallback pass regardless of `min_quality`.
pub const FALLBACK_MIN_QUALITY: u8 = 10;

/// The only quality the enforcement sweep tries.
pub const ENFORCEMENT_QUALITY: u8 = 1;

/// Targets below this floor are clamped up; searching for outputs smaller
/// than 10 KiB degenerates badly on photographic content.
pub const SAFE_TARGET_FLOOR: u64 = 10 * 1024;

/// Attempt caps for one search invocation.
#[derive(Debug, Clone, Copy)]
pub struct SearchPolicy {
    pub max_attempts_per_dim: u32,
    pub max_total_trials: u32,
}

impl SearchPolicy {
    pub fn from_options(options: &Options) -> Self {
        Self {
            max_attempts_per_dim: options.max_attempts_per_dim,
            max_total_trials: options.max_total_trials,
        }
    }
}

/// Inclusive quality bounds for a search pass.
#[derive(Debug, Clone, Copy)]
pub struct QualityBounds {
    pub min: u8,
    pub max: u8,
}

impl QualityBounds {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max: max.max(min) }
    }

    pub fn contains(&self, q: u8) -> bool {
        q >= self.min && q <= self.max
    }

    /// Bounds for the fallback pass: floor dropped to 10, same ceiling.
    pub fn widened(&self) -> Self {
        Self::new(FALLBACK_MIN_QUALITY, self.max)
    }
}

/// The working byte budget: raw target, safe target, and early-stop band.
#[derive(Debug, Clone, Copy)]
pub struct SizeBudget {
    target_bytes: u64,
    safe_target_bytes: u64,
    early_stop_floor: u64,
}

impl SizeBudget {
    pub fn new(target_bytes: u64, early_stop_ratio: f64) -> Self {
        let safe_target_bytes = target_bytes.max(SAFE_TARGET_FLOOR);
        Self {
            target_bytes,
            safe_target_bytes,
            early_stop_floor: (early_stop_ratio * safe_target_bytes as f64).floor() as u64,
        }
    }

    pub fn target(&self) -> u64 {
        self.target_bytes
    }

    pub fn safe_target(&self) -> u64 {
        self.safe_target_bytes
    }

    /// A size at or under the safe target.
    pub fn fits(&self, size: u64) -> bool {
        size <= self.safe_target_bytes
    }

    /// A size inside `[floor(ratio * safe_target), safe_target]` — close
    /// enough to the budget that searching further is wasted work.
    pub fn in_band(&self, size: u64) -> bool {
        size >= self.early_stop_floor && size <= self.safe_target_bytes
    }
}
