//! Bounded binary search over quality at a fixed dimension.

use super::outcome::{BestTracker, TrialBudget};
use super::policy::{QualityBounds, SizeBudget};
use crate::codec::{EncodedBlob, Encoder, OutputFormat, Quality};

/// Binary-search the quality band for the largest output that still fits.
///
/// Each step encodes at `mid`; a fitting size records the candidate and
/// raises the floor (seek higher quality still under target), an oversized
/// one lowers the ceiling. Stops when the bounds cross, on the per-dimension
/// attempt cap, on trial-budget exhaustion, or as soon as a candidate lands
/// in the early-stop band.
///
/// Encoded size is not guaranteed monotonic in quality, so this is a
/// heuristic: the tracker's accumulators keep the result well-defined
/// regardless of where the probe path wanders.
pub fn quality_search<E: Encoder>(
    encoder: &E,
    image: &E::Image,
    format: OutputFormat,
    bounds: QualityBounds,
    budget: &SizeBudget,
    max_attempts: u32,
    trials: &mut TrialBudget,
    tracker: &mut BestTracker,
) {
    let (width, height) = encoder.dimensions(image);

    if !format.is_lossy() {
        // Quality has no effect: a single probe at this dimension tells us
        // everything the format can.
        single_probe(encoder, image, format, bounds, budget, trials, tracker);
        return;
    }

    let mut low = bounds.min as i32;
    let mut high = bounds.max as i32;
    let mut attempts = 0u32;

    while low <= high && attempts < max_attempts {
        if !trials.charge() {
            log::debug!("trial budget exhausted at {width}x{height}");
            return;
        }
        attempts += 1;

        let mid = ((low + high) / 2) as u8;
        let quality = Quality::new(mid);
        let bytes = match encoder.encode(image, quality, format) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("encode at q={quality} failed, abandoning dimension: {err}");
                return;
            }
        };

        let size = bytes.len() as u64;
        log::debug!(
            "trial {width}x{height} q={quality}: {size}B vs target {}B",
            budget.safe_target()
        );

        let fits = budget.fits(size);
        tracker.offer(
            EncodedBlob::new(bytes, quality, Some((width, height))),
            budget,
        );

        if fits {
            if tracker.band_hit(budget) {
                return;
            }
            low = mid as i32 + 1;
        } else {
            high = mid as i32 - 1;
        }
    }
}

/// One encode at the top of the band; used for formats without a quality
/// knob (PNG) where only the dimension matters.
fn single_probe<E: Encoder>(
    encoder: &E,
    image: &E::Image,
    format: OutputFormat,
    bounds: QualityBounds,
    budget: &SizeBudget,
    trials: &mut TrialBudget,
    tracker: &mut BestTracker,
) {
    if !trials.charge() {
        return;
    }
    let (width, height) = encoder.dimensions(image);
    let quality = Quality::new(bounds.max);
    match encoder.encode(image, quality, format) {
        Ok(bytes) => {
            log::debug!("trial {width}x{height} (dimension-only): {}B", bytes.len());
            tracker.offer(
                EncodedBlob::new(bytes, quality, Some((width, height))),
                budget,
            );
        }
        Err(err) => log::warn!("encode at {width}x{height} failed: {err}"),
    }
}
