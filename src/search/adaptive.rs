//! Adaptive search: predictor, dimension ladder, fallback and enforcement.
//!
//! Drives a single decoded image through progressively more aggressive
//! strategies until a candidate lands in the early-stop band or every
//! avenue is spent. All candidates flow through the shared [`BestTracker`],
//! so the orchestrator can always answer with the best thing seen.

use super::dims;
use super::outcome::{BestTracker, TrialBudget};
use super::policy::{
    QualityBounds, SearchPolicy, SizeBudget, ENFORCEMENT_LADDER, ENFORCEMENT_QUALITY,
    FALLBACK_LADDER, FALLBACK_MIN_QUALITY, PRIMARY_LADDER,
};
use super::predictor::{predict_no_resize, predict_with_downscale};
use super::quality::quality_search;
use crate::codec::{EncodedBlob, Encoder, OutputFormat, Quality};

pub struct AdaptiveSearch<'a, E: Encoder> {
    encoder: &'a E,
    format: OutputFormat,
    bounds: QualityBounds,
    policy: SearchPolicy,
    budget: &'a SizeBudget,
}

impl<'a, E: Encoder> AdaptiveSearch<'a, E> {
    pub fn new(
        encoder: &'a E,
        format: OutputFormat,
        bounds: QualityBounds,
        policy: SearchPolicy,
        budget: &'a SizeBudget,
    ) -> Self {
        Self {
            encoder,
            format,
            bounds,
            policy,
            budget,
        }
    }

    /// Run the full adaptive pipeline over one decoded image.
    ///
    /// Order: predictor at full resolution, predictor-guided downscale when
    /// even the low probe overshot, then the primary dimension ladder, then
    /// the widened-quality fallback ladder. Exits as soon as the tracker
    /// holds a candidate in the early-stop band.
    pub fn run(&self, image: &E::Image, trials: &mut TrialBudget, tracker: &mut BestTracker) {
        if self.format.is_lossy() {
            let report = predict_no_resize(
                self.encoder,
                image,
                self.format,
                self.bounds,
                self.budget,
                trials,
                tracker,
            );
            if tracker.band_hit(self.budget) {
                return;
            }

            if let Some(report) = report {
                if report.s_lo > self.budget.safe_target() {
                    predict_with_downscale(
                        self.encoder,
                        image,
                        report,
                        self.format,
                        self.bounds,
                        self.budget,
                        trials,
                        tracker,
                    );
                    if tracker.band_hit(self.budget) {
                        return;
                    }
                }
            }
        }

        self.walk_ladder(image, PRIMARY_LADDER, self.bounds, trials, tracker, false);
        if tracker.band_hit(self.budget) || trials.exhausted() {
            return;
        }

        // Nothing under target at the configured floor: retry the small end
        // of the ladder with the quality floor dropped to 10.
        let nothing_fits = tracker.best_under().is_none()
            && tracker
                .smallest()
                .is_none_or(|s| s.size() > self.budget.safe_target());
        if nothing_fits && self.bounds.min > FALLBACK_MIN_QUALITY {
            log::info!(
                "fallback pass: widening quality floor {} → {}",
                self.bounds.min,
                FALLBACK_MIN_QUALITY
            );
            self.walk_ladder(
                image,
                FALLBACK_LADDER,
                self.bounds.widened(),
                trials,
                tracker,
                true,
            );
        }
    }

    /// Resize once per ladder entry and run the quality search there.
    ///
    /// Entries that would not shrink the image are skipped: the `0` entry
    /// already covers full resolution. With `first_hit_wins` the walk stops
    /// at the first under-target candidate instead of polishing toward the
    /// band (the fallback ladder wants *anything* that fits).
    fn walk_ladder(
        &self,
        image: &E::Image,
        ladder: &[u32],
        bounds: QualityBounds,
        trials: &mut TrialBudget,
        tracker: &mut BestTracker,
        first_hit_wins: bool,
    ) {
        let (width, height) = self.encoder.dimensions(image);

        for &dim in ladder {
            if trials.exhausted() {
                return;
            }

            let resized;
            let current = if dim == 0 {
                image
            } else {
                match dims::fit_to_max_side(width, height, dim) {
                    Some((w, h)) => {
                        resized = self.encoder.resize(image, w, h);
                        &resized
                    }
                    None => continue,
                }
            };

            quality_search(
                self.encoder,
                current,
                self.format,
                bounds,
                self.budget,
                self.policy.max_attempts_per_dim,
                trials,
                tracker,
            );

            if tracker.band_hit(self.budget) {
                return;
            }
            if first_hit_wins && tracker.best_under().is_some() {
                return;
            }
        }
    }
}

/// Last resort: sweep the enforcement ladder at quality 1 and take the
/// first output that fits. Not charged against the trial budget — by the
/// time this runs the budgeted search has already failed.
pub fn enforcement_sweep<E: Encoder>(
    encoder: &E,
    image: &E::Image,
    format: OutputFormat,
    budget: &SizeBudget,
    tracker: &mut BestTracker,
) {
    log::info!("enforcement sweep at quality {ENFORCEMENT_QUALITY}");
    let (width, height) = encoder.dimensions(image);
    let quality = Quality::new(ENFORCEMENT_QUALITY);

    for &dim in ENFORCEMENT_LADDER {
        let Some((w, h)) = dims::fit_to_max_side(width, height, dim) else {
            continue;
        };
        let resized = encoder.resize(image, w, h);
        match encoder.encode(&resized, quality, format) {
            Ok(bytes) => {
                let size = bytes.len() as u64;
                log::debug!("enforcement {w}x{h}: {size}B");
                tracker.offer(EncodedBlob::new(bytes, quality, Some((w, h))), budget);
                if budget.fits(size) {
                    return;
                }
            }
            Err(err) => log::warn!("enforcement encode at {w}x{h} failed: {err}"),
        }
    }
}
