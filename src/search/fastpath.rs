//! Platform-codec fast path: quality-only binary search, no resize.
//!
//! When the environment provides a codec that encodes straight from the
//! source file, a handful of attempts there is much cheaper than decoding
//! into memory. Failures are swallowed wholesale — a `None` from the codec
//! simply hands control to the next tier.

use super::outcome::{BestTracker, SearchOutcome};
use super::policy::{QualityBounds, SizeBudget};
use crate::codec::{EncodedBlob, OutputFormat, PlatformCodec, Quality};
use std::path::Path;

/// Hard attempt cap; the fast path is a cheap opening gambit, not a search
/// worth spending the request's budget on.
pub const FAST_PATH_MAX_ATTEMPTS: u32 = 6;

/// Binary-search quality through the platform codec.
///
/// `Found` only when an under-target candidate was recorded; the caller
/// treats `NotFound` as "tier unavailable" and falls through.
pub fn fast_path_search(
    codec: &dyn PlatformCodec,
    path: &Path,
    format: OutputFormat,
    keep_exif: bool,
    bounds: QualityBounds,
    budget: &SizeBudget,
    tracker: &mut BestTracker,
) -> SearchOutcome {
    let mut low = bounds.min as i32;
    let mut high = bounds.max as i32;
    let mut attempts = 0u32;
    let mut found = false;

    while low <= high && attempts < FAST_PATH_MAX_ATTEMPTS {
        attempts += 1;
        let mid = ((low + high) / 2) as u8;
        let quality = Quality::new(mid);

        let Some(bytes) = codec.encode_file(path, quality, format, keep_exif) else {
            log::warn!("platform codec declined q={quality}; abandoning fast path");
            break;
        };

        let size = bytes.len() as u64;
        log::debug!("fast path q={quality}: {size}B vs target {}B", budget.safe_target());
        tracker.offer(EncodedBlob::new(bytes, quality, None), budget);

        if budget.fits(size) {
            found = true;
            if tracker.band_hit(budget) {
                break;
            }
            low = mid as i32 + 1;
        } else {
            high = mid as i32 - 1;
        }
    }

    if found {
        SearchOutcome::take_from(tracker)
    } else {
        SearchOutcome::NotFound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Platform codec stub with a linear size curve and a call counter.
    struct StubCodec {
        per_quality: u64,
        calls: AtomicUsize,
        fail_after: Option<usize>,
    }

    impl StubCodec {
        fn linear(per_quality: u64) -> Self {
            Self {
                per_quality,
                calls: AtomicUsize::new(0),
                fail_after: None,
            }
        }
    }

    impl PlatformCodec for StubCodec {
        fn encode_file(
            &self,
            _path: &Path,
            quality: Quality,
            _format: OutputFormat,
            _keep_exif: bool,
        ) -> Option<Vec<u8>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_after.is_some_and(|limit| n >= limit) {
                return None;
            }
            Some(vec![0u8; (self.per_quality * quality.value() as u64) as usize])
        }
    }

    #[test]
    fn finds_under_target_candidate() {
        let codec = StubCodec::linear(1024);
        let budget = SizeBudget::new(100 * 1024, 0.95);
        let mut tracker = BestTracker::new();

        let outcome = fast_path_search(
            &codec,
            &PathBuf::from("/in.jpg"),
            OutputFormat::Jpeg,
            false,
            QualityBounds::new(40, 92),
            &budget,
            &mut tracker,
        );

        let SearchOutcome::Found(best) = outcome else {
            panic!("expected an under-target candidate");
        };
        assert!(budget.fits(best.size()));
        assert!(best.dimensions.is_none());
        // the verdict carries the winner out of the tracker
        assert!(tracker.best_under().is_none());
    }

    #[test]
    fn respects_six_attempt_cap() {
        // Sizes far over target at every quality: the search burns its six
        // attempts lowering the ceiling and gives up.
        let codec = StubCodec::linear(1_000_000);
        let budget = SizeBudget::new(100 * 1024, 0.95);
        let mut tracker = BestTracker::new();

        let outcome = fast_path_search(
            &codec,
            &PathBuf::from("/in.jpg"),
            OutputFormat::Jpeg,
            false,
            QualityBounds::new(1, 100),
            &budget,
            &mut tracker,
        );

        assert!(!outcome.is_found());
        assert!(codec.calls.load(Ordering::SeqCst) <= 6);
        // over-target attempts still feed the smallest-overall accumulator
        assert!(tracker.smallest().is_some());
    }

    #[test]
    fn codec_refusal_is_swallowed() {
        let codec = StubCodec {
            per_quality: 1024,
            calls: AtomicUsize::new(0),
            fail_after: Some(0),
        };
        let budget = SizeBudget::new(100 * 1024, 0.95);
        let mut tracker = BestTracker::new();

        let outcome = fast_path_search(
            &codec,
            &PathBuf::from("/in.jpg"),
            OutputFormat::Jpeg,
            false,
            QualityBounds::new(40, 92),
            &budget,
            &mut tracker,
        );

        assert!(!outcome.is_found());
        assert!(tracker.best_under().is_none());
    }

    #[test]
    fn early_stops_inside_band() {
        // Every quality lands exactly on target → first attempt is in band.
        struct FlatCodec(AtomicUsize);
        impl PlatformCodec for FlatCodec {
            fn encode_file(
                &self,
                _path: &Path,
                _quality: Quality,
                _format: OutputFormat,
                _keep_exif: bool,
            ) -> Option<Vec<u8>> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Some(vec![0u8; 100 * 1024])
            }
        }

        let codec = FlatCodec(AtomicUsize::new(0));
        let budget = SizeBudget::new(100 * 1024, 0.95);
        let mut tracker = BestTracker::new();
        let outcome = fast_path_search(
            &codec,
            &PathBuf::from("/in.jpg"),
            OutputFormat::Jpeg,
            false,
            QualityBounds::new(40, 92),
            &budget,
            &mut tracker,
        );

        let SearchOutcome::Found(best) = outcome else {
            panic!("expected a band hit");
        };
        assert!(budget.in_band(best.size()));
        assert_eq!(codec.0.load(Ordering::SeqCst), 1);
    }
}
