//! Two-probe linear predictor: quality → encoded size.
//!
//! Encoding is the expensive oracle here, so before walking the dimension
//! ladder the engine spends two probes fitting `size(q) ≈ a·q + b` and jumps
//! straight to the predicted quality. The fit is crude but photographic
//! JPEG curves are close enough to linear in the mid band for the prediction
//! to land within a trial or two of the budget.

use super::dims;
use super::outcome::{BestTracker, TrialBudget};
use super::policy::{QualityBounds, SizeBudget, FALLBACK_MIN_QUALITY};
use crate::codec::{EncodedBlob, Encoder, OutputFormat, Quality};

/// Probe qualities for the full-resolution pass.
const PROBE_HI: u8 = 85;
const PROBE_LO: u8 = 35;

/// Probe qualities after a predicted downscale.
const RESCALE_PROBE_HI: u8 = 80;
const RESCALE_PROBE_LO: u8 = 50;

/// Quality the size model is evaluated at when estimating how many bytes a
/// downscale must shed.
const DOWNSCALE_REFERENCE_QUALITY: f64 = 75.0;

/// Smallest dimension scale the predictor will propose in one jump.
const MIN_DIM_SCALE: f64 = 0.1;

/// Least-squares-free linear fit through two probe points.
#[derive(Debug, Clone, Copy)]
struct LinearFit {
    a: f64,
    b: f64,
}

impl LinearFit {
    fn from_probes(q_lo: u8, s_lo: u64, q_hi: u8, s_hi: u64) -> Self {
        let a = (s_hi as f64 - s_lo as f64) / (q_hi as f64 - q_lo as f64);
        let b = s_lo as f64 - a * q_lo as f64;
        Self { a, b }
    }

    /// A near-zero slope means the oracle is not responding to quality and
    /// the solve below would divide by noise.
    fn is_degenerate(&self) -> bool {
        self.a.abs() <= 1e-6
    }

    fn size_at(&self, q: f64) -> f64 {
        self.a * q + self.b
    }

    /// Quality predicted to hit `target`, clamped to [10, 100].
    fn quality_for(&self, target: u64) -> Option<u8> {
        if self.is_degenerate() {
            return None;
        }
        let q = ((target as f64 - self.b) / self.a).round();
        Some(q.clamp(10.0, 100.0) as u8)
    }
}

/// Sizes observed by the initial probe pair; the caller uses `s_lo` to
/// decide whether a downscale is unavoidable.
#[derive(Debug, Clone, Copy)]
pub struct ProbeReport {
    pub q_hi: u8,
    pub s_hi: u64,
    pub q_lo: u8,
    pub s_lo: u64,
}

/// Full-resolution predictor pass: two probes, a solve, then up to three
/// trials `{q*, q*+5, q*−5}` filtered to the active quality band.
///
/// Returns `None` when probing was impossible (encode failure or spent
/// budget). All probe and trial outputs are offered to the tracker, so a
/// lucky probe already counts as a candidate.
pub fn predict_no_resize<E: Encoder>(
    encoder: &E,
    image: &E::Image,
    format: OutputFormat,
    bounds: QualityBounds,
    budget: &SizeBudget,
    trials: &mut TrialBudget,
    tracker: &mut BestTracker,
) -> Option<ProbeReport> {
    // Probe qualities never exceed the configured ceiling; every candidate
    // the tracker sees stays within [1, initial_quality].
    let q_hi = PROBE_HI.min(bounds.max);
    let q_lo = PROBE_LO.min(bounds.max);

    let s_hi = probe(encoder, image, q_hi, format, budget, trials, tracker)?;
    let s_lo = if q_lo == q_hi {
        s_hi
    } else {
        probe(encoder, image, q_lo, format, budget, trials, tracker)?
    };
    let report = ProbeReport {
        q_hi,
        s_hi,
        q_lo,
        s_lo,
    };

    if tracker.band_hit(budget) || q_lo == q_hi {
        return Some(report);
    }

    let fit = LinearFit::from_probes(q_lo, s_lo, q_hi, s_hi);
    let Some(q_star) = fit.quality_for(budget.safe_target()) else {
        log::debug!("predictor fit degenerate (a≈0), skipping trials");
        return Some(report);
    };
    log::debug!("predictor: a={:.1} b={:.0} q*={q_star}", fit.a, fit.b);

    let candidates = trial_set(q_star, |q| bounds.contains(q));
    run_trials(encoder, image, &candidates, format, budget, trials, tracker);
    Some(report)
}

/// Downscale pass, used when even the low probe overshot the target: derive
/// a dimension scale from the byte overshoot, resize once, then re-probe and
/// solve again with the quality floor dropped to the fallback minimum.
///
/// Returns the resized image so the ladder can reuse it if the trials here
/// do not land in the band.
pub fn predict_with_downscale<E: Encoder>(
    encoder: &E,
    image: &E::Image,
    report: ProbeReport,
    format: OutputFormat,
    bounds: QualityBounds,
    budget: &SizeBudget,
    trials: &mut TrialBudget,
    tracker: &mut BestTracker,
) -> Option<E::Image> {
    let estimated = if report.q_hi == report.q_lo {
        report.s_hi as f64
    } else {
        let fit = LinearFit::from_probes(report.q_lo, report.s_lo, report.q_hi, report.s_hi);
        if fit.is_degenerate() {
            (report.s_hi + report.s_lo) as f64 / 2.0
        } else {
            fit.size_at(DOWNSCALE_REFERENCE_QUALITY)
        }
    };
    if estimated <= 0.0 {
        return None;
    }

    // Bytes scale roughly with pixel count, so the side length scales with
    // the square root of the byte ratio.
    let byte_scale = budget.safe_target() as f64 / estimated;
    let dim_scale = byte_scale.sqrt().max(MIN_DIM_SCALE);

    let (width, height) = encoder.dimensions(image);
    let (new_w, new_h) = dims::scale_dimensions(width, height, dim_scale);
    if (new_w, new_h) == (width, height) {
        return None;
    }
    log::debug!("predictor downscale: {width}x{height} → {new_w}x{new_h} (scale {dim_scale:.3})");
    let resized = encoder.resize(image, new_w, new_h);

    let q_hi = RESCALE_PROBE_HI.min(bounds.max);
    let q_lo = RESCALE_PROBE_LO.min(bounds.max);
    let s_hi = probe(encoder, &resized, q_hi, format, budget, trials, tracker);
    let s_lo = probe(encoder, &resized, q_lo, format, budget, trials, tracker);
    if tracker.band_hit(budget) || q_hi == q_lo {
        return Some(resized);
    }

    if let (Some(s_hi), Some(s_lo)) = (s_hi, s_lo) {
        let fit = LinearFit::from_probes(q_lo, s_lo, q_hi, s_hi);
        if let Some(q_star) = fit.quality_for(budget.safe_target()) {
            // Desperation pass: the floor drops to the fallback minimum, the
            // ceiling stays at the configured maximum.
            let clamp_lo = FALLBACK_MIN_QUALITY;
            let candidates = trial_set(q_star, |q| q >= clamp_lo && q <= bounds.max);
            run_trials(encoder, &resized, &candidates, format, budget, trials, tracker);
        }
    }

    Some(resized)
}

/// Encode once at `quality`, charge the budget, offer the output.
fn probe<E: Encoder>(
    encoder: &E,
    image: &E::Image,
    quality: u8,
    format: OutputFormat,
    budget: &SizeBudget,
    trials: &mut TrialBudget,
    tracker: &mut BestTracker,
) -> Option<u64> {
    if !trials.charge() {
        return None;
    }
    let quality = Quality::new(quality);
    let dims = encoder.dimensions(image);
    match encoder.encode(image, quality, format) {
        Ok(bytes) => {
            let size = bytes.len() as u64;
            log::debug!("probe q={quality}: {size}B");
            tracker.offer(EncodedBlob::new(bytes, quality, Some(dims)), budget);
            Some(size)
        }
        Err(err) => {
            log::warn!("probe at q={quality} failed: {err}");
            None
        }
    }
}

/// `{q*, q*+5, q*−5}` in that order, deduplicated, kept only where `keep`
/// accepts them.
fn trial_set(q_star: u8, keep: impl Fn(u8) -> bool) -> Vec<u8> {
    let mut set = Vec::with_capacity(3);
    for q in [q_star as i16, q_star as i16 + 5, q_star as i16 - 5] {
        if !(1..=100).contains(&q) {
            continue;
        }
        let q = q as u8;
        if keep(q) && !set.contains(&q) {
            set.push(q);
        }
    }
    set
}

fn run_trials<E: Encoder>(
    encoder: &E,
    image: &E::Image,
    qualities: &[u8],
    format: OutputFormat,
    budget: &SizeBudget,
    trials: &mut TrialBudget,
    tracker: &mut BestTracker,
) {
    for &q in qualities {
        if probe(encoder, image, q, format, budget, trials, tracker).is_none() {
            return;
        }
        if tracker.band_hit(budget) {
            return;
        }
    }
}
