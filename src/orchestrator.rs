//! Top-level compression entry point.
//!
//! [`Compressor::compress`] runs the tiered strategy from the cheapest to
//! the most desperate:
//!
//! 1. **Passthrough** — the source already fits the (safe) target.
//! 2. **Fast path** — platform codec, quality-only binary search.
//! 3. **Adaptive search** — predictor plus the dimension ladder, with a
//!    widened-quality fallback pass.
//! 4. **Enforcement** — quality-1 sweep over ever smaller dimensions.
//!
//! Sources already close to the target get an extra searching pass before
//! the general one, with the quality floor raised to
//! `preferred_min_quality`, so a nearly fitting image is never butchered
//! for a few kilobytes. When that pass finds nothing, the same fast-path +
//! adaptive pair runs again at the configured floor.
//!
//! The request holds one gate permit from entry to exit; the CPU-heavy
//! search runs on the blocking pool so callers can await without stalling
//! their event loop.

use crate::codec::{EncodedBlob, Encoder, EncoderError, PlatformCodec, RustEncoder};
use crate::error::CompressError;
use crate::gate::ConcurrencyGate;
use crate::options::Options;
use crate::search::{
    enforcement_sweep, fastpath::fast_path_search, AdaptiveSearch, BestTracker, QualityBounds,
    SearchOutcome, SearchPolicy, SizeBudget, TrialBudget,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Reported when the input is returned unchanged.
const PASSTHROUGH_QUALITY: u8 = 100;

/// Compression source: a file path or an in-memory buffer.
#[derive(Debug, Clone)]
pub enum Input {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

impl From<PathBuf> for Input {
    fn from(path: PathBuf) -> Self {
        Input::Path(path)
    }
}

impl From<&Path> for Input {
    fn from(path: &Path) -> Self {
        Input::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for Input {
    fn from(bytes: Vec<u8>) -> Self {
        Input::Bytes(bytes)
    }
}

/// The chosen output.
///
/// `quality_used` is 100 exactly when the input was returned unchanged;
/// dimensions are reported when the winning candidate went through the
/// decoder (the platform fast path does not).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Compressed {
    pub bytes: Vec<u8>,
    pub quality_used: u8,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Compressed {
    fn passthrough(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            quality_used: PASSTHROUGH_QUALITY,
            width: None,
            height: None,
        }
    }

    fn from_blob(blob: EncodedBlob) -> Self {
        let (width, height) = match blob.dimensions {
            Some((w, h)) => (Some(w), Some(h)),
            None => (None, None),
        };
        Self {
            bytes: blob.bytes,
            quality_used: blob.quality.value(),
            width,
            height,
        }
    }
}

/// Tiered compression orchestrator.
///
/// Cheap to clone pieces are shared: the encoder and the optional platform
/// codec sit behind `Arc`s, and the gate defaults to the process-global one.
pub struct Compressor<E: Encoder = RustEncoder> {
    encoder: Arc<E>,
    platform: Option<Arc<dyn PlatformCodec>>,
    gate: Arc<ConcurrencyGate>,
}

impl Compressor<RustEncoder> {
    pub fn new() -> Self {
        Self::with_encoder(RustEncoder::new())
    }
}

impl Default for Compressor<RustEncoder> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Encoder + 'static> Compressor<E> {
    pub fn with_encoder(encoder: E) -> Self {
        Self {
            encoder: Arc::new(encoder),
            platform: None,
            gate: ConcurrencyGate::shared(),
        }
    }

    /// Attach an environment-provided codec for the fast path.
    pub fn with_platform_codec(mut self, codec: impl PlatformCodec + 'static) -> Self {
        self.platform = Some(Arc::new(codec));
        self
    }

    /// Replace the process-global gate, e.g. to widen or isolate it.
    pub fn with_gate(mut self, gate: Arc<ConcurrencyGate>) -> Self {
        self.gate = gate;
        self
    }

    /// The underlying encoder.
    pub fn encoder(&self) -> &E {
        &self.encoder
    }

    /// Compress `input` to fit the configured byte target.
    ///
    /// Best-effort: intermediate codec failures are swallowed, and when no
    /// candidate fits, the smallest one seen (if smaller than the source) or
    /// the source itself is returned. Errors only when the source cannot be
    /// read, or nothing could decode it at any tier.
    pub async fn compress(
        &self,
        input: impl Into<Input>,
        options: Options,
    ) -> Result<Compressed, CompressError> {
        options.validate()?;
        let _permit = self.gate.acquire().await;

        let (original, path) = match input.into() {
            Input::Path(path) => {
                let bytes = tokio::fs::read(&path).await?;
                (bytes, Some(path))
            }
            Input::Bytes(bytes) => (bytes, None),
        };

        let budget = options.budget();
        if original.len() as u64 <= budget.safe_target() {
            log::debug!(
                "passthrough: {}B already fits {}B",
                original.len(),
                budget.safe_target()
            );
            return Ok(Compressed::passthrough(original));
        }

        let encoder = Arc::clone(&self.encoder);
        let platform = self.platform.clone();
        let task = tokio::task::spawn_blocking(move || {
            run_tiers(
                &*encoder,
                platform.as_deref(),
                path.as_deref(),
                original,
                &options,
                &budget,
            )
        });

        match task.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(_) => Err(CompressError::Cancelled),
        }
    }
}

/// Everything after the passthrough check, on the blocking pool.
///
/// The near-target and general branches are sequential tiers, not
/// alternatives: a near-target source first searches with the quality floor
/// raised to `preferred_min_quality`, and only when that finds nothing does
/// the configured floor get its turn. Enforcement runs last.
fn run_tiers<E: Encoder>(
    encoder: &E,
    platform: Option<&dyn PlatformCodec>,
    path: Option<&Path>,
    original: Vec<u8>,
    options: &Options,
    budget: &SizeBudget,
) -> Result<Compressed, CompressError> {
    let mut tiers = SearchTiers {
        encoder,
        platform,
        path,
        original: &original,
        options,
        budget,
        tracker: BestTracker::new(),
        decoded: None,
    };

    if original.len() as u64 <= options.near_target_threshold() {
        let bounds = options.quality_bounds(true);
        log::info!(
            "source {}B is near target: trying quality floor {} first",
            original.len(),
            bounds.min
        );
        if let SearchOutcome::Found(blob) = tiers.search_branch(bounds) {
            return Ok(winner(blob, budget));
        }
    }

    if let SearchOutcome::Found(blob) = tiers.search_branch(options.quality_bounds(false)) {
        return Ok(winner(blob, budget));
    }

    let SearchTiers {
        mut tracker,
        decoded,
        ..
    } = tiers;
    match decoded {
        Some(Ok(image)) => {
            let all_over = tracker
                .smallest()
                .is_none_or(|s| s.size() > budget.safe_target());
            if all_over {
                enforcement_sweep(encoder, &image, options.format, budget, &mut tracker);
            }
        }
        Some(Err(err)) if tracker.smallest().is_none() => {
            return Err(CompressError::Decode(err.to_string()));
        }
        _ => {}
    }

    Ok(select_result(tracker, original, budget))
}

/// Shared state for the searching branches: both work against the same
/// accumulators and the same once-decoded image, but each branch gets its
/// own trial budget and quality bounds.
struct SearchTiers<'a, E: Encoder> {
    encoder: &'a E,
    platform: Option<&'a dyn PlatformCodec>,
    path: Option<&'a Path>,
    original: &'a [u8],
    options: &'a Options,
    budget: &'a SizeBudget,
    tracker: BestTracker,
    decoded: Option<Result<E::Image, EncoderError>>,
}

impl<E: Encoder> SearchTiers<'_, E> {
    /// One branch: platform fast path, then the adaptive search.
    fn search_branch(&mut self, bounds: QualityBounds) -> SearchOutcome {
        if let (Some(path), Some(codec)) = (self.path, self.platform) {
            if self.options.format.is_lossy() {
                let outcome = fast_path_search(
                    codec,
                    path,
                    self.options.format,
                    self.options.keep_exif,
                    bounds,
                    self.budget,
                    &mut self.tracker,
                );
                if outcome.is_found() {
                    log::info!("fast path satisfied the target");
                    return outcome;
                }
            }
        }

        self.decode_once();
        if let Some(Ok(image)) = &self.decoded {
            let mut trials = TrialBudget::new(self.options.max_total_trials);
            AdaptiveSearch::new(
                self.encoder,
                self.options.format,
                bounds,
                SearchPolicy::from_options(self.options),
                self.budget,
            )
            .run(image, &mut trials, &mut self.tracker);
            log::debug!(
                "adaptive search [{}..={}] spent {} trials",
                bounds.min,
                bounds.max,
                trials.used()
            );
        }
        SearchOutcome::take_from(&mut self.tracker)
    }

    /// Decode lazily, once: a fast-path win never pays for a decode, and the
    /// second branch reuses the first branch's image.
    fn decode_once(&mut self) {
        if self.decoded.is_none() {
            self.decoded = Some(
                self.encoder
                    .decode(self.original)
                    .map(|image| apply_pre_cap(self.encoder, image, self.options))
                    .inspect_err(|err| log::warn!("decoder rejected source: {err}")),
            );
        }
    }
}

/// A branch produced an under-target candidate: the search is over.
fn winner(blob: EncodedBlob, budget: &SizeBudget) -> Compressed {
    log::info!(
        "fit {}B into {}B at q={}",
        blob.size(),
        budget.safe_target(),
        blob.quality
    );
    Compressed::from_blob(blob)
}

/// Honor `max_width`/`max_height` once, before any searching, so the ladder
/// never re-inflates past the caller's ceiling.
fn apply_pre_cap<E: Encoder>(encoder: &E, image: E::Image, options: &Options) -> E::Image {
    let (width, height) = encoder.dimensions(&image);
    match crate::search::apply_ceiling(width, height, options.max_width, options.max_height) {
        Some((w, h)) => {
            log::debug!("pre-cap {width}x{height} → {w}x{h}");
            encoder.resize(&image, w, h)
        }
        None => image,
    }
}

/// Pick the winner: the largest candidate under the safe target, otherwise
/// the smallest candidate that still beats the original, otherwise the
/// original unchanged.
fn select_result(tracker: BestTracker, original: Vec<u8>, budget: &SizeBudget) -> Compressed {
    let (best_under, smallest) = tracker.into_parts();

    if let Some(best) = best_under {
        log::info!(
            "fit {}B into {}B at q={}",
            best.size(),
            budget.safe_target(),
            best.quality
        );
        return Compressed::from_blob(best);
    }

    match smallest {
        Some(blob) if blob.size() < original.len() as u64 => {
            log::info!(
                "target {}B unreachable; returning smallest candidate ({}B)",
                budget.safe_target(),
                blob.size()
            );
            Compressed::from_blob(blob)
        }
        _ => {
            log::info!("no candidate beat the source; returning it unchanged");
            Compressed::passthrough(original)
        }
    }
}
