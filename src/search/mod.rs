//! The search layer — everything between "here is a decoded image" and
//! "here is the best candidate we could afford".
//!
//! The module is split into:
//! - **Dims**: pure dimension math (unit testable, no images)
//! - **Policy**: ladders, attempt caps, and the byte budget
//! - **Outcome**: per-tier verdicts, trial accounting, best-seen accumulators
//! - **Predictor**: two-probe linear model over the quality axis
//! - **Quality**: bounded binary search at a fixed dimension
//! - **Adaptive**: ladder orchestration, fallback and enforcement passes
//! - **Fastpath**: platform-codec quality-only search

pub mod adaptive;
mod dims;
pub mod fastpath;
pub mod outcome;
pub mod policy;
pub mod predictor;
pub mod quality;

pub use adaptive::{enforcement_sweep, AdaptiveSearch};
pub use dims::{apply_ceiling, fit_to_max_side, scale_dimensions};
pub use outcome::{BestTracker, SearchOutcome, TrialBudget};
pub use policy::{QualityBounds, SearchPolicy, SizeBudget};
