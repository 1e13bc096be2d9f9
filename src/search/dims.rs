//! Pure calculation functions for target dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Scale `(width, height)` so the longer side equals `max_side`, preserving
/// aspect ratio.
///
/// Returns `None` when the image is already within bounds (scale factor
/// would be >= 1.0), in which case the image must be left unchanged.
///
/// # Examples
/// ```
/// # use bytefit::search::fit_to_max_side;
/// // 4000x3000 capped at 1024 on the longer side → 1024x768
/// assert_eq!(fit_to_max_side(4000, 3000, 1024), Some((1024, 768)));
///
/// // already small enough → no-op
/// assert_eq!(fit_to_max_side(800, 600, 1024), None);
/// ```
pub fn fit_to_max_side(width: u32, height: u32, max_side: u32) -> Option<(u32, u32)> {
    let longer = width.max(height);
    if max_side == 0 || longer <= max_side {
        return None;
    }

    let scale = max_side as f64 / longer as f64;
    Some(scale_dimensions(width, height, scale))
}

/// Apply an optional hard ceiling on width and/or height.
///
/// Returns the capped dimensions, or `None` when the image already fits.
/// The aspect ratio is preserved; the tighter of the two constraints wins.
pub fn apply_ceiling(
    width: u32,
    height: u32,
    max_width: Option<u32>,
    max_height: Option<u32>,
) -> Option<(u32, u32)> {
    let w_scale = match max_width {
        Some(mw) if mw > 0 && width > mw => mw as f64 / width as f64,
        _ => 1.0,
    };
    let h_scale = match max_height {
        Some(mh) if mh > 0 && height > mh => mh as f64 / height as f64,
        _ => 1.0,
    };

    let scale = w_scale.min(h_scale);
    if scale >= 1.0 {
        return None;
    }
    Some(scale_dimensions(width, height, scale))
}

/// Scale both dimensions by `factor`, rounding, with a 1px floor.
pub fn scale_dimensions(width: u32, height: u32, factor: f64) -> (u32, u32) {
    let w = ((width as f64 * factor).round() as u32).max(1);
    let h = ((height as f64 * factor).round() as u32).max(1);
    (w, h)
}
