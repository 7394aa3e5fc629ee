//! Pure calculation functions for derivative dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Scale factor applied per step when quality reduction alone cannot meet
/// the byte budget.
pub const SHRINK_FACTOR: f64 = 0.8;

/// Fit `original` so its longer edge is at most `max_edge`, keeping aspect ratio.
///
/// Images already within bounds are returned unchanged (never upscaled).
/// The shorter edge is rounded and never drops below 1px.
///
/// # Examples
/// ```
/// # use gallery_prep::imaging::calculations::fit_within;
/// assert_eq!(fit_within((4000, 3000), 2000), (2000, 1500));
/// assert_eq!(fit_within((1200, 800), 2000), (1200, 800));
/// ```
pub fn fit_within(original: (u32, u32), max_edge: u32) -> (u32, u32) {
    let (w, h) = original;
    let longer = w.max(h);
    if longer <= max_edge || longer == 0 {
        return (w, h);
    }

    let ratio = max_edge as f64 / longer as f64;
    if w >= h {
        (max_edge, scale_edge(h, ratio))
    } else {
        (scale_edge(w, ratio), max_edge)
    }
}

/// Shrink dimensions by [`SHRINK_FACTOR`], or `None` once a 1px edge is reached.
pub fn shrink(dims: (u32, u32)) -> Option<(u32, u32)> {
    let (w, h) = dims;
    if w <= 1 || h <= 1 {
        return None;
    }
    Some((shrink_edge(w), shrink_edge(h)))
}

/// Strictly smaller than `edge` (which must be at least 2), never below 1.
fn shrink_edge(edge: u32) -> u32 {
    ((edge as f64 * SHRINK_FACTOR).floor() as u32).clamp(1, edge - 1)
}

fn scale_edge(edge: u32, ratio: f64) -> u32 {
    ((edge as f64 * ratio).round() as u32).max(1)
}
