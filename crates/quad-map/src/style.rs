//! Marker appearance: category colours, zoom scaling, pop-in stagger.

use std::time::Duration;

use quad_core::Category;

/// Marker diameter at scale 1.0.
pub const BASE_MARKER_SIZE_PX: f64 = 28.0;

pub const MIN_MARKER_SCALE: f64 = 0.9;
pub const MAX_MARKER_SCALE: f64 = 1.4;

/// Peak scale of the click pulse.
pub const PULSE_SCALE: f64 = 1.3;

/// Delay between consecutive created markers popping in.
pub const POP_IN_STAGGER: Duration = Duration::from_millis(30);

/// Fill colour and icon name for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerStyle {
    pub color: &'static str,
    pub icon: &'static str,
}

impl MarkerStyle {
    #[must_use]
    pub const fn for_category(category: Category) -> Self {
        let (color, icon) = match category {
            Category::Food => ("#ef4444", "utensils"),
            Category::LectureHall => ("#3b82f6", "graduation-cap"),
            Category::Hostel => ("#22c55e", "home"),
            Category::Admin => ("#f97316", "building"),
            Category::Recreation => ("#14b8a6", "tree-palm"),
            Category::Default => ("#6b7280", "map-pin"),
        };
        Self { color, icon }
    }
}

/// Everything the surface needs to draw a new marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerSpec {
    pub style: MarkerStyle,
    pub scale: f64,
    /// How long to wait before the pop-in animation starts.
    pub appear_delay: Duration,
}

/// Marker scale for a zoom level: grows linearly from 0.9 at zoom 12 and is
/// clamped to `[0.9, 1.4]`.
#[must_use]
pub fn scale_for_zoom(zoom: f64) -> f64 {
    ((zoom - 12.0) / 6.0 + 0.9).clamp(MIN_MARKER_SCALE, MAX_MARKER_SCALE)
}

#[must_use]
pub fn marker_size_px(scale: f64) -> f64 {
    BASE_MARKER_SIZE_PX * scale
}

/// Appear delay of the `index`-th marker created in one reconcile pass.
#[must_use]
pub fn appear_delay(index: usize) -> Duration {
    POP_IN_STAGGER.saturating_mul(u32::try_from(index).unwrap_or(u32::MAX))
}
