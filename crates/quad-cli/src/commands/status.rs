use quad_cache::LocalCache;
use quad_core::responses::StatusResponse;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `quad status`.
pub fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&build_status(&ctx.cache), flags.format)
}

fn build_status(cache: &LocalCache) -> StatusResponse {
    let state = cache.read();
    StatusResponse {
        locations: state.len(),
        renderable: state.renderable().count(),
        watermark: state.watermark,
        degraded: cache.is_degraded(),
        viewport: cache.viewport(),
        pending_placement: cache.pending_placement(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use quad_cache::LocalCache;
    use quad_core::{CacheState, Category, Coordinates, Location};

    use super::build_status;

    fn location(id: &str, lat: f64) -> Location {
        Location {
            id: id.into(),
            name: id.into(),
            coordinates: Coordinates { lat, lon: 77.59 },
            category: Category::Food,
            updated_at: Utc.with_ymd_and_hms(2025, 2, 1, 8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn empty_cache_status() {
        let status = build_status(&LocalCache::in_memory());
        assert_eq!(status.locations, 0);
        assert_eq!(status.watermark, None);
        assert!(status.viewport.is_none());
        assert!(!status.degraded);
    }

    #[test]
    fn out_of_range_locations_are_not_renderable() {
        let cache = LocalCache::in_memory();
        let watermark = Utc.with_ymd_and_hms(2025, 2, 1, 9, 0, 0).unwrap();
        cache
            .write(CacheState::from_locations(
                [location("canteen", 12.97), location("broken", 123.0)],
                Some(watermark),
            ))
            .unwrap();

        let status = build_status(&cache);
        assert_eq!(status.locations, 2);
        assert_eq!(status.renderable, 1);
        assert_eq!(status.watermark, Some(watermark));
    }
}
