use anyhow::Context;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct ResetResponse {
    removed_locations: usize,
    had_watermark: bool,
}

/// Handle `quad reset`. The viewport and pending placement are kept.
pub fn handle(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let previous = ctx.cache.read();
    ctx.cache
        .invalidate()
        .context("failed to invalidate location cache")?;

    output(
        &ResetResponse {
            removed_locations: previous.len(),
            had_watermark: previous.watermark.is_some(),
        },
        flags.format,
    )
}
