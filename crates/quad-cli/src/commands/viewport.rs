use anyhow::Context;
use quad_config::MapConfig;
use quad_core::{Coordinates, ViewportState};

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ViewportCommands;
use crate::context::AppContext;
use crate::output::output;

/// Handle `quad viewport`.
pub fn handle(action: &ViewportCommands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match action {
        ViewportCommands::Show => output(&ctx.cache.viewport(), flags.format),
        ViewportCommands::Set { lat, lon, zoom } => {
            let viewport = requested_viewport(*lat, *lon, *zoom, &ctx.config.map)?;
            ctx.cache
                .write_viewport(viewport)
                .context("failed to persist viewport")?;
            output(&viewport, flags.format)
        }
    }
}

fn requested_viewport(
    lat: f64,
    lon: f64,
    zoom: Option<f64>,
    map: &MapConfig,
) -> anyhow::Result<ViewportState> {
    let center = Coordinates::new(lat, lon)?;
    let zoom = zoom.unwrap_or(map.default_zoom);
    if !(map.min_zoom..=map.max_zoom).contains(&zoom) {
        anyhow::bail!(
            "zoom {zoom} is outside the map range {}..={}",
            map.min_zoom,
            map.max_zoom
        );
    }
    Ok(ViewportState::new(center, zoom))
}
