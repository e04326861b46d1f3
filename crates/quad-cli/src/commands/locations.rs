use quad_core::responses::LocationRow;
use quad_core::{CacheState, Category};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::LocationsArgs;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `quad locations`.
pub fn handle(args: &LocationsArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let category = args
        .category
        .as_deref()
        .map(|raw| parse_enum::<Category>(raw, "category"))
        .transpose()?;

    let mut rows = select(&ctx.cache.read(), category, args.search.as_deref());
    if let Some(limit) = flags.limit {
        rows.truncate(usize::try_from(limit)?);
    }

    output(&rows, flags.format)
}

/// Cached locations matching the filters, sorted by name then id.
fn select(state: &CacheState, category: Option<Category>, search: Option<&str>) -> Vec<LocationRow> {
    let needle = search.map(str::to_lowercase);
    let mut rows: Vec<LocationRow> = state
        .iter()
        .filter(|location| category.is_none_or(|c| location.category == c))
        .filter(|location| {
            needle
                .as_deref()
                .is_none_or(|n| location.name.to_lowercase().contains(n))
        })
        .map(LocationRow::from)
        .collect();
    rows.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    rows
}
