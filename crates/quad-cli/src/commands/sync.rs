use anyhow::Context;
use quad_core::SyncOutcome;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SyncArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `quad sync`.
pub async fn handle(args: &SyncArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let engine = ctx.sync_engine()?;
    let result = if args.full {
        engine.sync(None).await
    } else {
        engine.refresh().await
    };
    let report = result.context("location sync failed")?;

    if report.outcome == SyncOutcome::Superseded {
        tracing::warn!(
            watermark = %report.new_watermark,
            "server returned an older snapshot than the cache; nothing was applied"
        );
    }

    output(&report.to_response(), flags.format)
}
