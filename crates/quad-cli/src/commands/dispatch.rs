use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Sync(args) => commands::sync::handle(&args, ctx, flags).await,
        Commands::Status => commands::status::handle(ctx, flags),
        Commands::Locations(args) => commands::locations::handle(&args, ctx, flags),
        Commands::Viewport { action } => commands::viewport::handle(&action, ctx, flags),
        Commands::Reset => commands::reset::handle(ctx, flags),
        Commands::Watch(args) => commands::watch::handle(&args, ctx, flags).await,
        Commands::Init(_) | Commands::Schema(_) => {
            unreachable!("init/schema are pre-dispatched in main")
        }
    }
}
