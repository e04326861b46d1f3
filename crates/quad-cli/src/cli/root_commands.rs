use clap::{Args, Subcommand};

use super::subcommands::ViewportCommands;

/// Root subcommands for `quad`.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a .quad directory with a starter config.
    Init(InitArgs),
    /// Sync the local location cache with the campus maps service.
    Sync(SyncArgs),
    /// Show cache, watermark and viewport status.
    Status,
    /// List cached locations.
    Locations(LocationsArgs),
    /// Show or set the persisted map viewport.
    Viewport {
        #[command(subcommand)]
        action: ViewportCommands,
    },
    /// Drop cached locations and the watermark. The next sync is a full snapshot.
    Reset,
    /// Run the headless map runtime until Ctrl-C.
    Watch(WatchArgs),
    /// Print the JSON Schema of a command response.
    Schema(SchemaArgs),
}

/// Arguments for `quad init`.
#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Maps service origin written to the starter config.
    #[arg(long)]
    pub base_url: Option<String>,
    /// Overwrite an existing .quad/config.toml.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for `quad sync`.
#[derive(Clone, Debug, Args)]
pub struct SyncArgs {
    /// Ignore the cached watermark and fetch a full snapshot.
    #[arg(long)]
    pub full: bool,
}

/// Arguments for `quad locations`.
#[derive(Clone, Debug, Args)]
pub struct LocationsArgs {
    /// Only show this category (food, lecture-hall, hostel, admin, recreation, default).
    #[arg(long)]
    pub category: Option<String>,
    /// Case-insensitive substring match on the location name.
    #[arg(long)]
    pub search: Option<String>,
}

/// Arguments for `quad watch`.
#[derive(Clone, Debug, Args)]
pub struct WatchArgs {
    /// Background refresh period in seconds (defaults to sync.refresh_interval_secs).
    #[arg(long)]
    pub refresh_secs: Option<u64>,
    /// Treat the session as signed in, so the add flow opens instead of a login prompt.
    #[arg(long)]
    pub authenticated: bool,
    /// Device position as "<lon>, <lat>", used for startup and `locate`.
    #[arg(long)]
    pub position: Option<String>,
}

/// Arguments for `quad schema`.
#[derive(Clone, Debug, Args)]
pub struct SchemaArgs {
    /// Response type: status, sync, location, viewport, coordinates.
    pub type_name: String,
}
