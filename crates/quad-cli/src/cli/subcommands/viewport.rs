use clap::Subcommand;

/// Persisted viewport management.
#[derive(Clone, Debug, Subcommand)]
pub enum ViewportCommands {
    /// Show the persisted viewport.
    Show,
    /// Replace the persisted viewport.
    Set {
        #[arg(allow_negative_numbers = true)]
        lat: f64,
        #[arg(allow_negative_numbers = true)]
        lon: f64,
        /// Zoom level (defaults to map.default_zoom).
        zoom: Option<f64>,
    },
}
