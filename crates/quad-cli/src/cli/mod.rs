use clap::Parser;

pub mod global;
pub mod root_commands;
pub mod subcommands;

pub use global::{GlobalFlags, OutputFormat};
pub use root_commands::Commands;

/// Top-level CLI parser for the `quad` binary.
#[derive(Debug, Parser)]
#[command(name = "quad", version, about = "Quad - campus map location sync")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format: json, table, raw
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Max results to return
    #[arg(short, long, global = true)]
    pub limit: Option<u32>,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root path (defaults to auto-detect via .quad)
    #[arg(short, long, global = true)]
    pub project: Option<String>,
}

impl Cli {
    /// Extract ergonomic global flags struct for command handlers.
    #[must_use]
    pub fn global_flags(&self) -> GlobalFlags {
        GlobalFlags {
            format: self.format,
            limit: self.limit,
            quiet: self.quiet,
            project: self.project.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};
    use pretty_assertions::assert_eq;

    use super::subcommands::ViewportCommands;
    use super::{Cli, Commands, GlobalFlags, OutputFormat};

    #[test]
    fn clap_command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_before_subcommand() {
        let cli = Cli::try_parse_from([
            "quad",
            "--format",
            "table",
            "--limit",
            "10",
            "--verbose",
            "status",
        ])
        .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.limit, Some(10));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from(["quad", "status", "--format", "raw", "--quiet"])
            .expect("cli should parse");

        assert_eq!(cli.format, OutputFormat::Raw);
        assert!(cli.quiet);
        assert!(matches!(cli.command, Commands::Status));
    }

    #[test]
    fn output_format_rejects_invalid_value() {
        let parsed = Cli::try_parse_from(["quad", "--format", "xml", "status"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn sync_full_flag() {
        let cli = Cli::try_parse_from(["quad", "sync", "--full"]).expect("cli should parse");
        let Commands::Sync(args) = cli.command else {
            panic!("expected sync");
        };
        assert!(args.full);
    }

    #[test]
    fn viewport_set_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["quad", "viewport", "set", "-33.86", "-151.2", "15"])
            .expect("cli should parse");
        let Commands::Viewport {
            action: ViewportCommands::Set { lat, lon, zoom },
        } = cli.command
        else {
            panic!("expected viewport set");
        };
        assert_eq!((lat, lon, zoom), (-33.86, -151.2, Some(15.0)));
    }

    #[test]
    fn locations_category_filter() {
        let cli = Cli::try_parse_from(["quad", "locations", "--category", "lecture-hall"])
            .expect("cli should parse");
        let Commands::Locations(args) = cli.command else {
            panic!("expected locations");
        };
        assert_eq!(args.category.as_deref(), Some("lecture-hall"));
    }

    #[test]
    fn global_flags_extraction_copies_values() {
        let cli = Cli::try_parse_from(["quad", "--project", "/tmp/demo", "status"])
            .expect("cli should parse");
        let flags: GlobalFlags = cli.global_flags();
        assert_eq!(flags.project.as_deref(), Some("/tmp/demo"));
    }
}
