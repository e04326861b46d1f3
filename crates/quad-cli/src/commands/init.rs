use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::InitArgs;
use crate::context::QUAD_DIR;
use crate::output::output;

const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Serialize)]
struct InitResponse {
    project_root: PathBuf,
    config_path: PathBuf,
    overwritten: bool,
}

/// Handle `quad init`.
pub fn handle(args: &InitArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let root = match &flags.project {
        Some(path) => PathBuf::from(path),
        None => std::env::current_dir().context("failed to read current directory")?,
    };
    let response = write_starter_config(&root, args.base_url.as_deref(), args.force)?;
    output(&response, flags.format)
}

fn write_starter_config(
    root: &Path,
    base_url: Option<&str>,
    force: bool,
) -> anyhow::Result<InitResponse> {
    let quad_dir = root.join(QUAD_DIR);
    let config_path = quad_dir.join(CONFIG_FILE);
    let exists = config_path.exists();
    if exists && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    std::fs::create_dir_all(&quad_dir)
        .with_context(|| format!("failed to create {}", quad_dir.display()))?;
    std::fs::write(&config_path, starter_config(base_url))
        .with_context(|| format!("failed to write {}", config_path.display()))?;
    tracing::info!(path = %config_path.display(), "wrote starter config");

    Ok(InitResponse {
        project_root: root.to_path_buf(),
        config_path,
        overwritten: exists,
    })
}

fn starter_config(base_url: Option<&str>) -> String {
    let base_url = match base_url {
        Some(url) => format!("base_url = {}", toml_string(url)),
        None => String::from("# base_url = \"https://maps.campus.example\""),
    };
    format!(
        "# Quad project config. QUAD_* environment variables override these values\n\
         # (QUAD_SYNC__BASE_URL, QUAD_MAP__DEFAULT_ZOOM, ...).\n\
         \n\
         [sync]\n\
         {base_url}\n\
         # auth_token = \"\"\n\
         # refresh_interval_secs = 300\n\
         # dedupe_interval_secs = 30\n\
         \n\
         [map]\n\
         # default_center_lat = 12.9716\n\
         # default_center_lon = 77.5946\n\
         # default_zoom = 14.0\n"
    )
}

/// Basic TOML string literal.
fn toml_string(raw: &str) -> String {
    let escaped = raw.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}
