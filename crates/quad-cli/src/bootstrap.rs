use std::path::Path;

use anyhow::Context;
use quad_config::QuadConfig;

/// Load `.env` from the project root (or the working directory), then the
/// layered config.
pub fn load_config(project_root: &Path) -> anyhow::Result<QuadConfig> {
    load_project_dotenv(project_root)?;
    let config = QuadConfig::load_from(project_root).context("failed to load quad config")?;
    warn_unconfigured(&config, std::env::vars().map(|(key, _)| key));
    Ok(config)
}

fn load_project_dotenv(project_root: &Path) -> anyhow::Result<()> {
    let env_path = project_root.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
        return Ok(());
    }

    dotenvy::dotenv().ok();
    Ok(())
}

/// Warn about `QUAD_SYNC*` keys that were set but did not reach the config,
/// usually a single underscore where `__` was meant.
fn warn_unconfigured<I>(config: &QuadConfig, env_keys: I)
where
    I: IntoIterator<Item = String>,
{
    if let Some(warning) = unconfigured_sync_warning(config, env_keys) {
        tracing::warn!("{warning}");
    }
}

fn unconfigured_sync_warning<I>(config: &QuadConfig, env_keys: I) -> Option<&'static str>
where
    I: IntoIterator<Item = String>,
{
    let has_sync_env = env_keys
        .into_iter()
        .any(|key| key.starts_with("QUAD_SYNC"));
    (!config.sync.is_configured() && has_sync_env).then_some(
        "sync config appears default while QUAD_SYNC* env vars exist. Use double underscores (example: QUAD_SYNC__BASE_URL).",
    )
}

#[cfg(test)]
mod tests {
    use quad_config::QuadConfig;

    use super::unconfigured_sync_warning;

    #[test]
    fn warns_on_single_underscore_keys() {
        let config = QuadConfig::default();
        let keys = vec!["QUAD_SYNC_BASE_URL".to_string()];
        assert!(unconfigured_sync_warning(&config, keys).is_some());
    }

    #[test]
    fn quiet_when_sync_is_configured() {
        let mut config = QuadConfig::default();
        config.sync.base_url = "https://maps.example".into();
        let keys = vec!["QUAD_SYNC__BASE_URL".to_string()];
        assert!(unconfigured_sync_warning(&config, keys).is_none());
    }

    #[test]
    fn quiet_without_sync_env() {
        let config = QuadConfig::default();
        assert!(unconfigured_sync_warning(&config, vec!["HOME".to_string()]).is_none());
    }
}
