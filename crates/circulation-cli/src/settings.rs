use anyhow::{Context, Result};
use circulation_core::CirculationConfig;
use config::{Config, Environment, File, Map};

/// Load circulation settings from `<path>.toml` and the process environment.
pub fn load(path: &str) -> Result<CirculationConfig> {
    load_with_env(path, None)
}

/// Load circulation settings.
///
/// Sources, later ones override earlier ones:
/// 1. Defaults (`CirculationConfig::default()`)
/// 2. `<path>.toml` if it exists
/// 3. Variables prefixed with `CIRCULATION_`
///    (`CIRCULATION_DISABLED_OPERATIONS=transfer,receive`), read from `env`
///    when given, otherwise from the process environment
pub fn load_with_env(path: &str, env: Option<Map<String, String>>) -> Result<CirculationConfig> {
    let settings = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix("CIRCULATION")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("disabled_operations")
                .source(env),
        )
        .build()
        .with_context(|| format!("failed to read settings from {path}"))?;

    settings
        .try_deserialize()
        .context("invalid circulation settings")
}
