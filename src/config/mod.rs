mod settings;

use config::{Config, ConfigError, Environment, File};

pub use settings::{LoggingSettings, PartialSettings, ServerSettings, SessionSettings, Settings};

/// Prefix of environment overrides, e.g. `SENDQ_SESSION__POLL_INTERVAL_MS`.
pub const ENV_PREFIX: &str = "SENDQ";

/// Loads the configuration from `config/default` (optional) and `SENDQ_*`
/// environment variables, then fills the gaps with defaults.
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    Ok(partial.merge_into(Settings::default()))
}
