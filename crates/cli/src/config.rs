use clap::ValueEnum;
use serde::Deserialize;

use crate::error::Result;

const DEFAULT_CONFIG_PATH: &str = "config/ledger.toml";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Log level for the `ledger` and `ledger_cli` targets.
    pub level: String,
    /// Reject events that reference ids outside the declared members.
    pub strict_members: bool,
    pub format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            strict_members: false,
            format: OutputFormat::Text,
        }
    }
}

/// Command line values that take precedence over file and environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub config: Option<String>,
    pub level: Option<String>,
    pub strict_members: Option<bool>,
    pub format: Option<OutputFormat>,
}

/// Layers the optional TOML file, `LEDGER_*` environment variables and the
/// command line, in increasing priority.
pub fn load(overrides: Overrides) -> Result<Settings> {
    let config_path = overrides.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("LEDGER").try_parsing(true));
    let mut settings: Settings = builder.build()?.try_deserialize()?;

    if let Some(level) = overrides.level {
        settings.level = level;
    }
    if let Some(strict_members) = overrides.strict_members {
        settings.strict_members = strict_members;
    }
    if let Some(format) = overrides.format {
        settings.format = format;
    }

    Ok(settings)
}
