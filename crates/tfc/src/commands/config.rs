//! Config command implementation.
//!
//! View and create configuration settings.
//! Config file is located at ~/.config/tfc/config.toml.

use std::env;
use std::fs;
use std::path::PathBuf;

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use terms_filter_rs::MappingConfig;

use super::{CommandContext, CommandError, Result};

/// Current config file version. Increment when making breaking changes to schema.
const CONFIG_VERSION: u32 = 1;

/// Environment variable overriding the config file path.
pub const CONFIG_ENV: &str = "TFC_CONFIG";

/// Default config file contents.
const DEFAULT_CONFIG: &str = r#"# tfc - terms filter compiler configuration

# Config schema version (do not modify)
version = 1

# Output preferences
[output]
# color = true              # Enable colors (respects NO_COLOR env)

# Filter cache settings
[cache]
# enabled = true            # false compiles without memoizing filters

# Field mappings (--mapping <FILE> replaces this table)
[mapping]
# doc_types = ["post", "user"]
#
# [mapping.fields.status]
# type = "lowercase"        # keyword, lowercase, long, double, boolean, date
#
# [mapping.fields.age]
# index_name = "user_age"
# type = "long"
"#;

/// Configuration file structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Config {
    /// Config schema version for migrations.
    /// Defaults to current version when not present in file.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,

    /// Cache settings.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Field mappings.
    #[serde(default)]
    pub mapping: MappingConfig,
}

/// Returns the current config version (used by serde default).
fn default_version() -> u32 {
    CONFIG_VERSION
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            output: OutputConfig::default(),
            cache: CacheConfig::default(),
            mapping: MappingConfig::default(),
        }
    }
}

/// Output configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Enable colors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<bool>,
}

/// Cache configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Memoize compiled filters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl CacheConfig {
    /// Whether filters are memoized; on unless disabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

/// Gets the config directory path.
/// Uses XDG-style paths: ~/.config/tfc/ on all platforms.
fn get_config_dir() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        let path = PathBuf::from(path);
        if let Some(parent) = path.parent() {
            return Ok(parent.to_path_buf());
        }
    }

    if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        return Ok(PathBuf::from(xdg_config).join("tfc"));
    }

    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".config").join("tfc"))
        .ok_or_else(|| CommandError::Config("Could not determine config directory".to_string()))
}

/// Gets the config file path.
pub fn get_config_path() -> Result<PathBuf> {
    if let Ok(path) = env::var(CONFIG_ENV) {
        return Ok(PathBuf::from(path));
    }

    let config_dir = get_config_dir()?;
    Ok(config_dir.join("config.toml"))
}

/// Loads the configuration from disk.
///
/// A missing file yields the defaults.
pub fn load_config() -> Result<Config> {
    let path = get_config_path()?;

    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(Config::default());
    }

    let content = fs::read_to_string(&path)
        .map_err(|e| CommandError::Config(format!("Failed to read config: {}", e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| CommandError::Config(format!("Failed to parse config: {}", e)))?;

    migrate_config(config)
}

/// Migrates config to current version if needed.
fn migrate_config(mut config: Config) -> Result<Config> {
    if config.version > CONFIG_VERSION {
        return Err(CommandError::Config(format!(
            "Config version {} is newer than supported version {}",
            config.version, CONFIG_VERSION
        )));
    }

    // Version 1 is the initial schema.
    config.version = CONFIG_VERSION;
    Ok(config)
}

/// Executes the config show command.
pub fn execute_show(ctx: &CommandContext) -> Result<()> {
    let config = load_config()?;
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
            "config": config,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("{}", format_config(&config, &path, ctx.use_colors));
    }

    Ok(())
}

fn format_config(config: &Config, path: &std::path::Path, use_colors: bool) -> String {
    use owo_colors::OwoColorize;
    use std::fmt::Write;

    let mut out = String::new();
    let header = "Configuration";
    if use_colors {
        let _ = writeln!(out, "{}\n", header.green().bold());
    } else {
        let _ = writeln!(out, "{}\n", header);
    }

    let _ = writeln!(out, "File: {}", path.display());
    let _ = writeln!(out, "Exists: {}", path.exists());

    let _ = writeln!(out, "\n[output]");
    let _ = writeln!(out, "  color: {}", config.output.color.unwrap_or(true));

    let _ = writeln!(out, "\n[cache]");
    let _ = writeln!(out, "  enabled: {}", config.cache.is_enabled());

    let _ = writeln!(out, "\n[mapping]");
    if !config.mapping.doc_types.is_empty() {
        let _ = writeln!(out, "  doc_types: {}", config.mapping.doc_types.join(", "));
    }
    if config.mapping.fields.is_empty() {
        let _ = write!(out, "  (no mapped fields)");
    }
    for (name, mapping) in &config.mapping.fields {
        let target = match &mapping.index_name {
            Some(index_name) => format!(" -> {}", index_name),
            None => String::new(),
        };
        let _ = writeln!(out, "  {}{}: {:?}", name, target, mapping.field_type);
    }

    out.trim_end().to_string()
}

/// Executes the config init command.
pub fn execute_init(ctx: &CommandContext, force: bool) -> Result<()> {
    let path = get_config_path()?;

    if path.exists() && !force {
        return Err(CommandError::Config(format!(
            "Config file already exists at {} (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| CommandError::Config(format!("Failed to create config directory: {}", e)))?;
    }

    fs::write(&path, DEFAULT_CONFIG)
        .map_err(|e| CommandError::Config(format!("Failed to write config: {}", e)))?;

    if ctx.json_output {
        let output = serde_json::json!({
            "status": "created",
            "path": path.display().to_string(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !ctx.quiet {
        println!("Created default config at: {}", path.display());
    }

    Ok(())
}

/// Executes the config path command.
pub fn execute_path(ctx: &CommandContext) -> Result<()> {
    let path = get_config_path()?;

    if ctx.json_output {
        let output = serde_json::json!({
            "path": path.display().to_string(),
            "exists": path.exists(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", path.display());
    }

    Ok(())
}
