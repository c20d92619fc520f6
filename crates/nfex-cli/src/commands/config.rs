//! Config command - manage configuration.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;
use tracing::debug;

use nfex_core::models::config::NfexConfig;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a new configuration file
    Init(InitArgs),

    /// Get a specific configuration value
    Get {
        /// Configuration key (e.g., "report.mode")
        key: String,
    },

    /// Set a configuration value
    Set {
        /// Configuration key
        key: String,
        /// New value
        value: String,
    },

    /// Show configuration file path
    Path,
}

#[derive(Args)]
struct InitArgs {
    /// Output path for configuration file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub async fn run(args: ConfigArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path
        .map(PathBuf::from)
        .unwrap_or_else(default_config_path);

    match args.command {
        ConfigCommand::Show => show_config(&path),
        ConfigCommand::Init(init_args) => init_config(init_args, &path),
        ConfigCommand::Get { key } => get_config(&path, &key),
        ConfigCommand::Set { key, value } => set_config(&path, &key, &value),
        ConfigCommand::Path => show_path(&path),
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("nfex")
        .join("config.json")
}

/// Load the configuration used by pipeline commands: an explicit path,
/// else the default file if present, else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<NfexConfig> {
    if let Some(path) = config_path {
        debug!("Loading configuration from {}", path);
        return Ok(NfexConfig::from_file(Path::new(path))?);
    }

    read_or_default(&default_config_path())
}

/// Configuration stored at `path`, or defaults when there is no file yet.
fn read_or_default(path: &Path) -> anyhow::Result<NfexConfig> {
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(NfexConfig::from_file(path)?)
    } else {
        Ok(NfexConfig::default())
    }
}

fn show_config(config_path: &Path) -> anyhow::Result<()> {
    let config = if config_path.exists() {
        NfexConfig::from_file(config_path)?
    } else {
        println!(
            "{} No config file found, showing defaults.",
            style("ℹ").blue()
        );
        NfexConfig::default()
    };

    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}

fn init_config(args: InitArgs, config_path: &Path) -> anyhow::Result<()> {
    let output_path = args.output.unwrap_or_else(|| config_path.to_path_buf());

    if output_path.exists() && !args.force {
        anyhow::bail!(
            "Config file already exists at {}. Use --force to overwrite.",
            output_path.display()
        );
    }

    // Create parent directory if needed
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let config = NfexConfig::default();
    config.save(&output_path)?;

    println!(
        "{} Created configuration file at {}",
        style("✓").green(),
        output_path.display()
    );

    Ok(())
}

fn lookup<'a>(json: &'a serde_json::Value, key: &str) -> anyhow::Result<&'a serde_json::Value> {
    key.split('.').try_fold(json, |current, part| {
        current
            .get(part)
            .ok_or_else(|| anyhow::anyhow!("Configuration key not found: {}", key))
    })
}

fn get_config(config_path: &Path, key: &str) -> anyhow::Result<()> {
    let config = read_or_default(config_path)?;

    // Convert config to JSON for key lookup
    let json = serde_json::to_value(&config)?;
    println!("{}", serde_json::to_string_pretty(lookup(&json, key)?)?);

    Ok(())
}

/// Set `key` in the JSON form of `config` and convert back, so the value is
/// checked against the configuration types.
fn apply_setting(config: &NfexConfig, key: &str, value: &str) -> anyhow::Result<NfexConfig> {
    // Parse the value
    let parsed_value: serde_json::Value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));

    let mut json = serde_json::to_value(config)?;

    let (parent_key, last) = match key.rsplit_once('.') {
        Some((parent, last)) => (Some(parent), last),
        None => (None, key),
    };

    let mut current = &mut json;
    if let Some(parent_key) = parent_key {
        for part in parent_key.split('.') {
            current = current
                .get_mut(part)
                .ok_or_else(|| anyhow::anyhow!("Configuration path not found: {}", key))?;
        }
    }

    let obj = current
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("Cannot set value at non-object path"))?;
    if !obj.contains_key(last) {
        anyhow::bail!("Configuration key not found: {}", key);
    }
    obj.insert(last.to_string(), parsed_value);

    let updated: NfexConfig = serde_json::from_value(json)?;
    updated.validate()?;
    Ok(updated)
}

fn set_config(config_path: &Path, key: &str, value: &str) -> anyhow::Result<()> {
    let config = read_or_default(config_path)?;
    let config = apply_setting(&config, key, value)?;

    // Create parent directory if needed
    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    config.save(config_path)?;

    println!("{} Set {} = {}", style("✓").green(), key, value);

    Ok(())
}

fn show_path(config_path: &Path) -> anyhow::Result<()> {
    println!("Configuration file: {}", config_path.display());

    if config_path.exists() {
        println!("Status: {}", style("exists").green());
    } else {
        println!("Status: {}", style("not created").yellow());
        println!();
        println!("Run 'nfex config init' to create a configuration file.");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfex_core::report::WriteMode;

    #[test]
    fn test_apply_setting() {
        let config = NfexConfig::default();

        let updated = apply_setting(&config, "report.mode", "append").unwrap();
        assert_eq!(updated.report.mode, WriteMode::Append);

        let updated = apply_setting(&config, "input.dir", "/data/nfe").unwrap();
        assert_eq!(updated.input.dir, PathBuf::from("/data/nfe"));

        let updated =
            apply_setting(&config, "classification.asset_keywords", r#"["monitor"]"#).unwrap();
        assert_eq!(updated.classification.asset_keywords, vec!["monitor"]);
    }

    #[test]
    fn test_apply_setting_rejects_bad_values() {
        let config = NfexConfig::default();
        assert!(apply_setting(&config, "report.mode", "sometimes").is_err());
        assert!(apply_setting(&config, "report.colour", "red").is_err());
        assert!(apply_setting(&config, "nothing.here", "1").is_err());
        assert!(apply_setting(&config, "report.file_name", "\"\"").is_err());
    }

    #[test]
    fn test_lookup() {
        let json = serde_json::to_value(NfexConfig::default()).unwrap();
        assert_eq!(lookup(&json, "report.file_name").unwrap(), "dados_nfe.xlsx");
        assert!(lookup(&json, "report.missing").is_err());
    }

    #[test]
    fn test_set_writes_to_given_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("nfex.json");

        set_config(&path, "report.mode", "append").unwrap();
        set_config(&path, "report.file_name", "notas.csv").unwrap();

        let saved = NfexConfig::from_file(&path).unwrap();
        assert_eq!(saved.report.mode, WriteMode::Append);
        assert_eq!(saved.report.file_name, "notas.csv");
        assert_eq!(read_or_default(&path).unwrap().report.mode, WriteMode::Append);
    }

    #[test]
    fn test_read_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = read_or_default(&dir.path().join("missing.json")).unwrap();
        assert_eq!(config.report.file_name, "dados_nfe.xlsx");
    }
}
