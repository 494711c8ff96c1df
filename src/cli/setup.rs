use crate::core::config::AppConfig;
use anyhow::{Context, Result};
use std::path::Path;

const EXAMPLE_CONFIG: &str = r#"# Example configuration file for ivault
providers:
  yahoo:
    base_url: "https://query1.finance.yahoo.com"

currency:
  # Default display currency.
  primary: "TRY"
  # Settlement currency of instruments without the market suffix.
  secondary: "USD"
  # Used when the live exchange rate cannot be fetched.
  fallback_rate: 30.0
  # Symbols ending with this suffix settle in the primary currency.
  market_suffix: ".IS"

# Where the transaction ledger is stored. Defaults to the platform data dir.
# data_path: "/home/user/.local/share/ivault"
"#;

/// Creates a default configuration file at the default location.
pub fn setup() -> Result<()> {
    let path = AppConfig::default_config_path()?;
    setup_at_path(&path)
}

/// Creates a default configuration file at the specified path.
pub fn setup_at_path<P: AsRef<Path>>(path: P) -> Result<()> {
    let path = path.as_ref();

    if path.exists() {
        anyhow::bail!("Configuration file already exists at {}", path.display());
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(path, EXAMPLE_CONFIG)
        .with_context(|| format!("Failed to write config file to {}", path.display()))?;

    println!("Created default configuration at {}", path.display());
    Ok(())
}
