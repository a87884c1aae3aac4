//! Config command implementation.

use crate::cli::{ConfigAction, ConfigArgs};
use crate::config::{load_config, resolve_config_path, Overrides};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use policylens_engine::PolicyLensConfig;
use std::path::Path;

/// Execute the config command.
pub async fn execute_config(
    args: ConfigArgs,
    explicit_path: Option<&Path>,
    overrides: &Overrides,
    formatter: &Formatter,
) -> Result<()> {
    let path = resolve_config_path(explicit_path)?;

    match args.action {
        ConfigAction::Show => {
            let mut config = load_config(explicit_path)?;
            overrides.apply(&mut config)?;
            println!("{}", config.to_toml().map_err(CliError::Config)?);
        }
        ConfigAction::Path => {
            println!("{}", path.display());
            if !path.exists() {
                println!("{}", formatter.info("File does not exist, built-in defaults are used"));
            }
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(CliError::InvalidInput(format!(
                    "{} already exists, use --force to overwrite",
                    path.display()
                )));
            }
            PolicyLensConfig::default().save(&path)?;
            println!("{}", formatter.success(&format!("Wrote {}", path.display())));
        }
        ConfigAction::Validate => {
            PolicyLensConfig::load(&path)?;
            println!("{}", formatter.success(&format!("{} is valid", path.display())));
        }
    }

    Ok(())
}
