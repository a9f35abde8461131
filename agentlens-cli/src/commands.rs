//! CLI subcommand handlers.

use crate::Commands;
use crate::ConfigAction;
use std::path::Path;

/// Handle a CLI subcommand.
pub fn handle_command(
    command: &Commands,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match command {
        Commands::Config { action } => handle_config(action, workspace, config_file),
    }
}

fn handle_config(
    action: &ConfigAction,
    workspace: &Path,
    config_file: Option<&Path>,
) -> anyhow::Result<()> {
    match action {
        ConfigAction::Show => {
            let config = agentlens_core::load_config(Some(workspace), config_file)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("{}", toml_str);
            Ok(())
        }
        ConfigAction::Path => {
            for (path, exists) in agentlens_core::config::config_sources(Some(workspace), config_file)
            {
                let marker = if exists { "found" } else { "missing" };
                println!("{:<8} {}", marker, path.display());
            }
            Ok(())
        }
    }
}
