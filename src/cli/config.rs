//! Config command: show, validate or edit the settings file.

use crate::config::Settings;
use anyhow::{Context, Result};
use clap::Args;
use std::path::Path;
use std::process::Command;

#[derive(Args)]
pub struct ConfigArgs {
    /// Open the settings file in $EDITOR
    #[arg(long)]
    pub edit: bool,

    /// Check the settings and report the first problem found
    #[arg(long)]
    pub validate: bool,
}

pub fn run(args: ConfigArgs, settings: &Settings, path: Option<&Path>) -> Result<i32> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => Settings::default_path()?,
    };

    if args.edit {
        let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
        println!("Opening user settings file for modification");
        let status = Command::new(&editor)
            .arg(&path)
            .status()
            .with_context(|| format!("failed to launch editor '{}'", editor))?;
        return Ok(if status.success() { 0 } else { 1 });
    }

    if args.validate {
        return match settings.validate() {
            Ok(()) => {
                println!("Settings OK: {}", path.display());
                Ok(0)
            }
            Err(e) => {
                println!("Invalid settings in {}: {}", path.display(), e);
                Ok(1)
            }
        };
    }

    println!("# {}", path.display());
    println!("{}", toml::to_string_pretty(settings)?);
    Ok(0)
}
