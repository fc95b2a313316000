//! Info command: database, project count and active project.

use crate::config::Settings;
use crate::store::{self, ProjectStore};
use crate::walker;
use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct InfoArgs {
    /// List every project found
    #[arg(long)]
    pub list: bool,
}

pub async fn run(args: InfoArgs, settings: Settings) -> Result<i32> {
    let mut store = super::open_store(&settings)?;

    let output = tokio::task::spawn_blocking(move || -> crate::Result<Vec<String>> {
        let mut lines = Vec::new();
        let database = store.current_database_info()?;
        let walk = walker::collect_projects(&mut store, None)?;

        lines.push("ACTIVE DATABASE".to_string());
        lines.push(store::database_banner(&database));
        lines.push(String::new());
        lines.push("TOTAL PROJECTS".to_string());
        lines.push(walk.projects.len().to_string());
        if args.list {
            lines.extend(walk.projects.iter().map(|p| format!("  {}", p)));
        }
        lines.push(String::new());
        lines.push("ACTIVE PROJECT".to_string());
        lines.push(
            store
                .current_project()?
                .map(|p| p.to_string())
                .unwrap_or_else(|| "(none)".to_string()),
        );
        if !walk.dead_folders.is_empty() {
            lines.push(String::new());
            lines.push("EMPTY FOLDERS".to_string());
            lines.extend(walk.dead_folders.iter().map(|f| format!("  {}", f.join("/"))));
        }
        Ok(lines)
    })
    .await??;

    for line in output {
        println!("{}", line);
    }
    Ok(0)
}
