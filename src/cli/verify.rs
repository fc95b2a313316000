//! Verify command: re-check backups against their checksum sidecars.

use crate::checksum::{self, SidecarStatus};
use crate::config::Settings;
use crate::series;
use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct VerifyArgs {
    /// Only check backups whose name contains this project name
    pub project: Option<String>,
}

pub async fn run(args: VerifyArgs, settings: Settings) -> Result<i32> {
    let static_dir = settings.backup.static_dir.clone();
    let project = args.project.unwrap_or_default();

    let results = tokio::task::spawn_blocking(move || -> crate::Result<Vec<_>> {
        series::gather_series(&static_dir, &project)?
            .into_iter()
            .map(|artifact| -> crate::Result<_> {
                let status = checksum::verify_sidecar(&artifact)?;
                Ok((artifact, status))
            })
            .collect()
    })
    .await??;

    let mut mismatched = 0;
    for (artifact, status) in &results {
        let label = match status {
            SidecarStatus::Valid => "ok",
            SidecarStatus::Missing => "unverified",
            SidecarStatus::Mismatch => {
                mismatched += 1;
                "MISMATCH"
            }
        };
        println!("  [{}] {}", label, artifact.display());
    }
    println!("Checked {} backups, {} mismatched", results.len(), mismatched);

    Ok(if mismatched > 0 { 2 } else { 0 })
}
