//! Dry-run the pipeline and report what a sync would do.

use super::load_config;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;
use vaultpub_core::{RunReport, VaultPublisher};
use vaultpub_types::DocPath;

#[derive(Serialize)]
struct Shadowed<'a> {
    name: &'a str,
    path: &'a DocPath,
}

#[derive(Serialize)]
struct CheckSummary<'a> {
    report: &'a RunReport,
    shadowed_stems: Vec<Shadowed<'a>>,
    shadowed_attachments: Vec<Shadowed<'a>>,
}

fn shadowed(entries: &[(String, DocPath)]) -> Vec<Shadowed<'_>> {
    entries
        .iter()
        .map(|(name, path)| Shadowed { name, path })
        .collect()
}

/// Run discovery, classification and link resolution without writing output
pub async fn check_site(config_path: &Path, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let output = VaultPublisher::new(config)
        .check()
        .await
        .context("Failed to check vault")?;

    let summary = CheckSummary {
        report: &output.report,
        shadowed_stems: shadowed(&output.shadowed_stems),
        shadowed_attachments: shadowed(&output.shadowed_attachments),
    };

    if json {
        let payload = serde_json::to_string_pretty(&summary)?;
        println!("{}", payload);
        return Ok(());
    }

    let report = summary.report;
    println!(
        "Check complete: {} notes, {} posts ({} skipped), {} attachments, {} documents",
        report.notes_written,
        report.posts_published,
        report.posts_skipped,
        report.attachments_copied,
        report.documents_copied
    );
    println!(
        "{} malformed, {} collisions, {} shadowed stems, {} shadowed attachments",
        report.malformed, report.collisions, report.shadowed_stems, report.shadowed_attachments
    );
    for entry in &summary.shadowed_stems {
        println!("- stem '{}' unreachable at {}", entry.name, entry.path);
    }
    for entry in &summary.shadowed_attachments {
        println!("- attachment '{}' unreachable at {}", entry.name, entry.path);
    }

    Ok(())
}
