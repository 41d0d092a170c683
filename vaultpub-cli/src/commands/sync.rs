//! Sync command implementation.

use super::load_config;
use anyhow::{Context, Result};
use std::path::Path;
use vaultpub_core::VaultPublisher;

/// Run the full pipeline and print the run summary
pub async fn sync_site(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    let publisher = VaultPublisher::new(config);
    let output = publisher.publish().await.context("Failed to sync vault")?;
    let report = &output.report;

    println!(
        "✓ Synced {} notes, {} posts, {} attachments, {} documents",
        report.notes_written,
        report.posts_published,
        report.attachments_copied,
        report.documents_copied
    );
    println!(
        "  - {} search records, {} backlink targets",
        report.search_records, report.backlink_targets
    );
    if report.documents_converted > 0 {
        println!("  - {} generated pages (LaTeX, Anki)", report.documents_converted);
    }
    if report.posts_skipped > 0 {
        println!("  - {} posts not marked for publishing", report.posts_skipped);
    }
    if report.malformed > 0 {
        println!("  - {} documents skipped (malformed metadata)", report.malformed);
    }
    if report.collisions > 0 {
        println!("  - {} sources dropped (destination already taken)", report.collisions);
    }

    Ok(())
}
