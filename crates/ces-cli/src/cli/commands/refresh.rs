//! `ces refresh` – on-demand refresh of every registered script.

use anyhow::{Context as _, Result};

use crate::cli::context::Context;

pub async fn run_refresh(ctx: &Context) -> Result<()> {
    let refresher = ctx.refresher();
    let report = tokio::task::spawn_blocking(move || refresher.refresh_all())
        .await
        .context("refresh task join")?;
    print!("{}", report);
    println!(
        "{} written, {} failed, {} total",
        report.written(),
        report.failed(),
        report.entries.len()
    );
    Ok(())
}
