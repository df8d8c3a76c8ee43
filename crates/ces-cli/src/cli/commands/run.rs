//! `ces run` – periodic refresh until Ctrl-C, then unschedule.

use anyhow::{Context as _, Result};
use ces_core::trigger::PeriodicTrigger;
use std::sync::Arc;
use std::time::Duration;

use crate::cli::context::Context;

pub async fn run_trigger(ctx: &Context, interval_secs: Option<u64>) -> Result<()> {
    let interval = interval_secs
        .map(Duration::from_secs)
        .unwrap_or_else(|| ctx.cfg.refresh_interval());
    let trigger = PeriodicTrigger::new(interval);
    trigger.ensure_scheduled(Arc::new(ctx.refresher()));
    println!(
        "Refreshing {} script(s) every {}s; Ctrl-C to stop.",
        ctx.registry.len(),
        trigger.interval().as_secs()
    );

    tokio::signal::ctrl_c().await.context("wait for Ctrl-C")?;
    trigger.unschedule();
    println!("Stopped.");
    Ok(())
}
