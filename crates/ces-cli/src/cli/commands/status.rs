//! `ces status` – cache state per registered script and the last refresh.

use anyhow::Result;
use ces_core::refresh::RefreshReport;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::cli::context::Context;

fn format_age(secs: u64) -> String {
    match secs {
        s if s < 60 => format!("{s}s"),
        s if s < 3600 => format!("{}m", s / 60),
        s if s < 86_400 => format!("{}h", s / 3600),
        s => format!("{}d", s / 86_400),
    }
}

pub fn run_status(ctx: &Context) -> Result<()> {
    println!("Cache directory: {}", ctx.store.dir().display());
    println!(
        "{:<12} {:<14} {:>8} {:>6}  {}",
        "SLUG", "FILE", "SIZE", "AGE", "SHA256"
    );
    let mut all_cached = true;
    for entry in ctx.registry.iter() {
        let name = entry.local_basename();
        match ctx.store.stat(name)? {
            Some(asset) => {
                let digest = ctx.store.sha256(name)?.unwrap_or_else(|| "-".into());
                println!(
                    "{:<12} {:<14} {:>8} {:>6}  {}",
                    entry.slug(),
                    name,
                    asset.size,
                    format_age(asset.age_secs()),
                    digest
                );
            }
            None => {
                all_cached = false;
                println!("{:<12} {:<14} {:>8} {:>6}  -", entry.slug(), name, "-", "-");
            }
        }
    }
    if !all_cached {
        println!("Some scripts are not cached yet; run `ces refresh` or `ces run`.");
    }

    if let Ok(path) = RefreshReport::default_path() {
        match RefreshReport::load_from_path(&path) {
            Ok(Some(report)) => {
                let now = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or(0);
                println!();
                println!(
                    "Last refresh {} ago:",
                    format_age(now.saturating_sub(report.started_at))
                );
                print!("{}", report);
            }
            Ok(None) => println!("\nNo refresh has run yet."),
            Err(e) => tracing::warn!("could not read last refresh report: {:#}", e),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::format_age;

    #[test]
    fn age_units() {
        assert_eq!(format_age(5), "5s");
        assert_eq!(format_age(120), "2m");
        assert_eq!(format_age(7200), "2h");
        assert_eq!(format_age(3 * 86_400), "3d");
    }
}
