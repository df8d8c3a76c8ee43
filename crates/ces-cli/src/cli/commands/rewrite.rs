//! `ces rewrite [PATH]` – run a document through the render buffer and print the result.

use anyhow::{Context as _, Result};
use ces_core::render::ResponseBuffer;
use ces_core::rewrite::format_outcomes;
use std::io::{self, Read};
use std::path::Path;

use crate::cli::context::Context;

pub fn run_rewrite(ctx: &Context, path: Option<&Path>, debug: bool) -> Result<()> {
    let input = match path {
        Some(p) => std::fs::read(p).with_context(|| format!("read {}", p.display()))?,
        None => {
            let mut buf = Vec::new();
            io::stdin().lock().read_to_end(&mut buf).context("read stdin")?;
            buf
        }
    };

    let rewriter = ctx.rewriter()?;
    let debug = debug || ctx.cfg.debug_outcomes;
    let mut out = ResponseBuffer::new(io::stdout().lock()).with_debug_outcomes(debug);
    out.begin_buffering()?;
    io::Write::write_all(&mut out, &input)?;
    let outcomes = out.flush_and_rewrite(&rewriter)?;

    if debug {
        eprint!("{}", format_outcomes(&outcomes));
    }
    Ok(())
}
