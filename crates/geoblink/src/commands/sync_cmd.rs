//! One-shot sync: fetch the remote device list and report the result.

use std::time::Instant;

use crate::cli::GlobalOpts;
use crate::context::AppContext;
use crate::error::CliError;

pub async fn handle(global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = AppContext::build(global)?;
    ctx.require_auth()?;

    let started = Instant::now();
    ctx.sync.execute().await?;

    if !global.quiet {
        eprintln!(
            "Synced {} devices in {:.1}s",
            ctx.store.len(),
            started.elapsed().as_secs_f64()
        );
    }
    Ok(())
}
