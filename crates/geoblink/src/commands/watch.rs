//! Live fleet view.
//!
//! Drives a `MapController`: a ticker dispatches `RefreshDevices`, the
//! state stream re-renders the table on every change, and `ShowError`
//! effects surface as warnings instead of aborting the loop. Ctrl-C
//! shuts the controller down cleanly.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use owo_colors::OwoColorize;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use geoblink_core::{MapController, MapEffect, MapEvent, MapState};

use crate::cli::GlobalOpts;
use crate::commands::devices::DeviceRow;
use crate::context::AppContext;
use crate::error::CliError;
use crate::output;

pub async fn handle(interval: Option<u64>, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = AppContext::build(global)?;
    ctx.require_auth()?;

    let period = interval.map_or(ctx.refresh_interval, Duration::from_secs);
    let color = output::should_color(&global.color);

    let controller = MapController::new(&ctx.store, Arc::clone(&ctx.sync));
    let mut state_rx = controller.state();
    let mut effects = controller
        .subscribe_effects()
        .ok_or_else(|| CliError::SyncFailed {
            message: "effect channel already taken".into(),
        })?;

    // The controller ignores refreshes until the store feed's first
    // emission clears `loading`.
    state_rx
        .wait_for(|s| !s.loading)
        .await
        .map_err(|_| CliError::SyncFailed {
            message: "device feed closed".into(),
        })?;

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    if !global.quiet {
        eprintln!(
            "Watching fleet (refresh every {}s, Ctrl-C to stop)",
            period.as_secs()
        );
    }

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,

            // First tick fires immediately: that is the initial refresh.
            _ = ticker.tick() => {
                debug!("dispatching periodic refresh");
                controller.dispatch(MapEvent::RefreshDevices).await;
            }

            changed = state_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = state_rx.borrow_and_update().clone();
                render(&state, global);
            }

            effect = effects.recv() => match effect {
                Some(MapEffect::ShowError(message)) => warn(&message, color),
                Some(MapEffect::ZoomToDevice(_)) | None => {}
            },
        }
    }

    controller.shutdown().await;
    Ok(())
}

fn render(state: &MapState, global: &GlobalOpts) {
    if global.quiet {
        return;
    }

    let rows: Vec<DeviceRow> = state.devices.iter().map(DeviceRow::from).collect();
    let table = output::rounded_table(&rows);

    let marker = if state.loading { " (refreshing)" } else { "" };
    println!(
        "\n{} -- {} mappable devices{marker}",
        Utc::now().format("%H:%M:%S"),
        state.devices.len()
    );
    println!("{table}");
}

fn warn(message: &str, color: bool) {
    if color {
        eprintln!("{} {message}", "warning:".yellow().bold());
    } else {
        eprintln!("warning: {message}");
    }
}
