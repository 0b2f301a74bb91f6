//! Device command handlers: list, show, search, bind.
//!
//! Query handlers run one sync cycle first so the output reflects the
//! platform's current view, then read from the local cache.

use std::sync::Arc;

use tabled::Tabled;

use geoblink_core::{CoreError, Device, MapController, MapEffect, MapEvent};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::context::AppContext;
use crate::error::CliError;
use crate::output::{self, Presentable};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct DeviceRow {
    #[tabled(rename = "IMEI")]
    imei: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Plate")]
    plate: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Battery")]
    battery: String,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Last seen")]
    last_seen: String,
}

impl From<&Arc<Device>> for DeviceRow {
    fn from(d: &Arc<Device>) -> Self {
        Self {
            imei: d.imei.to_string(),
            name: d.name.clone(),
            plate: d.registration_plate.clone(),
            status: if d.online { "online" } else { "offline" }.into(),
            battery: d
                .battery_pct
                .map_or_else(String::new, |pct| format!("{pct:.0}%")),
            position: format_position(d),
            last_seen: d
                .last_seen
                .map_or_else(String::new, |t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

impl Presentable for Arc<Device> {
    type Row = DeviceRow;

    fn row(&self) -> DeviceRow {
        DeviceRow::from(self)
    }

    fn id(&self) -> String {
        self.imei.to_string()
    }

    fn detail(&self) -> String {
        let mut lines = vec![
            format!("IMEI:       {}", self.imei),
            format!("Name:       {}", self.name),
            format!(
                "Status:     {}",
                if self.online { "online" } else { "offline" }
            ),
            format!("Position:   {}", format_position(self)),
        ];
        if !self.registration_plate.is_empty() {
            lines.push(format!("Plate:      {}", self.registration_plate));
        }
        if let Some(pct) = self.battery_pct {
            lines.push(format!("Battery:    {pct:.0}%"));
        }
        if let Some(t) = self.last_seen {
            lines.push(format!(
                "Last seen:  {}",
                t.format("%Y-%m-%d %H:%M:%S UTC")
            ));
        }
        lines.join("\n")
    }
}

fn format_position(d: &Device) -> String {
    match d.position {
        Some(p) if p.is_valid() => format!("{:.5}, {:.5}", p.lat, p.lng),
        Some(_) => "(invalid fix)".into(),
        None => "(no fix)".into(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = AppContext::build(global)?;
    ctx.require_auth()?;

    match args.command {
        DevicesCommand::List => {
            ctx.sync.execute().await?;
            let snapshot = ctx.store.snapshot();
            output::emit(&output::list(&global.output, &snapshot), global.quiet);
            Ok(())
        }

        DevicesCommand::Show { device } => {
            ctx.sync.execute().await?;
            let snapshot = ctx.store.snapshot();
            let found = snapshot
                .iter()
                .find(|d| d.imei.as_str() == device || d.name.eq_ignore_ascii_case(&device))
                .ok_or(CliError::DeviceNotFound { identifier: device })?;
            output::emit(&output::single(&global.output, found), global.quiet);
            Ok(())
        }

        DevicesCommand::Search { query } => search(&ctx, query, global).await,

        DevicesCommand::Bind { imei, name } => bind(&ctx, &imei, name.as_deref(), global).await,
    }
}

/// Search through the map controller so the query semantics (name, IMEI
/// fragment, plate; first match wins) are exactly the map screen's.
async fn search(ctx: &AppContext, query: String, global: &GlobalOpts) -> Result<(), CliError> {
    ctx.sync.execute().await?;

    let controller = MapController::new(&ctx.store, Arc::clone(&ctx.sync));

    // Wait for the store feed to deliver the synced snapshot.
    let mut state = controller.state();
    state
        .wait_for(|s| !s.loading)
        .await
        .map_err(|_| CliError::SyncFailed {
            message: "device feed closed".into(),
        })?;

    let mut effects = controller
        .subscribe_effects()
        .ok_or_else(|| CliError::SyncFailed {
            message: "effect channel already taken".into(),
        })?;

    controller
        .dispatch(MapEvent::SearchDevice(query.clone()))
        .await;
    let outcome = effects.try_recv();
    controller.shutdown().await;

    match outcome {
        Some(MapEffect::ZoomToDevice(found)) => {
            output::emit(&output::single(&global.output, &found), global.quiet);
            Ok(())
        }
        _ => Err(CliError::DeviceNotFound { identifier: query }),
    }
}

/// Attach a new tracker to the account, then pull it into the cache.
async fn bind(
    ctx: &AppContext,
    imei: &str,
    name: Option<&str>,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if imei.len() != 15 || !imei.bytes().all(|b| b.is_ascii_digit()) {
        return Err(CliError::Validation {
            field: "imei".into(),
            reason: "expected a 15-digit IMEI".into(),
        });
    }

    let tokens = ctx.session.tokens().ok_or(CoreError::NotAuthenticated)?;
    let bound = ctx
        .client
        .bind_tracker(&tokens.token, &tokens.hash, imei, name)
        .await?;

    // Reconcile so the new device shows up in subsequent queries.
    ctx.sync.execute().await?;

    let device = Arc::new(Device::from(bound));
    output::emit(&output::single(&global.output, &device), global.quiet);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use geoblink_core::{Coordinates, Imei};
    use pretty_assertions::assert_eq;

    fn device() -> Arc<Device> {
        Arc::new(Device {
            imei: Imei::from("860000000000001"),
            name: "Truck".into(),
            position: Some(Coordinates::new(55.75, 37.61)),
            registration_plate: "A123BC".into(),
            online: true,
            battery_pct: Some(80.0),
            last_seen: chrono::Utc.timestamp_opt(1_700_000_000, 0).single(),
        })
    }

    #[test]
    fn plain_output_is_the_imei() {
        assert_eq!(device().id(), "860000000000001");
    }

    #[test]
    fn detail_includes_optional_fields_when_present() {
        let text = device().detail();
        assert!(text.contains("Plate:      A123BC"));
        assert!(text.contains("Battery:    80%"));
        assert!(text.contains("55.75000, 37.61000"));
    }

    #[test]
    fn detail_omits_absent_fields() {
        let mut d = Arc::unwrap_or_clone(device());
        d.registration_plate = String::new();
        d.battery_pct = None;
        let text = Arc::new(d).detail();
        assert!(!text.contains("Plate:"));
        assert!(!text.contains("Battery:"));
    }
}
