//! Notification feed listing.

use tabled::Tabled;

use geoblink_core::{CoreError, NotificationItem};

use crate::cli::GlobalOpts;
use crate::context::AppContext;
use crate::error::CliError;
use crate::output::{self, Presentable};

#[derive(Tabled)]
pub struct NotificationRow {
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "IMEI")]
    imei: String,
    #[tabled(rename = "Type")]
    kind: String,
}

impl Presentable for NotificationItem {
    type Row = NotificationRow;

    fn row(&self) -> NotificationRow {
        NotificationRow {
            time: self.time.format("%Y-%m-%d %H:%M:%S").to_string(),
            imei: self.imei.to_string(),
            kind: self.kind.clone(),
        }
    }

    fn id(&self) -> String {
        format!("{}\t{}", self.imei, self.kind)
    }
}

pub async fn handle(limit: usize, global: &GlobalOpts) -> Result<(), CliError> {
    let ctx = AppContext::build(global)?;
    ctx.require_auth()?;

    let tokens = ctx.session.tokens().ok_or(CoreError::NotAuthenticated)?;
    let items = ctx
        .client
        .list_notifications(&tokens.token, &tokens.hash)
        .await?;

    let items: Vec<NotificationItem> = items.into_iter().map(Into::into).take(limit).collect();
    output::emit(&output::list(&global.output, &items), global.quiet);
    Ok(())
}
