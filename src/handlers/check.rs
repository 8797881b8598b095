use std::sync::Arc;

use chrono::Local;
use teloxide::{prelude::*, types::Message};

use crate::{
    db::MedicineStore,
    services::{self, alert::AlertPolicy, notifier::Notifier, CycleReport},
};

/// Runs one alert cycle on demand and replies with its counts.
///
/// Alerts go to the configured caregiver chat through `notifier`, not to the
/// chat that sent the command.
pub async fn run_check(
    bot: Bot,
    msg: Message,
    store: Arc<dyn MedicineStore>,
    notifier: Arc<dyn Notifier>,
    policy: AlertPolicy,
) -> ResponseResult<()> {
    log::info!("Manual stock check requested from chat {}", msg.chat.id);

    let today = Local::now().date_naive();
    let reply = match services::check_and_alert_low_stock(
        store.as_ref(),
        notifier.as_ref(),
        &policy,
        today,
    )
    .await
    {
        Ok(report) => describe_report(&report),
        Err(e) => {
            log::error!("Manual stock check failed: {}", e);
            "⚠️ Failed to fetch stock data.".to_string()
        }
    };

    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

fn describe_report(report: &CycleReport) -> String {
    format!(
        "Stock check done: {} evaluated, {} skipped, {} alerts sent, {} failed.",
        report.evaluated, report.skipped, report.alerts_sent, report.delivery_failures
    )
}
