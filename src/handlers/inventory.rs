use std::sync::Arc;

use chrono::Local;
use teloxide::{prelude::*, types::Message, types::ParseMode};

use crate::{
    db::MedicineStore,
    services::digest::{build_forecast, render_forecast},
};

/// Replies with the out-of-stock forecast for every medicine still in use.
///
/// Medicines and entries are read as one snapshot. If the read fails the
/// chat gets a short failure notice instead of a partial table.
pub async fn stock_forecast(
    bot: Bot,
    msg: Message,
    store: Arc<dyn MedicineStore>,
) -> ResponseResult<()> {
    log::info!("Building stock forecast for chat {}", msg.chat.id);

    let snapshot = match store.fetch_snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log::error!("Failed to fetch stock data: {}", e);
            bot.send_message(msg.chat.id, "⚠️ Failed to fetch stock data.")
                .await?;
            return Ok(());
        }
    };

    let rows = build_forecast(&snapshot, Local::now().date_naive());

    bot.send_message(msg.chat.id, render_forecast(&rows))
        .parse_mode(ParseMode::MarkdownV2)
        .await?;

    Ok(())
}
