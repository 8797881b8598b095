use std::sync::Arc;

use teloxide::{
    dispatching::{HandlerExt, UpdateFilterExt},
    prelude::*,
    utils::command::BotCommands,
};
use tokio::sync::Semaphore;

use crate::{
    db::MedicineStore,
    services::{alert::AlertPolicy, notifier::Notifier},
};

pub mod check;
pub mod inventory;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(BotCommands, Debug, Clone, PartialEq)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    #[command(description = "Start interacting with the medicine tracker.")]
    Start,
    #[command(description = "Show when each medicine will run out.")]
    Stock,
    #[command(description = "Run the low-stock check now.")]
    Check,
    #[command(description = "Display help information about available commands.")]
    Help,
}

/// Runs the command dispatcher until Ctrl+C.
///
/// `limiter` bounds how many commands are handled at once across all chats.
/// `notifier` and `policy` are what `/check` runs the alert cycle with.
pub async fn run_bot(
    bot: Bot,
    store: Arc<dyn MedicineStore>,
    notifier: Arc<dyn Notifier>,
    policy: AlertPolicy,
    limiter: Arc<Semaphore>,
) {
    let handler = Update::filter_message()
        .branch(dptree::entry().filter_command::<Command>().endpoint(answer));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![store, notifier, policy, limiter])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}

async fn answer(
    bot: Bot,
    msg: Message,
    cmd: Command,
    store: Arc<dyn MedicineStore>,
    notifier: Arc<dyn Notifier>,
    policy: AlertPolicy,
    limiter: Arc<Semaphore>,
) -> HandlerResult {
    let _permit = limiter.acquire().await?;

    match cmd {
        Command::Start => {
            log::info!("Received start command");
            bot.send_message(
                msg.chat.id,
                "Welcome! I keep track of your medicine stock. Send /stock for a forecast.",
            )
            .await?;
        }
        Command::Stock => {
            log::info!("Received stock command");
            inventory::stock_forecast(bot, msg, store).await?;
        }
        Command::Check => {
            log::info!("Received check command");
            check::run_check(bot, msg, store, notifier, policy).await?;
        }
        Command::Help => {
            log::info!("Received help command");
            bot.send_message(msg.chat.id, Command::descriptions().to_string())
                .await?;
        }
    }

    Ok(())
}
