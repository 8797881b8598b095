use std::sync::Arc;

use dotenvy::dotenv;
use envconfig::Envconfig;
use medicine_tracker::{
    config::Config,
    db::{ensure_schema, init_db, MedicineStore, PostgresStore},
    handlers,
    services::{
        notifier::{Notifier, TelegramNotifier},
        schedule_alerts,
    },
};
use teloxide::prelude::*;
use tokio::sync::Semaphore;

type Error = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize the logger with default settings or "info" level if not specified
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    log::info!("Starting the medicine tracker...");

    // Load environment variables from a .env file if present
    dotenv().ok();

    let config = Config::init_from_env()?;

    let pool = init_db(&config.database_url).await?;
    ensure_schema(&pool).await?;
    let store: Arc<dyn MedicineStore> = Arc::new(PostgresStore::new(pool));

    let bot = Bot::new(config.telegram_bot_token.clone());

    let notifier: Arc<dyn Notifier> = Arc::new(TelegramNotifier::new(
        bot.clone(),
        ChatId(config.telegram_chat_id),
    ));
    let policy = config.alert_policy();

    // Keep the scheduler handle alive for the lifetime of the dispatcher
    let _scheduler = if config.enable_alert_ticker {
        Some(
            schedule_alerts(
                &config.alert_schedule,
                store.clone(),
                notifier.clone(),
                policy,
            )
            .await?,
        )
    } else {
        log::info!("Alert ticker disabled");
        None
    };

    let limiter = Arc::new(Semaphore::new(config.max_concurrent_commands.max(1)));
    handlers::run_bot(bot, store, notifier, policy, limiter).await;

    log::info!("Shutting down gracefully");
    Ok(())
}
