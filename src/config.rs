use envconfig::Envconfig;

use crate::services::alert::AlertPolicy;

#[derive(Envconfig, Clone)]
pub struct Config {
    #[envconfig(from = "TELEGRAM_BOT_TOKEN")]
    pub telegram_bot_token: String,

    /// Chat that receives scheduled alerts.
    #[envconfig(from = "TELEGRAM_CHAT_ID")]
    pub telegram_chat_id: i64,

    #[envconfig(from = "DATABASE_URL")]
    pub database_url: String,

    /// Six-field cron expression (seconds first).
    #[envconfig(from = "ALERT_SCHEDULE", default = "0 0 8 * * *")]
    pub alert_schedule: String,

    #[envconfig(from = "ENABLE_ALERT_TICKER", default = "true")]
    pub enable_alert_ticker: bool,

    #[envconfig(from = "LOW_STOCK_THRESHOLD_DAYS", default = "10")]
    pub low_stock_threshold_days: f64,

    #[envconfig(from = "MAX_CONCURRENT_COMMANDS", default = "4")]
    pub max_concurrent_commands: usize,
}

impl Config {
    pub fn alert_policy(&self) -> AlertPolicy {
        AlertPolicy {
            low_stock_days: self.low_stock_threshold_days,
        }
    }
}
