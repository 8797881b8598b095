use async_trait::async_trait;
use teloxide::{prelude::*, types::ParseMode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("Telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

/// Delivers one formatted (MarkdownV2) message to the caregiver.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Sends alerts to a single Telegram chat.
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        log::debug!("Sending Telegram message to {}: {}", self.chat_id, text);

        self.bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::MarkdownV2)
            .await?;

        Ok(())
    }
}
