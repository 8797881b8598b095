//! In-memory collaborators for exercising the alert cycle without a database
//! or a bot.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;
use teloxide::{ApiError, RequestError};

use crate::db::{
    models::{Medicine, StockEntry},
    DatabaseError, MedicineStore,
};

use super::notifier::{NotifyError, Notifier};

#[derive(Default)]
pub struct MemoryStore {
    medicines: Vec<Medicine>,
    entries: Vec<StockEntry>,
    alerted: Mutex<Vec<(String, NaiveDate)>>,
    fail_fetch: bool,
    fail_updates: bool,
}

impl MemoryStore {
    pub fn new(medicines: Vec<Medicine>, entries: Vec<StockEntry>) -> Self {
        Self {
            medicines,
            entries,
            ..Self::default()
        }
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fail_fetch = true;
        self
    }

    pub fn failing_updates(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    pub fn alerted(&self) -> Vec<(String, NaiveDate)> {
        self.alerted.lock().unwrap().clone()
    }
}

#[async_trait]
impl MedicineStore for MemoryStore {
    async fn fetch_medicines(&self) -> Result<Vec<Medicine>, DatabaseError> {
        if self.fail_fetch {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(self.medicines.clone())
    }

    async fn fetch_stock_entries(&self) -> Result<Vec<StockEntry>, DatabaseError> {
        if self.fail_fetch {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(self.entries.clone())
    }

    async fn update_last_alerted_date(
        &self,
        medicine_id: &str,
        date: NaiveDate,
    ) -> Result<(), DatabaseError> {
        if self.fail_updates {
            return Err(DatabaseError::UnknownMedicine(medicine_id.to_string()));
        }
        self.alerted
            .lock()
            .unwrap()
            .push((medicine_id.to_string(), date));
        Ok(())
    }
}

/// Records every message; rejects those containing `reject_marker`.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    reject_marker: Option<String>,
}

impl RecordingNotifier {
    pub fn rejecting(mut self, marker: &str) -> Self {
        self.reject_marker = Some(marker.to_string());
        self
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn any_contains(&self, needle: &str) -> bool {
        self.sent.lock().unwrap().iter().any(|text| text.contains(needle))
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        if let Some(marker) = &self.reject_marker {
            if text.contains(marker.as_str()) {
                return Err(RequestError::Api(ApiError::BotBlocked).into());
            }
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
