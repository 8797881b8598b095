//! Per-medicine alert decisions.

use chrono::NaiveDate;

use crate::{
    db::models::{Medicine, StockEntry},
    stockcalc::{self, Projection},
    utils::{escape_markdown, format_date},
};

pub const DEFAULT_LOW_STOCK_DAYS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertPolicy {
    /// Inclusive upper bound, in days of supply, for a low-stock alert.
    pub low_stock_days: f64,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            low_stock_days: DEFAULT_LOW_STOCK_DAYS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    RefillRecorded,
    LowStock { runs_out_on: NaiveDate, days_left: i64 },
    OutOfStock,
}

impl Alert {
    /// Renders the alert as a Telegram MarkdownV2 message.
    pub fn render(&self, medicine_name: &str) -> String {
        let name = escape_markdown(medicine_name);
        match self {
            Alert::RefillRecorded => format!("📦 *Refill recorded for {}*", name),
            Alert::LowStock {
                runs_out_on,
                days_left,
            } => format!(
                "⚠️ *{}* will run out on {} \\({} {} left\\)",
                name,
                escape_markdown(&format_date(*runs_out_on)),
                days_left,
                if *days_left == 1 { "day" } else { "days" },
            ),
            Alert::OutOfStock => format!("🚫 *{}* is out of stock", name),
        }
    }
}

/// True when a stock-increasing entry for `medicine` is recorded on `today`.
/// Corrections (zero or negative quantities) are not refills.
pub fn refilled_on(medicine: &Medicine, entries: &[StockEntry], today: NaiveDate) -> bool {
    entries.iter().any(|entry| {
        entry.medicine_id == medicine.id && entry.date == today && entry.quantity > 0.0
    })
}

/// Decides which alert, if any, `medicine` needs on `today`.
///
/// A refill recorded today wins over every stock level. Otherwise a medicine
/// that is being taken alerts when it is out, or when its days of supply fall
/// in `(0, policy.low_stock_days]`.
pub fn evaluate(
    medicine: &Medicine,
    entries: &[StockEntry],
    today: NaiveDate,
    policy: &AlertPolicy,
) -> Option<Alert> {
    if refilled_on(medicine, entries, today) {
        return Some(Alert::RefillRecorded);
    }

    let quantity = stockcalc::current_stock_at(medicine, entries, today);
    let days = stockcalc::days_of_supply(medicine, quantity)?;

    if quantity <= 0.0 {
        return Some(Alert::OutOfStock);
    }
    if days > policy.low_stock_days {
        return None;
    }

    match stockcalc::out_of_stock_date_at(medicine, quantity, today) {
        Projection::OutOn(runs_out_on) => Some(Alert::LowStock {
            runs_out_on,
            days_left: (runs_out_on - today).num_days(),
        }),
        Projection::Never => None,
    }
}
