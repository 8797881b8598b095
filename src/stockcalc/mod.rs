//! Stock arithmetic for a single medicine.
//!
//! Everything here works on calendar days: a dose is consumed once per
//! elapsed day after `start_date`, and an entry counts in full from the day
//! it is recorded on. Nothing in this module does I/O or keeps state.

use chrono::{Duration, NaiveDate};

use crate::db::models::{CalendarDate, Medicine, StockEntry};

/// Projected depletion of a medicine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Stock reaches zero on this day.
    OutOn(NaiveDate),
    /// Stock never reaches zero (no daily dose).
    Never,
}

impl Projection {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Projection::OutOn(date) => Some(*date),
            Projection::Never => None,
        }
    }
}

/// Whole days from `start` to `as_of`, clamped to zero when `as_of` is earlier.
pub fn elapsed_whole_days(start: NaiveDate, as_of: NaiveDate) -> i64 {
    (as_of - start).num_days().max(0)
}

/// Pills on hand at the calendar day of `as_of`.
///
/// Entries for other medicines and entries dated after `as_of` are ignored.
pub fn current_stock_at(
    medicine: &Medicine,
    entries: &[StockEntry],
    as_of: impl CalendarDate,
) -> f64 {
    let today = as_of.calendar_date();

    let consumed = medicine.daily_dose * elapsed_whole_days(medicine.start_date, today) as f64;

    let refilled: f64 = entries
        .iter()
        .filter(|entry| entry.medicine_id == medicine.id && entry.date <= today)
        .map(|entry| entry.pills(medicine.unit_per_box))
        .sum();

    medicine.initial_stock - consumed + refilled
}

/// Day on which `quantity` pills run out, counting partial days as whole ones.
pub fn out_of_stock_date_at(
    medicine: &Medicine,
    quantity: f64,
    as_of: impl CalendarDate,
) -> Projection {
    let days = match days_of_supply(medicine, quantity) {
        Some(days) if days.is_finite() => days.ceil() as i64,
        _ => return Projection::Never,
    };

    Duration::try_days(days)
        .and_then(|offset| as_of.calendar_date().checked_add_signed(offset))
        .map_or(Projection::Never, Projection::OutOn)
}

/// `quantity / daily_dose`, or `None` when the medicine is not being taken.
pub fn days_of_supply(medicine: &Medicine, quantity: f64) -> Option<f64> {
    (medicine.daily_dose > 0.0).then(|| quantity / medicine.daily_dose)
}
