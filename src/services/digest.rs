//! Out-of-stock forecast sent in reply to `/stock`.

use chrono::NaiveDate;

use crate::{
    db::Snapshot,
    stockcalc,
    utils::{escape_code, format_date},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRow {
    pub name: String,
    pub runs_out_on: NaiveDate,
    pub pills_left: f64,
}

/// One row per medicine that is being taken and still has pills, soonest first.
pub fn build_forecast(snapshot: &Snapshot, today: NaiveDate) -> Vec<ForecastRow> {
    let mut rows: Vec<ForecastRow> = snapshot
        .medicines
        .iter()
        .filter(|medicine| match medicine.validate(&snapshot.entries) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Leaving {} out of the forecast: {}", medicine.name, e);
                false
            }
        })
        .filter_map(|medicine| {
            let pills_left = stockcalc::current_stock_at(medicine, &snapshot.entries, today);
            if pills_left <= 0.0 {
                return None;
            }
            let runs_out_on =
                stockcalc::out_of_stock_date_at(medicine, pills_left, today).date()?;
            Some(ForecastRow {
                name: medicine.name.clone(),
                runs_out_on,
                pills_left,
            })
        })
        .collect();

    rows.sort_by(|a, b| {
        a.runs_out_on
            .cmp(&b.runs_out_on)
            .then_with(|| a.name.cmp(&b.name))
    });
    rows
}

/// Renders the forecast as a MarkdownV2 message with a fixed-width table.
pub fn render_forecast(rows: &[ForecastRow]) -> String {
    if rows.is_empty() {
        return "*Out\\-of\\-Stock Forecast*\n\nNo medicine has any stock left to forecast\\."
            .to_string();
    }

    let lines = rows
        .iter()
        .map(|row| {
            escape_code(&format!(
                "{:<22} → {} ({:.2} left)",
                row.name,
                format_date(row.runs_out_on),
                row.pills_left
            ))
        })
        .collect::<Vec<String>>()
        .join("\n");

    format!("*Out\\-of\\-Stock Forecast*\n\n```text\n{}\n```", lines)
}
