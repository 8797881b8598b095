use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ModelError {
    #[error("Unknown stock unit: {0}")]
    UnknownUnit(String),
    #[error("Invalid medicine {id}: {reason}")]
    Invalid { id: String, reason: String },
}

/// Anything that can be reduced to a day-granularity date.
///
/// Zoned timestamps keep the date as written in their own offset, so
/// `2025-06-04T23:30:00+03:00` and `2025-06-04T00:10:00Z` are the same day.
pub trait CalendarDate {
    fn calendar_date(&self) -> NaiveDate;
}

impl CalendarDate for NaiveDate {
    fn calendar_date(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDate for NaiveDateTime {
    fn calendar_date(&self) -> NaiveDate {
        self.date()
    }
}

impl<Tz: TimeZone> CalendarDate for DateTime<Tz> {
    fn calendar_date(&self) -> NaiveDate {
        self.date_naive()
    }
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Medicine {
    pub id: String,
    pub name: String,
    #[serde(with = "flexible_date")]
    pub start_date: NaiveDate,
    pub initial_stock: f64,
    pub daily_dose: f64,
    pub unit_per_box: f64,
    #[serde(default, with = "flexible_date::option")]
    pub last_alerted_date: Option<NaiveDate>,
}

impl Medicine {
    /// Checks the regimen invariants against the entries that reference it.
    pub fn validate(&self, entries: &[StockEntry]) -> Result<(), ModelError> {
        let invalid = |reason: &str| ModelError::Invalid {
            id: self.id.clone(),
            reason: reason.to_string(),
        };

        if !self.initial_stock.is_finite() || self.initial_stock < 0.0 {
            return Err(invalid("initial stock must be a non-negative number"));
        }
        if !self.daily_dose.is_finite() || self.daily_dose < 0.0 {
            return Err(invalid("daily dose must be a non-negative number"));
        }

        let uses_boxes = entries
            .iter()
            .any(|entry| entry.medicine_id == self.id && entry.unit == StockUnit::Box);
        if uses_boxes && !(self.unit_per_box.is_finite() && self.unit_per_box > 0.0) {
            return Err(invalid("unit per box must be positive when refills are boxed"));
        }

        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StockUnit {
    Box,
    Pill,
}

impl StockUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            StockUnit::Box => "box",
            StockUnit::Pill => "pill",
        }
    }
}

impl FromStr for StockUnit {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "box" | "boxes" => Ok(StockUnit::Box),
            "pill" | "pills" => Ok(StockUnit::Pill),
            other => Err(ModelError::UnknownUnit(other.to_string())),
        }
    }
}

impl TryFrom<String> for StockUnit {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A single stock-changing event. Quantities are signed; refills are positive.
#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StockEntry {
    pub medicine_id: String,
    pub quantity: f64,
    #[sqlx(try_from = "String")]
    pub unit: StockUnit,
    #[serde(with = "flexible_date")]
    pub date: NaiveDate,
}

impl StockEntry {
    /// Quantity of this entry expressed in pills.
    pub fn pills(&self, unit_per_box: f64) -> f64 {
        match self.unit {
            StockUnit::Box => self.quantity * unit_per_box,
            StockUnit::Pill => self.quantity,
        }
    }
}

/// Serde adapter accepting either `YYYY-MM-DD` or an RFC 3339 timestamp.
/// Always writes `YYYY-MM-DD`.
pub mod flexible_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn parse(raw: &str) -> Option<NaiveDate> {
        let raw = raw.trim();
        NaiveDate::parse_from_str(raw, FORMAT)
            .ok()
            .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
    }

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid calendar date: {raw}")))
    }

    pub mod option {
        use chrono::NaiveDate;
        use serde::{de, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            date: &Option<NaiveDate>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match date {
                Some(date) => super::serialize(date, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveDate>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid calendar date: {raw}"))),
                None => Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn medicine() -> Medicine {
        Medicine {
            id: "med1".to_string(),
            name: "Paracetamol".to_string(),
            start_date: date(2025, 6, 1),
            initial_stock: 10.0,
            daily_dose: 1.0,
            unit_per_box: 10.0,
            last_alerted_date: None,
        }
    }

    #[test]
    fn calendar_date_ignores_time_of_day_and_offset() {
        let late = FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 6, 4, 23, 30, 0)
            .unwrap();
        let early = Utc.with_ymd_and_hms(2025, 6, 4, 0, 10, 0).unwrap();

        assert_eq!(late.calendar_date(), date(2025, 6, 4));
        assert_eq!(early.calendar_date(), late.calendar_date());
        assert_eq!(early.naive_utc().calendar_date(), date(2025, 6, 4));
    }

    #[test]
    fn parses_units_case_insensitively() {
        assert_eq!("Box".parse::<StockUnit>(), Ok(StockUnit::Box));
        assert_eq!(StockUnit::try_from("pills".to_string()), Ok(StockUnit::Pill));
        assert_eq!(
            "blister".parse::<StockUnit>(),
            Err(ModelError::UnknownUnit("blister".to_string()))
        );
    }

    #[test]
    fn box_entries_are_converted_to_pills() {
        let boxed = StockEntry {
            medicine_id: "med1".to_string(),
            quantity: 2.0,
            unit: StockUnit::Box,
            date: date(2025, 6, 4),
        };
        let loose = StockEntry {
            unit: StockUnit::Pill,
            ..boxed.clone()
        };

        assert_eq!(boxed.pills(10.0), 20.0);
        assert_eq!(loose.pills(10.0), 2.0);
    }

    #[test]
    fn deserializes_plain_and_rfc3339_dates() {
        let json = r#"{
            "id": "med1",
            "name": "Paracetamol",
            "start_date": "2025-06-01T12:00:00+02:00",
            "initial_stock": 10,
            "daily_dose": 1,
            "unit_per_box": 10
        }"#;
        let parsed: Medicine = serde_json::from_str(json).unwrap();
        assert_eq!(parsed, medicine());

        let entry: StockEntry = serde_json::from_str(
            r#"{"medicine_id":"med1","quantity":1,"unit":"box","date":"2025-06-04"}"#,
        )
        .unwrap();
        assert_eq!(entry.date, date(2025, 6, 4));
        assert_eq!(entry.unit, StockUnit::Box);
    }

    #[test]
    fn rejects_garbage_dates() {
        let result = serde_json::from_str::<StockEntry>(
            r#"{"medicine_id":"med1","quantity":1,"unit":"box","date":"June 4th"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn serializes_dates_without_time() {
        let value = serde_json::to_value(medicine()).unwrap();
        assert_eq!(value["start_date"], "2025-06-01");
        assert!(value["last_alerted_date"].is_null());
    }

    #[test]
    fn validation_requires_box_size_only_for_boxed_refills() {
        let mut med = medicine();
        med.unit_per_box = 0.0;

        let pills = vec![StockEntry {
            medicine_id: "med1".to_string(),
            quantity: 5.0,
            unit: StockUnit::Pill,
            date: date(2025, 6, 2),
        }];
        assert!(med.validate(&pills).is_ok());

        let boxes = vec![StockEntry {
            unit: StockUnit::Box,
            ..pills[0].clone()
        }];
        assert!(matches!(med.validate(&boxes), Err(ModelError::Invalid { .. })));
    }

    #[test]
    fn validation_rejects_negative_regimen_values() {
        let mut med = medicine();
        med.daily_dose = -1.0;
        assert!(med.validate(&[]).is_err());

        let mut med = medicine();
        med.initial_stock = f64::NAN;
        assert!(med.validate(&[]).is_err());
    }
}
