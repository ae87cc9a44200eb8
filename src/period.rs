use crate::models::CycleBounds;
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Timelike};

pub const DAY_ROLLOVER_HOUR: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodResolver {
    rollover_hour: u32,
}

impl Default for PeriodResolver {
    fn default() -> Self {
        Self::new(DAY_ROLLOVER_HOUR)
    }
}

impl PeriodResolver {
    pub fn new(rollover_hour: u32) -> Self {
        Self { rollover_hour }
    }

    pub fn effective_date<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> NaiveDate {
        let date = now.date_naive();
        if now.hour() < self.rollover_hour {
            date.pred_opt().unwrap_or(date)
        } else {
            date
        }
    }

    pub fn cycle_bounds<Tz: TimeZone>(&self, now: &DateTime<Tz>, offset: u32) -> CycleBounds {
        cycle_containing(self.effective_date(now), offset)
    }
}

pub fn cycle_containing(date: NaiveDate, offset: u32) -> CycleBounds {
    let days_since_wednesday = (date.weekday().num_days_from_monday() + 5) % 7;
    let start = date - Duration::days(i64::from(days_since_wednesday)) - Duration::days(7 * i64::from(offset));
    CycleBounds {
        start,
        end: start + Duration::days(6),
    }
}

pub fn weekday_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}
