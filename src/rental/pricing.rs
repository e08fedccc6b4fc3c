//! Day count and amount computation
//!
//! No taxes, fees or deposits: `totalAmount == subtotal == dailyRate * days`.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// Whole days between two instants, rounded up and never less than 1
pub fn billable_days(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    let millis = (end - start).num_milliseconds();
    if millis <= 0 {
        return 1;
    }
    let days = (millis + DAY_MS - 1) / DAY_MS;
    u32::try_from(days).unwrap_or(u32::MAX).max(1)
}

/// Billable days between a pickup and a return date
pub fn number_of_days(pickup: NaiveDate, return_date: NaiveDate) -> u32 {
    billable_days(
        pickup.and_time(NaiveTime::MIN).and_utc(),
        return_date.and_time(NaiveTime::MIN).and_utc(),
    )
}

/// Price of a trip before it is booked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub number_of_days: u32,
    pub daily_rate: u64,
    pub subtotal: u64,
    pub total_amount: u64,
}

impl Quote {
    pub fn compute(daily_rate: u64, pickup: NaiveDate, return_date: NaiveDate) -> Self {
        let number_of_days = number_of_days(pickup, return_date);
        let subtotal = daily_rate.saturating_mul(u64::from(number_of_days));
        Self {
            number_of_days,
            daily_rate,
            subtotal,
            total_amount: subtotal,
        }
    }
}
