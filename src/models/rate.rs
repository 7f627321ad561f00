use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::services::rate_analysis::{RateObservation, TrendEntry, WeekOverWeek};

/// One daily-max point as consumed by the email table and the dashboard chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatePoint {
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub rate: Decimal,
}

impl From<&RateObservation> for RatePoint {
    fn from(obs: &RateObservation) -> Self {
        Self {
            date: obs.date,
            time: obs.time,
            rate: obs.rate,
        }
    }
}

/// Computed report handed to the email renderer and the dashboard.
/// `trends[i]` is aligned to `daily_max_observations[i]` by index; the last
/// index has no trend entry (the oldest day has no prior day to compare).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateReport {
    pub latest_rate: Decimal,
    pub overall_change: Decimal,
    pub overall_percentage: Decimal,
    pub highest_rate: Decimal,
    pub lowest_rate: Decimal,
    pub rate_volatility: Decimal,
    pub advisory: String,
    pub week_over_week: Option<WeekOverWeek>,
    pub daily_max_observations: Vec<RatePoint>,
    pub trends: Vec<TrendEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RateSeriesQuery {
    pub days: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub days: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeSummary {
    pub change: Decimal,
    pub percentage: Decimal,
}

/// Daily-max series for the dashboard chart, sorted ascending by date
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateSeriesResponse {
    pub rates: Vec<RatePoint>,
    pub latest_rate: Decimal,
    pub latest_timestamp: DateTime<Utc>,
    /// Change against the previous day's maximum; None without a prior day
    pub previous_day_change: Option<ChangeSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchRateResponse {
    pub success: bool,
    pub data: RateObservation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
