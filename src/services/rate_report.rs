use crate::models::rate::{RatePoint, RateReport};
use crate::services::rate_analysis::{
    self, AnalysisError, RateObservation,
};

/// Build the full report from a raw observation stream: collapse to one
/// maximum per day, bound to the lookback window, then derive trends and
/// period statistics. Pure function of its inputs.
pub fn build_rate_report(
    observations: &[RateObservation],
    lookback_days: u32,
) -> Result<RateReport, AnalysisError> {
    let daily_max = rate_analysis::collapse_daily_max(observations);
    let window = &daily_max[..daily_max.len().min(lookback_days as usize)];

    let stats = rate_analysis::compute_period_stats(window, lookback_days)?;
    let trends = rate_analysis::compute_trends(window)?;

    Ok(RateReport {
        latest_rate: stats.latest_rate,
        overall_change: stats.overall_change,
        overall_percentage: stats.overall_percentage,
        highest_rate: stats.highest_rate,
        lowest_rate: stats.lowest_rate,
        rate_volatility: stats.rate_volatility,
        advisory: stats.advisory.message().to_string(),
        week_over_week: stats.week_over_week,
        daily_max_observations: window.iter().map(RatePoint::from).collect(),
        trends,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn obs(date: &str, time: &str, rate: Decimal) -> RateObservation {
        let date: NaiveDate = date.parse().unwrap();
        let time: NaiveTime = time.parse().unwrap();
        RateObservation {
            rate,
            date,
            time,
            timestamp: date.and_time(time).and_utc(),
        }
    }

    #[test]
    fn report_collapses_and_aligns_trends() {
        let observations = vec![
            obs("2024-01-02", "08:00:00", dec!(305)),
            obs("2024-01-02", "12:00:00", dec!(304)),
            obs("2024-01-01", "08:00:00", dec!(300)),
        ];

        let report = build_rate_report(&observations, 14).unwrap();

        assert_eq!(report.daily_max_observations.len(), 2);
        assert_eq!(report.daily_max_observations[0].rate, dec!(305));
        assert_eq!(report.trends.len(), 1);
        assert_eq!(report.trends[0].difference, dec!(5.00));
        assert_eq!(report.overall_percentage, dec!(1.67));
        assert_eq!(report.rate_volatility, dec!(5.00));
        assert_eq!(
            report.advisory,
            "Current rate is the highest in the last 14 days - might want to wait for a better rate"
        );
    }

    #[test]
    fn report_on_empty_stream_is_insufficient_data() {
        assert_eq!(
            build_rate_report(&[], 14).unwrap_err(),
            AnalysisError::InsufficientData
        );
    }

    #[test]
    fn report_serializes_with_contract_field_names() {
        let observations = vec![
            obs("2024-01-02", "08:00:00", dec!(305)),
            obs("2024-01-01", "08:00:00", dec!(300)),
        ];

        let report = build_rate_report(&observations, 14).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert!(json.get("latestRate").is_some());
        assert!(json.get("rateVolatility").is_some());
        assert!(json.get("dailyMaxObservations").is_some());
        assert_eq!(json["trends"][0]["percentageChange"], "1.67");
        assert_eq!(json["trends"][0]["trend"], "up");
        assert!(json["weekOverWeek"].is_null());
    }
}
