use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Entries per comparison week in the week-over-week split
const WEEK_LEN: usize = 7;

/// One scraped rate reading. `date`/`time` are derived from the same instant
/// as `timestamp` (in the configured timezone) at insert time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateObservation {
    pub rate: Decimal,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("no rate observations available for the requested window")]
    InsufficientData,
    #[error("division by zero computing {figure}")]
    DivisionByZero { figure: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Flat,
}

impl Trend {
    fn of(difference: Decimal) -> Self {
        if difference > Decimal::ZERO {
            Trend::Up
        } else if difference < Decimal::ZERO {
            Trend::Down
        } else {
            Trend::Flat
        }
    }

    /// Indicator used in email subjects and table cells
    pub fn glyph(&self) -> &'static str {
        match self {
            Trend::Up => "🟢",
            Trend::Down => "🔴",
            Trend::Flat => "⚪",
        }
    }
}

/// Day-over-day delta between two adjacent daily-max observations.
/// `date` is the later day's date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendEntry {
    pub date: NaiveDate,
    pub difference: Decimal,
    pub percentage_change: Decimal,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advisory {
    PeriodHigh,
    PeriodLow,
    NormalRange,
}

impl Advisory {
    pub fn message(&self) -> &'static str {
        match self {
            Advisory::PeriodHigh => {
                "Current rate is the highest in the last 14 days - might want to wait for a better rate"
            }
            Advisory::PeriodLow => {
                "Current rate is the lowest in the last 14 days - could be a good time to convert"
            }
            Advisory::NormalRange => "Current rate is within the normal range",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekOverWeek {
    pub last_week_avg: Decimal,
    pub previous_week_avg: Decimal,
    pub change: Decimal,
    pub percentage: Decimal,
}

/// Aggregate summary of a lookback window of daily-max observations.
/// Pure value, recomputed per invocation and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodStats {
    pub latest_rate: Decimal,
    pub oldest_rate: Decimal,
    pub overall_change: Decimal,
    pub overall_percentage: Decimal,
    pub highest_rate: Decimal,
    pub lowest_rate: Decimal,
    pub rate_volatility: Decimal,
    pub week_over_week: Option<WeekOverWeek>,
    pub advisory: Advisory,
}

/// Matches the source's fixed-2-decimal formatting (half away from zero)
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Reduce a raw observation stream (any order) to one observation per
/// calendar date, keeping the highest rate seen that day. On equal rates the
/// earliest timestamp wins, so the result is independent of input order.
/// Output is sorted by timestamp descending (one entry per date, so this is
/// also date descending). Empty input yields an empty vector.
pub fn collapse_daily_max(observations: &[RateObservation]) -> Vec<RateObservation> {
    let mut by_date: HashMap<NaiveDate, RateObservation> = HashMap::new();

    for obs in observations {
        let replace = match by_date.get(&obs.date) {
            None => true,
            Some(existing) => {
                obs.rate > existing.rate
                    || (obs.rate == existing.rate && obs.timestamp < existing.timestamp)
            }
        };
        if replace {
            by_date.insert(obs.date, obs.clone());
        }
    }

    let mut daily_max: Vec<RateObservation> = by_date.into_values().collect();
    daily_max.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    daily_max
}

/// Compute day-over-day trends for a date-descending daily-max sequence.
/// Entry `i` compares day `i` against the day immediately before it, so a
/// sequence of length `n` yields exactly `max(0, n - 1)` entries and the
/// oldest day has none.
pub fn compute_trends(daily_max: &[RateObservation]) -> Result<Vec<TrendEntry>, AnalysisError> {
    let mut trends = Vec::with_capacity(daily_max.len().saturating_sub(1));

    for pair in daily_max.windows(2) {
        let current = &pair[0];
        let previous = &pair[1];

        if previous.rate.is_zero() {
            return Err(AnalysisError::DivisionByZero {
                figure: format!("day-over-day change for {}", current.date),
            });
        }

        let difference = current.rate - previous.rate;
        trends.push(TrendEntry {
            date: current.date,
            difference: round2(difference),
            percentage_change: round2(difference / previous.rate * Decimal::ONE_HUNDRED),
            trend: Trend::of(difference),
        });
    }

    Ok(trends)
}

/// Three-way advisory against the period's range. Exact equality on purpose:
/// the inputs are stored rates, not recomputed figures. The high branch is
/// checked first, so highest == lowest == latest classifies as PeriodHigh.
pub fn classify_advisory(latest: Decimal, highest: Decimal, lowest: Decimal) -> Advisory {
    if latest == highest {
        Advisory::PeriodHigh
    } else if latest == lowest {
        Advisory::PeriodLow
    } else {
        Advisory::NormalRange
    }
}

/// Whole-period summary over the first `lookback_days` entries of a
/// date-descending daily-max sequence. Empty input is an error, not a report
/// full of zeros.
pub fn compute_period_stats(
    daily_max: &[RateObservation],
    lookback_days: u32,
) -> Result<PeriodStats, AnalysisError> {
    let window = &daily_max[..daily_max.len().min(lookback_days as usize)];

    let (latest, oldest) = match (window.first(), window.last()) {
        (Some(latest), Some(oldest)) => (latest, oldest),
        _ => return Err(AnalysisError::InsufficientData),
    };

    if oldest.rate.is_zero() {
        return Err(AnalysisError::DivisionByZero {
            figure: format!("overall change against the {} rate", oldest.date),
        });
    }

    let overall_change = latest.rate - oldest.rate;
    let highest_rate = window.iter().map(|o| o.rate).max().unwrap_or(latest.rate);
    let lowest_rate = window.iter().map(|o| o.rate).min().unwrap_or(latest.rate);

    Ok(PeriodStats {
        latest_rate: latest.rate,
        oldest_rate: oldest.rate,
        overall_change: round2(overall_change),
        overall_percentage: round2(overall_change / oldest.rate * Decimal::ONE_HUNDRED),
        highest_rate,
        lowest_rate,
        rate_volatility: round2(highest_rate - lowest_rate),
        week_over_week: compute_week_over_week(window)?,
        advisory: classify_advisory(latest.rate, highest_rate, lowest_rate),
    })
}

/// Means of the first 7 and next 7 entries. Short windows use the entries
/// that exist; with no previous-week entries at all there is nothing to
/// compare against, and the section is omitted rather than faked.
fn compute_week_over_week(
    window: &[RateObservation],
) -> Result<Option<WeekOverWeek>, AnalysisError> {
    if window.len() <= WEEK_LEN {
        return Ok(None);
    }

    let last_week = &window[..WEEK_LEN];
    let previous_week = &window[WEEK_LEN..window.len().min(2 * WEEK_LEN)];

    // The source derives the change from the already-rounded averages
    let last_week_avg = round2(mean(last_week));
    let previous_week_avg = round2(mean(previous_week));

    if previous_week_avg.is_zero() {
        return Err(AnalysisError::DivisionByZero {
            figure: "week-over-week change against a zero previous-week average".to_string(),
        });
    }

    let change = last_week_avg - previous_week_avg;
    Ok(Some(WeekOverWeek {
        last_week_avg,
        previous_week_avg,
        change: round2(change),
        percentage: round2(change / previous_week_avg * Decimal::ONE_HUNDRED),
    }))
}

fn mean(observations: &[RateObservation]) -> Decimal {
    // callers guarantee a non-empty slice
    let sum: Decimal = observations.iter().map(|o| o.rate).sum();
    sum / Decimal::from(observations.len())
}

/// Change-detection gate: a notification is warranted whenever today's rate
/// differs from yesterday's daily maximum. No observations yesterday means no
/// baseline to suppress against, so the gate fails open and notifies.
pub fn should_notify(today_rate: Decimal, yesterday_max: Option<Decimal>) -> bool {
    match yesterday_max {
        Some(max_rate) => today_rate != max_rate,
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    /// Descending daily-max sequence, one entry per day, newest first
    fn daily_sequence(start_date: &str, rates: &[Decimal]) -> Vec<RateObservation> {
        let start: NaiveDate = start_date.parse().unwrap();
        rates
            .iter()
            .enumerate()
            .map(|(i, &rate)| {
                let date = start - chrono::Duration::days(i as i64);
                obs(&date.to_string(), "08:00:00", rate)
            })
            .collect()
    }

    #[test]
    fn collapse_keeps_max_rate_per_date() {
        let observations = vec![
            obs("2024-01-01", "08:00:00", dec!(300)),
            obs("2024-01-01", "12:00:00", dec!(302)),
            obs("2024-01-01", "16:00:00", dec!(301)),
        ];

        let daily_max = collapse_daily_max(&observations);
        assert_eq!(daily_max.len(), 1);
        assert_eq!(daily_max[0].rate, dec!(302));
        assert_eq!(daily_max[0].time, "12:00:00".parse::<NaiveTime>().unwrap());
    }

    #[test]
    fn collapse_max_wins_regardless_of_input_order() {
        let forward = vec![
            obs("2024-01-01", "08:00:00", dec!(300)),
            obs("2024-01-01", "12:00:00", dec!(302)),
        ];
        let mut backward = forward.clone();
        backward.reverse();

        assert_eq!(collapse_daily_max(&forward)[0].rate, dec!(302));
        assert_eq!(collapse_daily_max(&backward)[0].rate, dec!(302));
    }

    #[test]
    fn collapse_tie_breaks_on_earliest_timestamp() {
        let morning = obs("2024-01-01", "08:00:00", dec!(300));
        let evening = obs("2024-01-01", "18:00:00", dec!(300));

        let from_morning_first = collapse_daily_max(&[morning.clone(), evening.clone()]);
        let from_evening_first = collapse_daily_max(&[evening, morning.clone()]);

        assert_eq!(from_morning_first[0], morning);
        assert_eq!(from_evening_first[0], morning);
    }

    #[test]
    fn collapse_sorts_descending_and_handles_empty_input() {
        let observations = vec![
            obs("2024-01-01", "08:00:00", dec!(300)),
            obs("2024-01-03", "08:00:00", dec!(304)),
            obs("2024-01-02", "08:00:00", dec!(302)),
        ];

        let daily_max = collapse_daily_max(&observations);
        let dates: Vec<String> = daily_max.iter().map(|o| o.date.to_string()).collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-02", "2024-01-01"]);

        assert!(collapse_daily_max(&[]).is_empty());
    }

    #[test]
    fn trends_have_length_n_minus_one() {
        let daily = daily_sequence("2024-01-10", &[dec!(305), dec!(303), dec!(304), dec!(304)]);
        let trends = compute_trends(&daily).unwrap();

        assert_eq!(trends.len(), 3);
        assert_eq!(trends[0].difference, dec!(2.00));
        assert_eq!(trends[0].trend, Trend::Up);
        assert_eq!(trends[1].difference, dec!(-1.00));
        assert_eq!(trends[1].trend, Trend::Down);
        assert_eq!(trends[2].difference, dec!(0.00));
        assert_eq!(trends[2].trend, Trend::Flat);

        let single = daily_sequence("2024-01-10", &[dec!(305)]);
        assert!(compute_trends(&single).unwrap().is_empty());
        assert!(compute_trends(&[]).unwrap().is_empty());
    }

    #[test]
    fn trend_percentage_rounds_to_two_decimals() {
        let daily = daily_sequence("2024-01-02", &[dec!(305), dec!(300)]);
        let trends = compute_trends(&daily).unwrap();

        // 5 / 300 * 100 = 1.666... -> 1.67
        assert_eq!(trends[0].percentage_change, dec!(1.67));
    }

    #[test]
    fn trend_zero_prior_rate_is_division_by_zero() {
        let daily = daily_sequence("2024-01-02", &[dec!(305), dec!(0)]);

        let err = compute_trends(&daily).unwrap_err();
        assert!(matches!(err, AnalysisError::DivisionByZero { .. }));
    }

    #[test]
    fn period_stats_two_day_scenario() {
        // Descending: [305 on Jan 2, 300 on Jan 1]
        let daily = daily_sequence("2024-01-02", &[dec!(305), dec!(300)]);
        let stats = compute_period_stats(&daily, 14).unwrap();

        assert_eq!(stats.latest_rate, dec!(305));
        assert_eq!(stats.oldest_rate, dec!(300));
        assert_eq!(stats.overall_change, dec!(5.00));
        assert_eq!(stats.overall_percentage, dec!(1.67));
        assert_eq!(stats.highest_rate, dec!(305));
        assert_eq!(stats.lowest_rate, dec!(300));
        assert_eq!(stats.rate_volatility, dec!(5.00));
        assert_eq!(stats.advisory, Advisory::PeriodHigh);
        assert!(stats.week_over_week.is_none());
    }

    #[test]
    fn period_stats_empty_input_is_insufficient_data() {
        assert_eq!(
            compute_period_stats(&[], 14).unwrap_err(),
            AnalysisError::InsufficientData
        );
    }

    #[test]
    fn period_stats_single_entry_boundary() {
        let daily = daily_sequence("2024-01-01", &[dec!(310)]);
        let stats = compute_period_stats(&daily, 14).unwrap();

        assert_eq!(stats.overall_change, dec!(0.00));
        assert_eq!(stats.overall_percentage, dec!(0.00));
        assert_eq!(stats.rate_volatility, dec!(0.00));
        assert!(stats.week_over_week.is_none());
        // highest == lowest == latest resolves to the high branch
        assert_eq!(stats.advisory, Advisory::PeriodHigh);
    }

    #[test]
    fn period_stats_is_idempotent() {
        let daily = daily_sequence(
            "2024-01-14",
            &[
                dec!(305.10),
                dec!(304.80),
                dec!(305.25),
                dec!(303.90),
                dec!(304.00),
                dec!(304.55),
                dec!(305.00),
                dec!(302.75),
                dec!(303.10),
                dec!(302.90),
                dec!(303.50),
                dec!(302.00),
                dec!(302.40),
                dec!(301.95),
            ],
        );

        let first = compute_period_stats(&daily, 14).unwrap();
        let second = compute_period_stats(&daily, 14).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn period_stats_week_over_week_full_window() {
        // Last week all 310, previous week all 300
        let mut rates = vec![dec!(310); 7];
        rates.extend(vec![dec!(300); 7]);
        let daily = daily_sequence("2024-01-14", &rates);

        let stats = compute_period_stats(&daily, 14).unwrap();
        let wow = stats.week_over_week.unwrap();

        assert_eq!(wow.last_week_avg, dec!(310.00));
        assert_eq!(wow.previous_week_avg, dec!(300.00));
        assert_eq!(wow.change, dec!(10.00));
        assert_eq!(wow.percentage, dec!(3.33));
    }

    #[test]
    fn period_stats_short_previous_week_uses_available_entries() {
        // 9 entries: previous-week slice has only 2
        let mut rates = vec![dec!(310); 7];
        rates.extend(vec![dec!(300), dec!(302)]);
        let daily = daily_sequence("2024-01-09", &rates);

        let wow = compute_period_stats(&daily, 14)
            .unwrap()
            .week_over_week
            .unwrap();
        assert_eq!(wow.previous_week_avg, dec!(301.00));
    }

    #[test]
    fn period_stats_respects_lookback_window() {
        // 20 entries but only the first 14 should count; the low outlier
        // sits outside the window
        let mut rates = vec![dec!(305); 14];
        rates.extend(vec![dec!(100); 6]);
        let daily = daily_sequence("2024-01-20", &rates);

        let stats = compute_period_stats(&daily, 14).unwrap();
        assert_eq!(stats.lowest_rate, dec!(305));
        assert_eq!(stats.oldest_rate, dec!(305));
    }

    #[test]
    fn advisory_classification() {
        assert_eq!(
            classify_advisory(dec!(305), dec!(305), dec!(300)),
            Advisory::PeriodHigh
        );
        assert_eq!(
            classify_advisory(dec!(300), dec!(305), dec!(300)),
            Advisory::PeriodLow
        );
        assert_eq!(
            classify_advisory(dec!(302), dec!(305), dec!(300)),
            Advisory::NormalRange
        );
        // degenerate range resolves high-first
        assert_eq!(
            classify_advisory(dec!(305), dec!(305), dec!(305)),
            Advisory::PeriodHigh
        );
    }

    #[test]
    fn gate_notifies_on_changed_rate() {
        assert!(should_notify(dec!(310), Some(dec!(305))));
        assert!(!should_notify(dec!(305), Some(dec!(305))));
    }

    #[test]
    fn gate_fails_open_without_yesterday_observations() {
        assert!(should_notify(dec!(310), None));
    }
}
