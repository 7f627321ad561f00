use rust_decimal::Decimal;

use crate::models::rate::RateReport;

const GREEN: &str = "#28a745";
const RED: &str = "#dc3545";
const BLACK: &str = "#000000";

fn change_color(difference: Decimal) -> &'static str {
    if difference > Decimal::ZERO {
        GREEN
    } else if difference < Decimal::ZERO {
        RED
    } else {
        BLACK
    }
}

/// Subject line: `USD Rate Update: 305.75 LKR 🟢`
pub fn subject_line(report: &RateReport) -> String {
    let glyph = report
        .trends
        .first()
        .map(|t| t.trend.glyph())
        .unwrap_or("");
    format!("USD Rate Update: {} LKR {}", report.latest_rate, glyph)
        .trim_end()
        .to_string()
}

/// Render the HTML summary email from a computed report.
pub fn render_rates_email(report: &RateReport) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
</head>
<body style="margin: 0; padding: 0; background-color: #f5f5f5; font-family: Arial, sans-serif; color: #111827">
    <table role="presentation" cellpadding="0" cellspacing="0" width="100%" style="max-width: 600px; margin: 0 auto;">
        <tr>
            <td style="padding: 20px; background: #ffffff;">
                <h2 style="color: #333; margin-bottom: 20px;">USD Exchange Rates Analysis - Last 14 Days</h2>
                {current_rate_box}
                {key_stats}
                {week_over_week}
                {daily_table}
                {summary}
                {footer}
            </td>
        </tr>
    </table>
</body>
</html>"#,
        current_rate_box = render_current_rate_box(report),
        key_stats = render_key_stats(report),
        week_over_week = render_week_over_week(report),
        daily_table = render_daily_table(report),
        summary = render_summary(report),
        footer = render_footer(),
    )
}

fn render_current_rate_box(report: &RateReport) -> String {
    format!(
        r#"<table width="100%" style="background: #f8f9fa; border-radius: 4px; margin-bottom: 20px;">
                    <tr>
                        <td style="padding: 15px;">
                            <h3 style="color: #0066cc; margin: 0 0 10px 0;">Current Rate</h3>
                            <div style="font-size: 24px; font-weight: 600; color: #333;">{} LKR</div>
                            <div style="color: #666; margin-top: 5px;">{}</div>
                        </td>
                    </tr>
                </table>"#,
        report.latest_rate, report.advisory
    )
}

fn render_key_stats(report: &RateReport) -> String {
    let stat_cell = |label: &str, value: String, color: &str| {
        format!(
            r#"<td width="25%" style="background: #ffffff; border: 1px solid #dee2e6; padding: 10px; text-align: center; border-radius: 6px;">
                            <div style="color: #666; font-size: 14px; margin-bottom: 4px;">{}</div>
                            <div style="color: {}; font-weight: bold;">{}</div>
                        </td>"#,
            label, color, value
        )
    };

    format!(
        r#"<table width="100%" cellspacing="5" style="margin-bottom: 20px;">
                    <tr>
                        {}
                        {}
                        {}
                        {}
                    </tr>
                </table>"#,
        stat_cell(
            "Overall Change",
            format!(
                "{} LKR ({}%)",
                report.overall_change, report.overall_percentage
            ),
            change_color(report.overall_change),
        ),
        stat_cell(
            "Highest Rate",
            format!("{} LKR", report.highest_rate),
            BLACK
        ),
        stat_cell("Lowest Rate", format!("{} LKR", report.lowest_rate), BLACK),
        stat_cell(
            "Rate Volatility",
            format!("{} LKR", report.rate_volatility),
            BLACK
        ),
    )
}

fn render_week_over_week(report: &RateReport) -> String {
    match &report.week_over_week {
        Some(wow) => format!(
            r#"<h3>Week-over-Week Analysis</h3>
                <ul>
                    <li>Last Week Average: {} LKR</li>
                    <li>Previous Week Average: {} LKR</li>
                    <li>Week-over-Week Change: {} LKR ({}%)</li>
                </ul>"#,
            wow.last_week_avg, wow.previous_week_avg, wow.change, wow.percentage
        ),
        None => String::new(),
    }
}

fn render_daily_table(report: &RateReport) -> String {
    let rows: String = report
        .daily_max_observations
        .iter()
        .enumerate()
        .map(|(index, point)| {
            // Separator between the two comparison weeks
            let row_style = if index == 7 {
                r#" style="border-top: 2px solid #000;""#
            } else {
                ""
            };
            let trend = report.trends.get(index);
            let color = trend
                .map(|t| change_color(t.difference))
                .unwrap_or(BLACK);
            format!(
                r#"<tr{row_style}>
                        <td style="padding: 8px; border: 1px solid #dee2e6;">{date}</td>
                        <td style="padding: 8px; border: 1px solid #dee2e6;">{time}</td>
                        <td style="padding: 8px; border: 1px solid #dee2e6;">{rate}</td>
                        <td style="padding: 8px; border: 1px solid #dee2e6; color: {color};">{difference}</td>
                        <td style="padding: 8px; border: 1px solid #dee2e6; color: {color};">{percentage}</td>
                        <td style="padding: 8px; border: 1px solid #dee2e6;">{glyph}</td>
                    </tr>"#,
                row_style = row_style,
                date = point.date,
                time = point.time.format("%H:%M:%S"),
                rate = point.rate,
                color = color,
                difference = trend
                    .map(|t| t.difference.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                percentage = trend
                    .map(|t| format!("{}%", t.percentage_change))
                    .unwrap_or_else(|| "-".to_string()),
                glyph = trend.map(|t| t.trend.glyph()).unwrap_or("-"),
            )
        })
        .collect();

    format!(
        r#"<h3>Daily Rates and Trends</h3>
                <table width="100%" style="border-collapse: collapse; margin-bottom: 20px;">
                    <tr style="background-color: #f2f2f2;">
                        <th style="padding: 8px; border: 1px solid #dee2e6;">Date</th>
                        <th style="padding: 8px; border: 1px solid #dee2e6;">Time</th>
                        <th style="padding: 8px; border: 1px solid #dee2e6;">Rate (LKR)</th>
                        <th style="padding: 8px; border: 1px solid #dee2e6;">Daily Change</th>
                        <th style="padding: 8px; border: 1px solid #dee2e6;">% Change</th>
                        <th style="padding: 8px; border: 1px solid #dee2e6;">Trend</th>
                    </tr>
                    {}
                </table>"#,
        rows
    )
}

fn render_summary(report: &RateReport) -> String {
    let direction = if report.overall_change > Decimal::ZERO {
        "increased"
    } else {
        "decreased"
    };
    let verdict = if report.overall_percentage.abs() > Decimal::ONE {
        let tilt = if report.overall_change > Decimal::ZERO {
            "upward"
        } else {
            "downward"
        };
        format!("This represents a significant {} trend.", tilt)
    } else {
        "The rate has remained relatively stable.".to_string()
    };

    format!(
        r#"<h3>Analysis Summary</h3>
                <p>
                    Over the last 14 days, the USD/LKR rate has {} by {} LKR ({}%).
                    {}
                </p>"#,
        direction,
        report.overall_change.abs(),
        report.overall_percentage.abs(),
        verdict
    )
}

fn render_footer() -> String {
    r#"<div style="margin-top: 20px;">
                    <p style="margin-bottom: 4px;">
                        For current exchange rates, you can also visit the
                        <a href="https://www.combank.lk/rates-tariff#exchange-rates" target="_blank">Commercial Bank website</a>
                    </p>
                </div>"#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::rate_report::build_rate_report;
    use crate::services::rate_analysis::RateObservation;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;

    fn report() -> RateReport {
        let observations: Vec<RateObservation> = (0..3u32)
            .map(|i| {
                let date = NaiveDate::from_ymd_opt(2024, 1, 3 - i).unwrap();
                RateObservation {
                    rate: dec!(300) + Decimal::from(3 - i),
                    date,
                    time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
                    timestamp: date.and_hms_opt(8, 0, 0).unwrap().and_utc(),
                }
            })
            .collect();
        build_rate_report(&observations, 14).unwrap()
    }

    #[test]
    fn subject_includes_rate_and_trend_glyph() {
        let subject = subject_line(&report());
        assert_eq!(subject, "USD Rate Update: 303 LKR 🟢");
    }

    #[test]
    fn html_contains_figures_and_placeholder_for_oldest_row() {
        let html = render_rates_email(&report());

        assert!(html.contains("Current Rate"));
        assert!(html.contains("303 LKR"));
        assert!(html.contains("Daily Rates and Trends"));
        // the oldest row has no trend entry
        assert!(html.contains(">-</td>"));
        // short window: no week-over-week section
        assert!(!html.contains("Week-over-Week Analysis"));
    }
}
