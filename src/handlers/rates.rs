use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::DbErr;

use crate::models::rate::{
    ChangeSummary, ErrorResponse, FetchRateResponse, MessageResponse, RateReport, RatePoint,
    RateSeriesQuery, RateSeriesResponse, ReportQuery,
};
use crate::services::rate_analysis::{self, round2, AnalysisError};
use crate::services::{rate_report, rate_store};
use crate::jobs::rate_sync;
use crate::AppState;

fn db_error(e: DbErr) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: format!("Database error: {}", e),
        }),
    )
}

fn analysis_error(e: AnalysisError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match e {
        // Dashboard renders this as a "not enough data" state
        AnalysisError::InsufficientData => StatusCode::NOT_FOUND,
        AnalysisError::DivisionByZero { .. } => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
}

/// GET /api/rates?days=90 — daily-max series for the dashboard chart,
/// ascending by date, with the latest rate and previous-day change.
pub async fn get_rate_series(
    State(state): State<AppState>,
    Query(params): Query<RateSeriesQuery>,
) -> Result<Json<RateSeriesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let days = params.days.unwrap_or(90).clamp(1, 365);
    let since = Utc::now() - chrono::Duration::days(days);

    let observations = rate_store::observations_since(&state.db, since)
        .await
        .map_err(db_error)?;

    // Descending: index 0 is the most recent day
    let daily_max = rate_analysis::collapse_daily_max(&observations);
    let latest = daily_max.first().ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No rate observations found for the requested range".to_string(),
            }),
        )
    })?;

    let previous_day_change = daily_max.get(1).and_then(|previous| {
        if previous.rate.is_zero() {
            return None;
        }
        let change = latest.rate - previous.rate;
        Some(ChangeSummary {
            change: round2(change),
            percentage: round2(change / previous.rate * Decimal::ONE_HUNDRED),
        })
    });

    let latest_rate = latest.rate;
    let latest_timestamp = latest.timestamp;

    // Chart consumers want ascending order
    let rates: Vec<RatePoint> = daily_max.iter().rev().map(RatePoint::from).collect();

    Ok(Json(RateSeriesResponse {
        rates,
        latest_rate,
        latest_timestamp,
        previous_day_change,
    }))
}

/// GET /api/rates/report?days=14 — the full computed report consumed by the
/// dashboard summary cards (same shape the email renderer uses).
pub async fn get_rate_report(
    State(state): State<AppState>,
    Query(params): Query<ReportQuery>,
) -> Result<Json<RateReport>, (StatusCode, Json<ErrorResponse>)> {
    let lookback_days = params
        .days
        .unwrap_or(state.config.lookback_days)
        .clamp(1, 365);
    let since = Utc::now() - chrono::Duration::days(lookback_days as i64);

    let observations = rate_store::observations_since(&state.db, since)
        .await
        .map_err(db_error)?;

    let report =
        rate_report::build_rate_report(&observations, lookback_days).map_err(analysis_error)?;

    Ok(Json(report))
}

/// POST /api/rates/fetch — manual trigger: fetch the published rate and
/// store one observation, mirroring a scheduled cycle's first half.
pub async fn trigger_fetch_rate(
    State(state): State<AppState>,
) -> Result<Json<FetchRateResponse>, (StatusCode, Json<ErrorResponse>)> {
    let rate = state.combank.fetch_usd_rate().await.map_err(|e| {
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: format!("Failed to fetch USD rate: {}", e),
            }),
        )
    })?;

    let saved = rate_store::insert_observation(&state.db, rate, state.config.timezone)
        .await
        .map_err(db_error)?;

    Ok(Json(FetchRateResponse {
        success: true,
        data: saved,
    }))
}

/// POST /api/rates/email — manual trigger for the summary email.
pub async fn trigger_send_email(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    rate_sync::send_rates_email(&state.db, &state.mailjet, &state.config)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to send rates email: {}", e),
                }),
            )
        })?;

    Ok(Json(MessageResponse {
        message: "Email sent successfully".to_string(),
    }))
}
