use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, Order, QueryFilter,
    QueryOrder, QuerySelect, Set,
};

use crate::entities::{prelude::*, usd_rates};
use crate::services::rate_analysis::RateObservation;

/// Stamp and insert a freshly fetched rate. The calendar date and wall-clock
/// time are derived from the same instant as the timestamp, in the configured
/// timezone, so the three fields can never disagree.
pub async fn insert_observation(
    db: &DatabaseConnection,
    rate: Decimal,
    timezone: Tz,
) -> Result<RateObservation, DbErr> {
    let now = Utc::now().with_timezone(&timezone);

    let new_rate = usd_rates::ActiveModel {
        rate: Set(rate),
        date: Set(now.date_naive()),
        time: Set(now.time()),
        timestamp: Set(now.fixed_offset()),
        created_at: Set(Some(Utc::now().naive_utc())),
        ..Default::default()
    };

    let saved = new_rate.insert(db).await?;
    tracing::info!(
        "USD rate saved: {} LKR on {} at {}",
        saved.rate,
        saved.date,
        saved.time
    );

    Ok(observation_from(saved))
}

/// All observations with timestamp >= start, newest first
pub async fn observations_since(
    db: &DatabaseConnection,
    start: DateTime<Utc>,
) -> Result<Vec<RateObservation>, DbErr> {
    let rows = UsdRates::find()
        .filter(usd_rates::Column::Timestamp.gte(start))
        .order_by(usd_rates::Column::Timestamp, Order::Desc)
        .all(db)
        .await?;

    Ok(rows.into_iter().map(observation_from).collect())
}

/// Highest rate observed on a calendar date, None when that day has no
/// observations at all (the change gate treats that as "always notify").
pub async fn daily_max_rate_for(
    db: &DatabaseConnection,
    date: NaiveDate,
) -> Result<Option<Decimal>, DbErr> {
    let row = UsdRates::find()
        .filter(usd_rates::Column::Date.eq(date))
        .order_by(usd_rates::Column::Rate, Order::Desc)
        .limit(1)
        .one(db)
        .await?;

    Ok(row.map(|r| r.rate))
}

fn observation_from(model: usd_rates::Model) -> RateObservation {
    RateObservation {
        rate: model.rate,
        date: model.date,
        time: model.time,
        timestamp: model.timestamp.with_timezone(&Utc),
    }
}
