//! SeaORM Entity for scraped USD/LKR rate observations

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "usd_rates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    /// LKR per 1 USD at scrape time
    #[sea_orm(column_type = "Decimal(Some((12, 4)))")]
    pub rate: Decimal,
    /// Calendar date in the configured timezone, derived from `timestamp`
    pub date: Date,
    /// Wall-clock time in the configured timezone, derived from `timestamp`
    pub time: Time,
    /// Full instant of the scrape; the sole ordering key
    pub timestamp: DateTimeWithTimeZone,
    /// When the record was created
    pub created_at: Option<DateTime>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
