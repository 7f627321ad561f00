// src/lib.rs

use sea_orm::DatabaseConnection;
use services::{combank::CombankService, mailjet::MailjetService};

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub combank: CombankService,
    pub mailjet: MailjetService,
    pub config: AppConfig,
}

pub mod entities {
    pub mod prelude;
    pub mod usd_rates;
}

pub mod services {
    pub mod combank;
    pub mod email_template;
    pub mod mailjet;
    pub mod rate_analysis;
    pub mod rate_report;
    pub mod rate_store;
}

pub mod config;
pub mod jobs;
pub mod models;
pub mod handlers;
