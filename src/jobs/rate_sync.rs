use chrono::Utc;
use sea_orm::DatabaseConnection;
use tokio::time::{interval, Duration};

use crate::config::AppConfig;
use crate::services::combank::CombankService;
use crate::services::mailjet::MailjetService;
use crate::services::rate_analysis::should_notify;
use crate::services::{email_template, rate_report, rate_store};

/// Scheduled fetch -> store -> gate -> notify loop. The loop body runs one
/// cycle at a time; overlapping cycles would risk duplicate notifications.
pub async fn start_rate_sync_job(
    db: DatabaseConnection,
    combank: CombankService,
    mailjet: MailjetService,
    config: AppConfig,
) {
    tokio::spawn(async move {
        let mut interval = interval(Duration::from_secs(config.fetch_interval_secs));

        loop {
            interval.tick().await;
            tracing::info!("Starting scheduled rate sync");

            if let Err(e) = run_rate_cycle(&db, &combank, &mailjet, &config).await {
                tracing::error!("Rate sync cycle failed, skipping: {}", e);
            }
        }
    });
}

async fn run_rate_cycle(
    db: &DatabaseConnection,
    combank: &CombankService,
    mailjet: &MailjetService,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let rate = combank.fetch_usd_rate().await?;
    let saved = rate_store::insert_observation(db, rate, config.timezone).await?;

    // Gate against yesterday's daily maximum, queried by calendar date
    let yesterday = saved
        .date
        .pred_opt()
        .ok_or("calendar underflow computing yesterday")?;
    let yesterday_max = rate_store::daily_max_rate_for(db, yesterday).await?;

    if !should_notify(rate, yesterday_max) {
        tracing::info!(
            "Rate {} matches yesterday's maximum; suppressing notification",
            rate
        );
        return Ok(());
    }

    send_rates_email(db, mailjet, config).await
}

/// Build the lookback report, render it and deliver it to all recipients.
/// Shared by the scheduled cycle and the manual trigger endpoint.
pub async fn send_rates_email(
    db: &DatabaseConnection,
    mailjet: &MailjetService,
    config: &AppConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let since = Utc::now() - chrono::Duration::days(config.lookback_days as i64);
    let observations = rate_store::observations_since(db, since).await?;

    let report = rate_report::build_rate_report(&observations, config.lookback_days)?;
    let subject = email_template::subject_line(&report);
    let html = email_template::render_rates_email(&report);

    mailjet
        .send_html(&config.sender, &config.recipients, &subject, &html)
        .await?;

    tracing::info!(
        "Rates email sent to {} recipients: {}",
        config.recipients.len(),
        subject
    );

    Ok(())
}
