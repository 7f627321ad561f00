use chrono_tz::Tz;
use std::env;

use crate::services::mailjet::EmailAddress;

const DEFAULT_RATES_URL: &str = "https://www.combank.lk/rates-tariff#exchange-rates";
const DEFAULT_TIMEZONE: &str = "Asia/Colombo";

/// Process configuration, read from the environment exactly once at startup
/// and passed explicitly into services and jobs. The core analysis code never
/// touches ambient state.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    /// Commercial Bank rates page holding the published USD row
    pub rates_url: String,
    pub mailjet_api_key: String,
    pub mailjet_secret_key: String,
    pub sender: EmailAddress,
    pub recipients: Vec<EmailAddress>,
    /// Timezone used to derive the calendar date/time of an observation
    pub timezone: Tz,
    /// Days of history feeding the report (and the email lookback)
    pub lookback_days: u32,
    /// Seconds between scheduled fetch cycles
    pub fetch_interval_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let database_url =
            env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let rates_url =
            env::var("RATES_URL").unwrap_or_else(|_| DEFAULT_RATES_URL.to_string());

        let mailjet_api_key =
            env::var("MAILJET_API_KEY").map_err(|_| "MAILJET_API_KEY must be set")?;
        let mailjet_secret_key =
            env::var("MAILJET_SECRET_KEY").map_err(|_| "MAILJET_SECRET_KEY must be set")?;

        let sender = EmailAddress {
            email: env::var("MAIL_SENDER_EMAIL").map_err(|_| "MAIL_SENDER_EMAIL must be set")?,
            name: env::var("MAIL_SENDER_NAME").unwrap_or_else(|_| "KeepRates".to_string()),
        };

        // JSON array: [{"Email": "...", "Name": "..."}, ...]
        let recipients_json =
            env::var("MAIL_RECIPIENTS").map_err(|_| "MAIL_RECIPIENTS must be set")?;
        let recipients: Vec<EmailAddress> = serde_json::from_str(&recipients_json)
            .map_err(|e| format!("MAIL_RECIPIENTS is not a valid JSON address list: {}", e))?;
        if recipients.is_empty() {
            return Err("MAIL_RECIPIENTS must contain at least one address".into());
        }

        let timezone: Tz = env::var("TIMEZONE")
            .unwrap_or_else(|_| DEFAULT_TIMEZONE.to_string())
            .parse()
            .map_err(|e| format!("invalid TIMEZONE: {}", e))?;

        let lookback_days = env::var("LOOKBACK_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(14);

        // Original schedule was daily at 08:00 Asia/Colombo
        let fetch_interval_secs = env::var("FETCH_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86400);

        Ok(Self {
            database_url,
            bind_addr,
            rates_url,
            mailjet_api_key,
            mailjet_secret_key,
            sender,
            recipients,
            timezone,
            lookback_days,
            fetch_interval_secs,
        })
    }
}
