use lazy_static::lazy_static;
use moka::future::Cache;
use regex::Regex;
use reqwest::Client;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

lazy_static! {
    // Fifth numeric cell of the US DOLLARS row on the published rates page
    // (the T/T selling rate). The page is a server-rendered table; the cells
    // carry inline text-align styling.
    static ref USD_ROW_REGEX: Regex = Regex::new(
        r#"(?s)US DOLLARS.*?text-align:right">\s*[\d.]+\s*</td>.*?text-align:right">\s*[\d.]+\s*</td>.*?text-align:right">\s*[\d.]+\s*</td>.*?text-align:right">\s*[\d.]+\s*</td>.*?text-align:right">\s*([\d.]+)\s*<"#
    )
    .unwrap();
}

const RATE_CACHE_KEY: &str = "usd/lkr";

/// Fetches the published USD selling rate from the Commercial Bank website.
#[derive(Clone)]
pub struct CombankService {
    client: Client,
    rates_url: String,
    cache: Arc<Cache<String, Decimal>>,
}

impl CombankService {
    pub fn new(rates_url: String) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(600)) // 10 minute TTL
            .build();

        Self {
            client: Client::new(),
            rates_url,
            cache: Arc::new(cache),
        }
    }

    pub async fn fetch_usd_rate(
        &self,
    ) -> Result<Decimal, Box<dyn std::error::Error + Send + Sync>> {
        if let Some(rate) = self.cache.get(RATE_CACHE_KEY).await {
            tracing::debug!("Returning cached USD rate: {}", rate);
            return Ok(rate);
        }

        tracing::info!("Fetching USD rate from {}", self.rates_url);
        let response = self.client.get(&self.rates_url).send().await?;

        if !response.status().is_success() {
            return Err(format!("Rates page returned {}", response.status()).into());
        }

        let html = response.text().await?;
        let rate = extract_usd_rate(&html).ok_or("USD rate not found on the rates page")?;

        self.cache.insert(RATE_CACHE_KEY.to_string(), rate).await;
        tracing::info!("Fetched USD rate: {} LKR", rate);

        Ok(rate)
    }
}

/// Extract the USD selling rate from the rates page HTML.
/// Returns None when the US DOLLARS row is missing or malformed.
pub fn extract_usd_rate(html: &str) -> Option<Decimal> {
    USD_ROW_REGEX
        .captures(html)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<Decimal>().ok())
        .filter(|rate| *rate > Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd_row(cells: &[&str]) -> String {
        let tds: Vec<String> = cells
            .iter()
            .map(|c| format!(r#"<td style="text-align:right"> {} </td>"#, c))
            .collect();
        format!(
            "<table><tr><td>US DOLLARS</td>{}</tr></table>",
            tds.join("\n")
        )
    }

    #[test]
    fn extracts_fifth_cell_of_usd_row() {
        let html = usd_row(&["296.50", "299.00", "300.10", "301.25", "305.75"]);
        assert_eq!(extract_usd_rate(&html), Some(dec!(305.75)));
    }

    #[test]
    fn missing_row_yields_none() {
        assert_eq!(extract_usd_rate("<table></table>"), None);
        // EUR row alone must not match
        let html = usd_row(&["296.50", "299.00", "300.10", "301.25", "305.75"])
            .replace("US DOLLARS", "EURO");
        assert_eq!(extract_usd_rate(&html), None);
    }

    #[test]
    fn too_few_cells_yields_none() {
        let html = usd_row(&["296.50", "299.00", "300.10"]);
        assert_eq!(extract_usd_rate(&html), None);
    }
}
