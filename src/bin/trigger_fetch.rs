// src/bin/trigger_fetch.rs
//
// Manual trigger for a rate fetch against a running backend, for cron setups
// that drive the schedule externally.
// Usage: cargo run --bin trigger_fetch -- http://localhost:3000

use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let base_url = env::args()
        .nth(1)
        .or_else(|| env::var("KEEPRATES_URL").ok())
        .unwrap_or_else(|| "http://localhost:3000".to_string());

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/api/rates/fetch", base_url))
        .send()
        .await?;

    let status = response.status();
    let body: serde_json::Value = response.json().await?;
    println!("{}: {}", status, body);

    if !status.is_success() {
        std::process::exit(1);
    }

    Ok(())
}
