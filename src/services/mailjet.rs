use reqwest::Client;
use serde::{Deserialize, Serialize};

const MAILJET_BASE_URL: &str = "https://api.mailjet.com";

/// Address in Mailjet's wire casing, reused directly in AppConfig
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAddress {
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Name")]
    pub name: String,
}

#[derive(Serialize)]
struct SendRequest {
    #[serde(rename = "Messages")]
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    #[serde(rename = "From")]
    from: EmailAddress,
    #[serde(rename = "To")]
    to: Vec<EmailAddress>,
    #[serde(rename = "Subject")]
    subject: String,
    #[serde(rename = "HTMLPart")]
    html_part: String,
}

/// Thin client for the Mailjet v3.1 send API.
#[derive(Clone)]
pub struct MailjetService {
    client: Client,
    api_key: String,
    secret_key: String,
    base_url: String,
}

impl MailjetService {
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            secret_key,
            base_url: MAILJET_BASE_URL.to_string(),
        }
    }

    pub async fn send_html(
        &self,
        from: &EmailAddress,
        to: &[EmailAddress],
        subject: &str,
        html: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let payload = SendRequest {
            messages: vec![Message {
                from: from.clone(),
                to: to.to_vec(),
                subject: subject.to_string(),
                html_part: html.to_string(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/v3.1/send", self.base_url))
            .basic_auth(&self.api_key, Some(&self.secret_key))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(format!("Mailjet API error {}: {}", status, error_text).into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_in_mailjet_casing() {
        let payload = SendRequest {
            messages: vec![Message {
                from: EmailAddress {
                    email: "rates@example.com".to_string(),
                    name: "KeepRates".to_string(),
                },
                to: vec![EmailAddress {
                    email: "someone@example.com".to_string(),
                    name: "Someone".to_string(),
                }],
                subject: "USD Rate Update: 305.75 LKR".to_string(),
                html_part: "<h2>rates</h2>".to_string(),
            }],
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["Messages"][0]["From"]["Email"], "rates@example.com");
        assert_eq!(json["Messages"][0]["To"][0]["Name"], "Someone");
        assert_eq!(json["Messages"][0]["Subject"], "USD Rate Update: 305.75 LKR");
        assert!(json["Messages"][0]["HTMLPart"].is_string());
    }
}
