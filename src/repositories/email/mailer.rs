use anyhow::bail;
use serde_json::json;

#[derive(Clone)]
pub struct MailerApi {
    auth_token: String,
    url: String,
    from: String,
    client: reqwest::Client,
}

impl MailerApi {
    pub fn new(auth_token: String, url: String, from: String) -> Self {
        Self {
            auth_token,
            url,
            from,
            client: reqwest::Client::new(),
        }
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), anyhow::Error> {
        let payload = json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "html": body
        });

        let response = self
            .client
            .post(format!("{}/api/send", self.url))
            .bearer_auth(&self.auth_token)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            bail!("Mailer: send failed with status {}.", response.status());
        }

        Ok(())
    }
}
