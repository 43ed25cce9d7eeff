use anyhow::bail;
use serde_json::json;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnuraVerdict {
    Good,
    Warn,
    Bad,
}

#[derive(Clone)]
pub struct AnuraApi {
    instance_id: String,
    url: String,
    client: reqwest::Client,
}

impl AnuraApi {
    pub fn new(instance_id: String, url: String) -> Self {
        Self {
            instance_id,
            url,
            client: reqwest::Client::new(),
        }
    }

    pub async fn check_visitor(
        &self,
        ip: Option<&str>,
        user_agent: Option<&str>,
    ) -> Result<AnuraVerdict, anyhow::Error> {
        let payload = json!({
            "instance": self.instance_id,
            "ip": ip,
            "ua": user_agent
        });

        let response = self
            .client
            .post(format!("{}/direct.json", self.url))
            .json(&payload)
            .send()
            .await?
            .text()
            .await?;

        let response_json: serde_json::Value = serde_json::from_str(&response)?;
        match response_json.get("result").and_then(|r| r.as_str()) {
            Some("bad") => Ok(AnuraVerdict::Bad),
            Some("warn") => Ok(AnuraVerdict::Warn),
            Some(_) => Ok(AnuraVerdict::Good),
            None => bail!("Anura: Bad response format."),
        }
    }
}
