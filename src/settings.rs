use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Postgres {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Http {
    pub listen: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Mailer {
    pub url: String,
    pub auth_token: String,
    pub from: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Anura {
    pub enabled: bool,
    pub url: String,
    pub instance_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Risk {
    pub review_threshold: f64,
    pub reject_threshold: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub postgres: Postgres,
    pub http: Http,
    pub mailer: Mailer,
    pub anura: Anura,
    pub risk: Risk,
}

impl Settings {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = Config::builder()
            .add_source(config::File::from_str(
                r#"
                [postgres]
                url = "postgres://localhost/partnerdesk"
                max_connections = 5

                [http]
                listen = "127.0.0.1:8080"

                [mailer]
                url = "https://mail.example.com"
                auth_token = "secret"
                from = "partners@example.com"

                [anura]
                enabled = false
                url = "https://direct.anura.io"
                instance_id = ""

                [risk]
                review_threshold = 0.5
                reject_threshold = 0.8
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();

        let settings: Settings = config.try_deserialize().unwrap();
        assert_eq!(settings.http.listen, "127.0.0.1:8080");
        assert_eq!(settings.postgres.max_connections, 5);
        assert!(settings.risk.reject_threshold > settings.risk.review_threshold);
    }
}
