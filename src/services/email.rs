use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::oneshot;

use super::{RequestHandler, Service, ServiceError};
use crate::models::affiliates;
use crate::models::email::{self, Campaign, EmailTemplate, NewCampaign, NewTemplate, UpdateTemplate};
use crate::repositories::affiliates::AffiliateRepository;
use crate::repositories::email::mailer::MailerApi;
use crate::repositories::email::EmailRepository;
use crate::settings;

pub enum EmailRequest {
    CreateTemplate {
        req: NewTemplate,
        response: oneshot::Sender<Result<EmailTemplate, ServiceError>>,
    },
    ListTemplates {
        response: oneshot::Sender<Result<Vec<EmailTemplate>, ServiceError>>,
    },
    UpdateTemplate {
        id: String,
        req: UpdateTemplate,
        response: oneshot::Sender<Result<EmailTemplate, ServiceError>>,
    },
    CreateCampaign {
        req: NewCampaign,
        response: oneshot::Sender<Result<Campaign, ServiceError>>,
    },
    GetCampaign {
        id: String,
        response: oneshot::Sender<Result<Campaign, ServiceError>>,
    },
    SendCampaign {
        id: String,
        response: oneshot::Sender<Result<Campaign, ServiceError>>,
    },
}

#[derive(Clone)]
pub struct EmailRequestHandler {
    repository: EmailRepository,
    affiliates: AffiliateRepository,
    mailer: MailerApi,
}

impl EmailRequestHandler {
    pub fn new(sql_conn: PgPool, mailer: settings::Mailer) -> Self {
        let repository = EmailRepository::new(sql_conn.clone());
        let affiliates = AffiliateRepository::new(sql_conn);
        let mailer = MailerApi::new(mailer.auth_token, mailer.url, mailer.from);

        EmailRequestHandler {
            repository,
            affiliates,
            mailer,
        }
    }

    async fn create_template(&self, req: NewTemplate) -> Result<EmailTemplate, ServiceError> {
        if req.name.trim().is_empty() || req.subject.trim().is_empty() {
            return Err(ServiceError::InvalidRequest(
                "Template name and subject are required".to_string(),
            ));
        }

        self.repository
            .insert_template(&req)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn list_templates(&self) -> Result<Vec<EmailTemplate>, ServiceError> {
        self.repository
            .list_templates()
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn update_template(
        &self,
        id: &str,
        req: UpdateTemplate,
    ) -> Result<EmailTemplate, ServiceError> {
        self.repository
            .update_template(id, &req)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Template not found".to_string()))
    }

    async fn create_campaign(&self, req: NewCampaign) -> Result<Campaign, ServiceError> {
        let template = self
            .repository
            .get_template(&req.template_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        if template.is_none() {
            return Err(ServiceError::NotFound("Template not found".to_string()));
        }

        self.repository
            .insert_campaign(&req.template_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))
    }

    async fn get_campaign(&self, id: &str) -> Result<Campaign, ServiceError> {
        self.repository
            .get_campaign(id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Campaign not found".to_string()))
    }

    /// Synchronous recipient loop. Per-recipient failures are counted; an
    /// error escaping the loop marks the whole campaign failed.
    async fn send_campaign(&self, id: &str) -> Result<Campaign, ServiceError> {
        let campaign = self.get_campaign(id).await?;
        if campaign.status != email::STATUS_DRAFT && campaign.status != email::STATUS_FAILED {
            return Err(ServiceError::InvalidRequest(format!(
                "Campaign cannot be sent from status: {}",
                campaign.status
            )));
        }

        self.repository
            .update_campaign_status(id, email::STATUS_SENDING)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        let mut sent_count: i64 = 0;
        let mut failed_count: i64 = 0;

        let result = self
            .run_send_loop(&campaign, &mut sent_count, &mut failed_count)
            .await;

        let status = match &result {
            Ok(()) if sent_count == 0 && failed_count > 0 => email::STATUS_FAILED,
            Ok(()) => email::STATUS_SENT,
            Err(_) => email::STATUS_FAILED,
        };

        let finished = self
            .repository
            .finish_campaign(id, status, sent_count, failed_count)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Campaign not found".to_string()))?;

        result?;
        Ok(finished)
    }

    async fn run_send_loop(
        &self,
        campaign: &Campaign,
        sent_count: &mut i64,
        failed_count: &mut i64,
    ) -> Result<(), ServiceError> {
        let template = self
            .repository
            .get_template(&campaign.template_id)
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?
            .ok_or_else(|| ServiceError::NotFound("Template not found".to_string()))?;

        let recipients = self
            .affiliates
            .list_affiliates(Some(affiliates::STATUS_ACTIVE))
            .await
            .map_err(|e| ServiceError::Database(e.to_string()))?;

        for recipient in &recipients {
            let mut vars = HashMap::new();
            vars.insert("name".to_string(), recipient.name.clone());
            vars.insert("email".to_string(), recipient.email.clone());

            let subject = render(&template.subject, &vars);
            let body = render(&template.body, &vars);

            match self.mailer.send(&recipient.email, &subject, &body).await {
                Ok(()) => *sent_count += 1,
                Err(e) => {
                    *failed_count += 1;
                    log::warn!("Could not send campaign mail to {}: {}", recipient.email, e);
                }
            }
        }

        Ok(())
    }
}

/// Substitute `{{key}}` placeholders; unknown placeholders are left as-is.
pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        out = out.replace(&format!("{{{{{}}}}}", key), value);
    }
    out
}

#[async_trait]
impl RequestHandler<EmailRequest> for EmailRequestHandler {
    async fn handle_request(&self, request: EmailRequest) {
        match request {
            EmailRequest::CreateTemplate { req, response } => {
                let _ = response.send(self.create_template(req).await);
            }
            EmailRequest::ListTemplates { response } => {
                let _ = response.send(self.list_templates().await);
            }
            EmailRequest::UpdateTemplate { id, req, response } => {
                let _ = response.send(self.update_template(&id, req).await);
            }
            EmailRequest::CreateCampaign { req, response } => {
                let _ = response.send(self.create_campaign(req).await);
            }
            EmailRequest::GetCampaign { id, response } => {
                let _ = response.send(self.get_campaign(&id).await);
            }
            EmailRequest::SendCampaign { id, response } => {
                let _ = response.send(self.send_campaign(&id).await);
            }
        }
    }
}

pub struct EmailService;

impl EmailService {
    pub fn new() -> Self {
        EmailService {}
    }
}

#[async_trait]
impl Service<EmailRequest, EmailRequestHandler> for EmailService {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_replaces_known_placeholders() {
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Ada".to_string());

        assert_eq!(render("Hi {{name}}!", &vars), "Hi Ada!");
    }

    #[test]
    fn render_repeats_and_mixes_placeholders() {
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Ada".to_string());
        vars.insert("email".to_string(), "ada@example.com".to_string());

        assert_eq!(
            render("{{name}} <{{email}}>, welcome {{name}}", &vars),
            "Ada <ada@example.com>, welcome Ada"
        );
    }

    #[test]
    fn render_leaves_unknown_placeholders() {
        let vars = HashMap::new();
        assert_eq!(render("Hi {{name}}!", &vars), "Hi {{name}}!");
    }
}
