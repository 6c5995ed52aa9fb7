//! Password reset mail over SMTP, or into `.eml` files when no SMTP host is
//! configured.

use std::path::Path;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use lettre::{
    AsyncFileTransport, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Mailbox, header::ContentType},
    transport::smtp::authentication::Credentials,
};

use crate::application::ports::email_sender::EmailSender;
use crate::application::use_cases::auth::forgot_password::RESET_TOKEN_TTL_MINUTES;
use crate::bootstrap::config::Config;

const DEFAULT_EMAIL_DIR: &str = "./emails";

pub struct LettreEmailSender {
    transport: EmailTransport,
    from: Mailbox,
}

enum EmailTransport {
    Smtp(AsyncSmtpTransport<Tokio1Executor>),
    File(AsyncFileTransport<Tokio1Executor>),
}

impl LettreEmailSender {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        let transport = match &cfg.smtp {
            Some(smtp) => {
                if !smtp.use_tls {
                    tracing::warn!("smtp_tls_disabled");
                }
                let mut builder = if smtp.use_tls {
                    AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&smtp.host)
                        .map_err(|e| anyhow!("create SMTP transport: {e}"))?
                } else {
                    AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
                }
                .port(smtp.port);
                if let (Some(user), Some(pass)) = (&smtp.username, &smtp.password) {
                    builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
                }
                EmailTransport::Smtp(builder.build())
            }
            None => {
                let dir = Path::new(cfg.email_file_dir.as_deref().unwrap_or(DEFAULT_EMAIL_DIR));
                if !dir.exists() {
                    std::fs::create_dir_all(dir)
                        .with_context(|| format!("create emails directory {}", dir.display()))?;
                }
                tracing::info!(dir = %dir.display(), "email_file_transport");
                EmailTransport::File(AsyncFileTransport::<Tokio1Executor>::new(dir))
            }
        };
        let from = cfg
            .email_from
            .parse::<Mailbox>()
            .map_err(|e| anyhow!("parse EMAIL_FROM: {e}"))?;
        Ok(Self { transport, from })
    }

    async fn send(&self, message: Message) -> anyhow::Result<()> {
        match &self.transport {
            EmailTransport::Smtp(smtp) => {
                smtp.send(message)
                    .await
                    .map_err(|e| anyhow!("send SMTP email: {e}"))?;
            }
            EmailTransport::File(file) => {
                file.send(message)
                    .await
                    .map_err(|e| anyhow!("send file email: {e}"))?;
            }
        }
        Ok(())
    }
}

fn password_reset_body(to_name: Option<&str>, reset_link: &str) -> String {
    let greeting = match to_name {
        Some(name) => format!("Hello {name},"),
        None => "Hello,".to_string(),
    };
    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Reset your Sonara password</title></head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
  <p>{greeting}</p>
  <p>We received a request to reset your Sonara password. If you didn't make this request, you can ignore this email.</p>
  <p><a href="{reset_link}">Reset your password</a></p>
  <p>Or paste this link into your browser:<br>{reset_link}</p>
  <p>The link expires in {RESET_TOKEN_TTL_MINUTES} minutes.</p>
</body>
</html>"#
    )
}

#[async_trait]
impl EmailSender for LettreEmailSender {
    async fn send_password_reset(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        reset_link: &str,
    ) -> anyhow::Result<()> {
        let to = match to_name {
            Some(name) => format!("{name} <{to_email}>"),
            None => to_email.to_string(),
        }
        .parse::<Mailbox>()
        .map_err(|e| anyhow!("parse to email: {e}"))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject("Reset your Sonara password")
            .header(ContentType::TEXT_HTML)
            .body(password_reset_body(to_name, reset_link))
            .map_err(|e| anyhow!("build email message: {e}"))?;

        self.send(message).await?;
        tracing::debug!("password_reset_email_sent");
        Ok(())
    }
}
