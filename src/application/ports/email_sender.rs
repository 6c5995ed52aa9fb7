use async_trait::async_trait;

#[async_trait]
pub trait EmailSender: Send + Sync {
    async fn send_password_reset(
        &self,
        to_email: &str,
        to_name: Option<&str>,
        reset_link: &str,
    ) -> anyhow::Result<()>;
}
