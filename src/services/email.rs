use async_trait::async_trait;
use lettre::{
    message::header::ContentType, transport::smtp::authentication::Credentials, Message,
    SmtpTransport, Transport,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::MailerConfig;
use crate::error::AppError;

#[async_trait]
pub trait EmailProvider: Send + Sync {
    /// Send the email-confirmation link.
    async fn send_confirm_email(&self, to_email: &str, confirm_link: &str)
        -> Result<(), AppError>;

    /// Send the password-reset link.
    async fn send_password_reset_email(
        &self,
        to_email: &str,
        reset_link: &str,
    ) -> Result<(), AppError>;

    /// Send a 6-digit two-factor code.
    async fn send_two_factor_code(&self, to_email: &str, code: &str) -> Result<(), AppError>;
}

#[derive(Clone)]
pub struct EmailService {
    mailer: SmtpTransport,
    from_email: String,
}

impl EmailService {
    pub fn new(config: &MailerConfig) -> Result<Self, AppError> {
        let creds = Credentials::new(config.user.clone(), config.pass.clone());

        let mailer = SmtpTransport::relay(&config.host)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e.to_string())))?
            .credentials(creds)
            .port(config.port)
            .timeout(Some(Duration::from_secs(10)))
            .build();

        tracing::info!(host = %config.host, "Email service initialized");

        Ok(Self {
            mailer,
            from_email: config.from.clone(),
        })
    }

    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        plain_body: &str,
        html_body: &str,
    ) -> Result<(), AppError> {
        let email = Message::builder()
            .from(self.from_email.parse().map_err(
                |e: lettre::address::AddressError| AppError::Internal(e.into()),
            )?)
            .to(to_email.parse().map_err(
                |e: lettre::address::AddressError| AppError::Internal(e.into()),
            )?)
            .subject(subject)
            .multipart(
                lettre::message::MultiPart::alternative()
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(plain_body.to_string()),
                    )
                    .singlepart(
                        lettre::message::SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| AppError::Internal(e.into()))?;

        // Send in the blocking pool to avoid stalling the async runtime
        let mailer = self.mailer.clone();
        let result = tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| AppError::Internal(e.into()))?;

        match result {
            Ok(_) => {
                tracing::info!(to = %to_email, subject = %subject, "Email sent successfully");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e.to_string(), to = %to_email, "Failed to send email");
                Err(AppError::MailDispatch(e.to_string()))
            }
        }
    }
}

#[async_trait]
impl EmailProvider for EmailService {
    async fn send_confirm_email(
        &self,
        to_email: &str,
        confirm_link: &str,
    ) -> Result<(), AppError> {
        let html_body = format!(
            r#"<h3>Подтверждение регистрации</h3><p>Чтобы завершить регистрацию, перейдите по <a href="{0}">{0}</a></p>"#,
            confirm_link
        );
        let plain_body = format!(
            "Подтверждение регистрации\n\nЧтобы завершить регистрацию, перейдите по ссылке: {}",
            confirm_link
        );

        self.send_email(
            to_email,
            "Подтверждение регистрации на сайте skill-bridge.ru",
            &plain_body,
            &html_body,
        )
        .await
    }

    async fn send_password_reset_email(
        &self,
        to_email: &str,
        reset_link: &str,
    ) -> Result<(), AppError> {
        let html_body = format!(
            r#"<h3>Сброс пароля</h3><p>Чтобы сбросить пароль, перейдите по <a href="{0}">{0}</a></p>"#,
            reset_link
        );
        let plain_body = format!(
            "Сброс пароля\n\nЧтобы сбросить пароль, перейдите по ссылке: {}",
            reset_link
        );

        self.send_email(
            to_email,
            "Сброс пароля на сайте skill-bridge.ru",
            &plain_body,
            &html_body,
        )
        .await
    }

    async fn send_two_factor_code(&self, to_email: &str, code: &str) -> Result<(), AppError> {
        let html_body = format!(
            r#"<h3>Код двухфакторной аутентификации</h3><p>Ваш код: <b>{}</b></p>"#,
            code
        );
        let plain_body = format!("Код двухфакторной аутентификации\n\nВаш код: {}", code);

        self.send_email(
            to_email,
            "Код двухфакторной аутентификации",
            &plain_body,
            &html_body,
        )
        .await
    }
}

/// Captured message for test assertions.
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// In-memory provider: records every message and can be switched to fail.
#[derive(Clone, Default)]
pub struct MockEmailService {
    outbox: Arc<Mutex<Vec<SentEmail>>>,
    fail: Arc<AtomicBool>,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent send fail with a dispatch error.
    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Snapshot of everything sent so far.
    pub fn sent(&self) -> Vec<SentEmail> {
        self.outbox.lock().expect("email outbox lock poisoned").clone()
    }

    /// The most recent message, if any.
    pub fn last_sent(&self) -> Option<SentEmail> {
        self.outbox
            .lock()
            .expect("email outbox lock poisoned")
            .last()
            .cloned()
    }

    fn record(&self, to: &str, subject: &str, body: String) -> Result<(), AppError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::MailDispatch("SMTP connection refused".to_string()));
        }
        self.outbox
            .lock()
            .expect("email outbox lock poisoned")
            .push(SentEmail {
                to: to.to_string(),
                subject: subject.to_string(),
                body,
            });
        Ok(())
    }
}

#[async_trait]
impl EmailProvider for MockEmailService {
    async fn send_confirm_email(
        &self,
        to_email: &str,
        confirm_link: &str,
    ) -> Result<(), AppError> {
        self.record(
            to_email,
            "Подтверждение регистрации на сайте skill-bridge.ru",
            confirm_link.to_string(),
        )
    }

    async fn send_password_reset_email(
        &self,
        to_email: &str,
        reset_link: &str,
    ) -> Result<(), AppError> {
        self.record(
            to_email,
            "Сброс пароля на сайте skill-bridge.ru",
            reset_link.to_string(),
        )
    }

    async fn send_two_factor_code(&self, to_email: &str, code: &str) -> Result<(), AppError> {
        self.record(to_email, "Код двухфакторной аутентификации", code.to_string())
    }
}
