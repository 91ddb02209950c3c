//! # 메일 발송
//!
//! 가입 인증 메일의 내용을 만들고 `Mailer` 트레이트로 발송합니다.
//! - `SmtpMailer`: lettre로 SMTP 서버에 보냄
//! - `LogMailer`: 실제로 보내지 않고 tracing 로그로 남김 (SMTP 설정이 없을 때)

use async_trait::async_trait;
use lettre::{
    message::Mailbox, transport::smtp::authentication::Credentials, AsyncSmtpTransport,
    AsyncTransport, Message, Tokio1Executor,
};
use reqwest::Url;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailContent {
    pub from: String,
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, content: MailContent) -> Result<(), AppError>;
}

/// 메일 대신 로그를 남기는 발송기
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, content: MailContent) -> Result<(), AppError> {
        tracing::info!(
            from = %content.from,
            to = %content.recipient,
            subject = %content.subject,
            "outgoing mail\n{}",
            content.body
        );
        Ok(())
    }
}

/// SMTP 발송기
///
/// 평문 SMTP로 접속합니다. 사용자 이름과 비밀번호가 모두 있을 때만 인증합니다.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    pub fn new(hostname: &str, port: u16, username: &str, password: &str) -> Self {
        let mut builder =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(hostname).port(port);
        if !username.is_empty() && !password.is_empty() {
            builder = builder.credentials(Credentials::new(
                username.to_string(),
                password.to_string(),
            ));
        }
        Self {
            transport: builder.build(),
        }
    }
}

fn mailbox(address: &str) -> Result<Mailbox, AppError> {
    address
        .parse()
        .map_err(|e| AppError::Internal(format!("Invalid mail address {:?}: {}", address, e)))
}

/// `MailContent`를 SMTP로 보낼 메시지로 바꿉니다.
pub fn build_message(content: &MailContent) -> Result<Message, AppError> {
    Message::builder()
        .from(mailbox(&content.from)?)
        .to(mailbox(&content.recipient)?)
        .subject(content.subject.clone())
        .body(content.body.clone())
        .map_err(|e| AppError::Internal(format!("Failed to build mail: {}", e)))
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, content: MailContent) -> Result<(), AppError> {
        let message = build_message(&content)?;
        self.transport.send(message).await.map_err(|e| {
            tracing::error!(to = %content.recipient, error = %e, "smtp send failed");
            AppError::Internal(format!("Failed to send mail: {}", e))
        })?;

        tracing::info!(to = %content.recipient, subject = %content.subject, "mail sent");
        Ok(())
    }
}

/// `{front_url}/verify?token=...&email=...` 링크가 담긴 인증 메일
pub fn verify_mail_content(
    front_url: &str,
    from: &str,
    recipient: &str,
    token: &str,
) -> Result<MailContent, AppError> {
    let base = format!("{}/verify", front_url.trim_end_matches('/'));
    let link = Url::parse_with_params(&base, &[("token", token), ("email", recipient)])
        .map_err(|e| AppError::Internal(format!("Invalid FRONT_URL: {}", e)))?;

    Ok(MailContent {
        from: from.to_string(),
        recipient: recipient.to_string(),
        subject: "Verify your email address".to_string(),
        body: format!(
            "Please click the following link to verify your email address: {}",
            link
        ),
    })
}
