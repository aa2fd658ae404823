//! Email service for verification links and order notifications.
//!
//! Uses SMTP via lettre for delivery with Askama HTML templates. Every
//! message goes out as multipart/alternative with a plain-text fallback.

use askama::Template;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use emberline_core::Email;

use crate::config::EmailConfig;
use crate::models::Order;

/// HTML template for the email-verification message.
#[derive(Template)]
#[template(path = "email/verification.html")]
struct VerificationEmailHtml<'a> {
    name: &'a str,
    verification_url: &'a str,
}

/// Plain text template for the email-verification message.
#[derive(Template)]
#[template(path = "email/verification.txt")]
struct VerificationEmailText<'a> {
    name: &'a str,
    verification_url: &'a str,
}

/// One row of the order-notification item table, pre-formatted for display.
struct OrderItemView {
    product_name: String,
    variant: String,
    quantity: u32,
    unit_price: String,
}

/// HTML template for the merchant order notification.
#[derive(Template)]
#[template(path = "email/order_notification.html")]
struct OrderEmailHtml<'a> {
    order_number: &'a str,
    customer_name: String,
    customer_email: &'a str,
    phone: &'a str,
    address: &'a str,
    city: &'a str,
    state: &'a str,
    postal_code: &'a str,
    items: Vec<OrderItemView>,
    total: String,
}

/// Plain text template for the merchant order notification.
#[derive(Template)]
#[template(path = "email/order_notification.txt")]
struct OrderEmailText<'a> {
    order_number: &'a str,
    customer_name: String,
    customer_email: &'a str,
    phone: &'a str,
    address: &'a str,
    city: &'a str,
    state: &'a str,
    postal_code: &'a str,
    items: Vec<OrderItemView>,
    total: String,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

/// Email service for sending transactional emails.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
    merchant_address: String,
    base_url: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay parameters are invalid.
    pub fn new(config: &EmailConfig, base_url: &str) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
            merchant_address: config.merchant_address.clone(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Send the account-verification email.
    ///
    /// # Errors
    ///
    /// Returns an error if the message fails to render, build, or send.
    pub async fn send_verification(
        &self,
        to: &Email,
        name: &str,
        token: &str,
    ) -> Result<(), EmailError> {
        let verification_url = format!("{}/verify-email?token={token}", self.base_url);
        let html = VerificationEmailHtml {
            name,
            verification_url: &verification_url,
        }
        .render()?;
        let text = VerificationEmailText {
            name,
            verification_url: &verification_url,
        }
        .render()?;

        self.send_multipart_email(to.as_str(), "Verify your email - Emberline", &text, &html)
            .await
    }

    /// Send the new-order notification to the merchant.
    ///
    /// # Errors
    ///
    /// Returns an error if the message fails to render, build, or send.
    pub async fn send_order_notification(&self, order: &Order) -> Result<(), EmailError> {
        let items: Vec<OrderItemView> = order
            .lines
            .iter()
            .map(|line| OrderItemView {
                product_name: line.product_name.clone(),
                variant: line.variant.clone().unwrap_or_else(|| "-".to_string()),
                quantity: line.quantity,
                unit_price: line.unit_price.to_string(),
            })
            .collect();

        let html = OrderEmailHtml {
            order_number: &order.order_number,
            customer_name: format!("{} {}", order.first_name, order.last_name),
            customer_email: &order.email,
            phone: &order.phone,
            address: &order.address,
            city: &order.city,
            state: &order.state,
            postal_code: order.postal_code.as_deref().unwrap_or("-"),
            items,
            total: order.total.to_string(),
        }
        .render()?;

        let items: Vec<OrderItemView> = order
            .lines
            .iter()
            .map(|line| OrderItemView {
                product_name: line.product_name.clone(),
                variant: line.variant.clone().unwrap_or_else(|| "-".to_string()),
                quantity: line.quantity,
                unit_price: line.unit_price.to_string(),
            })
            .collect();

        let text = OrderEmailText {
            order_number: &order.order_number,
            customer_name: format!("{} {}", order.first_name, order.last_name),
            customer_email: &order.email,
            phone: &order.phone,
            address: &order.address,
            city: &order.city,
            state: &order.state,
            postal_code: order.postal_code.as_deref().unwrap_or("-"),
            items,
            total: order.total.to_string(),
        }
        .render()?;

        let subject = format!("New order {} - Emberline", order.order_number);
        self.send_multipart_email(&self.merchant_address, &subject, &text, &html)
            .await
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
    ) -> Result<(), EmailError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| EmailError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| EmailError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent");
        Ok(())
    }
}

/// Generate a random email-verification token.
///
/// 48 alphanumeric characters, URL-safe as-is.
#[must_use]
pub fn generate_verification_token() -> String {
    use rand::Rng;
    use rand::distr::Alphanumeric;

    rand::rng()
        .sample_iter(Alphanumeric)
        .take(48)
        .map(char::from)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_verification_token_shape() {
        let token = generate_verification_token();
        assert_eq!(token.len(), 48);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_generated_tokens_differ() {
        assert_ne!(generate_verification_token(), generate_verification_token());
    }

    #[test]
    fn test_verification_template_renders_link() {
        let html = VerificationEmailHtml {
            name: "Mira",
            verification_url: "https://shop.test/verify-email?token=abc123",
        }
        .render()
        .unwrap();

        assert!(html.contains("Mira"));
        assert!(html.contains("https://shop.test/verify-email?token=abc123"));
    }

    #[test]
    fn test_order_template_lists_items() {
        let text = OrderEmailText {
            order_number: "EMB-00000042",
            customer_name: "Mira Shah".to_string(),
            customer_email: "mira@example.com",
            phone: "555-0199",
            address: "12 Kiln Lane",
            city: "Pune",
            state: "MH",
            postal_code: "411001",
            items: vec![OrderItemView {
                product_name: "Brass Diya".to_string(),
                variant: "Large".to_string(),
                quantity: 2,
                unit_price: "450".to_string(),
            }],
            total: "999".to_string(),
        }
        .render()
        .unwrap();

        assert!(text.contains("EMB-00000042"));
        assert!(text.contains("Brass Diya"));
        assert!(text.contains("x2"));
        assert!(text.contains("999"));
    }
}
