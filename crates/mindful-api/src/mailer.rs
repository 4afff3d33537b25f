//! Outbound transactional email.
//!
//! Delivery is attempt-once and fire-and-forget: callers spawn the send and
//! never observe its outcome beyond a log line.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub enum Transport {
    /// Record the message in the log only.
    Log,
    /// POST the message as JSON to an HTTP mail relay.
    Webhook { client: reqwest::Client, url: String },
}

#[derive(Debug, Clone)]
pub struct Mailer {
    from: String,
    app_url: String,
    transport: Transport,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// The freshly registered user a welcome mail is addressed to.
#[derive(Debug, Clone)]
pub struct Recipient {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub university: String,
}

impl Mailer {
    pub fn new(from: impl Into<String>, app_url: impl Into<String>, transport: Transport) -> Self {
        Self {
            from: from.into(),
            app_url: app_url.into(),
            transport,
        }
    }

    pub fn log_only(from: impl Into<String>, app_url: impl Into<String>) -> Self {
        Self::new(from, app_url, Transport::Log)
    }

    pub fn webhook(from: impl Into<String>, app_url: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(
            from,
            app_url,
            Transport::Webhook {
                client: reqwest::Client::new(),
                url: url.into(),
            },
        )
    }

    pub async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        match &self.transport {
            Transport::Log => {
                info!("Email to {} (not delivered, log transport): {}", mail.to, mail.subject);
            }
            Transport::Webhook { client, url } => {
                client
                    .post(url)
                    .json(mail)
                    .send()
                    .await
                    .context("mail relay unreachable")?
                    .error_for_status()
                    .context("mail relay rejected message")?;
                info!("Email sent to {}: {}", mail.to, mail.subject);
            }
        }
        Ok(())
    }

    pub fn welcome(&self, to: &Recipient) -> OutgoingMail {
        OutgoingMail {
            from: self.from.clone(),
            to: to.email.clone(),
            subject: "Welcome to Mindful Campus - Your Mental Health Journey Starts Here!".into(),
            html: welcome_html(to, &self.app_url),
        }
    }

    /// Spawn delivery of the welcome mail. Failures are logged and dropped.
    pub fn send_welcome_in_background(&self, to: Recipient) {
        let mailer = self.clone();
        tokio::spawn(async move {
            let mail = mailer.welcome(&to);
            if let Err(e) = mailer.send(&mail).await {
                warn!("Welcome email to {} failed: {:#}", mail.to, e);
            }
        });
    }
}

fn welcome_html(to: &Recipient, app_url: &str) -> String {
    let first = escape(&to.first_name);
    let last = escape(&to.last_name);
    let university = escape(&to.university);
    let email = escape(&to.email);
    let login = escape(&format!("{}/login", app_url.trim_end_matches('/')));

    format!(
        r#"<!DOCTYPE html>
<html>
<head><meta charset="utf-8"><title>Welcome to Mindful Campus</title></head>
<body style="font-family: sans-serif; line-height: 1.6; color: #333; max-width: 600px; margin: 0 auto;">
  <h1>Welcome, {first}!</h1>
  <p>Dear {first} {last},</p>
  <p>Welcome to <strong>Mindful Campus</strong>, your mental health companion at <strong>{university}</strong>.</p>
  <ul>
    <li><strong>Chat Support</strong>: talk things through any time you need someone to listen</li>
    <li><strong>Mood Tracking</strong>: check in daily and spot patterns</li>
    <li><strong>Resources</strong>: articles, exercises and coping strategies</li>
    <li><strong>Counselors</strong>: book time with licensed professionals</li>
    <li><strong>Achievements</strong>: earn points as you look after yourself</li>
  </ul>
  <p><a href="{login}">Start your journey</a></p>
  <div style="background: #fed7d7; border-radius: 10px; padding: 15px; text-align: center;">
    <strong>Need immediate help?</strong><br>
    National Suicide Prevention Lifeline: <strong>988</strong><br>
    Crisis Text Line: text <strong>HOME</strong> to <strong>741741</strong>
  </div>
  <p>With warm regards,<br>The Mindful Campus Team</p>
  <p style="color: #718096; font-size: 0.9em;">This email was sent to {email} because you registered for Mindful Campus.</p>
</body>
</html>"#
    )
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient() -> Recipient {
        Recipient {
            email: "ada@example.edu".into(),
            first_name: "Ada".into(),
            last_name: "<script>".into(),
            university: "State U".into(),
        }
    }

    #[test]
    fn welcome_mail_is_addressed_and_escaped() {
        let mailer = Mailer::log_only("welcome@mindfulcampus.com", "http://localhost:3000/");
        let mail = mailer.welcome(&recipient());

        assert_eq!(mail.to, "ada@example.edu");
        assert_eq!(mail.from, "welcome@mindfulcampus.com");
        assert!(mail.html.contains("Welcome, Ada!"));
        assert!(mail.html.contains("State U"));
        assert!(mail.html.contains("http://localhost:3000/login"));
        assert!(mail.html.contains("&lt;script&gt;"));
        assert!(!mail.html.contains("<script>"));
    }

    #[tokio::test]
    async fn log_transport_always_succeeds() {
        let mailer = Mailer::log_only("welcome@mindfulcampus.com", "http://localhost:3000");
        let mail = mailer.welcome(&recipient());
        assert!(mailer.send(&mail).await.is_ok());
    }

    #[tokio::test]
    async fn unreachable_relay_is_an_error() {
        // Port 9 (discard) on localhost is not expected to speak HTTP.
        let mailer = Mailer::webhook("a@b.c", "http://localhost:3000", "http://127.0.0.1:9/send");
        let mail = mailer.welcome(&recipient());
        assert!(mailer.send(&mail).await.is_err());
    }
}
