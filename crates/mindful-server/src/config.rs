use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "your-secret-key",
];

pub struct ServerConfig {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    pub mail_webhook_url: Option<String>,
    pub mail_from: String,
    pub app_url: String,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let jwt_secret = var("MINDFUL_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("MINDFUL_JWT_SECRET is unset or still a placeholder; set it in your .env file");
        }

        let host = var("MINDFUL_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port: u16 = var("MINDFUL_PORT")
            .unwrap_or_else(|| "3001".into())
            .parse()
            .context("MINDFUL_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let token_ttl_hours: i64 = match var("MINDFUL_TOKEN_TTL_HOURS") {
            Some(v) => v.parse().context("MINDFUL_TOKEN_TTL_HOURS must be an integer")?,
            None => 1,
        };
        if token_ttl_hours <= 0 {
            bail!("MINDFUL_TOKEN_TTL_HOURS must be positive");
        }

        Ok(Self {
            addr,
            db_path: var("MINDFUL_DB_PATH")
                .unwrap_or_else(|| "mindful.db".into())
                .into(),
            jwt_secret,
            token_ttl: chrono::Duration::hours(token_ttl_hours),
            mail_webhook_url: var("MINDFUL_MAIL_WEBHOOK_URL").filter(|v| !v.is_empty()),
            mail_from: var("MINDFUL_MAIL_FROM")
                .unwrap_or_else(|| "Mindful Campus <welcome@mindfulcampus.com>".into()),
            app_url: var("MINDFUL_APP_URL").unwrap_or_else(|| "http://localhost:3000".into()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<ServerConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = load(&[("MINDFUL_JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.addr.port(), 3001);
        assert_eq!(config.db_path, PathBuf::from("mindful.db"));
        assert_eq!(config.token_ttl, chrono::Duration::hours(1));
        assert!(config.mail_webhook_url.is_none());
        assert_eq!(config.app_url, "http://localhost:3000");
    }

    #[test]
    fn missing_or_placeholder_secret_is_rejected() {
        assert!(load(&[]).is_err());
        assert!(load(&[("MINDFUL_JWT_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = load(&[
            ("MINDFUL_JWT_SECRET", "s3cret"),
            ("MINDFUL_HOST", "127.0.0.1"),
            ("MINDFUL_PORT", "8080"),
            ("MINDFUL_TOKEN_TTL_HOURS", "24"),
            ("MINDFUL_MAIL_WEBHOOK_URL", "https://relay.example/send"),
        ])
        .unwrap();
        assert_eq!(config.addr.to_string(), "127.0.0.1:8080");
        assert_eq!(config.token_ttl, chrono::Duration::hours(24));
        assert_eq!(config.mail_webhook_url.as_deref(), Some("https://relay.example/send"));
    }

    #[test]
    fn bad_numbers_are_errors() {
        assert!(load(&[("MINDFUL_JWT_SECRET", "s"), ("MINDFUL_PORT", "http")]).is_err());
        assert!(load(&[("MINDFUL_JWT_SECRET", "s"), ("MINDFUL_TOKEN_TTL_HOURS", "0")]).is_err());
    }
}
