use std::net::IpAddr;

use chrono::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub log_level: String,
    pub mail_from: String,
    pub product_name: String,
    pub reset_token_ttl: Duration,
    pub smtp: Option<SmtpConfig>,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        let database_url = env_required("DATABASE_URL")?;

        let host: IpAddr = env_or("ROLEPLAY_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid ROLEPLAY_HOST: {e}"))?;

        let port: u16 = env_or("ROLEPLAY_PORT", "3333")
            .parse()
            .map_err(|e| format!("Invalid ROLEPLAY_PORT: {e}"))?;

        let log_level = env_or("ROLEPLAY_LOG_LEVEL", "info");
        let mail_from = env_or("ROLEPLAY_MAIL_FROM", "no-reply@roleplay.com");
        let product_name = env_or("ROLEPLAY_PRODUCT_NAME", "Roleplay");

        let reset_token_ttl =
            parse_reset_token_ttl(&env_or("ROLEPLAY_RESET_TOKEN_TTL_HOURS", "2"))?;

        let smtp = match (
            std::env::var("ROLEPLAY_SMTP_HOST").ok(),
            std::env::var("ROLEPLAY_SMTP_PORT").ok(),
            std::env::var("ROLEPLAY_SMTP_USER").ok(),
            std::env::var("ROLEPLAY_SMTP_PASS").ok(),
        ) {
            (Some(host), Some(port), Some(user), Some(pass)) => Some(SmtpConfig {
                host,
                port: port
                    .parse()
                    .map_err(|e| format!("Invalid ROLEPLAY_SMTP_PORT: {e}"))?,
                user,
                pass,
            }),
            _ => None,
        };

        Ok(Config {
            database_url,
            host,
            port,
            log_level,
            mail_from,
            product_name,
            reset_token_ttl,
            smtp,
        })
    }
}

/// Parse the redemption window, given in whole hours. Must be positive and
/// small enough to be represented as a `Duration`.
pub fn parse_reset_token_ttl(raw: &str) -> Result<Duration, String> {
    let hours: i64 = raw
        .trim()
        .parse()
        .map_err(|e| format!("Invalid ROLEPLAY_RESET_TOKEN_TTL_HOURS: {e}"))?;
    if hours <= 0 {
        return Err("Invalid ROLEPLAY_RESET_TOKEN_TTL_HOURS: must be positive".to_string());
    }
    Duration::try_hours(hours)
        .ok_or_else(|| "Invalid ROLEPLAY_RESET_TOKEN_TTL_HOURS: out of range".to_string())
}

fn env_required(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing required environment variable: {key}"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
