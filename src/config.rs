use std::time::Duration;

use anyhow::{bail, Context};
use serde::Deserialize;

const DEFAULT_EXPIRES_IN: &str = "7d";
const MAX_EXPIRES_IN_SECS: u64 = 10 * 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expires_in: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let secret = std::env::var("JWT_SECRET").unwrap_or_default();
        if secret.trim().is_empty() {
            bail!("JWT_SECRET must be set to a non-empty value");
        }

        let expires_in =
            std::env::var("JWT_EXPIRES_IN").unwrap_or_else(|_| DEFAULT_EXPIRES_IN.into());
        let jwt = JwtConfig {
            secret,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "todo-api".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "todo-api-users".into()),
            expires_in: parse_expires_in(&expires_in)
                .with_context(|| format!("invalid JWT_EXPIRES_IN: {expires_in:?}"))?,
        };
        Ok(Self { database_url, jwt })
    }
}

/// Parses a token lifetime such as `7d`, `12h`, `30m`, `45s` or a bare
/// number of seconds.
pub fn parse_expires_in(raw: &str) -> anyhow::Result<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    if digits.is_empty() {
        bail!("expected a number followed by s, m, h or d");
    }
    let n: u64 = digits.parse()?;
    let unit_secs: u64 = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 60 * 60 * 24,
        other => bail!("unknown duration unit {other:?}"),
    };
    let secs = n
        .checked_mul(unit_secs)
        .filter(|s| *s <= MAX_EXPIRES_IN_SECS)
        .context("token lifetime must not exceed 3650d")?;
    if secs == 0 {
        bail!("token lifetime must be positive");
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_supported_units() {
        assert_eq!(parse_expires_in("7d").unwrap(), Duration::from_secs(7 * 86_400));
        assert_eq!(parse_expires_in("12h").unwrap(), Duration::from_secs(12 * 3_600));
        assert_eq!(parse_expires_in("30m").unwrap(), Duration::from_secs(1_800));
        assert_eq!(parse_expires_in("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_expires_in("3600").unwrap(), Duration::from_secs(3_600));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_expires_in("").is_err());
        assert!(parse_expires_in("d").is_err());
        assert!(parse_expires_in("7w").is_err());
        assert!(parse_expires_in("0s").is_err());
    }

    #[test]
    fn rejects_lifetimes_past_the_cap() {
        assert_eq!(parse_expires_in("3650d").unwrap(), Duration::from_secs(MAX_EXPIRES_IN_SECS));
        assert!(parse_expires_in("3651d").is_err());
        assert!(parse_expires_in("1000000000000").is_err());
        assert!(parse_expires_in("18446744073709551615d").is_err());
        assert!(parse_expires_in("99999999999999999999999").is_err());
    }
}
