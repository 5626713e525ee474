use anyhow::{Context, Result, anyhow};
use std::time::Duration;

const DEFAULT_SALT_ROUNDS: u32 = 12;
const DEFAULT_JWT_EXPIRES_IN: &str = "7d";

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_headers: Vec<String>,
    pub allowed_methods: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["*".to_string()],
            allowed_headers: split_list("Content-Type,Authorization"),
            allowed_methods: split_list("GET,POST,PUT,DELETE,PATCH,OPTIONS"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RateLimitConfig {
    pub window: Duration,
    pub max_requests: u32,
    /// Key clients on the first `x-forwarded-for` hop instead of the peer
    /// address.
    pub trust_proxy: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            max_requests: 100,
            trust_proxy: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expires_in: Duration,
    pub run_migrations: bool,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    pub bcrypt_salt_rounds: u32,
    pub order_tx_timeout: Duration,
    pub app_env: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub cors: CorsConfig,
    pub rate_limit: RateLimitConfig,
}

impl Config {
    pub fn init() -> Result<Self> {
        let database_url =
            std::env::var("DATABASE_URL").context("Missing environment variable: DATABASE_URL")?;
        let jwt_secret =
            std::env::var("JWT_SECRET").context("Missing environment variable: JWT_SECRET")?;

        let run_migrations = match optional_var("RUN_MIGRATIONS").as_deref() {
            None | Some("false") => false,
            Some("true") => true,
            Some(other) => {
                return Err(anyhow!(
                    "RUN_MIGRATIONS must be 'true' or 'false', got '{}'",
                    other
                ));
            }
        };

        let host = optional_var("HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = optional_var("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .context("PORT must be a valid u16 integer")?;

        let db_max_connections = optional_var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .context("DB_MAX_CONNECTIONS must be a valid u32 integer")?;

        let jwt_expires_in_str =
            optional_var("JWT_EXPIRES_IN").unwrap_or_else(|| DEFAULT_JWT_EXPIRES_IN.to_string());
        let jwt_expires_in = parse_duration(&jwt_expires_in_str)
            .with_context(|| format!("JWT_EXPIRES_IN is not a valid duration: '{jwt_expires_in_str}'"))?;

        let bcrypt_salt_rounds = parse_salt_rounds(optional_var("BCRYPT_SALT_ROUNDS").as_deref());

        // zero would switch the server-side statement and lock timeouts off
        let order_tx_timeout_ms = parse_positive(
            "ORDER_TX_TIMEOUT_MS",
            optional_var("ORDER_TX_TIMEOUT_MS").as_deref().unwrap_or("5000"),
        )?;

        let window_secs = parse_positive(
            "RATE_LIMIT_WINDOW_S",
            optional_var("RATE_LIMIT_WINDOW_S").as_deref().unwrap_or("60"),
        )?;

        let max_requests = u32::try_from(parse_positive(
            "RATE_LIMIT_MAX",
            optional_var("RATE_LIMIT_MAX").as_deref().unwrap_or("100"),
        )?)
        .context("RATE_LIMIT_MAX must fit in a u32")?;

        let trust_proxy = optional_var("TRUST_PROXY")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(true);

        let defaults = CorsConfig::default();
        let cors = CorsConfig {
            allowed_origins: optional_var("ALLOWED_ORIGINS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.allowed_origins),
            allowed_headers: optional_var("ALLOWED_HEADERS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.allowed_headers),
            allowed_methods: optional_var("ALLOWED_METHODS")
                .map(|v| split_list(&v))
                .unwrap_or(defaults.allowed_methods),
        };

        let app_env = optional_var("APP_ENV").unwrap_or_else(|| "development".to_string());

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expires_in,
            run_migrations,
            host,
            port,
            db_max_connections,
            bcrypt_salt_rounds,
            order_tx_timeout: Duration::from_millis(order_tx_timeout_ms),
            app_env,
            admin_email: optional_var("ADMIN_EMAIL"),
            admin_password: optional_var("ADMIN_PASSWORD"),
            cors,
            rate_limit: RateLimitConfig {
                window: Duration::from_secs(window_secs),
                max_requests,
                trust_proxy,
            },
        })
    }
}

/// Unset and blank variables both count as absent.
fn optional_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parses `30s`, `15m`, `12h`, `7d` or a plain number of seconds.
pub fn parse_duration(value: &str) -> Result<Duration> {
    let value = value.trim();
    let (digits, multiplier) = match value.char_indices().last() {
        Some((idx, 's')) => (&value[..idx], 1),
        Some((idx, 'm')) => (&value[..idx], 60),
        Some((idx, 'h')) => (&value[..idx], 60 * 60),
        Some((idx, 'd')) => (&value[..idx], 60 * 60 * 24),
        Some(_) => (value, 1),
        None => return Err(anyhow!("empty duration")),
    };

    let amount = digits
        .parse::<u64>()
        .with_context(|| format!("invalid duration amount '{digits}'"))?;

    amount
        .checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(|| anyhow!("duration '{value}' is too large"))
}

/// Parses a strictly positive integer setting named `key`.
pub fn parse_positive(key: &str, value: &str) -> Result<u64> {
    let parsed = value
        .trim()
        .parse::<u64>()
        .with_context(|| format!("{key} must be a valid u64 integer, got '{value}'"))?;

    if parsed == 0 {
        return Err(anyhow!("{key} must be greater than zero"));
    }

    Ok(parsed)
}

/// bcrypt cost from config; anything missing, unparsable or outside 8..=15
/// falls back to 12.
pub fn parse_salt_rounds(value: Option<&str>) -> u32 {
    value
        .and_then(|v| v.trim().parse::<u32>().ok())
        .filter(|rounds| (8..=15).contains(rounds))
        .unwrap_or(DEFAULT_SALT_ROUNDS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_suffixed_and_plain_durations() {
        assert_eq!(parse_duration("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("15m").unwrap(), Duration::from_secs(900));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(604_800));
        assert_eq!(parse_duration("3600").unwrap(), Duration::from_secs(3600));
    }

    #[test]
    fn rejects_malformed_durations() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("d").is_err());
        assert!(parse_duration("7w").is_err());
        assert!(parse_duration("-5s").is_err());
    }

    #[test]
    fn salt_rounds_fall_back_outside_the_safe_range() {
        assert_eq!(parse_salt_rounds(None), 12);
        assert_eq!(parse_salt_rounds(Some("10")), 10);
        assert_eq!(parse_salt_rounds(Some("7")), 12);
        assert_eq!(parse_salt_rounds(Some("16")), 12);
        assert_eq!(parse_salt_rounds(Some("abc")), 12);
    }

    #[test]
    fn positive_settings_reject_zero() {
        assert_eq!(parse_positive("ORDER_TX_TIMEOUT_MS", "5000").unwrap(), 5000);
        assert_eq!(parse_positive("RATE_LIMIT_MAX", " 7 ").unwrap(), 7);

        let err = parse_positive("ORDER_TX_TIMEOUT_MS", "0").unwrap_err();
        assert!(err.to_string().contains("ORDER_TX_TIMEOUT_MS"));
        assert!(parse_positive("RATE_LIMIT_WINDOW_S", "-1").is_err());
        assert!(parse_positive("RATE_LIMIT_WINDOW_S", "soon").is_err());
    }

    #[test]
    fn splits_comma_separated_lists() {
        assert_eq!(
            split_list(" GET, POST ,,PUT "),
            vec!["GET".to_string(), "POST".to_string(), "PUT".to_string()]
        );
    }
}
