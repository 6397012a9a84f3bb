use std::{env, time::Duration};

use anyhow::{Context, Result};
use chrono::Duration as ChronoDuration;

use crate::drafts::gemini::{DEFAULT_GEMINI_API_BASE, DEFAULT_GEMINI_MODEL};
use crate::drafts::DEFAULT_PLATFORM_NAME;
use crate::store::{StoreSettings, DEFAULT_NOTIFICATION_TTL_SECS};

pub const DEFAULT_IMPORT_COUNT: usize = 1050;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_host: String,
    pub server_port: u16,
    pub cors_allowed_origin: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
    pub platform_name: String,
    pub notification_ttl_secs: u32,
    pub bulk_dismiss_delay: Duration,
    pub import_count: usize,
    pub import_delay: Duration,
    pub media_kit_delay: Duration,
    pub default_sending_profile_id: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 3000,
            cors_allowed_origin: None,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
            platform_name: DEFAULT_PLATFORM_NAME.to_string(),
            notification_ttl_secs: DEFAULT_NOTIFICATION_TTL_SECS,
            bulk_dismiss_delay: Duration::from_millis(1500),
            import_count: DEFAULT_IMPORT_COUNT,
            import_delay: Duration::from_millis(2500),
            media_kit_delay: Duration::from_millis(1500),
            default_sending_profile_id: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let server_host = env::var("SERVER_HOST").unwrap_or(defaults.server_host);
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("SERVER_PORT must be a valid u16")?;
        let cors_allowed_origin = env::var("CORS_ALLOWED_ORIGIN").ok();
        let gemini_api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty());
        let gemini_model = env::var("GEMINI_MODEL").unwrap_or(defaults.gemini_model);
        let gemini_api_base = env::var("GEMINI_API_BASE").unwrap_or(defaults.gemini_api_base);
        let platform_name = env::var("PLATFORM_NAME").unwrap_or(defaults.platform_name);
        let notification_ttl_secs = env::var("NOTIFICATION_TTL_SECS")
            .unwrap_or_else(|_| DEFAULT_NOTIFICATION_TTL_SECS.to_string())
            .parse()
            .context("NOTIFICATION_TTL_SECS must be a non-negative number of seconds")?;
        let bulk_dismiss_delay = millis_var("BULK_DISMISS_DELAY_MS", defaults.bulk_dismiss_delay)?;
        let import_count = env::var("IMPORT_COUNT")
            .unwrap_or_else(|_| DEFAULT_IMPORT_COUNT.to_string())
            .parse()
            .context("IMPORT_COUNT must be a non-negative integer")?;
        let import_delay = millis_var("IMPORT_DELAY_MS", defaults.import_delay)?;
        let media_kit_delay = millis_var("MEDIA_KIT_DELAY_MS", defaults.media_kit_delay)?;
        let default_sending_profile_id = env::var("DEFAULT_SENDING_PROFILE_ID").ok();

        Ok(Self {
            server_host,
            server_port,
            cors_allowed_origin,
            gemini_api_key,
            gemini_model,
            gemini_api_base,
            platform_name,
            notification_ttl_secs,
            bulk_dismiss_delay,
            import_count,
            import_delay,
            media_kit_delay,
            default_sending_profile_id,
        })
    }

    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            notification_ttl: ChronoDuration::seconds(i64::from(self.notification_ttl_secs)),
            default_sending_profile_id: self.default_sending_profile_id.clone(),
        }
    }

    pub fn redacted_gemini_api_key(&self) -> String {
        match self.gemini_api_key.as_deref() {
            Some(key) => redact_secret(key),
            None => "<unset>".to_string(),
        }
    }
}

fn millis_var(name: &str, default: Duration) -> Result<Duration> {
    match env::var(name) {
        Ok(raw) => raw
            .parse::<u64>()
            .map(Duration::from_millis)
            .with_context(|| format!("{name} must be a number of milliseconds")),
        Err(_) => Ok(default),
    }
}

fn redact_secret(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("*****{tail}")
}

#[cfg(test)]
mod tests {
    use super::{redact_secret, AppConfig};
    use chrono::Duration as ChronoDuration;

    #[test]
    fn widest_notification_ttl_converts_to_seconds() {
        let config = AppConfig {
            notification_ttl_secs: u32::MAX,
            ..AppConfig::default()
        };
        assert_eq!(
            config.store_settings().notification_ttl,
            ChronoDuration::seconds(i64::from(u32::MAX))
        );
    }

    #[test]
    fn redacts_all_but_the_tail_of_long_keys() {
        let redacted = redact_secret("AIzaSyExampleKey1234");
        assert_eq!(redacted, "*****1234");
        assert!(!redacted.contains("AIza"));
    }

    #[test]
    fn hides_short_keys_entirely() {
        assert_eq!(redact_secret("abc"), "***");
        assert_eq!(redact_secret("12345678"), "***");
    }
}
