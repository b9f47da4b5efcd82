//! Client configuration shared by the web UI and the tester.
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "http://localhost:5000";
pub const DEFAULT_SEAT_REFRESH_SECS: u64 = 30;
pub const DEFAULT_IMAGE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MAX_SEATS: usize = 6;
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// How custom segment prices are looked up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceLookup {
    /// Only `GET /api/bus/custom-price`, read as `{ data: { price | customPrice } }`.
    Strict,
    /// The primary endpoint followed by the two legacy fare endpoints, accepting
    /// every known response shape.
    #[default]
    Fallback,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("api_base must be an http(s) URL, got {0:?}")]
    ApiBase(String),
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    pub api_base: String,
    pub seat_refresh_secs: u64,
    pub image_timeout_ms: u64,
    pub max_seats: usize,
    pub price_lookup: PriceLookup,
    pub currency_symbol: String,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            seat_refresh_secs: DEFAULT_SEAT_REFRESH_SECS,
            image_timeout_ms: DEFAULT_IMAGE_TIMEOUT_MS,
            max_seats: DEFAULT_MAX_SEATS,
            price_lookup: PriceLookup::default(),
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl BookingConfig {
    /// Parse and validate a JSON config; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validated()
    }

    /// Check ranges and normalise the API base (no trailing slash).
    ///
    /// # Errors
    ///
    /// Returns an error if the API base is not an http(s) URL or a timing/limit is zero.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        let base = self.api_base.trim().trim_end_matches('/').to_string();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::ApiBase(self.api_base));
        }
        self.api_base = base;
        if self.seat_refresh_secs == 0 {
            return Err(ConfigError::Zero {
                field: "seat_refresh_secs",
            });
        }
        if self.image_timeout_ms == 0 {
            return Err(ConfigError::Zero {
                field: "image_timeout_ms",
            });
        }
        if self.max_seats == 0 {
            return Err(ConfigError::Zero { field: "max_seats" });
        }
        Ok(self)
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    #[must_use]
    pub const fn seat_refresh(&self) -> Duration {
        Duration::from_secs(self.seat_refresh_secs)
    }

    #[must_use]
    pub const fn image_timeout(&self) -> Duration {
        Duration::from_millis(self.image_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_timings() {
        let cfg = BookingConfig::default();
        assert_eq!(cfg.seat_refresh(), Duration::from_secs(30));
        assert_eq!(cfg.image_timeout(), Duration::from_secs(5));
        assert_eq!(cfg.price_lookup, PriceLookup::Fallback);
    }

    #[test]
    fn from_json_fills_defaults_and_trims_base() {
        let cfg = BookingConfig::from_json(
            r#"{ "api_base": "https://api.example.test/ ", "price_lookup": "strict" }"#,
        )
        .unwrap();
        assert_eq!(cfg.api_base, "https://api.example.test");
        assert_eq!(cfg.price_lookup, PriceLookup::Strict);
        assert_eq!(cfg.max_seats, DEFAULT_MAX_SEATS);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            BookingConfig::from_json(r#"{ "api_base": "ftp://x" }"#),
            Err(ConfigError::ApiBase(_))
        ));
        assert!(matches!(
            BookingConfig::from_json(r#"{ "max_seats": 0 }"#),
            Err(ConfigError::Zero { field: "max_seats" })
        ));
        assert!(matches!(
            BookingConfig::from_json("{"),
            Err(ConfigError::Json(_))
        ));
    }
}
