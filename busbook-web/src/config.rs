//! Build-time configuration for the browser bundle.
use busbook_core::config::{BookingConfig, ConfigError, DEFAULT_API_BASE};

/// Config baked in at compile time: `BUSBOOK_CONFIG` (a JSON document) when
/// set, otherwise defaults, with `BUSBOOK_API_BASE` overriding the backend URL.
///
/// # Errors
/// Returns an error if the baked-in values do not validate.
pub fn build_config() -> Result<BookingConfig, ConfigError> {
    config_from(option_env!("BUSBOOK_CONFIG"), option_env!("BUSBOOK_API_BASE"))
}

/// Same as [`build_config`], but never fails: invalid settings are logged and
/// the defaults are used instead.
#[must_use]
pub fn load_config() -> BookingConfig {
    build_config().unwrap_or_else(|err| {
        log::error!("invalid booking config, using defaults: {err}");
        BookingConfig::default()
    })
}

fn config_from(json: Option<&str>, api_base: Option<&str>) -> Result<BookingConfig, ConfigError> {
    let config = match json.map(str::trim).filter(|s| !s.is_empty()) {
        Some(json) => BookingConfig::from_json(json)?,
        None => BookingConfig::default(),
    };
    let api_base = api_base
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(if config.api_base.is_empty() {
            DEFAULT_API_BASE
        } else {
            config.api_base.as_str()
        })
        .to_string();
    config.with_api_base(api_base).validated()
}
