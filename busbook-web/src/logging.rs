//! `log` backend that writes to the browser console.
//!
//! The level comes from `BUSBOOK_LOG` at build time (`error`..`trace`,
//! default `info`).
use log::{Level, LevelFilter, Log, Metadata, Record};
use wasm_bindgen::JsValue;

struct ConsoleLogger;

static LOGGER: ConsoleLogger = ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from(format_record(record));
        match record.level() {
            Level::Error => web_sys::console::error_1(&line),
            Level::Warn => web_sys::console::warn_1(&line),
            Level::Info => web_sys::console::info_1(&line),
            Level::Debug | Level::Trace => web_sys::console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

fn format_record(record: &Record<'_>) -> String {
    format!(
        "[{} {}] {}",
        record.level(),
        record.target(),
        record.args()
    )
}

/// Parse a level name; unknown or missing names fall back to `info`.
#[must_use]
pub fn level_from(raw: Option<&str>) -> LevelFilter {
    raw.and_then(|s| s.trim().parse().ok())
        .unwrap_or(LevelFilter::Info)
}

/// Install the console logger. Safe to call more than once.
pub fn init() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level_from(option_env!("BUSBOOK_LOG")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_names_parse_case_insensitively() {
        assert_eq!(level_from(Some("DEBUG")), LevelFilter::Debug);
        assert_eq!(level_from(Some(" warn ")), LevelFilter::Warn);
        assert_eq!(level_from(Some("off")), LevelFilter::Off);
    }

    #[test]
    fn unknown_levels_default_to_info() {
        assert_eq!(level_from(None), LevelFilter::Info);
        assert_eq!(level_from(Some("loud")), LevelFilter::Info);
    }

    #[test]
    fn records_carry_level_and_target() {
        let line = format_record(
            &Record::builder()
                .args(format_args!("seat map ready"))
                .level(Level::Warn)
                .target("busbook_web::pages")
                .build(),
        );
        assert_eq!(line, "[WARN busbook_web::pages] seat map ready");
    }
}
