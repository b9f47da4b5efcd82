use chrono::NaiveDate;
use std::time::Duration;
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Storage, Window};

#[derive(Debug, Error)]
pub enum DomError {
    #[error("{0} unavailable")]
    Unavailable(&'static str),
    #[error("browser error: {0}")]
    Js(String),
}

impl From<JsValue> for DomError {
    fn from(value: JsValue) -> Self {
        Self::Js(js_error_message(&value))
    }
}

/// Retrieve the global `window` object.
///
/// # Panics
/// Panics if executed outside of a browser context where `window` is unavailable.
#[must_use]
pub fn window() -> Window {
    web_sys::window().expect("`window` should be available in web context")
}

/// Retrieve the document object for DOM interactions.
///
/// # Panics
/// Panics when the document cannot be accessed from the current browser window.
#[must_use]
pub fn document() -> Document {
    window()
        .document()
        .expect("`document` should exist in browser context")
}

/// Convert a JavaScript value into a readable string for error reporting.
#[must_use]
pub fn js_error_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            value
                .dyn_ref::<js_sys::Error>()
                .map(|err| err.message().into())
        })
        .unwrap_or_else(|| format!("{value:?}"))
}

/// Milliseconds since the Unix epoch.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// A seed for client-side randomness (cache tokens).
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn random_seed() -> u64 {
    let noise = (js_sys::Math::random() * 9_007_199_254_740_992.0) as u64;
    noise ^ now_ms().rotate_left(21)
}

/// Today's date in the browser's local time zone.
#[must_use]
pub fn today() -> Option<NaiveDate> {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        i32::try_from(now.get_full_year()).ok()?,
        now.get_month() + 1,
        now.get_date(),
    )
}

fn millis(duration: Duration) -> i32 {
    i32::try_from(duration.as_millis()).unwrap_or(i32::MAX)
}

/// A repeating browser timer, cleared when dropped.
pub struct Interval {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Interval {
    /// Call `callback` every `period`.
    ///
    /// # Errors
    /// Returns an error if the browser refuses to schedule the timer.
    pub fn new(period: Duration, callback: impl FnMut() + 'static) -> Result<Self, DomError> {
        let callback = Closure::<dyn FnMut()>::new(callback);
        let handle = window().set_interval_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            millis(period),
        )?;
        Ok(Self {
            handle,
            _callback: callback,
        })
    }
}

impl Drop for Interval {
    fn drop(&mut self) {
        if let Some(win) = web_sys::window() {
            win.clear_interval_with_handle(self.handle);
        }
    }
}

/// A one-shot browser timer, cancelled when dropped before it fires.
pub struct Timeout {
    handle: i32,
    _callback: Closure<dyn FnMut()>,
}

impl Timeout {
    /// Call `callback` once after `delay`.
    ///
    /// # Errors
    /// Returns an error if the browser refuses to schedule the timer.
    pub fn new(delay: Duration, callback: impl FnOnce() + 'static) -> Result<Self, DomError> {
        let callback = Closure::once(callback);
        let handle = window().set_timeout_with_callback_and_timeout_and_arguments_0(
            callback.as_ref().unchecked_ref(),
            millis(delay),
        )?;
        Ok(Self {
            handle,
            _callback: callback,
        })
    }
}

impl Drop for Timeout {
    fn drop(&mut self) {
        if let Some(win) = web_sys::window() {
            win.clear_timeout_with_handle(self.handle);
        }
    }
}

/// Access the browser `sessionStorage` handle.
///
/// # Errors
/// Returns an error if the browser window cannot be accessed or `sessionStorage` is unavailable.
pub fn session_storage() -> Result<Storage, DomError> {
    web_sys::window()
        .ok_or(DomError::Unavailable("window"))?
        .session_storage()?
        .ok_or(DomError::Unavailable("sessionStorage"))
}
