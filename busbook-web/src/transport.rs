//! [`HttpTransport`] over the browser `fetch` API.
use crate::dom;
use async_trait::async_trait;
use busbook_core::api::{ApiError, HttpTransport};
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response, UrlSearchParams};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTransport {
    base: String,
}

impl FetchTransport {
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> String {
        let mut url = format!("{}{path}", self.base);
        if !query.is_empty()
            && let Ok(params) = UrlSearchParams::new()
        {
            for (key, value) in query {
                params.append(key, value);
            }
            url.push('?');
            url.push_str(&String::from(params.to_string()));
        }
        url
    }

    #[allow(clippy::future_not_send)] // Wasm futures rely on `JsFuture`, which is not `Send`.
    async fn send(&self, request: Request) -> Result<Value, ApiError> {
        let url = request.url();
        let response = JsFuture::from(dom::window().fetch_with_request(&request))
            .await
            .map_err(transport_error)?;
        let response: Response = response.dyn_into().map_err(transport_error)?;
        let text = JsFuture::from(response.text().map_err(transport_error)?)
            .await
            .map_err(transport_error)?
            .as_string()
            .unwrap_or_default();
        log::debug!("{} {url}", response.status());
        read_body(response.status(), &response.status_text(), &text)
    }
}

fn transport_error(err: JsValue) -> ApiError {
    ApiError::Transport(dom::js_error_message(&err))
}

/// Turn a fetched body into JSON, mapping non-2xx statuses to
/// [`ApiError::Status`] with the backend's `message` when it sent one.
///
/// # Errors
/// Returns an error for non-2xx statuses or a 2xx body that is not JSON.
pub fn read_body(status: u16, status_text: &str, text: &str) -> Result<Value, ApiError> {
    let ok = (200..300).contains(&status);
    if text.trim().is_empty() {
        return if ok {
            Ok(Value::Null)
        } else {
            Err(ApiError::Status {
                status,
                message: status_text.to_string(),
            })
        };
    }
    if ok {
        return Ok(serde_json::from_str(text)?);
    }
    let message = serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or_else(|| status_text.to_string());
    Err(ApiError::Status { status, message })
}

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        let init = RequestInit::new();
        init.set_method("GET");
        let request =
            Request::new_with_str_and_init(&self.url(path, query), &init).map_err(transport_error)?;
        self.send(request).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        let headers = Headers::new().map_err(transport_error)?;
        headers
            .set("Content-Type", "application/json")
            .map_err(transport_error)?;
        let init = RequestInit::new();
        init.set_method("POST");
        init.set_headers(&headers);
        init.set_body(&JsValue::from_str(&body.to_string()));
        let request =
            Request::new_with_str_and_init(&self.url(path, &[]), &init).map_err(transport_error)?;
        self.send(request).await
    }
}
