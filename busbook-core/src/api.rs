//! Typed access to the booking backend over an injected HTTP transport.
use crate::config::PriceLookup;
use crate::fare::Fare;
use crate::model::{
    BookingKey, ReservationHold, ReservationIntent, RouteInfo, RoutePoints, SeatData,
};
use crate::price::{PriceEndpoint, PriceQuery, extract_price};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub const SEAT_DATA_PATH: &str = "/api/bus/seat-data";
pub const ROUTE_POINTS_PATH: &str = "/api/bus/route-points";
pub const RESERVE_SEATS_PATH: &str = "/api/bus/reserve-seats";
pub const IMAGE_PROXY_PATH: &str = "/api/bus/image-proxy";

#[must_use]
pub fn bus_path(bus_id: &str) -> String {
    format!("/api/bus/{bus_id}")
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("{0}")]
    Rejected(String),
    #[error("response missing {0}")]
    MissingData(&'static str),
}

impl ApiError {
    /// Message suitable for a toast: the backend's own words when it sent any,
    /// otherwise `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected(message) | Self::Status { message, .. }
                if !message.trim().is_empty() =>
            {
                message.clone()
            }
            _ => fallback.to_string(),
        }
    }
}

/// GET/POST JSON against the backend base URL.
///
/// Implementations resolve `path` against their configured base and encode
/// `query`. Non-2xx responses map to [`ApiError::Status`], carrying the body's
/// `message` field when there is one.
#[async_trait(?Send)]
pub trait HttpTransport {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError>;

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError>;
}

#[async_trait(?Send)]
impl<T: HttpTransport + ?Sized> HttpTransport for std::rc::Rc<T> {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<Value, ApiError> {
        (**self).get(path, query).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ApiError> {
        (**self).post(path, body).await
    }
}

/// Unwrap the `{ success, data, message }` envelope most endpoints use.
///
/// `success: false` becomes [`ApiError::Rejected`]. A body without an envelope
/// is decoded as `T` directly.
///
/// # Errors
///
/// Returns an error when the backend rejected the request, the envelope has no
/// `data`, or the payload does not decode as `T`.
pub fn unwrap_envelope<T: DeserializeOwned>(
    body: Value,
    what: &'static str,
) -> Result<T, ApiError> {
    let Value::Object(mut map) = body else {
        return Ok(serde_json::from_value(body)?);
    };
    let enveloped = map.contains_key("success") || map.contains_key("data");
    if !enveloped {
        return Ok(serde_json::from_value(Value::Object(map))?);
    }
    if map.get("success").and_then(Value::as_bool) == Some(false) {
        let message = map
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(ApiError::Rejected(message));
    }
    match map.remove("data") {
        Some(Value::Null) | None => Err(ApiError::MissingData(what)),
        Some(data) => Ok(serde_json::from_value(data)?),
    }
}

/// The backend endpoints the booking UI uses.
#[derive(Debug, Clone)]
pub struct BookingClient<T> {
    transport: T,
    price_lookup: PriceLookup,
}

impl<T: HttpTransport> BookingClient<T> {
    pub const fn new(transport: T, price_lookup: PriceLookup) -> Self {
        Self {
            transport,
            price_lookup,
        }
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub const fn price_lookup(&self) -> PriceLookup {
        self.price_lookup
    }

    /// `GET /api/bus/:busId`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or an undecodable body.
    pub async fn bus_details(&self, bus_id: &str) -> Result<RouteInfo, ApiError> {
        let body = self.transport.get(&bus_path(bus_id), &[]).await?;
        unwrap_envelope(body, "bus")
    }

    /// `GET /api/bus/seat-data?busId&date`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, rejection or an undecodable body.
    pub async fn seat_data(&self, key: &BookingKey) -> Result<SeatData, ApiError> {
        let query = [("busId", key.bus_id.clone()), ("date", key.date_param())];
        let body = self.transport.get(SEAT_DATA_PATH, &query).await?;
        unwrap_envelope(body, "seat data")
    }

    /// `GET /api/bus/route-points?busId&date`, sorted by time.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, rejection or an undecodable body.
    pub async fn route_points(&self, key: &BookingKey) -> Result<RoutePoints, ApiError> {
        let query = [("busId", key.bus_id.clone()), ("date", key.date_param())];
        let body = self.transport.get(ROUTE_POINTS_PATH, &query).await?;
        let mut points: RoutePoints = unwrap_envelope(body, "route points")?;
        points.sort();
        Ok(points)
    }

    /// Walk the configured endpoint chain until one yields a usable price.
    ///
    /// Transport errors on one endpoint move on to the next; `None` means no
    /// endpoint knows a custom price for this pair.
    pub async fn resolve_custom_price(&self, query: &PriceQuery) -> Option<Fare> {
        for endpoint in PriceEndpoint::chain(self.price_lookup) {
            let params = endpoint.query(query);
            match self.transport.get(endpoint.path(), &params).await {
                Ok(body) => {
                    if let Some(fare) = extract_price(&body, self.price_lookup) {
                        log::debug!(
                            "custom price {fare} for {}→{} from {}",
                            query.pickup_id,
                            query.drop_id,
                            endpoint.path()
                        );
                        return Some(fare);
                    }
                    log::debug!("no usable price in {} response", endpoint.path());
                }
                Err(err) => log::debug!("price lookup via {} failed: {err}", endpoint.path()),
            }
        }
        None
    }

    /// `POST /api/bus/reserve-seats`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Rejected`] with the backend's message when it answers
    /// `success: false`, or any transport/decode error.
    pub async fn reserve_seats(
        &self,
        intent: &ReservationIntent,
    ) -> Result<ReservationHold, ApiError> {
        let body = serde_json::to_value(intent)?;
        let response = self.transport.post(RESERVE_SEATS_PATH, &body).await?;
        unwrap_envelope(response, "reservation")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn envelope_unwraps_data() {
        let points: RoutePoints = unwrap_envelope(
            json!({"success": true, "data": {"pickupPoints": [{"id": "p1", "name": "Central", "time": "21:00"}], "dropPoints": []}}),
            "route points",
        )
        .unwrap();
        assert_eq!(points.pickup_points.len(), 1);
    }

    #[test]
    fn envelope_reports_rejection_message() {
        let err = unwrap_envelope::<ReservationHold>(
            json!({"success": false, "message": "Seat A1 is already reserved"}),
            "reservation",
        )
        .unwrap_err();
        assert_eq!(err.user_message("fallback"), "Seat A1 is already reserved");

        let err = unwrap_envelope::<ReservationHold>(json!({"success": false}), "reservation")
            .unwrap_err();
        assert_eq!(err.user_message("fallback"), "fallback");
    }

    #[test]
    fn envelope_without_data_is_missing() {
        let err = unwrap_envelope::<SeatData>(json!({"success": true}), "seat data").unwrap_err();
        assert!(matches!(err, ApiError::MissingData("seat data")));
    }

    #[test]
    fn bare_bodies_decode_directly() {
        let info: RouteInfo = unwrap_envelope(json!({"from": "Pune", "to": "Goa"}), "bus").unwrap();
        assert_eq!(info.to, "Goa");
    }

    #[test]
    fn enveloped_bus_with_null_fields_still_decodes() {
        let info: RouteInfo = unwrap_envelope(
            json!({
                "success": true,
                "data": {"from": "Pune", "to": "Goa", "busNumber": null, "images": null}
            }),
            "bus",
        )
        .unwrap();
        assert_eq!(info.title(), "Pune → Goa");
        assert!(info.bus_number.is_empty());
        assert!(info.images.is_empty());
    }

    #[test]
    fn transport_errors_use_fallback_message() {
        let err = ApiError::Transport("connection refused".into());
        assert_eq!(err.user_message("Try again"), "Try again");
        let err = ApiError::Status {
            status: 409,
            message: "Hold expired".into(),
        };
        assert_eq!(err.user_message("Try again"), "Hold expired");
    }
}
