//! Custom segment price endpoints and response parsing.
//!
//! The primary endpoint is `GET /api/bus/custom-price`. Older deployments only
//! expose `GET /api/route/price` or `GET /api/routes/custom-fare`, each with its
//! own parameter names and response layout, so in [`PriceLookup::Fallback`] mode
//! all three are tried in order.
use crate::config::PriceLookup;
use crate::fare::Fare;
use crate::model::format_travel_date;
use chrono::NaiveDate;
use serde_json::Value;

/// Keys that may carry the price inside an object.
const STRICT_KEYS: [&str; 2] = ["price", "customPrice"];
const FALLBACK_KEYS: [&str; 4] = ["price", "customPrice", "fare", "customFare"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceEndpoint {
    CustomPrice,
    RoutePrice,
    CustomFare,
}

impl PriceEndpoint {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::CustomPrice => "/api/bus/custom-price",
            Self::RoutePrice => "/api/route/price",
            Self::CustomFare => "/api/routes/custom-fare",
        }
    }

    /// Endpoints to try, in order, for a lookup mode.
    #[must_use]
    pub const fn chain(mode: PriceLookup) -> &'static [Self] {
        match mode {
            PriceLookup::Strict => &[Self::CustomPrice],
            PriceLookup::Fallback => &[Self::CustomPrice, Self::RoutePrice, Self::CustomFare],
        }
    }

    /// Query parameters in the naming each endpoint expects.
    #[must_use]
    pub fn query(self, q: &PriceQuery) -> Vec<(&'static str, String)> {
        match self {
            Self::CustomPrice => vec![
                ("busId", q.bus_id.clone()),
                ("pickupPointId", q.pickup_id.clone()),
                ("dropPointId", q.drop_id.clone()),
                ("date", format_travel_date(q.date)),
            ],
            Self::RoutePrice => vec![
                ("busId", q.bus_id.clone()),
                ("from", q.pickup_id.clone()),
                ("to", q.drop_id.clone()),
                ("date", format_travel_date(q.date)),
            ],
            Self::CustomFare => vec![
                ("busId", q.bus_id.clone()),
                ("pickup", q.pickup_id.clone()),
                ("drop", q.drop_id.clone()),
            ],
        }
    }
}

/// A custom price lookup for one pickup/drop pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuery {
    pub bus_id: String,
    pub pickup_id: String,
    pub drop_id: String,
    pub date: NaiveDate,
}

/// Pull a usable price out of a response body.
///
/// Accepted shapes, in the order they are checked:
/// 1. `{ "data": { "price": n } }`
/// 2. `{ "data": { "customPrice": n } }`
/// 3. `{ "price": n }` (also `customPrice`, `fare`, `customFare`)
/// 4. a bare number or numeric string
///
/// In [`PriceLookup::Strict`] mode only the first two are accepted. A body with
/// `"success": false` never yields a price, nor do zero, negative or non-finite
/// values.
#[must_use]
pub fn extract_price(body: &Value, mode: PriceLookup) -> Option<Fare> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        return None;
    }
    let keys: &[&str] = match mode {
        PriceLookup::Strict => &STRICT_KEYS,
        PriceLookup::Fallback => &FALLBACK_KEYS,
    };
    if let Some(data) = body.get("data")
        && let Some(fare) = price_in_object(data, keys)
    {
        return Some(fare);
    }
    if mode == PriceLookup::Strict {
        return None;
    }
    price_in_object(body, keys).or_else(|| scalar_price(body))
}

fn price_in_object(value: &Value, keys: &[&str]) -> Option<Fare> {
    let object = value.as_object()?;
    keys.iter()
        .filter_map(|key| object.get(*key))
        .find_map(scalar_price)
}

fn scalar_price(value: &Value) -> Option<Fare> {
    let major = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    Fare::from_major(major).filter(|fare| fare.is_positive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn query() -> PriceQuery {
        PriceQuery {
            bus_id: "bus-7".into(),
            pickup_id: "p1".into(),
            drop_id: "d1".into(),
            date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
        }
    }

    #[test]
    fn accepts_all_four_shapes_in_fallback_mode() {
        let mode = PriceLookup::Fallback;
        let expected = Some(Fare::from_minor(42_000));
        assert_eq!(extract_price(&json!({"success": true, "data": {"price": 420}}), mode), expected);
        assert_eq!(extract_price(&json!({"data": {"customPrice": "420"}}), mode), expected);
        assert_eq!(extract_price(&json!({"price": 420.0}), mode), expected);
        assert_eq!(extract_price(&json!({"customFare": 420}), mode), expected);
        assert_eq!(extract_price(&json!({"data": {"fare": 420}}), mode), expected);
        assert_eq!(extract_price(&json!(420), mode), expected);
        assert_eq!(extract_price(&json!("420"), mode), expected);
    }

    #[test]
    fn strict_mode_only_reads_documented_contract() {
        let mode = PriceLookup::Strict;
        assert_eq!(
            extract_price(&json!({"data": {"customPrice": 380}}), mode),
            Some(Fare::from_minor(38_000))
        );
        assert_eq!(extract_price(&json!({"price": 380}), mode), None);
        assert_eq!(extract_price(&json!(380), mode), None);
    }

    #[test]
    fn missing_or_unusable_values_yield_none() {
        let mode = PriceLookup::Fallback;
        assert_eq!(extract_price(&json!({"success": false, "price": 400}), mode), None);
        assert_eq!(extract_price(&json!({"data": {"price": null}}), mode), None);
        assert_eq!(extract_price(&json!({"data": null}), mode), None);
        assert_eq!(extract_price(&json!({"price": 0}), mode), None);
        assert_eq!(extract_price(&json!({"price": -5}), mode), None);
        assert_eq!(extract_price(&json!({"message": "no custom price"}), mode), None);
    }

    #[test]
    fn endpoints_use_their_own_parameter_names() {
        let q = query();
        let primary = PriceEndpoint::CustomPrice.query(&q);
        assert!(primary.contains(&("pickupPointId", "p1".to_string())));
        assert!(primary.contains(&("date", "2026-11-02".to_string())));
        let legacy = PriceEndpoint::RoutePrice.query(&q);
        assert!(legacy.contains(&("from", "p1".to_string())));
        let fare = PriceEndpoint::CustomFare.query(&q);
        assert!(fare.contains(&("drop", "d1".to_string())));
        assert_eq!(PriceEndpoint::chain(PriceLookup::Fallback).len(), 3);
        assert_eq!(PriceEndpoint::chain(PriceLookup::Strict), [PriceEndpoint::CustomPrice]);
    }
}
