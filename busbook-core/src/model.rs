//! Backend data shapes as the booking UI reads them.
use crate::fare::Fare;
use chrono::{NaiveDate, NaiveTime};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Availability of a single seat. Anything the backend reports other than
/// `available` is treated as not selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatStatus {
    Available,
    Booked,
}

impl<'de> Deserialize<'de> for SeatStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().eq_ignore_ascii_case("available") {
            Ok(Self::Available)
        } else {
            Ok(Self::Booked)
        }
    }
}

fn id_from_string_or_number<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected a seat id string or number, got {other}"
        ))),
    }
}

/// Explicit `null` reads as the field's default, like a missing field does.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    #[serde(
        alias = "seatId",
        alias = "seatNumber",
        deserialize_with = "id_from_string_or_number"
    )]
    pub id: String,
    pub status: SeatStatus,
    #[serde(default)]
    pub price: Fare,
}

impl Seat {
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self.status, SeatStatus::Available)
    }
}

/// A pickup or drop point along the route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutePoint {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub time: String,
}

impl RoutePoint {
    /// Parsed `HH:MM` time, if the backend sent a readable one.
    #[must_use]
    pub fn departs_at(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(self.time.trim(), "%H:%M").ok()
    }

    /// `"Name (HH:MM)"`, or just the name when no time is known.
    #[must_use]
    pub fn label(&self) -> String {
        if self.time.trim().is_empty() {
            self.name.clone()
        } else {
            format!("{} ({})", self.name, self.time.trim())
        }
    }
}

/// Sort points by time of day; points with unreadable times keep their
/// relative order at the end.
pub fn sort_by_time(points: &mut [RoutePoint]) {
    points.sort_by_key(|p| match p.departs_at() {
        Some(t) => (0_u8, Some(t)),
        None => (1_u8, None),
    });
}

/// Read-only snapshot of a bus and its route.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteInfo {
    #[serde(
        alias = "source",
        alias = "origin",
        deserialize_with = "null_as_default"
    )]
    pub from: String,
    #[serde(alias = "destination", deserialize_with = "null_as_default")]
    pub to: String,
    #[serde(deserialize_with = "null_as_default")]
    pub departure_time: String,
    #[serde(deserialize_with = "null_as_default")]
    pub arrival_time: String,
    #[serde(alias = "price", alias = "fare")]
    pub base_price: Fare,
    #[serde(alias = "name", deserialize_with = "null_as_default")]
    pub bus_name: String,
    #[serde(
        alias = "number",
        alias = "registrationNumber",
        deserialize_with = "null_as_default"
    )]
    pub bus_number: String,
    #[serde(
        alias = "imageUrls",
        alias = "photos",
        deserialize_with = "null_as_default"
    )]
    pub images: Vec<String>,
}

impl RouteInfo {
    #[must_use]
    pub fn title(&self) -> String {
        match (self.from.is_empty(), self.to.is_empty()) {
            (false, false) => format!("{} → {}", self.from, self.to),
            (false, true) => self.from.clone(),
            (true, false) => self.to.clone(),
            (true, true) => self.bus_name.clone(),
        }
    }
}

/// Trip schedule that accompanies seat data.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schedule {
    #[serde(deserialize_with = "null_as_default")]
    pub departure_time: String,
    #[serde(deserialize_with = "null_as_default")]
    pub arrival_time: String,
    #[serde(alias = "fare")]
    pub price: Option<Fare>,
}

/// Payload of `GET /api/bus/seat-data`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeatData {
    #[serde(
        rename = "busSeatData",
        alias = "seats",
        default,
        deserialize_with = "null_as_default"
    )]
    pub seats: Vec<Seat>,
    #[serde(default)]
    pub schedule: Option<Schedule>,
}

/// Payload of `GET /api/bus/route-points`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutePoints {
    #[serde(deserialize_with = "null_as_default")]
    pub pickup_points: Vec<RoutePoint>,
    #[serde(deserialize_with = "null_as_default")]
    pub drop_points: Vec<RoutePoint>,
}

impl RoutePoints {
    pub fn sort(&mut self) {
        sort_by_time(&mut self.pickup_points);
        sort_by_time(&mut self.drop_points);
    }
}

/// Identifies the bus and travel date a booking page works against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BookingKey {
    pub bus_id: String,
    pub date: NaiveDate,
}

impl BookingKey {
    #[must_use]
    pub fn new(bus_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            bus_id: bus_id.into(),
            date,
        }
    }

    /// Parse a key from route parameters; `None` when the id is blank or the
    /// date is not `YYYY-MM-DD`.
    #[must_use]
    pub fn parse(bus_id: &str, date: &str) -> Option<Self> {
        let bus_id = bus_id.trim();
        if bus_id.is_empty() {
            return None;
        }
        let date = parse_travel_date(date)?;
        Some(Self::new(bus_id, date))
    }

    #[must_use]
    pub fn date_param(&self) -> String {
        format_travel_date(self.date)
    }
}

impl fmt::Display for BookingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.bus_id, self.date_param())
    }
}

#[must_use]
pub fn parse_travel_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[must_use]
pub fn format_travel_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Body of `POST /api/bus/reserve-seats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationIntent {
    pub bus_id: String,
    pub date: String,
    pub seat_ids: Vec<String>,
    pub pickup_point_id: String,
    pub drop_point_id: String,
}

/// A backend-side hold on the reserved seats. Both fields are opaque here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationHold {
    #[serde(alias = "id", alias = "_id")]
    pub reservation_id: String,
    #[serde(default, alias = "expiresAt", deserialize_with = "null_as_default")]
    pub expiration_time: String,
}

/// Everything the checkout view needs, priced at the moment of reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSnapshot {
    pub bus_id: String,
    pub date: String,
    pub route: RouteInfo,
    pub seat_ids: Vec<String>,
    pub pickup: RoutePoint,
    pub drop: RoutePoint,
    pub unit_fare: Fare,
    pub total: Fare,
    pub custom_fare_applied: bool,
    pub reservation: ReservationHold,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn seat_data_accepts_backend_shape() {
        let payload = json!({
            "busSeatData": [
                { "id": "A1", "status": "available", "price": 499 },
                { "seatNumber": 19, "status": "booked", "price": "499.50" },
                { "id": "A3", "status": "blocked" }
            ],
            "schedule": { "departureTime": "21:30", "arrivalTime": "06:10", "price": 520 },
            "bus": { "busName": "Night Rider" }
        });
        let data: SeatData = serde_json::from_value(payload).unwrap();
        assert_eq!(data.seats.len(), 3);
        assert_eq!(data.seats[1].id, "19");
        assert_eq!(data.seats[1].price, Fare::from_minor(49_950));
        assert!(data.seats[0].is_available());
        assert_eq!(data.seats[2].status, SeatStatus::Booked);
        assert_eq!(data.seats[2].price, Fare::ZERO);
        assert_eq!(
            data.schedule.and_then(|s| s.price),
            Some(Fare::from_minor(52_000))
        );
    }

    #[test]
    fn route_points_sort_by_time_with_unknowns_last() {
        let mut points = vec![
            RoutePoint {
                id: "p3".into(),
                name: "Depot".into(),
                time: "later".into(),
            },
            RoutePoint {
                id: "p2".into(),
                name: "Ring Road".into(),
                time: "21:45".into(),
            },
            RoutePoint {
                id: "p1".into(),
                name: "Central".into(),
                time: "21:05".into(),
            },
        ];
        sort_by_time(&mut points);
        let ids: Vec<&str> = points.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["p1", "p2", "p3"]);
        assert_eq!(points[0].label(), "Central (21:05)");
    }

    #[test]
    fn route_info_reads_aliases() {
        let info: RouteInfo = serde_json::from_value(json!({
            "source": "Pune",
            "destination": "Goa",
            "price": 899,
            "name": "Sleeper AC",
            "registrationNumber": "MH12 AB 1234",
            "departureTime": "20:00"
        }))
        .unwrap();
        assert_eq!(info.title(), "Pune → Goa");
        assert_eq!(info.base_price, Fare::from_minor(89_900));
        assert_eq!(info.bus_number, "MH12 AB 1234");
        assert!(info.images.is_empty());
    }

    #[test]
    fn route_info_tolerates_null_fields() {
        let info: RouteInfo = serde_json::from_value(json!({
            "from": "Pune",
            "to": "Goa",
            "busName": "Night Rider",
            "busNumber": null,
            "departureTime": null,
            "price": 750,
            "images": null
        }))
        .unwrap();
        assert_eq!(info.title(), "Pune → Goa");
        assert_eq!(info.bus_number, "");
        assert_eq!(info.departure_time, "");
        assert!(info.images.is_empty());
        assert_eq!(info.base_price, Fare::from_minor(75_000));
    }

    #[test]
    fn null_lists_and_names_read_as_empty() {
        let points: RoutePoints = serde_json::from_value(json!({
            "pickupPoints": [{ "id": "p1", "name": null, "time": null }],
            "dropPoints": null
        }))
        .unwrap();
        assert_eq!(points.pickup_points[0].name, "");
        assert_eq!(points.pickup_points[0].label(), "");
        assert!(points.drop_points.is_empty());

        let data: SeatData = serde_json::from_value(json!({
            "busSeatData": null,
            "schedule": { "departureTime": null, "price": 520 }
        }))
        .unwrap();
        assert!(data.seats.is_empty());
        assert_eq!(
            data.schedule.and_then(|s| s.price),
            Some(Fare::from_minor(52_000))
        );
    }

    #[test]
    fn booking_key_parses_route_params() {
        let key = BookingKey::parse(" 64f0c2 ", "2026-11-02").unwrap();
        assert_eq!(key.bus_id, "64f0c2");
        assert_eq!(key.date_param(), "2026-11-02");
        assert_eq!(key.to_string(), "64f0c2@2026-11-02");
        assert!(BookingKey::parse("", "2026-11-02").is_none());
        assert!(BookingKey::parse("64f0c2", "02/11/2026").is_none());
    }

    #[test]
    fn intent_serializes_camel_case() {
        let intent = ReservationIntent {
            bus_id: "b1".into(),
            date: "2026-11-02".into(),
            seat_ids: vec!["A1".into()],
            pickup_point_id: "p1".into(),
            drop_point_id: "d1".into(),
        };
        let value = serde_json::to_value(&intent).unwrap();
        assert_eq!(value["busId"], "b1");
        assert_eq!(value["seatIds"][0], "A1");
        assert_eq!(value["pickupPointId"], "p1");
        assert_eq!(value["dropPointId"], "d1");
    }
}
