use busbook_core::model::{BookingKey, format_travel_date};
use yew_router::prelude::*;

#[derive(Clone, Debug, Routable, PartialEq, Eq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/bus/:bus_id/:date")]
    Bus { bus_id: String, date: String },
    #[at("/checkout")]
    Checkout,
    #[at("/404")]
    #[not_found]
    NotFound,
}

impl Route {
    #[must_use]
    pub fn for_booking(key: &BookingKey) -> Self {
        Self::Bus {
            bus_id: key.bus_id.clone(),
            date: format_travel_date(key.date),
        }
    }

    /// The booking a detail route points at; `None` for other routes and for
    /// malformed ids or dates.
    #[must_use]
    pub fn booking_key(&self) -> Option<BookingKey> {
        match self {
            Self::Bus { bus_id, date } => BookingKey::parse(bus_id, date),
            Self::Home | Self::Checkout | Self::NotFound => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Route;
    use chrono::NaiveDate;
    use busbook_core::model::BookingKey;
    use yew_router::Routable;

    #[test]
    fn detail_route_round_trips_booking_key() {
        let key = BookingKey::new("b-12", NaiveDate::from_ymd_opt(2026, 1, 9).unwrap());
        let route = Route::for_booking(&key);
        assert_eq!(route.to_path(), "/bus/b-12/2026-01-09");
        assert_eq!(route.booking_key(), Some(key));
    }

    #[test]
    fn malformed_dates_have_no_booking() {
        let bad = Route::recognize("/bus/b-12/09-01-2026").unwrap();
        assert_eq!(bad.booking_key(), None);
        assert_eq!(Route::Checkout.booking_key(), None);
    }
}
