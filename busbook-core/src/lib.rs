//! Busbook core
//!
//! Platform-agnostic logic behind the bus seat-selection and reservation UI:
//! seat maps, fare calculation, custom segment pricing, the reservation flow
//! and image fallbacks. Network access goes through [`HttpTransport`] and user
//! messages through [`Notifier`], so the same code runs in the browser and in
//! headless tests.

pub mod api;
pub mod booking;
pub mod config;
pub mod controller;
pub mod fare;
pub mod gate;
pub mod image;
pub mod model;
pub mod notify;
pub mod price;
pub mod reservation;
pub mod seats;

// Re-export commonly used types
pub use api::{ApiError, BookingClient, HttpTransport, unwrap_envelope};
pub use booking::{
    BookingState, PriceTicket, ReservationOutcome, ReserveTicket, SeatRefresh, SeatTicket,
};
pub use config::{BookingConfig, ConfigError, PriceLookup};
pub use controller::BookingController;
pub use fare::{Fare, effective_fare, total_price};
pub use gate::{RequestGate, Ticket};
pub use image::{ImageSlot, ImageSource, ImageStatus, ImageTransform, cache_token};
pub use model::{
    BookingKey, CheckoutSnapshot, ReservationHold, ReservationIntent, RouteInfo, RoutePoint,
    RoutePoints, Schedule, Seat, SeatData, SeatStatus, format_travel_date, parse_travel_date,
};
pub use notify::{Notice, NoticeLevel, NoticeLog, Notifier};
pub use price::{PriceEndpoint, PriceQuery, extract_price};
pub use reservation::{
    CheckoutError, FlowError, ReservationFlow, ReservationPhase, ValidationError, validate_draft,
};
pub use seats::{SEATS_PER_ROW, SeatMap, SeatRejection, SeatSelection, Toggle};
