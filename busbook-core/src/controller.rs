//! Sequential driver that runs the seat-selection flow end to end.
//!
//! Used by headless front ends (the QA tester) and integration tests. The web
//! UI drives [`BookingState`] directly so that requests can overlap.
use crate::api::{BookingClient, HttpTransport};
use crate::booking::{BookingState, PriceTicket, ReservationOutcome, SeatRefresh};
use crate::config::BookingConfig;
use crate::model::{BookingKey, CheckoutSnapshot};
use crate::notify::{Notifier, messages};
use crate::reservation::CheckoutError;
use crate::seats::Toggle;

pub struct BookingController<T, N> {
    client: BookingClient<T>,
    notifier: N,
    state: BookingState,
}

impl<T: HttpTransport, N: Notifier> BookingController<T, N> {
    pub fn new(transport: T, notifier: N, key: BookingKey, config: &BookingConfig) -> Self {
        Self {
            client: BookingClient::new(transport, config.price_lookup),
            notifier,
            state: BookingState::new(key, config.max_seats),
        }
    }

    pub const fn state(&self) -> &BookingState {
        &self.state
    }

    pub const fn client(&self) -> &BookingClient<T> {
        &self.client
    }

    /// Fetch bus metadata. Returns `false` (and notifies) on failure.
    pub async fn load_route(&mut self) -> bool {
        match self.client.bus_details(&self.state.key().bus_id).await {
            Ok(route) => {
                self.state.set_route(route);
                true
            }
            Err(err) => {
                log::warn!("bus details for {} failed: {err}", self.state.key());
                self.notifier.error(messages::BUS_LOAD_FAILED);
                false
            }
        }
    }

    /// Refresh seat statuses. On failure the previous seat map stays.
    pub async fn load_seats(&mut self) -> bool {
        let ticket = self.state.begin_seat_refresh();
        match self.client.seat_data(&ticket.key).await {
            Ok(data) => {
                if let SeatRefresh::Applied { released } = self.state.apply_seat_data(&ticket, data)
                    && !released.is_empty()
                {
                    self.notifier.warning(&messages::seats_released(&released));
                }
                true
            }
            Err(err) => {
                log::warn!("seat data for {} failed: {err}", ticket.key);
                self.notifier.error(messages::SEAT_LOAD_FAILED);
                false
            }
        }
    }

    pub async fn load_route_points(&mut self) -> bool {
        match self.client.route_points(self.state.key()).await {
            Ok(points) => {
                if let Some(ticket) = self.state.apply_route_points(points) {
                    self.resolve_price(ticket).await;
                }
                true
            }
            Err(err) => {
                log::warn!("route points for {} failed: {err}", self.state.key());
                self.notifier.error(messages::ROUTE_POINTS_FAILED);
                false
            }
        }
    }

    pub fn select_seat(&mut self, seat_id: &str) -> Toggle {
        let toggle = self.state.toggle_seat(seat_id);
        if let Toggle::Rejected(why) = toggle {
            self.notifier.warning(&messages::seat_rejected(seat_id, why));
        }
        toggle
    }

    pub async fn choose_pickup(&mut self, point_id: Option<&str>) {
        if let Some(ticket) = self.state.choose_pickup(point_id) {
            self.resolve_price(ticket).await;
        }
    }

    pub async fn choose_drop(&mut self, point_id: Option<&str>) {
        if let Some(ticket) = self.state.choose_drop(point_id) {
            self.resolve_price(ticket).await;
        }
    }

    async fn resolve_price(&mut self, ticket: PriceTicket) {
        let fare = self.client.resolve_custom_price(&ticket.query).await;
        if self.state.apply_custom_price(&ticket, fare) && fare.is_some() {
            self.notifier.info(messages::CUSTOM_PRICE_APPLIED);
        }
    }

    /// Checkout clicked. Validation problems are reported and nothing is sent.
    pub fn request_checkout(&mut self) -> bool {
        match self.state.request_checkout() {
            Ok(()) => true,
            Err(CheckoutError::Invalid(err)) => {
                self.notifier.warning(&messages::invalid_checkout(&err));
                false
            }
            Err(CheckoutError::Flow(err)) => {
                log::debug!("{err}");
                false
            }
        }
    }

    pub fn cancel_checkout(&mut self) -> bool {
        self.state.cancel_checkout().is_ok()
    }

    /// Confirm the reservation. Seat data is refreshed afterwards whatever the
    /// outcome; on success the priced snapshot for checkout is returned.
    pub async fn confirm_reservation(&mut self) -> Option<CheckoutSnapshot> {
        let ticket = match self.state.confirm() {
            Ok(ticket) => ticket,
            Err(CheckoutError::Invalid(err)) => {
                self.notifier.warning(&messages::invalid_checkout(&err));
                return None;
            }
            Err(CheckoutError::Flow(err)) => {
                log::debug!("{err}");
                return None;
            }
        };
        let result = self.client.reserve_seats(&ticket.intent).await;
        let outcome = self.state.finish_reservation(&ticket, result);
        if outcome == ReservationOutcome::Abandoned {
            return None;
        }
        self.load_seats().await;
        match outcome {
            ReservationOutcome::Confirmed(snapshot) => {
                log::info!(
                    "reserved {:?} on {} as {}",
                    snapshot.seat_ids,
                    self.state.key(),
                    snapshot.reservation.reservation_id
                );
                self.notifier.success(messages::RESERVED);
                Some(*snapshot)
            }
            ReservationOutcome::Failed { message } => {
                self.notifier.error(&message);
                None
            }
            ReservationOutcome::Abandoned => None,
        }
    }

    /// Leave the page.
    pub fn teardown(&mut self) {
        self.state.teardown();
    }
}
