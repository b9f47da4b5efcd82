//! State behind the seat-selection screen.
//!
//! [`BookingState`] is synchronous: front ends start requests by taking a
//! ticket from it, perform the I/O themselves, and hand the response back with
//! the ticket. Responses for superseded tickets are dropped, so a slow seat
//! refresh or price lookup can never overwrite fresher state.
use crate::api::ApiError;
use crate::fare::{Fare, effective_fare, total_price};
use crate::gate::{RequestGate, Ticket};
use crate::model::{
    BookingKey, CheckoutSnapshot, ReservationHold, ReservationIntent, RouteInfo, RoutePoint,
    RoutePoints, SeatData,
};
use crate::notify::messages;
use crate::price::PriceQuery;
use crate::reservation::{
    CheckoutError, FlowError, ReservationFlow, ReservationPhase, ValidationError, validate_draft,
};
use crate::seats::{SeatMap, SeatRejection, SeatSelection, Toggle};

/// A price lookup to perform for the current pickup/drop pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceTicket {
    ticket: Ticket,
    pub query: PriceQuery,
}

/// A seat refresh to perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatTicket {
    ticket: Ticket,
    pub key: BookingKey,
}

/// A reservation POST in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReserveTicket {
    ticket: Ticket,
    key: BookingKey,
    pub intent: ReservationIntent,
}

/// Result of applying fresh seat data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatRefresh {
    /// The response belonged to a superseded request and was dropped.
    Stale,
    /// Applied; lists selected seats that are no longer available.
    Applied { released: Vec<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationOutcome {
    Confirmed(Box<CheckoutSnapshot>),
    Failed { message: String },
    /// The page was left or the request superseded before the response came
    /// back; nothing was applied.
    Abandoned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingState {
    key: BookingKey,
    route: Option<RouteInfo>,
    seats: SeatMap,
    seats_loaded: bool,
    selection: SeatSelection,
    pickup_points: Vec<RoutePoint>,
    drop_points: Vec<RoutePoint>,
    pickup: Option<String>,
    drop: Option<String>,
    base_fare: Fare,
    custom_fare: Option<Fare>,
    max_seats: usize,
    seat_gate: RequestGate,
    price_gate: RequestGate,
    reserve_gate: RequestGate,
    flow: ReservationFlow,
    torn_down: bool,
}

impl BookingState {
    #[must_use]
    pub fn new(key: BookingKey, max_seats: usize) -> Self {
        Self {
            key,
            route: None,
            seats: SeatMap::default(),
            seats_loaded: false,
            selection: SeatSelection::new(),
            pickup_points: Vec::new(),
            drop_points: Vec::new(),
            pickup: None,
            drop: None,
            base_fare: Fare::ZERO,
            custom_fare: None,
            max_seats,
            seat_gate: RequestGate::new(),
            price_gate: RequestGate::new(),
            reserve_gate: RequestGate::new(),
            flow: ReservationFlow::new(),
            torn_down: false,
        }
    }

    #[must_use]
    pub const fn key(&self) -> &BookingKey {
        &self.key
    }

    /// Set once the page has been left; no response should act on it then.
    #[must_use]
    pub const fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    #[must_use]
    pub const fn route(&self) -> Option<&RouteInfo> {
        self.route.as_ref()
    }

    #[must_use]
    pub const fn seats(&self) -> &SeatMap {
        &self.seats
    }

    #[must_use]
    pub const fn seats_loaded(&self) -> bool {
        self.seats_loaded
    }

    #[must_use]
    pub const fn selection(&self) -> &SeatSelection {
        &self.selection
    }

    #[must_use]
    pub fn pickup_points(&self) -> &[RoutePoint] {
        &self.pickup_points
    }

    #[must_use]
    pub fn drop_points(&self) -> &[RoutePoint] {
        &self.drop_points
    }

    #[must_use]
    pub fn pickup(&self) -> Option<&str> {
        self.pickup.as_deref()
    }

    #[must_use]
    pub fn drop_point(&self) -> Option<&str> {
        self.drop.as_deref()
    }

    #[must_use]
    pub const fn base_fare(&self) -> Fare {
        self.base_fare
    }

    #[must_use]
    pub const fn custom_fare(&self) -> Option<Fare> {
        self.custom_fare
    }

    #[must_use]
    pub const fn max_seats(&self) -> usize {
        self.max_seats
    }

    #[must_use]
    pub const fn phase(&self) -> ReservationPhase {
        self.flow.phase()
    }

    /// Per-seat fare currently in effect.
    #[must_use]
    pub fn unit_fare(&self) -> Fare {
        effective_fare(self.custom_fare, self.base_fare)
    }

    #[must_use]
    pub fn total_price(&self) -> Fare {
        total_price(self.selection.len(), self.custom_fare, self.base_fare)
    }

    /// Install bus metadata; its price becomes the base fare when positive.
    pub fn set_route(&mut self, route: RouteInfo) {
        if route.base_price.is_positive() {
            self.base_fare = route.base_price;
        }
        self.route = Some(route);
    }

    pub fn begin_seat_refresh(&mut self) -> SeatTicket {
        SeatTicket {
            ticket: self.seat_gate.issue(),
            key: self.key.clone(),
        }
    }

    /// Whether a seat response for `ticket` would still be applied.
    #[must_use]
    pub fn seat_ticket_current(&self, ticket: &SeatTicket) -> bool {
        self.seat_gate.is_current(ticket.ticket) && ticket.key == self.key
    }

    /// Apply a seat response and drop selected seats that became unavailable.
    pub fn apply_seat_data(&mut self, ticket: &SeatTicket, data: SeatData) -> SeatRefresh {
        if !self.seat_ticket_current(ticket) {
            log::debug!("dropping stale seat data for {}", ticket.key);
            return SeatRefresh::Stale;
        }
        if let Some(price) = data.schedule.as_ref().and_then(|s| s.price)
            && price.is_positive()
            && self.route.as_ref().is_none_or(|r| !r.base_price.is_positive())
        {
            self.base_fare = price;
        }
        if !self.base_fare.is_positive()
            && let Some(seat) = data.seats.iter().find(|s| s.price.is_positive())
        {
            self.base_fare = seat.price;
        }
        self.seats = SeatMap::new(data.seats);
        self.seats_loaded = true;
        let released = if self.flow.is_idle() || self.flow.confirmation_open() {
            self.selection.reconcile(&self.seats)
        } else {
            Vec::new()
        };
        if !released.is_empty() {
            log::warn!("released seats {released:?} for {}", self.key);
            if self.flow.confirmation_open() && self.selection.is_empty() {
                self.flow.reset();
            }
        }
        SeatRefresh::Applied { released }
    }

    /// Install route points. A previously chosen point that vanished is
    /// cleared; returns a price ticket when the pair changed as a result.
    pub fn apply_route_points(&mut self, points: RoutePoints) -> Option<PriceTicket> {
        self.pickup_points = points.pickup_points;
        self.drop_points = points.drop_points;
        let pickup_gone = self
            .pickup
            .as_deref()
            .is_some_and(|id| !self.pickup_points.iter().any(|p| p.id == id));
        let drop_gone = self
            .drop
            .as_deref()
            .is_some_and(|id| !self.drop_points.iter().any(|p| p.id == id));
        if pickup_gone {
            self.pickup = None;
        }
        if drop_gone {
            self.drop = None;
        }
        if pickup_gone || drop_gone {
            self.points_changed()
        } else {
            None
        }
    }

    pub fn toggle_seat(&mut self, seat_id: &str) -> Toggle {
        if !self.flow.is_idle() {
            return Toggle::Rejected(SeatRejection::Locked);
        }
        self.selection.toggle(seat_id, &self.seats, self.max_seats)
    }

    /// Choose (or clear, with `None` or an unknown id) the pickup point.
    pub fn choose_pickup(&mut self, point_id: Option<&str>) -> Option<PriceTicket> {
        let next = point_id
            .filter(|id| self.pickup_points.iter().any(|p| p.id == *id))
            .map(str::to_string);
        if next == self.pickup {
            return None;
        }
        self.pickup = next;
        self.points_changed()
    }

    /// Choose (or clear) the drop point.
    pub fn choose_drop(&mut self, point_id: Option<&str>) -> Option<PriceTicket> {
        let next = point_id
            .filter(|id| self.drop_points.iter().any(|p| p.id == *id))
            .map(str::to_string);
        if next == self.drop {
            return None;
        }
        self.drop = next;
        self.points_changed()
    }

    /// The pair changed: forget the old override and supersede any lookup in
    /// flight. A new lookup is needed only when both points are set.
    fn points_changed(&mut self) -> Option<PriceTicket> {
        self.custom_fare = None;
        match (&self.pickup, &self.drop) {
            (Some(pickup), Some(drop)) => Some(PriceTicket {
                ticket: self.price_gate.issue(),
                query: PriceQuery {
                    bus_id: self.key.bus_id.clone(),
                    pickup_id: pickup.clone(),
                    drop_id: drop.clone(),
                    date: self.key.date,
                },
            }),
            _ => {
                self.price_gate.invalidate();
                None
            }
        }
    }

    /// Apply a resolved custom price. Returns `false` when the lookup was
    /// superseded by a newer pickup/drop choice.
    pub fn apply_custom_price(&mut self, ticket: &PriceTicket, fare: Option<Fare>) -> bool {
        if !self.price_gate.is_current(ticket.ticket)
            || ticket.query.bus_id != self.key.bus_id
            || ticket.query.date != self.key.date
        {
            log::debug!(
                "dropping stale custom price for {}→{}",
                ticket.query.pickup_id,
                ticket.query.drop_id
            );
            return false;
        }
        self.custom_fare = fare;
        true
    }

    /// Checkout clicked: validate and open the confirmation step.
    ///
    /// # Errors
    ///
    /// Returns a validation error (no network call should follow) or a flow
    /// error if a reservation is already under way.
    pub fn request_checkout(&mut self) -> Result<(), CheckoutError> {
        validate_draft(self.selection.len(), self.pickup(), self.drop_point())?;
        self.flow.open_confirmation()?;
        Ok(())
    }

    /// Close the confirmation step without reserving.
    ///
    /// # Errors
    ///
    /// Fails unless the confirmation step is open.
    pub fn cancel_checkout(&mut self) -> Result<(), FlowError> {
        self.flow.cancel()
    }

    /// Confirmed: validate again and produce the intent to POST.
    ///
    /// # Errors
    ///
    /// Returns a validation or flow error; on validation failure the
    /// confirmation step is closed.
    pub fn confirm(&mut self) -> Result<ReserveTicket, CheckoutError> {
        if !self.flow.confirmation_open() {
            return Err(FlowError {
                action: "confirm",
                phase: self.flow.phase(),
            }
            .into());
        }
        if let Err(err) = validate_draft(self.selection.len(), self.pickup(), self.drop_point()) {
            self.flow.reset();
            return Err(err.into());
        }
        let (Some(pickup), Some(drop)) = (self.pickup.clone(), self.drop.clone()) else {
            self.flow.reset();
            return Err(ValidationError::MissingPickup.into());
        };
        self.flow.begin_reserving()?;
        Ok(ReserveTicket {
            ticket: self.reserve_gate.issue(),
            key: self.key.clone(),
            intent: ReservationIntent {
                bus_id: self.key.bus_id.clone(),
                date: self.key.date_param(),
                seat_ids: self.selection.to_vec(),
                pickup_point_id: pickup,
                drop_point_id: drop,
            },
        })
    }

    /// Record the reservation response. On success the selection is handed
    /// to the checkout snapshot and cleared. A response for a ticket that
    /// [`teardown`](Self::teardown) superseded is [`ReservationOutcome::Abandoned`].
    pub fn finish_reservation(
        &mut self,
        ticket: &ReserveTicket,
        result: Result<ReservationHold, ApiError>,
    ) -> ReservationOutcome {
        if !self.reserve_gate.is_current(ticket.ticket)
            || ticket.key != self.key
            || self.flow.phase() != ReservationPhase::Reserving
        {
            log::debug!("dropping reservation response for {}", ticket.key);
            return ReservationOutcome::Abandoned;
        }
        match result {
            Ok(hold) => match self.snapshot(hold) {
                Some(snapshot) => {
                    if let Err(err) = self.flow.finish(true) {
                        log::warn!("{err}");
                    }
                    self.selection.clear();
                    ReservationOutcome::Confirmed(Box::new(snapshot))
                }
                None => {
                    self.flow.reset();
                    ReservationOutcome::Failed {
                        message: messages::RESERVE_FAILED.to_string(),
                    }
                }
            },
            Err(err) => {
                log::warn!("reservation for {} failed: {err}", self.key);
                if let Err(flow_err) = self.flow.finish(false) {
                    log::warn!("{flow_err}");
                    self.flow.reset();
                }
                ReservationOutcome::Failed {
                    message: err.user_message(messages::RESERVE_FAILED),
                }
            }
        }
    }

    fn snapshot(&self, reservation: ReservationHold) -> Option<CheckoutSnapshot> {
        let pickup = find_point(&self.pickup_points, self.pickup.as_deref())?;
        let drop = find_point(&self.drop_points, self.drop.as_deref())?;
        Some(CheckoutSnapshot {
            bus_id: self.key.bus_id.clone(),
            date: self.key.date_param(),
            route: self.route.clone().unwrap_or_default(),
            seat_ids: self.selection.to_vec(),
            pickup,
            drop,
            unit_fare: self.unit_fare(),
            total: self.total_price(),
            custom_fare_applied: self.custom_fare.is_some(),
            reservation,
        })
    }

    /// Leaving the page: forget the selection and supersede every request.
    pub fn teardown(&mut self) {
        self.selection.clear();
        self.flow.reset();
        self.seat_gate.invalidate();
        self.price_gate.invalidate();
        self.reserve_gate.invalidate();
        self.torn_down = true;
    }

    /// Back on the page after [`teardown`](Self::teardown). Tickets issued
    /// before the teardown stay superseded.
    pub fn resume(&mut self) {
        self.torn_down = false;
    }
}

fn find_point(points: &[RoutePoint], id: Option<&str>) -> Option<RoutePoint> {
    let id = id?;
    points.iter().find(|p| p.id == id).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Schedule, Seat, SeatStatus};
    use chrono::NaiveDate;

    fn key() -> BookingKey {
        BookingKey::new("bus-7", NaiveDate::from_ymd_opt(2026, 11, 2).unwrap())
    }

    fn seat(id: &str, status: SeatStatus) -> Seat {
        Seat {
            id: id.into(),
            status,
            price: Fare::from_minor(50_000),
        }
    }

    fn point(id: &str, name: &str, time: &str) -> RoutePoint {
        RoutePoint {
            id: id.into(),
            name: name.into(),
            time: time.into(),
        }
    }

    fn hold(id: &str) -> ReservationHold {
        ReservationHold {
            reservation_id: id.into(),
            expiration_time: "2026-11-02T10:15:00Z".into(),
        }
    }

    fn loaded_state() -> BookingState {
        let mut state = BookingState::new(key(), 6);
        let ticket = state.begin_seat_refresh();
        state.apply_seat_data(
            &ticket,
            SeatData {
                seats: vec![
                    seat("A1", SeatStatus::Available),
                    seat("A2", SeatStatus::Booked),
                    seat("A3", SeatStatus::Available),
                ],
                schedule: None,
            },
        );
        state.apply_route_points(RoutePoints {
            pickup_points: vec![point("P1", "Central", "21:00"), point("P2", "Ring Road", "21:20")],
            drop_points: vec![point("D1", "Mapusa", "06:00"), point("D2", "Panjim", "06:30")],
        });
        state
    }

    #[test]
    fn total_uses_custom_price_when_present() {
        let mut state = loaded_state();
        state.toggle_seat("A1");
        state.toggle_seat("A3");
        assert_eq!(state.base_fare(), Fare::from_minor(50_000));
        assert_eq!(state.total_price(), Fare::from_minor(100_000));

        assert!(state.choose_pickup(Some("P1")).is_none());
        let ticket = state.choose_drop(Some("D1")).unwrap();
        assert!(state.apply_custom_price(&ticket, Some(Fare::from_minor(42_000))));
        assert_eq!(state.unit_fare(), Fare::from_minor(42_000));
        assert_eq!(state.total_price(), Fare::from_minor(84_000));
    }

    #[test]
    fn stale_price_is_discarded() {
        let mut state = loaded_state();
        state.choose_pickup(Some("P1"));
        let first = state.choose_drop(Some("D1")).unwrap();
        let second = state.choose_drop(Some("D2")).unwrap();

        assert!(state.apply_custom_price(&second, None));
        assert!(!state.apply_custom_price(&first, Some(Fare::from_minor(10_000))));
        assert_eq!(state.custom_fare(), None);
        assert_eq!(second.query.drop_id, "D2");
    }

    #[test]
    fn changing_points_clears_previous_override() {
        let mut state = loaded_state();
        state.choose_pickup(Some("P1"));
        let ticket = state.choose_drop(Some("D1")).unwrap();
        state.apply_custom_price(&ticket, Some(Fare::from_minor(30_000)));
        assert!(state.choose_pickup(Some("P2")).is_some());
        assert_eq!(state.custom_fare(), None);
        assert!(state.choose_pickup(None).is_none());
        assert_eq!(state.pickup(), None);
        assert!(state.choose_drop(Some("nowhere")).is_none());
        assert_eq!(state.drop_point(), None);
    }

    #[test]
    fn stale_seat_refresh_is_dropped() {
        let mut state = loaded_state();
        let older = state.begin_seat_refresh();
        let newer = state.begin_seat_refresh();
        let fresh = SeatData {
            seats: vec![seat("A1", SeatStatus::Booked)],
            schedule: None,
        };
        assert!(!state.seat_ticket_current(&older));
        assert!(state.seat_ticket_current(&newer));
        assert_eq!(state.apply_seat_data(&older, fresh.clone()), SeatRefresh::Stale);
        assert_eq!(state.seats().seats().len(), 3);
        assert_eq!(
            state.apply_seat_data(&newer, fresh),
            SeatRefresh::Applied { released: vec![] }
        );
        assert_eq!(state.seats().seats().len(), 1);
    }

    #[test]
    fn refresh_releases_seats_booked_elsewhere() {
        let mut state = loaded_state();
        state.toggle_seat("A1");
        state.toggle_seat("A3");
        let ticket = state.begin_seat_refresh();
        let refresh = state.apply_seat_data(
            &ticket,
            SeatData {
                seats: vec![seat("A1", SeatStatus::Available), seat("A3", SeatStatus::Booked)],
                schedule: None,
            },
        );
        assert_eq!(
            refresh,
            SeatRefresh::Applied {
                released: vec!["A3".to_string()]
            }
        );
        assert_eq!(state.selection().ids(), ["A1"]);
    }

    #[test]
    fn schedule_price_seeds_base_fare_without_route_price() {
        let mut state = BookingState::new(key(), 6);
        let ticket = state.begin_seat_refresh();
        state.apply_seat_data(
            &ticket,
            SeatData {
                seats: vec![seat("A1", SeatStatus::Available)],
                schedule: Some(Schedule {
                    price: Some(Fare::from_minor(61_000)),
                    ..Schedule::default()
                }),
            },
        );
        assert_eq!(state.base_fare(), Fare::from_minor(61_000));

        state.set_route(RouteInfo {
            base_price: Fare::from_minor(55_000),
            ..RouteInfo::default()
        });
        assert_eq!(state.base_fare(), Fare::from_minor(55_000));
    }

    #[test]
    fn checkout_requires_seats_and_points() {
        let mut state = loaded_state();
        assert_eq!(
            state.request_checkout(),
            Err(CheckoutError::Invalid(ValidationError::NoSeats))
        );
        state.toggle_seat("A1");
        assert_eq!(
            state.request_checkout(),
            Err(CheckoutError::Invalid(ValidationError::MissingPickup))
        );
        state.choose_pickup(Some("P1"));
        assert_eq!(
            state.request_checkout(),
            Err(CheckoutError::Invalid(ValidationError::MissingDrop))
        );
        state.choose_drop(Some("D1"));
        assert_eq!(state.request_checkout(), Ok(()));
        assert_eq!(state.phase(), ReservationPhase::AwaitingConfirmation);
        assert_eq!(state.toggle_seat("A3"), Toggle::Rejected(SeatRejection::Locked));
        state.cancel_checkout().unwrap();
        assert_eq!(state.phase(), ReservationPhase::Idle);
    }

    #[test]
    fn confirmed_reservation_builds_snapshot_and_clears_selection() {
        let mut state = loaded_state();
        state.toggle_seat("A1");
        state.choose_pickup(Some("P2"));
        state.choose_drop(Some("D2"));
        state.request_checkout().unwrap();
        let ticket = state.confirm().unwrap();
        assert_eq!(ticket.intent.seat_ids, ["A1"]);
        assert_eq!(ticket.intent.pickup_point_id, "P2");
        assert_eq!(state.phase(), ReservationPhase::Reserving);

        let outcome = state.finish_reservation(&ticket, Ok(hold("r-1")));
        let ReservationOutcome::Confirmed(snapshot) = outcome else {
            panic!("expected confirmation");
        };
        assert_eq!(snapshot.seat_ids, ["A1"]);
        assert_eq!(snapshot.pickup.name, "Ring Road");
        assert_eq!(snapshot.total, Fare::from_minor(50_000));
        assert_eq!(snapshot.reservation.reservation_id, "r-1");
        assert!(state.selection().is_empty());
        assert_eq!(state.phase(), ReservationPhase::NavigatedToCheckout);
    }

    #[test]
    fn rejected_reservation_returns_to_idle_with_backend_message() {
        let mut state = loaded_state();
        state.toggle_seat("A1");
        state.choose_pickup(Some("P1"));
        state.choose_drop(Some("D1"));
        state.request_checkout().unwrap();
        let ticket = state.confirm().unwrap();
        let outcome = state.finish_reservation(
            &ticket,
            Err(ApiError::Rejected("Seat A1 was just taken".into())),
        );
        assert_eq!(
            outcome,
            ReservationOutcome::Failed {
                message: "Seat A1 was just taken".into()
            }
        );
        assert_eq!(state.phase(), ReservationPhase::Idle);
        assert_eq!(state.selection().ids(), ["A1"]);
    }

    #[test]
    fn teardown_supersedes_in_flight_requests() {
        let mut state = loaded_state();
        state.toggle_seat("A1");
        state.choose_pickup(Some("P1"));
        let price = state.choose_drop(Some("D1")).unwrap();
        let seats = state.begin_seat_refresh();
        state.teardown();
        assert!(!state.apply_custom_price(&price, Some(Fare::from_minor(1))));
        assert_eq!(
            state.apply_seat_data(&seats, SeatData::default()),
            SeatRefresh::Stale
        );
        assert!(state.selection().is_empty());
        assert!(state.is_torn_down());
    }

    #[test]
    fn reservation_answered_after_leaving_is_abandoned() {
        let mut state = loaded_state();
        state.toggle_seat("A1");
        state.choose_pickup(Some("P1"));
        state.choose_drop(Some("D1"));
        state.request_checkout().unwrap();
        let ticket = state.confirm().unwrap();
        state.teardown();

        let outcome = state.finish_reservation(&ticket, Ok(hold("r-late")));
        assert_eq!(outcome, ReservationOutcome::Abandoned);
        assert_eq!(state.phase(), ReservationPhase::Idle);
        assert!(state.selection().is_empty());
    }

    #[test]
    fn reservation_for_another_booking_is_abandoned() {
        let mut state = loaded_state();
        state.toggle_seat("A1");
        state.choose_pickup(Some("P1"));
        state.choose_drop(Some("D1"));
        state.request_checkout().unwrap();
        let ticket = state.confirm().unwrap();

        let other = BookingKey::new("bus-9", NaiveDate::from_ymd_opt(2026, 11, 3).unwrap());
        let mut replaced = BookingState::new(other, 6);
        assert_eq!(
            replaced.finish_reservation(&ticket, Ok(hold("r-other"))),
            ReservationOutcome::Abandoned
        );
        assert_eq!(replaced.phase(), ReservationPhase::Idle);
    }

    #[test]
    fn resuming_keeps_earlier_tickets_superseded() {
        let mut state = loaded_state();
        state.toggle_seat("A1");
        state.choose_pickup(Some("P1"));
        state.choose_drop(Some("D1"));
        state.request_checkout().unwrap();
        let stale = state.confirm().unwrap();
        state.teardown();
        state.resume();
        assert!(!state.is_torn_down());

        state.toggle_seat("A1");
        state.request_checkout().unwrap();
        let fresh = state.confirm().unwrap();
        assert_eq!(
            state.finish_reservation(&stale, Ok(hold("r-stale"))),
            ReservationOutcome::Abandoned
        );
        assert_eq!(state.phase(), ReservationPhase::Reserving);
        let ReservationOutcome::Confirmed(snapshot) =
            state.finish_reservation(&fresh, Ok(hold("r-fresh")))
        else {
            panic!("expected confirmation");
        };
        assert_eq!(snapshot.reservation.reservation_id, "r-fresh");
    }
}
