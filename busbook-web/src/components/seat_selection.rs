//! Seat selection, pickup/drop choice, fare and reservation for one bus and
//! date.
//!
//! The component owns a [`BookingState`] behind `Rc<RefCell<_>>`. Requests are
//! spawned on the browser event loop with a ticket from the state; responses
//! are handed back with that ticket, and superseded ones are dropped by the
//! state itself.
use crate::a11y::announce;
use crate::app::state::{AppContext, use_booking_context};
use crate::components::button::Button;
use crate::components::confirm_modal::ConfirmReservation;
use crate::components::fare_summary::FareSummary;
use crate::components::point_picker::PointPicker;
use crate::components::seat_map::SeatMapView;
use crate::dom::Interval;
use crate::router::Route;
use busbook_core::booking::{BookingState, PriceTicket, ReservationOutcome, SeatRefresh};
use busbook_core::config::DEFAULT_MAX_SEATS;
use busbook_core::model::{BookingKey, RouteInfo, RoutePoint};
use busbook_core::notify::{Notifier, messages};
use busbook_core::reservation::{CheckoutError, ReservationPhase};
use busbook_core::seats::Toggle;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_router::prelude::*;

const CHECKOUT_BUTTON_ID: &str = "checkout-btn";

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub booking: BookingKey,
    #[prop_or_default]
    pub route: Option<RouteInfo>,
}

#[derive(Clone)]
struct Session {
    state: Rc<RefCell<BookingState>>,
    ctx: AppContext,
    redraw: UseForceUpdateHandle,
}

impl Session {
    /// Point the state at `key` and start loading. The returned interval keeps
    /// seat statuses fresh until it is dropped.
    fn start(&self, key: &BookingKey, route: Option<RouteInfo>) -> Option<Interval> {
        {
            let mut state = self.state.borrow_mut();
            if state.key() != key {
                state.teardown();
                *state = BookingState::new(key.clone(), self.ctx.config.max_seats);
            } else if state.is_torn_down() {
                state.resume();
            }
            if let Some(route) = route {
                state.set_route(route);
            }
        }
        self.refresh_seats();
        self.load_route_points();
        let poll = self.clone();
        Interval::new(self.ctx.config.seat_refresh(), move || poll.refresh_seats())
            .map_err(|err| log::warn!("seat refresh timer not scheduled: {err}"))
            .ok()
    }

    fn stop(&self) {
        self.state.borrow_mut().teardown();
    }

    fn refresh_seats(&self) {
        let ticket = self.state.borrow_mut().begin_seat_refresh();
        let session = self.clone();
        spawn_local(async move {
            match session.ctx.client.seat_data(&ticket.key).await {
                Ok(data) => {
                    let refresh = session.state.borrow_mut().apply_seat_data(&ticket, data);
                    if let SeatRefresh::Applied { released } = refresh {
                        if !released.is_empty() {
                            session
                                .ctx
                                .notifier
                                .warning(&messages::seats_released(&released));
                        }
                        session.redraw.force_update();
                    }
                }
                Err(err) => {
                    let current = session.state.borrow().seat_ticket_current(&ticket);
                    if current {
                        log::warn!("seat data for {} failed: {err}", ticket.key);
                        session.ctx.notifier.error(messages::SEAT_LOAD_FAILED);
                    }
                }
            }
        });
    }

    fn load_route_points(&self) {
        let key = self.state.borrow().key().clone();
        let session = self.clone();
        spawn_local(async move {
            match session.ctx.client.route_points(&key).await {
                Ok(points) => {
                    if !session.points_still_wanted(&key) {
                        return;
                    }
                    let ticket = session.state.borrow_mut().apply_route_points(points);
                    if let Some(ticket) = ticket {
                        session.resolve_price(ticket);
                    }
                    session.redraw.force_update();
                }
                Err(err) => {
                    if session.points_still_wanted(&key) {
                        log::warn!("route points for {key} failed: {err}");
                        session.ctx.notifier.error(messages::ROUTE_POINTS_FAILED);
                    }
                }
            }
        });
    }

    fn points_still_wanted(&self, key: &BookingKey) -> bool {
        points_wanted(&self.state.borrow(), key)
    }

    fn resolve_price(&self, ticket: PriceTicket) {
        let session = self.clone();
        spawn_local(async move {
            let fare = session.ctx.client.resolve_custom_price(&ticket.query).await;
            let applied = session.state.borrow_mut().apply_custom_price(&ticket, fare);
            if applied {
                if fare.is_some() {
                    session.ctx.notifier.info(messages::CUSTOM_PRICE_APPLIED);
                }
                session.redraw.force_update();
            }
        });
    }

    fn toggle(&self, seat_id: &str) {
        let toggle = self.state.borrow_mut().toggle_seat(seat_id);
        match toggle {
            Toggle::Selected => announce(&format!("Seat {seat_id} selected")),
            Toggle::Deselected => announce(&format!("Seat {seat_id} deselected")),
            Toggle::Rejected(why) => {
                self.ctx
                    .notifier
                    .warning(&messages::seat_rejected(seat_id, why));
            }
        }
        self.redraw.force_update();
    }

    fn choose(&self, pickup: bool, point_id: Option<&str>) {
        let ticket = {
            let mut state = self.state.borrow_mut();
            if pickup {
                state.choose_pickup(point_id)
            } else {
                state.choose_drop(point_id)
            }
        };
        if let Some(ticket) = ticket {
            self.resolve_price(ticket);
        }
        self.redraw.force_update();
    }

    fn checkout(&self) {
        let result = self.state.borrow_mut().request_checkout();
        match result {
            Ok(()) => {}
            Err(CheckoutError::Invalid(err)) => {
                self.ctx.notifier.warning(&messages::invalid_checkout(&err));
            }
            Err(CheckoutError::Flow(err)) => log::debug!("{err}"),
        }
        self.redraw.force_update();
    }

    fn cancel(&self) {
        if let Err(err) = self.state.borrow_mut().cancel_checkout() {
            log::debug!("{err}");
        }
        self.redraw.force_update();
    }

    fn confirm(&self, navigator: Option<Navigator>) {
        let result = self.state.borrow_mut().confirm();
        let ticket = match result {
            Ok(ticket) => ticket,
            Err(CheckoutError::Invalid(err)) => {
                self.ctx.notifier.warning(&messages::invalid_checkout(&err));
                self.redraw.force_update();
                return;
            }
            Err(CheckoutError::Flow(err)) => {
                log::debug!("{err}");
                return;
            }
        };
        self.redraw.force_update();
        let session = self.clone();
        spawn_local(async move {
            let result = session.ctx.client.reserve_seats(&ticket.intent).await;
            let outcome = session.state.borrow_mut().finish_reservation(&ticket, result);
            if outcome == ReservationOutcome::Abandoned {
                log::debug!(
                    "reservation for {} answered after leaving",
                    ticket.intent.bus_id
                );
                return;
            }
            session.refresh_seats();
            match outcome {
                ReservationOutcome::Confirmed(snapshot) => {
                    log::info!(
                        "reserved {:?} for {} as {}",
                        snapshot.seat_ids,
                        ticket.intent.bus_id,
                        snapshot.reservation.reservation_id
                    );
                    session.ctx.notifier.success(messages::RESERVED);
                    session.ctx.begin_checkout(*snapshot);
                    if let Some(navigator) = navigator {
                        navigator.push(&Route::Checkout);
                    }
                }
                ReservationOutcome::Failed { message } => {
                    session.ctx.notifier.error(&message);
                }
                ReservationOutcome::Abandoned => {}
            }
            session.redraw.force_update();
        });
    }
}

/// Route points fetched for `key` still belong on screen.
fn points_wanted(state: &BookingState, key: &BookingKey) -> bool {
    state.key() == key && !state.is_torn_down()
}

fn point_label(points: &[RoutePoint], id: Option<&str>) -> Option<AttrValue> {
    let id = id?;
    points
        .iter()
        .find(|p| p.id == id)
        .map(|p| AttrValue::from(p.label()))
}

#[function_component(SeatSelection)]
pub fn seat_selection(props: &Props) -> Html {
    let ctx = use_booking_context();
    let max_seats = ctx
        .as_ref()
        .map_or(DEFAULT_MAX_SEATS, |c| c.config.max_seats);
    let state = use_mut_ref({
        let key = props.booking.clone();
        move || BookingState::new(key, max_seats)
    });
    let redraw = use_force_update();
    let navigator = use_navigator();
    let session = ctx.clone().map(|ctx| Session {
        state: state.clone(),
        ctx,
        redraw,
    });

    {
        let session = session.clone();
        let route = props.route.clone();
        use_effect_with(props.booking.clone(), move |key| {
            let poll = session.as_ref().and_then(|s| s.start(key, route));
            move || {
                drop(poll);
                if let Some(session) = session {
                    session.stop();
                }
            }
        });
    }
    {
        let session = session.clone();
        use_effect_with(props.route.clone(), move |route| {
            if let (Some(session), Some(route)) = (session, route.clone()) {
                session.state.borrow_mut().set_route(route);
                session.redraw.force_update();
            }
            || {}
        });
    }

    let Some(session) = session else {
        return html! { <p class="error">{"Booking services are unavailable."}</p> };
    };
    let currency = AttrValue::from(session.ctx.config.currency_symbol.clone());

    let on_toggle = {
        let session = session.clone();
        Callback::from(move |seat_id: String| session.toggle(&seat_id))
    };
    let on_pickup = {
        let session = session.clone();
        Callback::from(move |id: Option<String>| session.choose(true, id.as_deref()))
    };
    let on_drop = {
        let session = session.clone();
        Callback::from(move |id: Option<String>| session.choose(false, id.as_deref()))
    };
    let on_checkout = {
        let session = session.clone();
        Callback::from(move |_: MouseEvent| session.checkout())
    };
    let on_cancel = {
        let session = session.clone();
        Callback::from(move |()| session.cancel())
    };
    let on_confirm = {
        let session = session.clone();
        Callback::from(move |()| session.confirm(navigator.clone()))
    };

    let view = state.borrow();
    let phase = view.phase();
    let idle = phase == ReservationPhase::Idle;
    let dialog_open = matches!(
        phase,
        ReservationPhase::AwaitingConfirmation | ReservationPhase::Reserving
    );
    let seat_ids = view.selection().to_vec();

    html! {
        <section class="seat-selection" aria-labelledby="seat-selection-title">
            <h2 id="seat-selection-title">{"Choose your seats"}</h2>
            <SeatMapView
                seats={view.seats().clone()}
                selected={seat_ids.clone()}
                loaded={view.seats_loaded()}
                locked={!idle}
                {on_toggle}
            />
            <div class="seat-selection__points">
                <PointPicker
                    id="pickup-point"
                    label="Pickup point"
                    points={view.pickup_points().to_vec()}
                    selected={view.pickup().map(str::to_string)}
                    disabled={!idle}
                    on_change={on_pickup}
                />
                <PointPicker
                    id="drop-point"
                    label="Drop point"
                    points={view.drop_points().to_vec()}
                    selected={view.drop_point().map(str::to_string)}
                    disabled={!idle}
                    on_change={on_drop}
                />
            </div>
            <FareSummary
                seat_ids={seat_ids.clone()}
                unit_fare={view.unit_fare()}
                total={view.total_price()}
                currency={currency.clone()}
                custom_applied={view.custom_fare().is_some()}
            />
            <Button
                id={AttrValue::from(CHECKOUT_BUTTON_ID)}
                class="btn btn-primary"
                label="Proceed to checkout"
                disabled={!idle}
                onclick={on_checkout}
            />
            <ConfirmReservation
                open={dialog_open}
                busy={phase == ReservationPhase::Reserving}
                seat_ids={seat_ids}
                unit_fare={view.unit_fare()}
                total={view.total_price()}
                {currency}
                custom_applied={view.custom_fare().is_some()}
                pickup={point_label(view.pickup_points(), view.pickup())}
                drop={point_label(view.drop_points(), view.drop_point())}
                {on_confirm}
                {on_cancel}
                return_focus_id={AttrValue::from(CHECKOUT_BUTTON_ID)}
            />
        </section>
    }
}
