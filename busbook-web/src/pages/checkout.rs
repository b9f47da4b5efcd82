use crate::app::state::use_booking_context;
use crate::router::Route;
use busbook_core::config::DEFAULT_CURRENCY_SYMBOL;
use busbook_core::model::CheckoutSnapshot;
use std::rc::Rc;
use yew::prelude::*;
use yew_router::prelude::*;

#[derive(Properties, Clone)]
pub struct SummaryProps {
    pub snapshot: Rc<CheckoutSnapshot>,
    pub currency: AttrValue,
    pub on_back: Callback<Route>,
}

impl PartialEq for SummaryProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.snapshot, &other.snapshot)
            && self.currency == other.currency
            && self.on_back == other.on_back
    }
}

/// Everything the payment step needs from a held reservation.
#[function_component(CheckoutSummary)]
pub fn checkout_summary(props: &SummaryProps) -> Html {
    let s = &props.snapshot;
    let back = {
        let route = Route::Bus {
            bus_id: s.bus_id.clone(),
            date: s.date.clone(),
        };
        let cb = props.on_back.clone();
        Callback::from(move |_: MouseEvent| cb.emit(route.clone()))
    };
    html! {
        <section class="panel checkout" aria-labelledby="checkout-title">
            <h1 id="checkout-title">{"Checkout"}</h1>
            <p class="checkout__hold">
                {"Reservation "}
                <strong data-reservation={s.reservation.reservation_id.clone()}>
                    { s.reservation.reservation_id.clone() }
                </strong>
                if !s.reservation.expiration_time.is_empty() {
                    { format!(" is held until {}.", s.reservation.expiration_time) }
                }
            </p>
            <dl class="checkout__details">
                <dt>{"Route"}</dt>
                <dd>{ s.route.title() }</dd>
                <dt>{"Travel date"}</dt>
                <dd>{ s.date.clone() }</dd>
                <dt>{"Seats"}</dt>
                <dd>{ s.seat_ids.join(", ") }</dd>
                <dt>{"Pickup"}</dt>
                <dd>{ s.pickup.label() }</dd>
                <dt>{"Drop"}</dt>
                <dd>{ s.drop.label() }</dd>
                <dt>{"Fare per seat"}</dt>
                <dd>
                    { s.unit_fare.display_with(&props.currency) }
                    if s.custom_fare_applied {
                        <span class="badge">{"special fare"}</span>
                    }
                </dd>
                <dt>{"Total"}</dt>
                <dd class="checkout__total">{ s.total.display_with(&props.currency) }</dd>
            </dl>
            <button type="button" class="btn btn-link" onclick={back}>{"Back to seat selection"}</button>
        </section>
    }
}

#[function_component(CheckoutPage)]
pub fn checkout_page() -> Html {
    let ctx = use_booking_context();
    let navigator = use_navigator();
    let on_back = Callback::from(move |route: Route| {
        if let Some(navigator) = navigator.as_ref() {
            navigator.push(&route);
        }
    });
    let snapshot = ctx.as_ref().and_then(|ctx| (*ctx.checkout).clone());
    let currency = ctx.as_ref().map_or_else(
        || AttrValue::from(DEFAULT_CURRENCY_SYMBOL),
        |ctx| AttrValue::from(ctx.config.currency_symbol.clone()),
    );

    match snapshot {
        Some(snapshot) => html! { <CheckoutSummary {snapshot} {currency} {on_back} /> },
        None => {
            let find_bus = Callback::from(move |_: MouseEvent| on_back.emit(Route::Home));
            html! {
                <section class="panel checkout checkout--empty">
                    <h1>{"Checkout"}</h1>
                    <p>{"There is no reservation to check out. Pick your seats first."}</p>
                    <button type="button" class="btn" onclick={find_bus}>{"Find a bus"}</button>
                </section>
            }
        }
    }
}
