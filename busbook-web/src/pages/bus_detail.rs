use crate::app::state::use_booking_context;
use crate::components::bus_image::BusGallery;
use crate::components::seat_selection::SeatSelection;
use busbook_core::gate::RequestGate;
use busbook_core::model::{BookingKey, RouteInfo};
use busbook_core::notify::{Notifier, messages};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub booking: BookingKey,
}

#[derive(Properties, PartialEq, Clone)]
pub struct HeaderProps {
    pub booking: BookingKey,
    #[prop_or_default]
    pub route: Option<RouteInfo>,
    #[prop_or_default]
    pub failed: bool,
}

/// Title block: route, times and the bus itself.
#[function_component(RouteHeader)]
pub fn route_header(props: &HeaderProps) -> Html {
    let date = props.booking.date.format("%a, %d %b %Y").to_string();
    match props.route.as_ref() {
        Some(route) => html! {
            <header class="route-header">
                <h1>{ route.title() }</h1>
                <p class="route-header__times">
                    <time>{ route.departure_time.clone() }</time>
                    {" – "}
                    <time>{ route.arrival_time.clone() }</time>
                    {" · "}
                    { date }
                </p>
                if !route.bus_name.is_empty() || !route.bus_number.is_empty() {
                    <p class="route-header__bus">
                        { route.bus_name.clone() }
                        if !route.bus_number.is_empty() {
                            <span class="route-header__number">{ format!(" ({})", route.bus_number) }</span>
                        }
                    </p>
                }
            </header>
        },
        None if props.failed => html! {
            <header class="route-header route-header--error">
                <h1>{ format!("Bus {}", props.booking.bus_id) }</h1>
                <p>{ messages::BUS_LOAD_FAILED }</p>
            </header>
        },
        None => html! {
            <header class="route-header" aria-busy="true">
                <h1>{ format!("Bus {}", props.booking.bus_id) }</h1>
                <p>{"Loading route details…"}</p>
            </header>
        },
    }
}

#[function_component(BusDetailPage)]
pub fn bus_detail_page(props: &Props) -> Html {
    let ctx = use_booking_context();
    let route = use_state(|| None::<RouteInfo>);
    let failed = use_state(|| false);
    let gate = use_mut_ref(RequestGate::new);

    {
        let ctx = ctx.clone();
        let route = route.clone();
        let failed = failed.clone();
        use_effect_with(props.booking.clone(), move |booking| {
            route.set(None);
            failed.set(false);
            let ticket = gate.borrow_mut().issue();
            if let Some(ctx) = ctx {
                let bus_id = booking.bus_id.clone();
                let gate = gate.clone();
                spawn_local(async move {
                    let result = ctx.client.bus_details(&bus_id).await;
                    if !gate.borrow().is_current(ticket) {
                        log::debug!("dropping stale bus details for {bus_id}");
                        return;
                    }
                    match result {
                        Ok(info) => route.set(Some(info)),
                        Err(err) => {
                            log::error!("bus details for {bus_id}: {err}");
                            failed.set(true);
                            ctx.notifier
                                .error(&err.user_message(messages::BUS_LOAD_FAILED));
                        }
                    }
                });
            }
            move || gate.borrow_mut().invalidate()
        });
    }

    let gallery = match (ctx.as_ref(), route.as_ref()) {
        (Some(ctx), Some(info)) => html! {
            <BusGallery
                urls={info.images.clone()}
                api_base={AttrValue::from(ctx.config.api_base.clone())}
                timeout_ms={ctx.config.image_timeout_ms}
                title={AttrValue::from(info.title())}
            />
        },
        _ => Html::default(),
    };

    html! {
        <section class="panel bus-detail">
            <RouteHeader booking={props.booking.clone()} route={(*route).clone()} failed={*failed} />
            { gallery }
            <SeatSelection booking={props.booking.clone()} route={(*route).clone()} />
        </section>
    }
}
