use crate::components::fare_summary::FareSummary;
use crate::components::modal::Modal;
use busbook_core::fare::Fare;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub open: bool,
    pub seat_ids: Vec<String>,
    pub unit_fare: Fare,
    pub total: Fare,
    pub currency: AttrValue,
    #[prop_or_default]
    pub custom_applied: bool,
    #[prop_or_default]
    pub pickup: Option<AttrValue>,
    #[prop_or_default]
    pub drop: Option<AttrValue>,
    /// The reservation request is in flight.
    #[prop_or_default]
    pub busy: bool,
    pub on_confirm: Callback<()>,
    pub on_cancel: Callback<()>,
    #[prop_or_default]
    pub return_focus_id: Option<AttrValue>,
}

#[function_component(ConfirmReservation)]
pub fn confirm_reservation(props: &Props) -> Html {
    let confirm = {
        let cb = props.on_confirm.clone();
        Callback::from(move |_: MouseEvent| cb.emit(()))
    };
    let cancel = {
        let cb = props.on_cancel.clone();
        Callback::from(move |_: MouseEvent| cb.emit(()))
    };
    let point = |label: &str, value: Option<&AttrValue>| {
        value.map_or_else(Html::default, |v| {
            html! { <p class="confirm__point"><strong>{ label }</strong>{" "}{ v.clone() }</p> }
        })
    };

    html! {
        <Modal
            open={props.open}
            title={AttrValue::from("Confirm your booking")}
            description={Some(AttrValue::from("Your seats will be held while you complete checkout."))}
            on_close={props.on_cancel.clone()}
            return_focus_id={props.return_focus_id.clone()}
            dismiss_locked={props.busy}
        >
            <FareSummary
                seat_ids={props.seat_ids.clone()}
                unit_fare={props.unit_fare}
                total={props.total}
                currency={props.currency.clone()}
                custom_applied={props.custom_applied}
            />
            { point("Pickup:", props.pickup.as_ref()) }
            { point("Drop:", props.drop.as_ref()) }
            <div class="modal__actions">
                <button type="button" class="btn btn-ghost" onclick={cancel} disabled={props.busy}>
                    {"Cancel"}
                </button>
                <button
                    type="button"
                    id="confirm-reservation"
                    class="btn btn-primary"
                    onclick={confirm}
                    disabled={props.busy}
                    aria-busy={props.busy.then_some("true")}
                >
                    { if props.busy { "Reserving…" } else { "Confirm" } }
                </button>
            </div>
        </Modal>
    }
}
