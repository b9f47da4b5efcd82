use busbook_core::fare::Fare;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub seat_ids: Vec<String>,
    pub unit_fare: Fare,
    pub total: Fare,
    pub currency: AttrValue,
    #[prop_or_default]
    pub custom_applied: bool,
}

#[function_component(FareSummary)]
pub fn fare_summary(props: &Props) -> Html {
    let seats = if props.seat_ids.is_empty() {
        "None".to_string()
    } else {
        props.seat_ids.join(", ")
    };
    html! {
        <dl class="fare-summary" aria-live="polite">
            <dt>{"Selected seats"}</dt>
            <dd class="fare-summary__seats">{ seats }</dd>
            <dt>{"Fare per seat"}</dt>
            <dd class="fare-summary__unit">
                { props.unit_fare.display_with(&props.currency) }
                if props.custom_applied {
                    <span class="badge badge-info">{"Special fare"}</span>
                }
            </dd>
            <dt>{"Total"}</dt>
            <dd class="fare-summary__total">{ props.total.display_with(&props.currency) }</dd>
        </dl>
    }
}
