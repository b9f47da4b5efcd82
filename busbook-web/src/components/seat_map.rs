use busbook_core::model::Seat;
use busbook_core::seats::{SEATS_PER_ROW, SeatMap};
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub seats: SeatMap,
    pub selected: Vec<String>,
    #[prop_or_default]
    pub loaded: bool,
    /// Selection is frozen while a reservation is under way.
    #[prop_or_default]
    pub locked: bool,
    pub on_toggle: Callback<String>,
}

fn seat_label(seat: &Seat, selected: bool) -> String {
    let state = if selected {
        "selected"
    } else if seat.is_available() {
        "available"
    } else {
        "booked"
    };
    format!("Seat {}, {state}", seat.id)
}

#[function_component(SeatMapView)]
pub fn seat_map_view(props: &Props) -> Html {
    if !props.loaded {
        return html! { <p class="seat-map__status" role="status">{"Loading seats…"}</p> };
    }
    if props.seats.is_empty() {
        return html! { <p class="seat-map__status">{"No seats are listed for this trip."}</p> };
    }

    let seat_button = |seat: &Seat| {
        let selected = props.selected.iter().any(|id| *id == seat.id);
        let onclick = {
            let cb = props.on_toggle.clone();
            let id = seat.id.clone();
            Callback::from(move |_: MouseEvent| cb.emit(id.clone()))
        };
        let class = classes!(
            "seat",
            if selected {
                "seat--selected"
            } else if seat.is_available() {
                "seat--available"
            } else {
                "seat--booked"
            }
        );
        html! {
            <button
                type="button"
                {class}
                data-seat={seat.id.clone()}
                aria-pressed={if selected { "true" } else { "false" }}
                aria-label={seat_label(seat, selected)}
                disabled={!seat.is_available() || props.locked}
                {onclick}
            >
                { seat.id.clone() }
            </button>
        }
    };

    html! {
        <div class="seat-map">
            <p class="seat-map__summary">
                { format!("{} of {} seats available", props.seats.available_count(), props.seats.seats().len()) }
            </p>
            <div class="seat-map__grid" role="group" aria-label="Seat map">
                { for props.seats.rows(SEATS_PER_ROW).map(|row| html! {
                    <div class="seat-map__row">
                        { for row.iter().map(seat_button) }
                    </div>
                }) }
            </div>
            <ul class="seat-map__legend" aria-hidden="true">
                <li><span class="seat seat--available"></span>{"Available"}</li>
                <li><span class="seat seat--selected"></span>{"Selected"}</li>
                <li><span class="seat seat--booked"></span>{"Booked"}</li>
            </ul>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use busbook_core::fare::Fare;
    use busbook_core::model::SeatStatus;
    use futures::executor::block_on;
    use yew::LocalServerRenderer;

    fn seat(id: &str, status: SeatStatus) -> Seat {
        Seat {
            id: id.into(),
            status,
            price: Fare::ZERO,
        }
    }

    #[test]
    fn seat_labels_describe_state() {
        let a1 = seat("A1", SeatStatus::Available);
        assert_eq!(seat_label(&a1, false), "Seat A1, available");
        assert_eq!(seat_label(&a1, true), "Seat A1, selected");
        assert_eq!(seat_label(&seat("A2", SeatStatus::Booked), false), "Seat A2, booked");
    }

    #[test]
    fn loading_state_renders_status() {
        let props = Props {
            seats: SeatMap::default(),
            selected: Vec::new(),
            loaded: false,
            locked: false,
            on_toggle: Callback::noop(),
        };
        let html = block_on(LocalServerRenderer::<SeatMapView>::with_props(props).render());
        assert!(html.contains("Loading seats"));
    }
}
