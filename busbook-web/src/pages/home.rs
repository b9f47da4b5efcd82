use crate::dom;
use crate::router::Route;
use busbook_core::model::{BookingKey, format_travel_date, parse_travel_date};
use web_sys::HtmlInputElement;
use yew::prelude::*;
use yew_router::prelude::*;

/// Validate the search form.
///
/// # Errors
/// Returns the message to show next to the form.
pub fn parse_search(bus_id: &str, date: &str) -> Result<BookingKey, &'static str> {
    if bus_id.trim().is_empty() {
        return Err("Enter a bus id.");
    }
    if parse_travel_date(date).is_none() {
        return Err("Choose a travel date.");
    }
    BookingKey::parse(bus_id, date).ok_or("Enter a valid bus id and date.")
}

fn input_value(e: &InputEvent) -> String {
    e.target_dyn_into::<HtmlInputElement>()
        .map(|input| input.value())
        .unwrap_or_default()
}

#[function_component(HomePage)]
pub fn home_page() -> Html {
    let bus_id = use_state(String::new);
    let date = use_state(String::new);
    let error = use_state(|| None::<&'static str>);
    let navigator = use_navigator();

    {
        let date = date.clone();
        use_effect_with((), move |()| {
            if date.is_empty()
                && let Some(today) = dom::today()
            {
                date.set(format_travel_date(today));
            }
            || {}
        });
    }

    let on_bus = {
        let bus_id = bus_id.clone();
        Callback::from(move |e: InputEvent| bus_id.set(input_value(&e)))
    };
    let on_date = {
        let date = date.clone();
        Callback::from(move |e: InputEvent| date.set(input_value(&e)))
    };
    let on_submit = {
        let bus_id = bus_id.clone();
        let date = date.clone();
        let error = error.clone();
        Callback::from(move |e: SubmitEvent| {
            e.prevent_default();
            match parse_search(&bus_id, &date) {
                Ok(key) => {
                    error.set(None);
                    if let Some(navigator) = navigator.as_ref() {
                        navigator.push(&Route::for_booking(&key));
                    }
                }
                Err(message) => error.set(Some(message)),
            }
        })
    };

    html! {
        <section class="panel home">
            <h1>{"Book your bus seats"}</h1>
            <form class="search-form" onsubmit={on_submit} novalidate=true>
                <label for="bus-id">{"Bus id"}</label>
                <input id="bus-id" class="input" type="text" value={(*bus_id).clone()} oninput={on_bus} />
                <label for="travel-date">{"Travel date"}</label>
                <input id="travel-date" class="input" type="date" value={(*date).clone()} oninput={on_date} />
                if let Some(message) = *error {
                    <p class="form-error" role="alert">{ message }</p>
                }
                <button type="submit" class="btn btn-primary">{"Show seats"}</button>
            </form>
        </section>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use yew::LocalServerRenderer;

    #[test]
    fn search_requires_id_and_date() {
        assert_eq!(parse_search(" ", "2026-11-02"), Err("Enter a bus id."));
        assert_eq!(parse_search("bus-7", ""), Err("Choose a travel date."));
        assert_eq!(parse_search("bus-7", "2026-02-30"), Err("Choose a travel date."));
        let key = parse_search(" bus-7 ", "2026-11-02").unwrap();
        assert_eq!(key.bus_id, "bus-7");
    }

    #[test]
    fn renders_search_form() {
        let html = block_on(LocalServerRenderer::<HomePage>::new().render());
        assert!(html.contains("travel-date"));
        assert!(html.contains("Show seats"));
    }
}
