use crate::router::Route;
use yew::prelude::*;
use yew_router::prelude::*;

/// Not-found page to show when routing fails to match a known view.
#[derive(Properties, PartialEq)]
pub struct Props {
    pub on_go_home: Callback<()>,
}

#[function_component(NotFound)]
pub fn not_found(props: &Props) -> Html {
    let go_home = {
        let cb = props.on_go_home.clone();
        Callback::from(move |_| cb.emit(()))
    };

    html! {
        <section class="panel not-found" aria-live="assertive">
            <h1>{"Page not found"}</h1>
            <p>{"That bus or travel date could not be found. Check the link and try again."}</p>
            <button type="button" class="btn" onclick={go_home}>
                {"Back to search"}
            </button>
        </section>
    }
}

#[function_component(NotFoundPage)]
pub fn not_found_page() -> Html {
    let navigator = use_navigator();
    let on_go_home = Callback::from(move |()| {
        if let Some(navigator) = navigator.as_ref() {
            navigator.push(&Route::Home);
        }
    });
    html! { <NotFound {on_go_home} /> }
}
