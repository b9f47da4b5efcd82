use crate::pages::bus_detail::BusDetailPage;
use crate::pages::checkout::CheckoutPage;
use crate::pages::home::HomePage;
use crate::pages::not_found::NotFoundPage;
use crate::router::Route;
use yew::prelude::*;
#[cfg(target_arch = "wasm32")]
use yew_router::prelude::*;

pub mod state;

#[cfg(target_arch = "wasm32")]
#[function_component(App)]
pub fn app() -> Html {
    let router_base = crate::paths::router_base().map(AttrValue::from);
    html! {
        <BrowserRouter basename={router_base}>
            <AppInner />
        </BrowserRouter>
    }
}

#[cfg(target_arch = "wasm32")]
#[function_component(AppInner)]
pub fn app_inner() -> Html {
    use crate::a11y::STATUS_REGION_ID;
    use crate::components::toast_stack::ToastStack;
    use crate::toast::{ToastAction, Toasts};

    let toasts = use_reducer(Toasts::default);
    let context = state::use_app_context(&toasts);
    let on_dismiss = {
        let dispatcher = toasts.dispatcher();
        Callback::from(move |id: u32| dispatcher.dispatch(ToastAction::Dismiss(id)))
    };

    html! {
        <ContextProvider<state::AppContext> {context}>
            <a class="skip-link" href="#main">{"Skip to content"}</a>
            <header class="site-header">
                <Link<Route> to={Route::Home} classes="site-header__brand">{"BusBook"}</Link<Route>>
            </header>
            <main id="main" role="main">
                <Switch<Route> render={switch} />
            </main>
            <div id={STATUS_REGION_ID} class="sr-only" aria-live="polite"></div>
            <ToastStack toasts={toasts.items().to_vec()} {on_dismiss} />
        </ContextProvider<state::AppContext>>
    }
}

/// Map a route to its page. Detail routes with a malformed bus id or date
/// land on the not-found page.
#[must_use]
pub fn switch(route: Route) -> Html {
    match route {
        Route::Home => html! { <HomePage /> },
        Route::Bus { .. } => match route.booking_key() {
            Some(booking) => html! { <BusDetailPage {booking} /> },
            None => {
                log::info!("unroutable booking {route:?}");
                html! { <NotFoundPage /> }
            }
        },
        Route::Checkout => html! { <CheckoutPage /> },
        Route::NotFound => html! { <NotFoundPage /> },
    }
}
