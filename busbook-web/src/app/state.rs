use crate::config::load_config;
use crate::dom;
use crate::toast::{ToastAction, ToastNotifier, Toasts};
use crate::transport::FetchTransport;
use busbook_core::api::BookingClient;
use busbook_core::config::BookingConfig;
use busbook_core::model::CheckoutSnapshot;
use busbook_core::notify::Notice;
use std::rc::Rc;
use yew::prelude::*;

/// Session key the checkout snapshot is kept under, so `/checkout` survives a
/// reload.
pub const CHECKOUT_KEY: &str = "busbook.checkout";

/// Shared services handed to every page through a `ContextProvider`.
#[derive(Clone)]
pub struct AppContext {
    pub config: Rc<BookingConfig>,
    pub client: Rc<BookingClient<FetchTransport>>,
    pub notifier: ToastNotifier,
    pub checkout: UseStateHandle<Option<Rc<CheckoutSnapshot>>>,
}

impl PartialEq for AppContext {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.config, &other.config)
            && Rc::ptr_eq(&self.client, &other.client)
            && self.notifier == other.notifier
            && self.checkout == other.checkout
    }
}

impl AppContext {
    /// Hand a confirmed reservation to the checkout page.
    pub fn begin_checkout(&self, snapshot: CheckoutSnapshot) {
        match serde_json::to_string(&snapshot) {
            Ok(json) => {
                if let Err(err) = dom::session_storage()
                    .and_then(|s| s.set_item(CHECKOUT_KEY, &json).map_err(Into::into))
                {
                    log::warn!("checkout snapshot not persisted: {err}");
                }
            }
            Err(err) => log::warn!("checkout snapshot not serialisable: {err}"),
        }
        self.checkout.set(Some(Rc::new(snapshot)));
    }
}

/// The snapshot left by a previous page load, if any.
#[must_use]
pub fn restore_checkout() -> Option<CheckoutSnapshot> {
    let json = dom::session_storage()
        .ok()?
        .get_item(CHECKOUT_KEY)
        .ok()
        .flatten()?;
    serde_json::from_str(&json)
        .map_err(|err| log::warn!("discarding stored checkout snapshot: {err}"))
        .ok()
}

#[hook]
pub fn use_app_context(toasts: &UseReducerHandle<Toasts>) -> AppContext {
    let config = use_memo((), |()| load_config());
    let client = {
        let config = config.clone();
        use_memo((), move |()| {
            BookingClient::new(
                FetchTransport::new(config.api_base.clone()),
                config.price_lookup,
            )
        })
    };
    let sink = {
        let dispatcher = toasts.dispatcher();
        use_callback((), move |notice: Notice, ()| {
            dispatcher.dispatch(ToastAction::Push(notice));
        })
    };
    let checkout = use_state(|| restore_checkout().map(Rc::new));

    AppContext {
        config,
        client,
        notifier: ToastNotifier::new(sink),
        checkout,
    }
}

/// The app context; pages are only ever rendered inside the provider.
#[hook]
pub fn use_booking_context() -> Option<AppContext> {
    use_context::<AppContext>()
}
