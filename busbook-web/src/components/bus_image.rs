use crate::dom::Timeout;
use crate::paths::image_placeholder;
use busbook_core::image::{ImageSlot, ImageSource, ImageStatus, cache_token};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::rc::Rc;
use std::time::Duration;
use yew::prelude::*;

#[cfg(target_arch = "wasm32")]
fn fresh_token() -> String {
    let mut rng = SmallRng::seed_from_u64(crate::dom::random_seed());
    cache_token(crate::dom::now_ms(), &mut rng)
}

#[cfg(not(target_arch = "wasm32"))]
fn fresh_token() -> String {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
    cache_token(now, &mut SmallRng::seed_from_u64(now))
}

enum SlotAction {
    Loaded(u8),
    Failed(u8),
    Retry,
    Reset(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct SlotState {
    url: String,
    slot: ImageSlot,
}

impl SlotState {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            slot: ImageSlot::new(ImageSource::classify(url), fresh_token()),
        }
    }
}

impl Reducible for SlotState {
    type Action = SlotAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        match action {
            SlotAction::Loaded(attempt) => {
                if !next.slot.on_loaded(attempt) {
                    return self;
                }
            }
            SlotAction::Failed(attempt) => {
                let before = (next.slot.attempt(), next.slot.status());
                next.slot.on_failed(attempt);
                if (next.slot.attempt(), next.slot.status()) == before {
                    return self;
                }
            }
            SlotAction::Retry => next.slot.retry(fresh_token()),
            SlotAction::Reset(url) => {
                if url == next.url {
                    return self;
                }
                next = Self::new(&url);
            }
        }
        Rc::new(next)
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub url: AttrValue,
    pub api_base: AttrValue,
    pub timeout_ms: u64,
    #[prop_or_else(|| AttrValue::from("Bus photo"))]
    pub alt: AttrValue,
}

/// One bus photo, walking its fallback URLs until one loads.
#[function_component(BusImage)]
pub fn bus_image(props: &Props) -> Html {
    let state = use_reducer({
        let url = props.url.to_string();
        move || SlotState::new(&url)
    });

    {
        let dispatcher = state.dispatcher();
        use_effect_with(props.url.clone(), move |url| {
            dispatcher.dispatch(SlotAction::Reset(url.to_string()));
            || {}
        });
    }

    {
        // Each attempt gets its own timer; a later attempt or unmount drops it.
        let dispatcher = state.dispatcher();
        let timeout = Duration::from_millis(props.timeout_ms);
        let attempt = state.slot.attempt();
        let status = state.slot.status();
        use_effect_with((attempt, status, state.url.clone()), move |(attempt, status, _)| {
            let attempt = *attempt;
            let guard = if *status == ImageStatus::Loading {
                Timeout::new(timeout, move || {
                    log::debug!("image attempt {} timed out", attempt + 1);
                    dispatcher.dispatch(SlotAction::Failed(attempt));
                })
                .map_err(|err| log::warn!("image timeout not scheduled: {err}"))
                .ok()
            } else {
                None
            };
            move || drop(guard)
        });
    }

    let attempt = state.slot.attempt();
    let onload = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: Event| dispatcher.dispatch(SlotAction::Loaded(attempt)))
    };
    let onerror = {
        let dispatcher = state.dispatcher();
        Callback::from(move |_: Event| dispatcher.dispatch(SlotAction::Failed(attempt)))
    };

    match state.slot.current_url(&props.api_base) {
        Some(src) if state.slot.status() != ImageStatus::Error => {
            let loading = state.slot.status() == ImageStatus::Loading;
            html! {
                <figure class={classes!("bus-image", loading.then_some("bus-image--loading"))}>
                    <img
                        key={src.clone()}
                        {src}
                        alt={props.alt.clone()}
                        data-attempt={(attempt + 1).to_string()}
                        {onload}
                        {onerror}
                    />
                    if loading {
                        <span class="bus-image__spinner" aria-hidden="true"></span>
                    }
                </figure>
            }
        }
        _ => {
            let retry = {
                let dispatcher = state.dispatcher();
                Callback::from(move |_: MouseEvent| dispatcher.dispatch(SlotAction::Retry))
            };
            html! {
                <figure class="bus-image bus-image--error">
                    <img src={image_placeholder()} alt="" aria-hidden="true" />
                    <figcaption>
                        {"Photo unavailable. "}
                        <button type="button" class="btn btn-link" onclick={retry}>{"Retry"}</button>
                    </figcaption>
                </figure>
            }
        }
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct GalleryProps {
    pub urls: Vec<String>,
    pub api_base: AttrValue,
    pub timeout_ms: u64,
    #[prop_or_default]
    pub title: AttrValue,
}

/// Every photo of a bus; each slot falls back independently.
#[function_component(BusGallery)]
pub fn bus_gallery(props: &GalleryProps) -> Html {
    if props.urls.is_empty() {
        return html! {
            <div class="bus-gallery bus-gallery--empty">
                <img src={image_placeholder()} alt="No photos for this bus" />
            </div>
        };
    }
    let total = props.urls.len();
    html! {
        <div class="bus-gallery">
            { for props.urls.iter().enumerate().map(|(i, url)| html! {
                <BusImage
                    key={url.clone()}
                    url={AttrValue::from(url.clone())}
                    api_base={props.api_base.clone()}
                    timeout_ms={props.timeout_ms}
                    alt={AttrValue::from(format!("{} photo {} of {total}", props.title, i + 1))}
                />
            }) }
        </div>
    }
}
