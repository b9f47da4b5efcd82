use crate::a11y::{restore_focus, trap_focus_in};
use std::sync::atomic::{AtomicUsize, Ordering};
use yew::prelude::*;

static MODAL_IDS: AtomicUsize = AtomicUsize::new(0);

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub open: bool,
    pub title: AttrValue,
    pub on_close: Callback<()>,
    #[prop_or_default]
    pub description: Option<AttrValue>,
    #[prop_or_default]
    pub return_focus_id: Option<AttrValue>,
    /// While set, Escape, the close button and backdrop clicks do nothing.
    #[prop_or_default]
    pub dismiss_locked: bool,
    #[prop_or_default]
    pub children: Children,
}

#[function_component(Modal)]
pub fn modal(props: &Props) -> Html {
    let modal_id = use_state(|| MODAL_IDS.fetch_add(1, Ordering::Relaxed));
    let container_ref = use_node_ref();
    let prev_open = use_mut_ref(|| props.open);
    let container_id = format!("modal-{}", *modal_id);

    {
        let container_ref = container_ref.clone();
        let container_id = container_id.clone();
        let return_focus = props.return_focus_id.clone();
        use_effect_with(
            (props.open, return_focus),
            move |(is_open, return_focus_id)| {
                let was_open = *prev_open.borrow();
                *prev_open.borrow_mut() = *is_open;
                if *is_open {
                    if let Some(el) = container_ref.cast::<web_sys::HtmlElement>() {
                        let _ = el.set_attribute("tabindex", "-1");
                        let _ = el.focus();
                    }
                    trap_focus_in(&container_id);
                } else if was_open && let Some(id) = return_focus_id.as_ref() {
                    restore_focus(id);
                }
                || {}
            },
        );
    }

    if !props.open {
        return Html::default();
    }

    let title_id = format!("modal-title-{}", *modal_id);
    let desc_id: Option<String> = props
        .description
        .as_ref()
        .map(|_| format!("modal-desc-{}", *modal_id));

    let close = {
        let cb = props.on_close.clone();
        let locked = props.dismiss_locked;
        Callback::from(move |()| {
            if !locked {
                cb.emit(());
            }
        })
    };
    let on_backdrop = {
        let close = close.clone();
        Callback::from(move |_: MouseEvent| close.emit(()))
    };
    let on_close_click = on_backdrop.clone();
    // Clicks inside the dialog must not reach the backdrop.
    let stop_click = Callback::from(|e: MouseEvent| e.stop_propagation());
    let on_keydown = {
        let close = close.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Escape" {
                e.prevent_default();
                close.emit(());
            }
        })
    };

    html! {
        <div class="modal-backdrop" role="presentation" onclick={on_backdrop}>
            <div
                id={container_id}
                class="modal"
                role="dialog"
                aria-modal="true"
                aria-labelledby={title_id.clone()}
                aria-describedby={desc_id.clone().unwrap_or_default()}
                onkeydown={on_keydown}
                onclick={stop_click}
                ref={container_ref}
            >
                <div class="modal__header">
                    <h2 id={title_id}>{ props.title.clone() }</h2>
                    <button
                        type="button"
                        class="modal__close"
                        aria-label="Close dialog"
                        disabled={props.dismiss_locked}
                        onclick={on_close_click}
                    >
                        {"×"}
                    </button>
                </div>
                { props.description.as_ref().map(|desc| {
                    let id = desc_id.clone().unwrap_or_default();
                    html! {
                        <p id={id} class="modal__description">{ desc.clone() }</p>
                    }
                }).unwrap_or_default() }
                <div class="modal__body">
                    { for props.children.iter() }
                </div>
            </div>
        </div>
    }
}
