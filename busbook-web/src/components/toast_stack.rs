use crate::dom::Timeout;
use crate::toast::{TOAST_TTL_MS, Toast};
use busbook_core::notify::NoticeLevel;
use std::time::Duration;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub toasts: Vec<Toast>,
    pub on_dismiss: Callback<u32>,
}

#[function_component(ToastStack)]
pub fn toast_stack(props: &Props) -> Html {
    html! {
        <div class="toast-stack" role="status" aria-live="polite">
            { for props.toasts.iter().map(|toast| html! {
                <ToastItem key={toast.id} toast={toast.clone()} on_dismiss={props.on_dismiss.clone()} />
            }) }
        </div>
    }
}

#[derive(Properties, PartialEq, Clone)]
pub struct ItemProps {
    pub toast: Toast,
    pub on_dismiss: Callback<u32>,
}

const fn level_class(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "toast--info",
        NoticeLevel::Success => "toast--success",
        NoticeLevel::Warning => "toast--warning",
        NoticeLevel::Error => "toast--error",
    }
}

#[function_component(ToastItem)]
pub fn toast_item(props: &ItemProps) -> Html {
    {
        let on_dismiss = props.on_dismiss.clone();
        use_effect_with(props.toast.id, move |id| {
            let id = *id;
            let guard = Timeout::new(Duration::from_millis(TOAST_TTL_MS), move || {
                on_dismiss.emit(id);
            })
            .map_err(|err| log::warn!("toast timer not scheduled: {err}"))
            .ok();
            move || drop(guard)
        });
    }

    let dismiss = {
        let cb = props.on_dismiss.clone();
        let id = props.toast.id;
        Callback::from(move |_: MouseEvent| cb.emit(id))
    };
    let notice = &props.toast.notice;
    let role = if notice.level == NoticeLevel::Error {
        "alert"
    } else {
        "status"
    };

    html! {
        <div class={classes!("toast", level_class(notice.level))} {role}>
            <span class="toast__message">{ notice.message.clone() }</span>
            <button type="button" class="toast__close" aria-label="Dismiss" onclick={dismiss}>{"×"}</button>
        </div>
    }
}
