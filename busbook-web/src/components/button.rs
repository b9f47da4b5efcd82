use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub label: AttrValue,
    #[prop_or_default]
    pub onclick: Callback<MouseEvent>,
    #[prop_or_default]
    pub disabled: bool,
    #[prop_or_default]
    pub busy: bool,
    #[prop_or_else(|| AttrValue::from("btn"))]
    pub class: AttrValue,
    #[prop_or_default]
    pub id: Option<AttrValue>,
}

#[function_component(Button)]
pub fn button(p: &Props) -> Html {
    let onclick = p.onclick.clone();
    let label = p.label.clone();
    html! {
        <button
            type="button"
            id={p.id.clone()}
            class={classes!(p.class.to_string(), p.busy.then_some("is-busy"))}
            disabled={p.disabled || p.busy}
            aria-busy={p.busy.then_some("true")}
            {onclick}
        >
            { label }
        </button>
    }
}
