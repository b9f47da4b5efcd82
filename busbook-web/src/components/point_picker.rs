use busbook_core::model::RoutePoint;
use web_sys::HtmlSelectElement;
use yew::prelude::*;

#[derive(Properties, PartialEq, Clone)]
pub struct Props {
    pub id: AttrValue,
    pub label: AttrValue,
    pub points: Vec<RoutePoint>,
    #[prop_or_default]
    pub selected: Option<String>,
    #[prop_or_default]
    pub disabled: bool,
    pub on_change: Callback<Option<String>>,
}

#[function_component(PointPicker)]
pub fn point_picker(props: &Props) -> Html {
    let onchange = {
        let cb = props.on_change.clone();
        Callback::from(move |e: Event| {
            let value = e
                .target_dyn_into::<HtmlSelectElement>()
                .map(|select| select.value())
                .unwrap_or_default();
            cb.emit(Some(value).filter(|v| !v.is_empty()));
        })
    };
    let selected = props.selected.as_deref().unwrap_or("");

    html! {
        <div class="point-picker">
            <label for={props.id.clone()}>{ props.label.clone() }</label>
            <select
                id={props.id.clone()}
                class="select"
                disabled={props.disabled || props.points.is_empty()}
                {onchange}
            >
                <option value="" selected={selected.is_empty()}>
                    { if props.points.is_empty() { "No points available" } else { "Choose a point" } }
                </option>
                { for props.points.iter().map(|point| html! {
                    <option value={point.id.clone()} selected={point.id == selected}>
                        { point.label() }
                    </option>
                }) }
            </select>
        </div>
    }
}
