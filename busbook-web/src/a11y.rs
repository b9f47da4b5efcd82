// Accessibility helpers

use wasm_bindgen::JsCast;

/// Id of the polite live region the app shell renders.
pub const STATUS_REGION_ID: &str = "sr-status";

const FOCUSABLE: &str = "button:not([disabled]), select:not([disabled]), input:not([disabled]), a[href], [tabindex]:not([tabindex='-1'])";

/// Announce a message to screen readers through the live region.
pub fn announce(msg: &str) {
    if let Some(node) = web_sys::window()
        .and_then(|win| win.document())
        .and_then(|doc| doc.get_element_by_id(STATUS_REGION_ID))
    {
        node.set_text_content(Some(msg));
    }
}

/// Move focus to the first focusable element inside `container_id`.
pub fn trap_focus_in(container_id: &str) {
    let Some(container) = web_sys::window()
        .and_then(|win| win.document())
        .and_then(|doc| doc.get_element_by_id(container_id))
    else {
        return;
    };
    if let Ok(Some(first)) = container.query_selector(FOCUSABLE)
        && let Ok(el) = first.dyn_into::<web_sys::HtmlElement>()
    {
        let _ = el.focus();
    }
}

/// Give focus back to the element that opened a dialog.
pub fn restore_focus(element_id: &str) {
    if let Some(el) = web_sys::window()
        .and_then(|win| win.document())
        .and_then(|doc| doc.get_element_by_id(element_id))
        .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
    {
        let _ = el.focus();
    }
}
