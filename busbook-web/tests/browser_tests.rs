#![cfg(target_arch = "wasm32")]

use busbook_web::app::state::{CHECKOUT_KEY, restore_checkout};
use busbook_web::dom::{self, Interval, Timeout};
use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

async fn sleep(ms: i32) {
    let promise = js_sys::Promise::new(&mut |resolve, _| {
        dom::window()
            .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
            .expect("schedule sleep");
    });
    JsFuture::from(promise).await.expect("sleep resolves");
}

#[wasm_bindgen_test]
async fn timeout_fires_once() {
    let fired = Rc::new(Cell::new(0));
    let counter = fired.clone();
    let _guard = Timeout::new(Duration::from_millis(10), move || counter.set(counter.get() + 1))
        .expect("timeout scheduled");
    sleep(60).await;
    assert_eq!(fired.get(), 1);
}

#[wasm_bindgen_test]
async fn dropped_timeout_never_fires() {
    let fired = Rc::new(Cell::new(false));
    let flag = fired.clone();
    let guard = Timeout::new(Duration::from_millis(20), move || flag.set(true))
        .expect("timeout scheduled");
    drop(guard);
    sleep(60).await;
    assert!(!fired.get());
}

#[wasm_bindgen_test]
async fn interval_stops_when_dropped() {
    let ticks = Rc::new(Cell::new(0));
    let counter = ticks.clone();
    let guard = Interval::new(Duration::from_millis(10), move || counter.set(counter.get() + 1))
        .expect("interval scheduled");
    sleep(55).await;
    drop(guard);
    let seen = ticks.get();
    assert!(seen >= 2, "expected ticks, saw {seen}");
    sleep(50).await;
    assert_eq!(ticks.get(), seen);
}

#[wasm_bindgen_test]
fn corrupt_checkout_snapshot_is_ignored() {
    let storage = dom::session_storage().expect("session storage");
    storage.set_item(CHECKOUT_KEY, "{not json").expect("write");
    assert!(restore_checkout().is_none());
    storage.remove_item(CHECKOUT_KEY).expect("cleanup");
    assert!(restore_checkout().is_none());
}
