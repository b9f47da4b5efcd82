use busbook_core::fare::Fare;
use busbook_core::model::{Seat, SeatStatus};
use busbook_core::seats::SeatMap;
use busbook_web::components::confirm_modal::{ConfirmReservation, Props as ConfirmProps};
use busbook_web::components::modal::{Modal, Props as ModalProps};
use busbook_web::components::seat_map::{Props as SeatMapProps, SeatMapView};
use busbook_web::pages::not_found::{NotFound, Props as NotFoundProps};
use futures::executor::block_on;
use yew::LocalServerRenderer;
use yew::prelude::*;

fn seat(id: &str, status: SeatStatus) -> Seat {
    Seat {
        id: id.into(),
        status,
        price: Fare::from_minor(120_000),
    }
}

fn confirm_props(busy: bool) -> ConfirmProps {
    ConfirmProps {
        open: true,
        seat_ids: vec!["A1".into(), "A2".into()],
        unit_fare: Fare::from_minor(120_000),
        total: Fare::from_minor(240_000),
        currency: AttrValue::from("₹"),
        custom_applied: false,
        pickup: Some(AttrValue::from("Swargate (21:30)")),
        drop: Some(AttrValue::from("Panaji (07:15)")),
        busy,
        on_confirm: Callback::noop(),
        on_cancel: Callback::noop(),
        return_focus_id: None,
    }
}

#[test]
fn closed_modal_renders_nothing() {
    let props = ModalProps {
        open: false,
        title: AttrValue::from("Hidden"),
        on_close: Callback::noop(),
        description: None,
        return_focus_id: None,
        dismiss_locked: false,
        children: Children::default(),
    };
    let html = block_on(LocalServerRenderer::<Modal>::with_props(props).render());
    assert!(!html.contains("role=\"dialog\""));
}

#[test]
fn open_modal_is_labelled_dialog() {
    let props = ModalProps {
        open: true,
        title: AttrValue::from("Confirm your booking"),
        on_close: Callback::noop(),
        description: Some(AttrValue::from("Held while you pay.")),
        return_focus_id: None,
        dismiss_locked: false,
        children: Children::default(),
    };
    let html = block_on(LocalServerRenderer::<Modal>::with_props(props).render());
    assert!(html.contains("role=\"dialog\""));
    assert!(html.contains("aria-modal=\"true\""));
    assert!(html.contains("Confirm your booking"));
    assert!(html.contains("Held while you pay."));
}

#[test]
fn confirm_dialog_summarises_selection() {
    let html = block_on(LocalServerRenderer::<ConfirmReservation>::with_props(confirm_props(false)).render());
    assert!(html.contains("A1, A2"));
    assert!(html.contains("Swargate (21:30)"));
    assert!(html.contains("Panaji (07:15)"));
    assert!(html.contains(&Fare::from_minor(240_000).display_with("₹")));
    assert!(html.contains("Confirm"));
}

#[test]
fn busy_confirm_dialog_disables_actions() {
    let html = block_on(LocalServerRenderer::<ConfirmReservation>::with_props(confirm_props(true)).render());
    assert!(html.contains("Reserving…"));
    assert!(html.contains("disabled"));
}

#[test]
fn seat_map_marks_booked_and_selected_seats() {
    let props = SeatMapProps {
        seats: SeatMap::new(vec![
            seat("A1", SeatStatus::Available),
            seat("A2", SeatStatus::Booked),
            seat("A3", SeatStatus::Available),
        ]),
        selected: vec!["A1".into()],
        loaded: true,
        locked: false,
        on_toggle: Callback::noop(),
    };
    let html = block_on(LocalServerRenderer::<SeatMapView>::with_props(props).render());
    assert!(html.contains("Seat A1, selected"));
    assert!(html.contains("Seat A2, booked"));
    assert!(html.contains("Seat A3, available"));
    assert!(html.contains("data-seat=\"A2\""));
}

#[test]
fn seat_map_waits_for_first_load() {
    let props = SeatMapProps {
        seats: SeatMap::default(),
        selected: Vec::new(),
        loaded: false,
        locked: false,
        on_toggle: Callback::noop(),
    };
    let html = block_on(LocalServerRenderer::<SeatMapView>::with_props(props).render());
    assert!(html.contains("Loading seats"));
}

#[test]
fn not_found_offers_way_home() {
    let props = NotFoundProps {
        on_go_home: Callback::noop(),
    };
    let html = block_on(LocalServerRenderer::<NotFound>::with_props(props).render());
    assert!(html.contains("Back to search"));
}
