pub mod bus_image;
pub mod button;
pub mod confirm_modal;
pub mod fare_summary;
pub mod modal;
pub mod point_picker;
pub mod seat_map;
pub mod seat_selection;
pub mod toast_stack;
