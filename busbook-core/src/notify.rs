//! User-facing notifications.
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoticeLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl NoticeLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for NoticeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    #[must_use]
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }
}

/// Where transient messages for the user go.
pub trait Notifier {
    fn notify(&self, notice: Notice);

    fn info(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Info, message));
    }

    fn success(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Success, message));
    }

    fn warning(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Warning, message));
    }

    fn error(&self, message: &str) {
        self.notify(Notice::new(NoticeLevel::Error, message));
    }
}

impl<N: Notifier + ?Sized> Notifier for Rc<N> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}

/// Keeps every notice in memory, for headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct NoticeLog {
    notices: Rc<RefCell<Vec<Notice>>>,
}

impl NoticeLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.borrow().clone()
    }

    #[must_use]
    pub fn count(&self, level: NoticeLevel) -> usize {
        self.notices
            .borrow()
            .iter()
            .filter(|n| n.level == level)
            .count()
    }

    #[must_use]
    pub fn last(&self) -> Option<Notice> {
        self.notices.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.notices.borrow_mut().clear();
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, notice: Notice) {
        log::debug!("notice [{}] {}", notice.level, notice.message);
        self.notices.borrow_mut().push(notice);
    }
}

/// Message text shared by every front end.
pub mod messages {
    use crate::reservation::ValidationError;
    use crate::seats::SeatRejection;

    pub const SEAT_LOAD_FAILED: &str = "Failed to load seat data. Showing the last known seat map.";
    pub const ROUTE_POINTS_FAILED: &str = "Failed to load pickup and drop points.";
    pub const BUS_LOAD_FAILED: &str = "Failed to load bus details.";
    pub const RESERVE_FAILED: &str = "Failed to reserve seats. Please try again.";
    pub const RESERVED: &str = "Seats reserved. Complete checkout before the hold expires.";
    pub const CUSTOM_PRICE_APPLIED: &str = "Special fare applied for the selected points.";

    #[must_use]
    pub fn seat_rejected(seat_id: &str, why: SeatRejection) -> String {
        match why {
            SeatRejection::Booked => format!("Seat {seat_id} is already booked."),
            SeatRejection::Unknown => format!("Seat {seat_id} is not on this bus."),
            SeatRejection::LimitReached(max) => {
                format!("You can select at most {max} seats per booking.")
            }
            SeatRejection::Locked => {
                "Seats cannot be changed while the reservation is in progress.".to_string()
            }
        }
    }

    #[must_use]
    pub fn seats_released(dropped: &[String]) -> String {
        match dropped {
            [single] => format!(
                "Seat {single} is no longer available and was removed from your selection."
            ),
            many => format!(
                "Seats {} are no longer available and were removed from your selection.",
                many.join(", ")
            ),
        }
    }

    #[must_use]
    pub fn invalid_checkout(err: &ValidationError) -> String {
        err.to_string()
    }
}
