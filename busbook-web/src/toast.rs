//! Toast notifications: the browser-side [`Notifier`].
use busbook_core::notify::{Notice, Notifier};
use std::rc::Rc;
use yew::prelude::*;

/// Toasts visible at once; older ones are dropped first.
pub const MAX_TOASTS: usize = 4;
/// How long a toast stays up.
pub const TOAST_TTL_MS: u64 = 5_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u32,
    pub notice: Notice,
}

pub enum ToastAction {
    Push(Notice),
    Dismiss(u32),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Toasts {
    next_id: u32,
    items: Vec<Toast>,
}

impl Toasts {
    #[must_use]
    pub fn items(&self) -> &[Toast] {
        &self.items
    }

    pub fn apply(&mut self, action: ToastAction) {
        match action {
            ToastAction::Push(notice) => {
                // The same message twice in a row (e.g. repeated refresh
                // failures) stays a single toast.
                if self.items.last().is_some_and(|t| t.notice == notice) {
                    return;
                }
                self.items.push(Toast {
                    id: self.next_id,
                    notice,
                });
                self.next_id = self.next_id.wrapping_add(1);
                if self.items.len() > MAX_TOASTS {
                    let excess = self.items.len() - MAX_TOASTS;
                    self.items.drain(..excess);
                }
            }
            ToastAction::Dismiss(id) => self.items.retain(|t| t.id != id),
        }
    }
}

impl Reducible for Toasts {
    type Action = ToastAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let mut next = (*self).clone();
        next.apply(action);
        Rc::new(next)
    }
}

/// Sends notices into the app's toast stack.
#[derive(Clone, PartialEq)]
pub struct ToastNotifier {
    sink: Callback<Notice>,
}

impl ToastNotifier {
    #[must_use]
    pub const fn new(sink: Callback<Notice>) -> Self {
        Self { sink }
    }
}

impl Notifier for ToastNotifier {
    fn notify(&self, notice: Notice) {
        log::debug!("toast [{}] {}", notice.level, notice.message);
        self.sink.emit(notice);
    }
}
