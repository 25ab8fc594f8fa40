//! User-facing notices ("toasts") raised by the auth and booking flows.

use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Surfaces a short message to the user.
pub trait Notifier {
    fn notify(&self, kind: NoticeKind, message: &str);
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn notify(&self, kind: NoticeKind, message: &str) {
        (**self).notify(kind, message)
    }
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn notify(&self, kind: NoticeKind, message: &str) {
        (**self).notify(kind, message)
    }
}
