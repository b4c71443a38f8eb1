//! The notification collaborator seam.
//!
//! Fetch failures are reported to the user through a [`Notifier`]. How the
//! message is presented (toast, status bar, log) is the host's concern.

use std::sync::Arc;

use larder_core::Signal;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum NotificationLevel {
    Error,
}

/// A user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    /// An error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
        }
    }
}

/// Receives user-facing notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}

/// Writes notifications to the `larder::guard` log target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Error => {
                tracing::error!(target: "larder::guard", message = %notification.message, "notification");
            }
        }
    }
}

/// Forwards notifications to a [`Signal`], for hosts that already present
/// messages through signal connections.
///
/// ```
/// use larder::notify::{Notification, Notifier, SignalNotifier};
///
/// let notifier = SignalNotifier::new();
/// notifier.notified.connect(|n: &Notification| println!("{}", n.message));
/// notifier.notify(Notification::error("Failed to load items"));
/// ```
#[derive(Debug, Default)]
pub struct SignalNotifier {
    /// Emitted once per notification.
    pub notified: Signal<Notification>,
}

impl SignalNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for SignalNotifier {
    fn notify(&self, notification: Notification) {
        self.notified.emit(notification);
    }
}
