//! Signal/slot system for Larder.
//!
//! A [`Signal`] is a list of callbacks ("slots") invoked with a shared
//! reference to the emitted value. Engine components expose their outputs as
//! public signal fields (for example a combobox's `value_changed`), and the
//! rendering or form layer connects to them.
//!
//! Slots run synchronously on the emitting thread. The connection list is
//! snapshotted before invocation, so a slot may connect or disconnect on the
//! same signal without deadlocking.
//!
//! # Example
//!
//! ```
//! use larder_core::Signal;
//!
//! let value_changed = Signal::<String>::new();
//! let id = value_changed.connect(|value| println!("bound value is now {value:?}"));
//!
//! value_changed.emit("42".to_string());
//! value_changed.disconnect(id);
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::error::{Result, SignalError};

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple for several.
pub struct Signal<Args> {
    /// All active connections.
    connections: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(SlotMap::with_key()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connections.lock().insert(Arc::new(slot))
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.connections.lock().remove(id).is_some()
    }

    /// Disconnect a slot, reporting an unknown ID as an error.
    pub fn try_disconnect(&self, id: ConnectionId) -> Result<()> {
        if self.disconnect(id) {
            Ok(())
        } else {
            Err(SignalError::InvalidConnection.into())
        }
    }

    /// Disconnect all slots from this signal.
    pub fn disconnect_all(&self) {
        self.connections.lock().clear();
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking every connected slot.
    ///
    /// Slots run in unspecified order; a slot connected after a disconnect
    /// may reuse the freed entry and run before older slots.
    #[tracing::instrument(skip_all, target = "larder_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: "larder_core::signal", "signal blocked, skipping emit");
            return;
        }

        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: "larder_core::signal", connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

impl<Args: Send + 'static> Signal<Args> {
    /// Capture the current slots and `args` without invoking anything.
    ///
    /// The returned [`QueuedEmission`] runs the captured slots when invoked.
    /// Use this to emit after releasing a lock that a slot may need.
    pub fn emit_queued(&self, args: Args) -> QueuedEmission {
        if self.is_blocked() {
            tracing::trace!(target: "larder_core::signal", "signal blocked, nothing queued");
            return QueuedEmission::default();
        }

        let slots: Vec<Slot<Args>> = self.connections.lock().values().cloned().collect();
        tracing::trace!(target: "larder_core::signal", connection_count = slots.len(), "emission queued");

        QueuedEmission {
            slot_count: slots.len(),
            run: Some(Box::new(move || {
                for slot in slots {
                    slot(&args);
                }
            })),
        }
    }
}

/// Slot invocations captured by [`Signal::emit_queued`].
#[must_use = "queued slots do nothing unless invoked"]
#[derive(Default)]
pub struct QueuedEmission {
    slot_count: usize,
    run: Option<Box<dyn FnOnce() + Send>>,
}

impl QueuedEmission {
    /// Number of slots that will run.
    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Run the captured slots with the captured arguments.
    pub fn invoke(self) {
        if let Some(run) = self.run {
            run();
        }
    }
}

impl std::fmt::Debug for QueuedEmission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueuedEmission")
            .field("slot_count", &self.slot_count)
            .finish()
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connection_count())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}
