//! Event System
//!
//! Lifecycle notifications for sync observers. Informational only: UI and
//! observability hang off these, correctness never does.

use std::sync::Arc;

/// Events emitted by the sync controller.
#[derive(Debug, Clone)]
pub enum ValiseEvent {
    /// A sync cycle began.
    SyncStarted,

    /// A pulled blob was decrypted and applied.
    BlobReceived {
        /// Logical id the blob resolved to.
        logical_id: String,
    },

    /// A sync cycle finished successfully.
    SyncCompleted {
        /// Blobs pulled and applied.
        pulled: usize,
        /// Blobs pushed.
        pushed: usize,
    },

    /// A sync cycle failed.
    SyncFailed {
        /// Error description.
        message: String,
    },

    /// A sync cycle ended, success or not. Always follows `SyncStarted`.
    SyncEnded,
}

/// Event handler trait.
///
/// Implement this trait to receive sync events.
pub trait EventHandler: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: ValiseEvent);
}

/// Simple callback-based event handler.
///
/// Wraps a closure for easy event handling.
pub struct CallbackHandler<F>
where
    F: Fn(ValiseEvent) + Send + Sync,
{
    callback: F,
}

impl<F> CallbackHandler<F>
where
    F: Fn(ValiseEvent) + Send + Sync,
{
    /// Creates a new callback handler.
    pub fn new(callback: F) -> Self {
        CallbackHandler { callback }
    }
}

impl<F> EventHandler for CallbackHandler<F>
where
    F: Fn(ValiseEvent) + Send + Sync,
{
    fn on_event(&self, event: ValiseEvent) {
        (self.callback)(event);
    }
}

/// Event dispatcher for managing multiple handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    /// Creates a new event dispatcher.
    pub fn new() -> Self {
        EventDispatcher {
            handlers: Vec::new(),
        }
    }

    /// Adds an event handler.
    pub fn add_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Removes all handlers.
    pub fn clear_handlers(&mut self) {
        self.handlers.clear();
    }

    /// Returns the number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Dispatches an event to all handlers.
    pub fn dispatch(&self, event: ValiseEvent) {
        for handler in &self.handlers {
            handler.on_event(event.clone());
        }
    }
}
