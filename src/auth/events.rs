//! Auth lifecycle event broadcasting
//!
//! A process-wide publish/subscribe registry keyed by lifecycle event tag.
//! Delivery is synchronous and fire-and-forget: an event reaches exactly the
//! subscribers registered at publish time, in registration order; subscribers
//! registered later miss prior events.

use async_stream::stream;
use futures::Stream;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

/// Auth lifecycle event tags.
///
/// Events carry no payload beyond the tag itself; subscribers that need the
/// resulting identity read it from the session afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthEvent {
    /// A sign-in flow completed and a session is now current
    SignInSuccess,
    /// A sign-in flow failed; no session was established
    SignInError,
    /// The current session ended
    SignOutSuccess,
    /// Sign-out failed; the session is unchanged
    SignOutError,
    /// A credential was linked onto the current session
    LinkSuccess,
    /// Linking failed; the session is unchanged
    LinkError,
}

/// Identifies a subscription for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberId(u64);

// Handlers return false to be dropped from the registry.
type Handler = Arc<dyn Fn(AuthEvent) -> bool + Send + Sync>;

/// Publish/subscribe registry for [`AuthEvent`]s.
///
/// Constructed once by the composition root and shared by handle; there is no
/// global instance.
#[derive(Default)]
pub struct EventBus {
    inner: Mutex<Registry>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    handlers: HashMap<AuthEvent, Vec<(u64, Handler)>>,
}

impl EventBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event`.
    ///
    /// Handlers run synchronously on the publishing thread, in registration
    /// order for a given tag.
    pub fn subscribe<F>(&self, event: AuthEvent, handler: F) -> SubscriberId
    where
        F: Fn(AuthEvent) + Send + Sync + 'static,
    {
        self.register(
            event,
            Arc::new(move |e| {
                handler(e);
                true
            }),
        )
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, event: AuthEvent, id: SubscriberId) -> bool {
        let mut inner = self.inner.lock().expect("event registry poisoned");
        let Some(handlers) = inner.handlers.get_mut(&event) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id.0);
        handlers.len() != before
    }

    /// Publish `event` to every subscriber currently registered for it.
    ///
    /// Fire-and-forget: there is no delivery guarantee beyond the synchronous
    /// calls made here.
    pub fn publish(&self, event: AuthEvent) {
        // Handlers are cloned out of the lock so a subscriber may publish or
        // subscribe reentrantly without deadlocking.
        let handlers: Vec<(u64, Handler)> = {
            let inner = self.inner.lock().expect("event registry poisoned");
            match inner.handlers.get(&event) {
                Some(handlers) => handlers.clone(),
                None => return,
            }
        };

        let mut dead = Vec::new();
        for (id, handler) in &handlers {
            if !(handler.as_ref())(event) {
                dead.push(*id);
            }
        }

        if !dead.is_empty() {
            let mut inner = self.inner.lock().expect("event registry poisoned");
            if let Some(handlers) = inner.handlers.get_mut(&event) {
                handlers.retain(|(id, _)| !dead.contains(id));
            }
        }
    }

    /// An async stream of future occurrences of `event`.
    ///
    /// The subscription starts at the call, so events published earlier are
    /// not replayed. The subscription is dropped when the stream is.
    pub fn stream(&self, event: AuthEvent) -> Pin<Box<dyn Stream<Item = AuthEvent> + Send>> {
        let (tx, mut rx) = mpsc::unbounded_channel();
        self.register(event, Arc::new(move |e| tx.send(e).is_ok()));

        Box::pin(stream! {
            while let Some(e) = rx.recv().await {
                yield e;
            }
        })
    }

    fn register(&self, event: AuthEvent, handler: Handler) -> SubscriberId {
        let mut inner = self.inner.lock().expect("event registry poisoned");
        let id = inner.next_id;
        inner.next_id += 1;
        inner.handlers.entry(event).or_default().push((id, handler));
        SubscriberId(id)
    }
}
