//! Lifecycle-driven view routing
//!
//! A consumer of the event bus, not part of the sign-in core: it tracks
//! which root screen should be active and swaps it when sign-in or sign-out
//! succeeds. No layout lives here.

use crate::auth::events::{AuthEvent, EventBus};
use std::sync::{Arc, Mutex};

/// Root screens an application swaps between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// The sign-in flow
    SignIn,
    /// The signed-in home experience
    Home,
}

/// Swaps the active root screen in response to lifecycle events.
pub struct ViewRouter {
    active: Arc<Mutex<Screen>>,
}

impl ViewRouter {
    /// Pick the initial screen from whether a session was restored at
    /// startup.
    pub fn new(signed_in: bool) -> Self {
        let initial = if signed_in { Screen::Home } else { Screen::SignIn };
        Self {
            active: Arc::new(Mutex::new(initial)),
        }
    }

    /// Subscribe to the events that change the root screen.
    pub fn attach(&self, events: &EventBus) {
        let active = Arc::clone(&self.active);
        events.subscribe(AuthEvent::SignInSuccess, move |_| {
            *active.lock().expect("router state poisoned") = Screen::Home;
        });

        let active = Arc::clone(&self.active);
        events.subscribe(AuthEvent::SignOutSuccess, move |_| {
            *active.lock().expect("router state poisoned") = Screen::SignIn;
        });
    }

    /// The screen currently displayed.
    pub fn active(&self) -> Screen {
        *self.active.lock().expect("router state poisoned")
    }
}
