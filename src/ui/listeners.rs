//! Document-level key listeners.
//!
//! Every key press the application receives is offered to all registered
//! listeners, regardless of which component has focus. Registration returns
//! a [`Subscription`] guard; dropping the guard removes the listener.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crossterm::event::KeyEvent;

type Listener = Rc<dyn Fn(&KeyEvent)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: Vec<(u64, Listener)>,
}

/// Shared registry of key listeners.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct KeyListeners {
    inner: Rc<RefCell<Registry>>,
}

impl KeyListeners {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It stays registered until the returned guard is dropped.
    #[must_use = "dropping the subscription removes the listener immediately"]
    pub fn subscribe(&self, listener: impl Fn(&KeyEvent) + 'static) -> Subscription {
        let mut registry = self.inner.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Rc::new(listener)));
        Subscription {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Offer a key event to every listener, returning how many were called.
    ///
    /// Listeners run against a snapshot, so a listener may subscribe or
    /// unsubscribe while the dispatch is in progress.
    pub fn dispatch(&self, key: &KeyEvent) -> usize {
        let snapshot: Vec<Listener> = self
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in &snapshot {
            listener(key);
        }
        snapshot.len()
    }

    pub fn len(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Guard for a registered listener.
pub struct Subscription {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    /// Registration number, unique within its registry.
    pub const fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry
                .borrow_mut()
                .listeners
                .retain(|(id, _)| *id != self.id);
        }
    }
}
