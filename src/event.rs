//! Listener attachment for beans that publish change notifications.
//!
//! A bean that can notify listeners implements [`ListenerSource`].
//! [`EventSupport`] keeps one listener attached to whichever bean it is
//! currently bound to, moving it when the bean or the listener changes and
//! detaching it while events are disabled. [`ChangeSupport`] is a ready-made
//! listener list a bean can embed to implement [`ListenerSource`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

/// A bean that accepts listeners of type `L`.
pub trait ListenerSource<L> {
    fn add_listener(&self, listener: L);

    /// Remove a previously added listener. Unknown listeners are ignored.
    fn remove_listener(&self, listener: &L);
}

impl<L, S: ListenerSource<L> + ?Sized> ListenerSource<L> for Rc<S> {
    fn add_listener(&self, listener: L) {
        (**self).add_listener(listener)
    }

    fn remove_listener(&self, listener: &L) {
        (**self).remove_listener(listener)
    }
}

// ============================================================================
// Change Support
// ============================================================================

/// A shared event callback; listeners are identified by pointer.
pub type Listener<E> = Rc<dyn Fn(&E)>;

/// An ordered list of listeners for events of type `E`.
pub struct ChangeSupport<E> {
    listeners: RefCell<Vec<Listener<E>>>,
}

impl<E> ChangeSupport<E> {
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    /// Notify every listener, in registration order.
    ///
    /// Listeners may add or remove listeners while being notified; changes
    /// take effect from the next event.
    pub fn fire(&self, event: &E) {
        let listeners = self.listeners.borrow().clone();
        for listener in &listeners {
            listener(event);
        }
    }
}

impl<E> Default for ChangeSupport<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ListenerSource<Listener<E>> for ChangeSupport<E> {
    fn add_listener(&self, listener: Listener<E>) {
        self.listeners.borrow_mut().push(listener);
    }

    fn remove_listener(&self, listener: &Listener<E>) {
        let mut listeners = self.listeners.borrow_mut();
        if let Some(position) = listeners.iter().position(|l| Rc::ptr_eq(l, listener)) {
            listeners.remove(position);
        }
    }
}

impl<E> fmt::Debug for ChangeSupport<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeSupport").field("listeners", &self.len()).finish()
    }
}

// ============================================================================
// Event Support
// ============================================================================

/// Keeps a single listener attached to a single bean.
///
/// The listener is attached exactly when a bean, a listener, and enabled
/// events are all present. Dropping the support detaches it.
pub struct EventSupport<B: ListenerSource<L>, L: Clone> {
    bean: Option<B>,
    listener: Option<L>,
    events_disabled: bool,
}

impl<B: ListenerSource<L>, L: Clone> EventSupport<B, L> {
    pub fn new() -> Self {
        Self {
            bean: None,
            listener: None,
            events_disabled: false,
        }
    }

    /// Bind to `bean`, moving the listener off the previous bean.
    pub fn set_bean(&mut self, bean: Option<B>) {
        self.detach();
        self.bean = bean;
        self.attach();
    }

    /// Replace the listener on the current bean.
    pub fn set_listener(&mut self, listener: Option<L>) {
        self.detach();
        self.listener = listener;
        self.attach();
    }

    /// Detach the listener while disabled; reattach when re-enabled.
    pub fn set_events_disabled(&mut self, disabled: bool) {
        if self.events_disabled == disabled {
            return;
        }
        self.detach();
        self.events_disabled = disabled;
        self.attach();
    }

    pub fn bean(&self) -> Option<&B> {
        self.bean.as_ref()
    }

    pub fn listener(&self) -> Option<&L> {
        self.listener.as_ref()
    }

    pub fn is_events_disabled(&self) -> bool {
        self.events_disabled
    }

    fn attach(&self) {
        if self.events_disabled {
            return;
        }
        if let (Some(bean), Some(listener)) = (&self.bean, &self.listener) {
            trace!("attaching listener");
            bean.add_listener(listener.clone());
        }
    }

    fn detach(&self) {
        if self.events_disabled {
            return;
        }
        if let (Some(bean), Some(listener)) = (&self.bean, &self.listener) {
            trace!("detaching listener");
            bean.remove_listener(listener);
        }
    }
}

impl<B: ListenerSource<L>, L: Clone> Default for EventSupport<B, L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: ListenerSource<L>, L: Clone> Drop for EventSupport<B, L> {
    fn drop(&mut self) {
        self.detach();
    }
}

impl<B: ListenerSource<L>, L: Clone> fmt::Debug for EventSupport<B, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventSupport")
            .field("bean", &self.bean.is_some())
            .field("listener", &self.listener.is_some())
            .field("events_disabled", &self.events_disabled)
            .finish()
    }
}
