//! Observable single-value cell with explicit subscription handles.
//!
//! DESIGN
//! ======
//! A `Writable<T>` is a shared handle (`Rc<RefCell<_>>`) to one value and an
//! ordered subscriber list. Cloning the handle shares the cell. Subscribing
//! runs the callback once with the current value, then again after every
//! change, in registration order.
//!
//! Change detection is `PartialEq`: setting an equal value notifies nobody.
//! This applies to collections too, so writing back an identical `Vec` or
//! JSON object is silent, unlike a JS store that always re-notifies for
//! objects and arrays.
//!
//! Callbacks run with no borrow held, so a subscriber may read, write, or
//! unsubscribe from inside its own callback. Each change is queued as a
//! batch of (subscriber snapshot, value); a `set` made while a batch is
//! being delivered only enqueues, and the outermost `set` drains the queue
//! in order. Every subscriber therefore sees changes in the order they were
//! made and ends on the latest value.
//!
//! Cells are `!Send`: they belong to the single UI event loop.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

type Callback<T> = Rc<dyn Fn(&T)>;

struct Inner<T> {
    value: T,
    subscribers: Vec<(u64, Callback<T>)>,
    next_id: u64,
    /// Set while the outermost `notify` is draining `pending`.
    notifying: bool,
    pending: VecDeque<(Vec<Callback<T>>, T)>,
}

/// Shared handle to an observable value.
pub struct Writable<T> {
    inner: Rc<RefCell<Inner<T>>>,
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<T: fmt::Debug> fmt::Debug for Writable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Writable")
            .field("value", &inner.value)
            .field("subscribers", &inner.subscribers.len())
            .finish()
    }
}

impl<T: Default + Clone + PartialEq + 'static> Default for Writable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + PartialEq + 'static> Writable<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                value,
                subscribers: Vec::new(),
                next_id: 0,
                notifying: false,
                pending: VecDeque::new(),
            })),
        }
    }

    /// Snapshot of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value without cloning it.
    ///
    /// # Panics
    ///
    /// The cell stays borrowed while `f` runs, so calling `set` or `update`
    /// on the same cell from inside `f` panics. Use [`Writable::get`] there.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    /// Replace the value and notify subscribers if it changed.
    pub fn set(&self, value: T) {
        {
            let mut inner = self.inner.borrow_mut();
            if inner.value == value {
                return;
            }
            inner.value = value;
        }
        self.notify();
    }

    /// Mutate a copy of the value in place, then `set` it.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut next = self.get();
        f(&mut next);
        self.set(next);
    }

    /// Register `callback`; it runs immediately with the current value.
    pub fn subscribe(&self, callback: impl Fn(&T) + 'static) -> Subscription {
        let callback: Callback<T> = Rc::new(callback);
        let (id, current) = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_id;
            inner.next_id += 1;
            inner.subscribers.push((id, Rc::clone(&callback)));
            (id, inner.value.clone())
        };
        tracing::trace!(id, "store subscriber added");
        callback(&current);

        let weak: Weak<RefCell<Inner<T>>> = Rc::downgrade(&self.inner);
        Subscription::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.borrow_mut().subscribers.retain(|(sid, _)| *sid != id);
                tracing::trace!(id, "store subscriber removed");
            }
        })
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }

    fn notify(&self) {
        {
            let mut inner = self.inner.borrow_mut();
            let callbacks: Vec<Callback<T>> = inner.subscribers.iter().map(|(_, cb)| Rc::clone(cb)).collect();
            let value = inner.value.clone();
            inner.pending.push_back((callbacks, value));
            if inner.notifying {
                return;
            }
            inner.notifying = true;
        }

        while let Some((callbacks, value)) = self.next_batch() {
            for callback in callbacks {
                callback(&value);
            }
        }
        self.inner.borrow_mut().notifying = false;
    }

    /// Pops the next pending batch; the borrow ends before any callback runs.
    fn next_batch(&self) -> Option<(Vec<Callback<T>>, T)> {
        self.inner.borrow_mut().pending.pop_front()
    }
}

/// Live subscription. Dropping it or calling [`Subscription::unsubscribe`]
/// stops further notifications.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }

    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "writable_test.rs"]
mod tests;
