//! Multicast event dispatch.
//!
//! An [`Event`] is an ordered list of bindings. Invoking it calls every bound
//! callback in insertion order with the same arguments and hands back the
//! result of the last one.
//!
//! # Example
//!
//! ```rust
//! use tickstate::event::Event;
//!
//! let mut on_hit: Event<i32, i32> = Event::new();
//! on_hit.bind_with("a", |x| x + 1);
//! on_hit.bind_with("a", |x| x + 2);
//!
//! assert_eq!(on_hit.invoke(10), Some(12));
//! // Only the first binding under "a" is removed.
//! assert!(on_hit.unbind("a"));
//! assert_eq!(on_hit.count(), 1);
//! assert_eq!(on_hit.invoke(10), Some(12));
//! ```

mod key;

pub use key::{BindingKey, Callback, Handler, Key};

use std::fmt;
use std::ops::{AddAssign, SubAssign};
use tracing::{debug, trace};

/// Initial capacity of an event created with [`Event::new`].
const DEFAULT_CAPACITY: usize = 8;

/// A key and the callback bound under it.
pub struct Binding<A, R, K> {
    key: K,
    callback: Callback<A, R>,
}

impl<A, R, K> Binding<A, R, K> {
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Call the bound function.
    pub fn call(&mut self, args: A) -> R {
        (self.callback)(args)
    }
}

impl<A, R, K: fmt::Debug> fmt::Debug for Binding<A, R, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

/// A collection of callbacks that are bound, unbound and invoked together.
///
/// `A` is the argument passed to every callback (use a tuple for several
/// values), `R` the callback return type, and `K` the key type used to look
/// bindings up again. Keys need not be unique.
///
/// Events are single-owner values: invocation takes `&mut self` and nothing
/// here is `Send` or `Sync`.
pub struct Event<A, R = (), K = Key<A, R>> {
    bindings: Vec<Binding<A, R, K>>,
}

impl<A, R, K> Event<A, R, K> {
    /// Create an empty event.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty event with room for `capacity` bindings.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bindings: Vec::with_capacity(capacity),
        }
    }

    /// Number of bound callbacks.
    pub fn count(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Number of bindings the event can hold before reallocating.
    pub fn capacity(&self) -> usize {
        self.bindings.capacity()
    }

    /// Bind `callback` under `key`, after all existing bindings.
    pub fn bind_with<F>(&mut self, key: impl Into<K>, callback: F)
    where
        F: FnMut(A) -> R + 'static,
    {
        self.bindings.push(Binding {
            key: key.into(),
            callback: Box::new(callback),
        });
    }

    /// Unbind the first binding whose key matches.
    ///
    /// Later bindings under the same key stay bound. Returns `false` and
    /// leaves the event untouched when nothing matches.
    pub fn unbind<Q>(&mut self, key: &Q) -> bool
    where
        K: PartialEq<Q>,
        Q: ?Sized,
    {
        match self.bindings.iter().position(|binding| binding.key == *key) {
            Some(index) => {
                self.bindings.remove(index);
                true
            }
            None => false,
        }
    }

    /// Whether at least one binding's key matches.
    pub fn is_bound<Q>(&self, key: &Q) -> bool
    where
        K: PartialEq<Q>,
        Q: ?Sized,
    {
        self.bindings.iter().any(|binding| binding.key == *key)
    }

    /// Unbind everything.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Bindings in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Binding<A, R, K>> {
        self.bindings.iter()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.bindings.iter().map(Binding::key)
    }
}

impl<A, R, K: BindingKey<A, R>> Event<A, R, K> {
    /// Bind a key that is its own callback.
    ///
    /// Only invocable keys (see [`BindingKey::as_callback`]) are bound. Any
    /// other key is ignored and `false` is returned; no error is raised.
    pub fn bind(&mut self, key: impl Into<K>) -> bool {
        let key = key.into();
        match key.as_callback() {
            Some(callback) => {
                self.bindings.push(Binding { key, callback });
                true
            }
            None => {
                debug!("ignoring bind of a key that is not invocable");
                false
            }
        }
    }
}

impl<A: Clone, R, K> Event<A, R, K> {
    /// Call every bound callback in order with a clone of `args`.
    ///
    /// Returns the last callback's result, or `None` when nothing is bound.
    /// A panicking callback unwinds straight through this call, so callbacks
    /// after it are not reached.
    pub fn invoke(&mut self, args: A) -> Option<R> {
        trace!(bindings = self.bindings.len(), "invoking event");
        let mut result = None;
        for binding in &mut self.bindings {
            result = Some(binding.call(args.clone()));
        }
        result
    }
}

impl<A: Clone, T, E, K> Event<A, Result<T, E>, K> {
    /// Invoke fallible callbacks, stopping at the first error.
    ///
    /// Callbacks after a failing one are not called. On success the last
    /// callback's value is returned, or `None` when nothing is bound.
    pub fn try_invoke(&mut self, args: A) -> Result<Option<T>, E> {
        trace!(bindings = self.bindings.len(), "invoking fallible event");
        let mut result = None;
        for binding in &mut self.bindings {
            result = Some(binding.call(args.clone())?);
        }
        Ok(result)
    }
}

impl<A, R, K> Default for Event<A, R, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, R, K: fmt::Debug> fmt::Debug for Event<A, R, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

impl<'a, A, R, K> IntoIterator for &'a Event<A, R, K> {
    type Item = &'a Binding<A, R, K>;
    type IntoIter = std::slice::Iter<'a, Binding<A, R, K>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// `event += key` is `event.bind(key)`.
impl<A, R, K, T> AddAssign<T> for Event<A, R, K>
where
    K: BindingKey<A, R>,
    T: Into<K>,
{
    fn add_assign(&mut self, key: T) {
        self.bind(key);
    }
}

/// `event -= key` is `event.unbind(&key)`.
impl<A, R, K, Q> SubAssign<Q> for Event<A, R, K>
where
    K: PartialEq<Q>,
{
    fn sub_assign(&mut self, key: Q) {
        self.unbind(&key);
    }
}
