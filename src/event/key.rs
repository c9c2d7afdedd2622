//! Binding keys.
//!
//! Every binding in an [`Event`](super::Event) carries a key that is used to
//! find it again with `unbind` and `is_bound`. A key may itself be invocable,
//! in which case it can be bound on its own and serves as its own callback.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

/// Boxed callback stored in a binding.
pub type Callback<A, R> = Box<dyn FnMut(A) -> R>;

/// Trait for values usable as binding keys.
///
/// Keys are compared with `PartialEq`. A key that is also invocable returns
/// a callback from [`as_callback`](BindingKey::as_callback), which lets it be
/// bound without a separate callback.
///
/// Default implementation returns `None` (the key is a plain identifier).
pub trait BindingKey<A, R>: PartialEq {
    /// Callback to bind when this key is bound on its own.
    fn as_callback(&self) -> Option<Callback<A, R>> {
        None
    }
}

macro_rules! plain_keys {
    ($($ty:ty),* $(,)?) => {
        $(impl<A, R> BindingKey<A, R> for $ty {})*
    };
}

plain_keys!(&'static str, String, char, u32, u64, usize, i32, i64);

/// Shared, comparable callback handle.
///
/// Clones of a handler compare equal to each other and to nothing else, so a
/// handler can be bound by itself and later unbound with a clone.
///
/// # Example
///
/// ```rust
/// use tickstate::event::{Event, Handler};
///
/// let double = Handler::new(|x: i32| x * 2);
/// let mut event: Event<i32, i32> = Event::new();
///
/// event += double.clone();
/// assert_eq!(event.invoke(21), Some(42));
///
/// event -= double;
/// assert!(event.is_empty());
/// ```
pub struct Handler<A, R> {
    inner: Rc<dyn Fn(A) -> R>,
}

impl<A, R> Handler<A, R> {
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(A) -> R + 'static,
    {
        Self {
            inner: Rc::new(callback),
        }
    }

    /// Call the wrapped function directly.
    pub fn call(&self, args: A) -> R {
        (self.inner)(args)
    }
}

impl<A, R> Clone for Handler<A, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<A, R> PartialEq for Handler<A, R> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<A, R> fmt::Debug for Handler<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler")
            .field(&Rc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}

impl<A: 'static, R: 'static> BindingKey<A, R> for Handler<A, R> {
    fn as_callback(&self) -> Option<Callback<A, R>> {
        let handler = self.clone();
        Some(Box::new(move |args| handler.call(args)))
    }
}

/// Default key type for events that mix named bindings and handlers.
///
/// Converts from `&'static str`, `String`, `u64` and [`Handler`], and compares
/// against the same types so lookups need no explicit conversion:
///
/// ```rust
/// use tickstate::event::Event;
///
/// let mut event: Event<(), &'static str> = Event::new();
/// event.bind_with("greet", |_| "hello");
///
/// assert!(event.is_bound("greet"));
/// assert!(!event.is_bound("farewell"));
/// ```
pub enum Key<A, R> {
    Name(Cow<'static, str>),
    Id(u64),
    Handler(Handler<A, R>),
}

impl<A, R> Key<A, R> {
    pub fn is_handler(&self) -> bool {
        matches!(self, Self::Handler(_))
    }
}

impl<A, R> Clone for Key<A, R> {
    fn clone(&self) -> Self {
        match self {
            Self::Name(name) => Self::Name(name.clone()),
            Self::Id(id) => Self::Id(*id),
            Self::Handler(handler) => Self::Handler(handler.clone()),
        }
    }
}

impl<A, R> fmt::Debug for Key<A, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Id(id) => f.debug_tuple("Id").field(id).finish(),
            Self::Handler(handler) => handler.fmt(f),
        }
    }
}

impl<A, R> PartialEq for Key<A, R> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Name(a), Self::Name(b)) => a == b,
            (Self::Id(a), Self::Id(b)) => a == b,
            (Self::Handler(a), Self::Handler(b)) => a == b,
            _ => false,
        }
    }
}

impl<A, R> PartialEq<str> for Key<A, R> {
    fn eq(&self, other: &str) -> bool {
        matches!(self, Self::Name(name) if name == other)
    }
}

impl<A, R> PartialEq<&str> for Key<A, R> {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

impl<A, R> PartialEq<u64> for Key<A, R> {
    fn eq(&self, other: &u64) -> bool {
        matches!(self, Self::Id(id) if id == other)
    }
}

impl<A, R> PartialEq<Handler<A, R>> for Key<A, R> {
    fn eq(&self, other: &Handler<A, R>) -> bool {
        matches!(self, Self::Handler(handler) if handler == other)
    }
}

impl<A, R> From<&'static str> for Key<A, R> {
    fn from(name: &'static str) -> Self {
        Self::Name(Cow::Borrowed(name))
    }
}

impl<A, R> From<String> for Key<A, R> {
    fn from(name: String) -> Self {
        Self::Name(Cow::Owned(name))
    }
}

impl<A, R> From<u64> for Key<A, R> {
    fn from(id: u64) -> Self {
        Self::Id(id)
    }
}

impl<A, R> From<Handler<A, R>> for Key<A, R> {
    fn from(handler: Handler<A, R>) -> Self {
        Self::Handler(handler)
    }
}

impl<A: 'static, R: 'static> BindingKey<A, R> for Key<A, R> {
    fn as_callback(&self) -> Option<Callback<A, R>> {
        match self {
            Self::Handler(handler) => handler.as_callback(),
            Self::Name(_) | Self::Id(_) => None,
        }
    }
}
