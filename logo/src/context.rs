//! Request-scoped context propagation.
//!
//! A [`Context`] is an immutable bag of values keyed by types rather than
//! strings. Each key is a type implementing [`ContextKey`]; keeping that type
//! private to a module makes its slot unreachable from anywhere else, so
//! unrelated values cannot collide. Deriving a context copies the slot table
//! and leaves the parent untouched.
//!
//! ```rust
//! use logo::context::{self, Context};
//! use logo::LogFacade;
//!
//! let logger = LogFacade::new("DEBUG", None);
//! let ctx = context::with_facade(&Context::new(), &logger);
//!
//! // ... further down the call chain
//! context::from_context(&ctx).debug("handling request", None);
//! ```

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::facade::{default_facade, LogFacade};

/// A type token identifying one slot in a [`Context`].
pub trait ContextKey: 'static {
    type Value: Any + Send + Sync;
}

/// Slot holding the bound facade
struct FacadeKey;

impl ContextKey for FacadeKey {
    type Value = LogFacade;
}

/// Immutable, cheaply cloneable request-scoped values.
#[derive(Clone, Default)]
pub struct Context {
    values: Arc<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>,
}

impl Context {
    /// An empty root context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive a context with `value` stored under `K`, replacing any value
    /// `K` already held.
    pub fn with_value<K: ContextKey>(&self, value: K::Value) -> Context {
        let mut values = (*self.values).clone();
        values.insert(TypeId::of::<K>(), Arc::new(value));
        Context {
            values: Arc::new(values),
        }
    }

    pub fn value<K: ContextKey>(&self) -> Option<&K::Value> {
        self.values
            .get(&TypeId::of::<K>())
            .and_then(|value| (**value).downcast_ref::<K::Value>())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether both handles share the same slot table.
    pub fn ptr_eq(a: &Context, b: &Context) -> bool {
        Arc::ptr_eq(&a.values, &b.values)
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.values.len())
            .field("facade", &self.value::<FacadeKey>())
            .finish()
    }
}

/// Bind `facade` to a context derived from `ctx`.
///
/// If `ctx` already carries this exact facade, `ctx` itself is returned (a
/// clone sharing its slot table) instead of a new layer.
pub fn with_facade(ctx: &Context, facade: &LogFacade) -> Context {
    if let Some(bound) = ctx.value::<FacadeKey>() {
        if LogFacade::ptr_eq(bound, facade) {
            return ctx.clone();
        }
    }
    ctx.with_value::<FacadeKey>(facade.clone())
}

/// The facade bound to `ctx`, or the shared `INFO` default if none is.
pub fn from_context(ctx: &Context) -> LogFacade {
    ctx.value::<FacadeKey>()
        .cloned()
        .unwrap_or_else(default_facade)
}

/// The facade bound to `ctx`, without falling back.
pub fn bound_facade(ctx: &Context) -> Option<&LogFacade> {
    ctx.value::<FacadeKey>()
}
