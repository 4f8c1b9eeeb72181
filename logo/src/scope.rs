//! Implicit facade propagation along a call chain.
//!
//! Two scopes are available when threading a [`Context`](crate::Context)
//! through every signature is impractical:
//!
//! - thread scope: [`enter`] pushes a facade onto a thread-local stack and
//!   returns a guard that pops it when dropped;
//! - task scope: [`in_task`] binds a facade for the whole of an async task,
//!   across `.await` points and worker threads.
//!
//! [`current`] resolves the task scope first, then the innermost thread
//! scope, then the shared default facade.

use std::cell::RefCell;
use std::future::Future;
use std::marker::PhantomData;

use crate::facade::{default_facade, LogFacade};

// Thread-local stack of entered facades
thread_local! {
    static FACADE_STACK: RefCell<Vec<LogFacade>> = const { RefCell::new(Vec::new()) };
}

tokio::task_local! {
    static TASK_FACADE: LogFacade;
}

/// RAII guard that pops its facade from the thread scope when dropped.
///
/// Not `Send`: it must be dropped on the thread that entered it.
pub struct ScopeGuard {
    _not_send: PhantomData<*const ()>,
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        FACADE_STACK.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Make `facade` the current facade on this thread until the guard drops.
///
/// Usage:
/// ```
/// use logo::{scope, LogFacade};
///
/// let request_logger = LogFacade::new("DEBUG", None);
/// {
///     let _guard = scope::enter(request_logger.clone());
///     scope::current().debug("inside the request", None);
/// }
/// // The previous facade is current again here
/// ```
pub fn enter(facade: LogFacade) -> ScopeGuard {
    FACADE_STACK.with(|stack| stack.borrow_mut().push(facade));
    ScopeGuard {
        _not_send: PhantomData,
    }
}

/// Run `future` with `facade` bound as the current facade for the task.
pub async fn in_task<F>(facade: LogFacade, future: F) -> F::Output
where
    F: Future,
{
    TASK_FACADE.scope(facade, future).await
}

/// The facade in effect for the caller.
pub fn current() -> LogFacade {
    try_current().unwrap_or_else(default_facade)
}

/// The facade in effect for the caller, `None` outside any scope.
pub fn try_current() -> Option<LogFacade> {
    TASK_FACADE
        .try_with(LogFacade::clone)
        .ok()
        .or_else(|| FACADE_STACK.with(|stack| stack.borrow().last().cloned()))
}

/// Number of facades entered on this thread.
pub fn depth() -> usize {
    FACADE_STACK.with(|stack| stack.borrow().len())
}
