//! Units of work and their registration
//!
//! A [`Work`] is the function a child process runs. Candidates for
//! registration are [`Callable`]s: either a function value, which is always
//! invokable, or a name looked up in the process-wide work scope. A name is
//! invokable only if it was registered for the same argument type.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, RwLock};

use tracing::debug;

use crate::utils::{with_read_lock, with_write_lock};

type WorkFn<A> = dyn Fn(A) + Send + Sync;

/// Named functions visible to `Callable::Named`, keyed by name
static WORK_SCOPE: LazyLock<RwLock<HashMap<String, Box<dyn Any + Send + Sync>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// A function to run in a child process with arguments of type `A`
///
/// `A` is the positional argument tuple, e.g. `(i32, i32, i32)`, or `()`.
pub struct Work<A> {
    name: Option<String>,
    func: Arc<WorkFn<A>>,
}

impl<A> Work<A> {
    /// Wrap a function value
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Self {
            name: None,
            func: Arc::new(f),
        }
    }

    /// Name the work was registered under, if it came from the work scope
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether both values refer to the same underlying function
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.func), Arc::as_ptr(&other.func))
    }

    pub(crate) fn call(&self, args: A) {
        (self.func)(args)
    }
}

impl<A> Clone for Work<A> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            func: Arc::clone(&self.func),
        }
    }
}

impl<A> fmt::Debug for Work<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Work")
            .field("name", &self.name)
            .field("func", &Arc::as_ptr(&self.func))
            .finish()
    }
}

/// A candidate for registration on a process handle
#[derive(Debug, Clone)]
pub enum Callable<A> {
    /// A function value
    Func(Work<A>),
    /// A name to resolve in the work scope
    Named(String),
}

impl<A: 'static> Callable<A> {
    /// Candidate from a function value
    pub fn func<F>(f: F) -> Self
    where
        F: Fn(A) + Send + Sync + 'static,
    {
        Callable::Func(Work::new(f))
    }

    /// Candidate from a registered name
    pub fn named<S: Into<String>>(name: S) -> Self {
        Callable::Named(name.into())
    }

    /// Resolve to a runnable work, or `None` if not invokable
    pub fn resolve(&self) -> Option<Work<A>> {
        match self {
            Callable::Func(work) => Some(work.clone()),
            Callable::Named(name) => lookup_work(name),
        }
    }

    pub(crate) fn name(&self) -> Option<&str> {
        match self {
            Callable::Func(work) => work.name(),
            Callable::Named(name) => Some(name),
        }
    }
}

impl<A> From<Work<A>> for Callable<A> {
    fn from(work: Work<A>) -> Self {
        Callable::Func(work)
    }
}

/// Whether `candidate` can be run with arguments of type `A`
///
/// Pure check with no side effects; usable without a handle.
pub fn is_invokable<A: 'static>(candidate: &Callable<A>) -> bool {
    candidate.resolve().is_some()
}

/// Register a named function in the work scope
///
/// Replaces any function previously registered under the same name, whatever
/// its argument type. Returns `true` if a previous entry was replaced.
pub fn register_work<A, F>(name: &str, f: F) -> bool
where
    A: 'static,
    F: Fn(A) + Send + Sync + 'static,
{
    let work = Work {
        name: Some(name.to_string()),
        func: Arc::new(f) as Arc<WorkFn<A>>,
    };
    let replaced = with_write_lock(&WORK_SCOPE, |scope| {
        scope
            .insert(name.to_string(), Box::new(work) as Box<dyn Any + Send + Sync>)
            .is_some()
    });
    debug!("Registered work {:?} (replaced: {})", name, replaced);
    replaced
}

/// Remove a named function from the work scope
///
/// Handles that already resolved the name keep their work.
pub fn unregister_work(name: &str) -> bool {
    with_write_lock(&WORK_SCOPE, |scope| scope.remove(name).is_some())
}

/// Whether any function is registered under `name`
pub fn is_registered(name: &str) -> bool {
    with_read_lock(&WORK_SCOPE, |scope| scope.contains_key(name))
}

fn lookup_work<A: 'static>(name: &str) -> Option<Work<A>> {
    with_read_lock(&WORK_SCOPE, |scope| {
        scope
            .get(name)
            .and_then(|entry| entry.downcast_ref::<Work<A>>())
            .cloned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_function_value_is_invokable() {
        let candidate = Callable::func(|(): ()| {});
        assert!(is_invokable(&candidate));
    }

    #[test]
    fn test_unknown_name_is_not_invokable() {
        let candidate = Callable::<()>::named("work_test_never_registered");
        assert!(!is_invokable(&candidate));
    }

    #[test]
    fn test_named_resolution_checks_argument_type() {
        register_work("work_test_sum3", |(a, b, c): (i32, i32, i32)| {
            let _ = a + b + c;
        });

        assert!(is_invokable(&Callable::<(i32, i32, i32)>::named("work_test_sum3")));
        assert!(!is_invokable(&Callable::<(i32, i32)>::named("work_test_sum3")));
        assert!(!is_invokable(&Callable::<()>::named("work_test_sum3")));
    }

    #[test]
    fn test_resolved_work_runs_registered_function() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        register_work("work_test_counter", move |n: usize| {
            counter.fetch_add(n, Ordering::SeqCst);
        });

        let work = Callable::<usize>::named("work_test_counter")
            .resolve()
            .unwrap();
        assert_eq!(work.name(), Some("work_test_counter"));
        work.call(3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_register_replace_and_unregister() {
        assert!(!register_work("work_test_replace", |(): ()| {}));
        let first = Callable::<()>::named("work_test_replace").resolve().unwrap();
        assert!(register_work("work_test_replace", |(): ()| {}));
        let second = Callable::<()>::named("work_test_replace").resolve().unwrap();
        assert!(!first.ptr_eq(&second));

        assert!(unregister_work("work_test_replace"));
        assert!(!is_registered("work_test_replace"));
        assert!(!unregister_work("work_test_replace"));

        // Already-resolved work survives unregistration
        first.call(());
    }

    #[test]
    fn test_clone_shares_function() {
        let work = Work::new(|_: u8| {});
        let copy = work.clone();
        assert!(work.ptr_eq(&copy));
        assert!(!work.ptr_eq(&Work::new(|_: u8| {})));
    }
}
