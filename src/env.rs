//! Lexical scopes.
//!
//! Each [`Env`] owns its own bindings and points at the scope it is nested in. Lookups walk
//! outward; bindings only ever go into the current scope.

use std::{
    collections::HashMap,
    mem,
    sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak},
    thread::{self, ThreadId},
};

use tracing::debug;

use crate::{
    core::Builtin,
    future::Future,
    types::{
        error::{Error, OryxResult},
        value::{Symbol, Value},
        Callable,
    },
};

#[derive(Debug)]
pub struct EnvStruct {
    outer: Option<Env>,
    data: HashMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct Env(Arc<Mutex<EnvStruct>>);

/// A handle that does not keep its scope alive
#[derive(Debug, Clone)]
pub struct WeakEnv(Weak<Mutex<EnvStruct>>);

impl WeakEnv {
    pub fn upgrade(&self) -> Option<Env> {
        self.0.upgrade().map(Env)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // bindings stay consistent even if a holder panicked mid-insert
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Env {
    pub fn new(outer: Option<Env>) -> Self {
        Env(Arc::new(Mutex::new(EnvStruct {
            outer,
            data: HashMap::default(),
        })))
    }

    /// A scope holding every builtin of `table`, bound under each of its names.
    ///
    /// Aliases share one callable, named after the last name listed.
    pub fn with_builtins(
        outer: Option<Env>,
        table: Vec<(&'static [&'static str], Builtin)>,
    ) -> Self {
        let env = Env::new(outer);
        for (names, func) in table {
            let callable = Callable::new(names.last().copied().unwrap_or_default(), func);
            for name in names {
                env.set(name, Value::Func(callable.clone()));
            }
        }
        env
    }

    /// For deferred work stored inside this scope, which must not own it
    pub fn downgrade(&self) -> WeakEnv {
        WeakEnv(Arc::downgrade(&self.0))
    }

    pub fn outer(&self) -> Option<Env> {
        lock(&self.0).outer.clone()
    }

    /// Whether `name` is bound here or in an enclosing scope
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        let mut scope = self.clone();
        loop {
            let outer = {
                let ctx = lock(&scope.0);
                if let Some(value) = ctx.data.get(name) {
                    return Some(value.clone());
                }
                ctx.outer.clone()
            };
            scope = outer?;
        }
    }

    /// The value bound to `symbol` in the nearest scope that binds it.
    ///
    /// The stored value is returned as is, so it may be a future nobody has forced yet.
    pub fn get(&self, symbol: &Symbol) -> OryxResult<Value> {
        self.lookup(&symbol.name).ok_or_else(|| Error::NotFound {
            symbol: format!("{symbol:?}"),
        })
    }

    /// Bind `name` in this scope, replacing any earlier binding here.
    ///
    /// A future is stored behind a memoizing wrapper: the first force runs it and rebinds
    /// `name` to the plain result, so later lookups never force it again.
    pub fn set(&self, name: &str, value: Value) {
        let value = match value {
            Value::Future(deferred) => Value::Future(self.memoize(name, deferred)),
            other => other,
        };
        lock(&self.0).data.insert(name.to_owned(), value);
    }

    fn memoize(&self, name: &str, deferred: Future) -> Future {
        let binding = Arc::new(Binding {
            state: Mutex::new(State::Pending(deferred)),
            ready: Condvar::new(),
        });
        let name = name.to_owned();
        let scope = self.downgrade();
        Future::new(move || binding.force(&name, &scope))
    }
}

/// Progress of a deferred binding
enum State {
    Pending(Future),
    Forcing(ThreadId),
    Ready(OryxResult<Value>),
}

/// Shared by every copy of a memoized binding's future.
///
/// Forcers on other threads wait for the first one and receive its result, so the deferred
/// expression runs exactly once.
struct Binding {
    state: Mutex<State>,
    ready: Condvar,
}

impl Binding {
    fn force(&self, name: &str, scope: &WeakEnv) -> OryxResult<Value> {
        let me = thread::current().id();
        let mut state = lock(&self.state);
        let deferred = loop {
            let waiting = match &*state {
                State::Ready(result) => return result.clone(),
                State::Forcing(owner) if *owner == me => {
                    return Err(Error::Cycle {
                        symbol: name.to_owned(),
                    })
                }
                State::Forcing(_) => true,
                State::Pending(_) => false,
            };
            if waiting {
                state = self.ready.wait(state).unwrap_or_else(PoisonError::into_inner);
            } else if let State::Pending(deferred) = mem::replace(&mut *state, State::Forcing(me)) {
                break deferred;
            }
        };
        drop(state);

        let guard = ResetOnUnwind {
            binding: self,
            deferred,
        };
        let result = guard.deferred.force();
        drop(guard);
        if let (Ok(value), Some(scope)) = (&result, scope.upgrade()) {
            debug!(symbol = name, "memoized deferred binding");
            lock(&scope.0).data.insert(name.to_owned(), value.clone());
        }
        *lock(&self.state) = State::Ready(result.clone());
        self.ready.notify_all();
        result
    }
}

/// Puts a binding back to pending when its forcer panics, and wakes the waiters to retry it
struct ResetOnUnwind<'a> {
    binding: &'a Binding,
    deferred: Future,
}

impl Drop for ResetOnUnwind<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            *lock(&self.binding.state) = State::Pending(self.deferred.clone());
            self.binding.ready.notify_all();
        }
    }
}
