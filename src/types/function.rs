use std::{fmt, sync::Arc};

use im::Vector;

use crate::{env::Env, future::Future};

use super::{error::OryxResult, value::Value};

/// Native operation behind a [`Callable`]: receives the whole invocation `(head args..)`
/// unevaluated, plus the calling environment.
pub type NativeFn = dyn Fn(&Vector<Value>, &Env) -> OryxResult<Value> + Send + Sync;

#[derive(Clone)]
/// These are values which can be applied.
///
/// A callable decides itself which arguments to evaluate and when, which is what lets
/// `and`/`or` short-circuit and `def!` defer its body.
pub struct Callable {
    name: Arc<str>,
    func: Arc<NativeFn>,
}

impl Callable {
    pub fn new<F>(name: impl Into<Arc<str>>, func: F) -> Self
    where
        F: Fn(&Vector<Value>, &Env) -> OryxResult<Value> + Send + Sync + 'static,
    {
        Callable {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn call(&self, expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
        (self.func)(expr, env)
    }

    /// Defer the call until forced
    pub fn as_future(&self, expr: Vector<Value>, env: Env) -> Future {
        let callable = self.clone();
        Future::new(move || callable.call(&expr, &env))
    }

    /// Same underlying operation, however many names it is bound under
    pub fn ptr_eq(&self, other: &Callable) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.func).cast::<u8>(),
            Arc::as_ptr(&other.func).cast::<u8>(),
        )
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#<fn {}>", self.name)
    }
}
