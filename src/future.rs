//! Deferred computations.
//!
//! A [`Future`] yields a value or an error when forced, and the value may itself be another
//! future. [`Future::force`] resolves such chains in a loop so their length never grows the
//! call stack.

use std::{
    sync::{Arc, OnceLock},
    thread,
};

use im::Vector;
use tracing::{debug, trace};

use crate::types::{
    error::{Error, OryxResult},
    value::Value,
};

type Thunk = dyn Fn() -> OryxResult<Value> + Send + Sync;

#[derive(Clone)]
pub struct Future(Arc<Thunk>);

impl Future {
    pub fn new<F>(thunk: F) -> Self
    where
        F: Fn() -> OryxResult<Value> + Send + Sync + 'static,
    {
        Future(Arc::new(thunk))
    }

    /// A future whose result is already known
    pub fn ready(result: OryxResult<Value>) -> Self {
        Future::new(move || result.clone())
    }

    /// Run the deferred operation once, without following chained futures
    pub fn step(&self) -> OryxResult<Value> {
        (self.0)()
    }

    /// Trampoline: keep stepping while the result is another future.
    ///
    /// Stops at the first error or the first value that is not a future.
    pub fn force(&self) -> OryxResult<Value> {
        let mut next = self.step();
        let mut steps = 1usize;
        loop {
            match next {
                Ok(Value::Future(future)) => {
                    next = future.step();
                    steps += 1;
                }
                done => {
                    trace!(steps, "forced future");
                    return done;
                }
            }
        }
    }

    /// Force this future on its own thread.
    ///
    /// Returns at once with a future that blocks until the spawned computation has delivered
    /// its result, then keeps returning that same result. There is no way to cancel the
    /// computation or to wait for it with a timeout.
    pub fn spawn(self) -> Future {
        let (sender, receiver) = crossbeam::channel::bounded::<OryxResult<Value>>(1);
        let spawned = thread::Builder::new()
            .name("oryx-spawn".to_owned())
            .spawn(move || {
                let result = self.force();
                debug!(ok = result.is_ok(), "spawned computation finished");
                // nobody may be waiting any more
                let _ = sender.send(result);
            });
        if let Err(err) = spawned {
            return Future::ready(Err(Error::Spawn {
                reason: err.to_string(),
            }));
        }
        debug!("spawned computation");
        let delivered = Arc::new(OnceLock::new());
        Future::new(move || {
            delivered
                .get_or_init(|| {
                    receiver.recv().unwrap_or_else(|_| {
                        Err(Error::Spawn {
                            reason: "computation ended without a result".to_owned(),
                        })
                    })
                })
                .clone()
        })
    }

    /// Annotate errors with the head of `expr`; values pass through unchanged
    pub fn trace(self, expr: &Vector<Value>) -> Future {
        let form = expr
            .front()
            .map(|head| format!("{head:?}"))
            .unwrap_or_default();
        Future::new(move || {
            self.force().map_err(|err| Error::Traced {
                form: form.clone(),
                inner: Box::new(err),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::{Duration, Instant},
    };

    use super::*;

    fn countdown(n: u64) -> Future {
        Future::new(move || {
            if n == 0 {
                Ok(Value::from(42))
            } else {
                Ok(Value::Future(countdown(n - 1)))
            }
        })
    }

    #[test]
    fn force_follows_long_chains_without_recursion() {
        assert_eq!(countdown(100_000).force(), Ok(Value::from(42)));
    }

    #[test]
    fn step_does_not_follow_chains() {
        assert!(matches!(countdown(1).step(), Ok(Value::Future(_))));
    }

    #[test]
    fn force_stops_at_first_error() {
        let failing = Future::new(|| Ok(Value::Future(Future::ready(Err(Error::EmptySequence)))));
        assert_eq!(failing.force(), Err(Error::EmptySequence));
    }

    #[test]
    fn spawn_blocks_until_the_result_arrives() {
        let start = Instant::now();
        let awaiting = Future::new(|| {
            thread::sleep(Duration::from_millis(50));
            Ok(Value::from(42))
        })
        .spawn();
        assert_eq!(awaiting.force(), Ok(Value::from(42)));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn spawned_result_is_delivered_once_and_cached() {
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let awaiting = Future::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Value::from(7))
        })
        .spawn();
        assert_eq!(awaiting.force(), Ok(Value::from(7)));
        assert_eq!(awaiting.force(), Ok(Value::from(7)));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn spawned_errors_are_redelivered_verbatim() {
        let awaiting = Future::ready(Err(Error::EmptySequence)).spawn();
        assert_eq!(awaiting.force(), Err(Error::EmptySequence));
        assert_eq!(awaiting.force(), Err(Error::EmptySequence));
    }

    #[test]
    fn spawned_chains_are_forced_to_the_end() {
        assert_eq!(countdown(10).spawn().force(), Ok(Value::from(42)));
    }

    #[test]
    fn trace_names_the_form() {
        let expr = Vector::from(vec![Value::symbol("sum"), Value::from(1)]);
        let traced = Future::ready(Err(Error::EmptySequence)).trace(&expr);
        let err = traced.force().unwrap_err();
        assert_eq!(err.to_string(), "sum<?>: empty sequence");
        assert_eq!(err.root(), &Error::EmptySequence);

        let fine = Future::ready(Ok(Value::from(3))).trace(&expr);
        assert_eq!(fine.force(), Ok(Value::from(3)));
    }
}
