//! oryx: a small embeddable expression language.
//!
//! Source text is read into a tree of [`Value`]s and evaluated against a chain of [`Env`]
//! scopes. Calls are deferred as [`Future`]s and resolved by a trampoline, so arbitrarily long
//! tail chains never grow the stack.
//!
//! ```no_run
//! let value = oryx::do_string("(def! x 0.1) (add x 0.2)", None)?;
//! assert_eq!(value.to_string(), "0.3");
//! # Ok::<(), oryx::Error>(())
//! ```

use std::{io::Read, path::Path};

pub mod config;
pub mod core;
pub mod env;
pub mod eval;
pub mod future;
pub mod printer;
pub mod reader;
pub mod repl;
pub mod types;

pub use crate::{
    core::base_env,
    env::Env,
    eval::evaluate,
    future::Future,
    types::{Callable, Error, Number, OryxResult, Position, Symbol, Value},
};

/// The last value of a program, or the value itself if it is not a sequence
pub fn last(value: Value) -> OryxResult<Value> {
    match value {
        Value::Array(mut items) => items.pop_back().ok_or(Error::EmptySequence),
        other => Ok(other),
    }
}

/// Read and evaluate `input`, returning its last value.
///
/// The program runs in a fresh scope holding the builtins, nested in `env` when one is given.
/// Its definitions land in that fresh scope, so `env` is only read. To keep definitions across
/// calls, evaluate into a scope of your own with [`eval::eval_bytes`].
pub fn do_string(input: &str, env: Option<Env>) -> OryxResult<Value> {
    eval::eval_bytes(input.as_bytes(), &base_env(env)).and_then(last)
}

pub fn do_file(path: impl AsRef<Path>, env: Option<Env>) -> OryxResult<Value> {
    eval::eval_file(path, &base_env(env)).and_then(last)
}

pub fn do_reader(read: impl Read, env: Option<Env>) -> OryxResult<Value> {
    eval::eval_reader(read, &base_env(env)).and_then(last)
}
