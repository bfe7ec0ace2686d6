//! The evaluator: turns a value, read as a program, into a resolved value.

use std::{io::Read, iter::once, path::Path};

use im::{OrdMap, Vector};
use tracing::trace;

use crate::{
    env::Env,
    future::Future,
    reader,
    types::{error::OryxResult, value::Value},
};

pub fn eval_bytes(bytes: &[u8], env: &Env) -> OryxResult<Value> {
    let program = reader::parse(bytes)?;
    evaluate(&program, env)
}

pub fn eval_file(path: impl AsRef<Path>, env: &Env) -> OryxResult<Value> {
    let program = reader::parse_file(path)?;
    evaluate(&program, env)
}

pub fn eval_reader(read: impl Read, env: &Env) -> OryxResult<Value> {
    let program = reader::parse_reader(read)?;
    evaluate(&program, env)
}

/// Eager evaluation: forces the lazy evaluation to its final value
pub fn evaluate(value: &Value, env: &Env) -> OryxResult<Value> {
    lazy_evaluate(value.clone(), env.clone()).force()
}

/// Lazy evaluation: nothing runs until the returned future is forced
pub fn lazy_evaluate(value: Value, env: Env) -> Future {
    Future::new(move || eval_ast(&value, &env))
}

fn eval_ast(value: &Value, env: &Env) -> OryxResult<Value> {
    match value {
        // may be a deferred binding, left for the trampoline
        Value::Symbol(sym) => env.get(sym),
        Value::Array(items) => items
            .iter()
            .map(|item| evaluate(item, env))
            .collect::<OryxResult<Vector<_>>>()
            .map(Value::Array),
        Value::Map(entries) => entries
            .iter()
            .map(|(key, item)| Ok((key.clone(), evaluate(item, env)?)))
            .collect::<OryxResult<OrdMap<_, _>>>()
            .map(Value::Map),
        Value::Expr(items) => {
            let Some(head) = items.front() else {
                return Ok(Value::Null);
            };
            match evaluate(head, env)? {
                Value::Func(func) => {
                    trace!(form = func.name(), "deferred call");
                    Ok(Value::Future(func.as_future(items.clone(), env.clone())))
                }
                // not a call: plain data, evaluated like an array
                head => once(Ok(head))
                    .chain(items.iter().skip(1).map(|item| evaluate(item, env)))
                    .collect::<OryxResult<Vector<_>>>()
                    .map(Value::Array),
            }
        }
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use test_case::test_case;

    use super::*;
    use crate::types::{error::Error, Callable};

    fn env_with_counter() -> (Env, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let env = Env::new(None);
        env.set(
            "count",
            Value::Func(Callable::new("count", move |expr, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Value::from(i64::try_from(expr.len()).unwrap_or(-1)))
            })),
        );
        env.set("one", Value::from(1));
        (env, calls)
    }

    #[test_case(Value::Null ; "null")]
    #[test_case(Value::from(true) ; "boolean")]
    #[test_case(Value::from(3) ; "number")]
    #[test_case(Value::string("text") ; "string")]
    #[test_case(Value::Operator("+".to_owned()) ; "operator")]
    fn atoms_evaluate_to_themselves(value: Value) {
        let (env, _) = env_with_counter();
        assert_eq!(evaluate(&value, &env), Ok(value));
    }

    #[test]
    fn empty_expr_is_null() {
        let (env, _) = env_with_counter();
        assert_eq!(evaluate(&Value::expr([]), &env), Ok(Value::Null));
    }

    #[test]
    fn symbols_resolve_through_the_environment() {
        let (env, _) = env_with_counter();
        assert_eq!(evaluate(&Value::symbol("one"), &env), Ok(Value::from(1)));
        assert!(matches!(
            evaluate(&Value::symbol("two"), &env),
            Err(Error::NotFound { .. })
        ));
    }

    #[test]
    fn arrays_and_maps_evaluate_their_elements() {
        let (env, _) = env_with_counter();
        let array = Value::array([Value::symbol("one"), Value::expr([Value::symbol("count")])]);
        assert_eq!(
            evaluate(&array, &env),
            Ok(Value::array([Value::from(1), Value::from(1)]))
        );
        let map = Value::Map(OrdMap::unit("k".to_owned(), Value::symbol("one")));
        assert_eq!(
            evaluate(&map, &env),
            Ok(Value::Map(OrdMap::unit("k".to_owned(), Value::from(1))))
        );
    }

    #[test]
    fn array_evaluation_stops_at_the_first_error() {
        let (env, calls) = env_with_counter();
        let array = Value::array([
            Value::symbol("missing"),
            Value::expr([Value::symbol("count")]),
        ]);
        assert!(evaluate(&array, &env).is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn callables_receive_the_unevaluated_form() {
        let env = Env::new(None);
        env.set(
            "quote",
            Value::Func(Callable::new("quote", |expr, _| Ok(Value::Expr(expr.clone())))),
        );
        let form = Value::expr([Value::symbol("quote"), Value::symbol("unbound")]);
        assert_eq!(evaluate(&form, &env), Ok(form));
    }

    #[test]
    fn calls_are_deferred_until_forced() {
        let (env, calls) = env_with_counter();
        let call = lazy_evaluate(Value::expr([Value::symbol("count"), Value::Null]), env);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        let deferred = call.step();
        assert!(matches!(deferred, Ok(Value::Future(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(call.force(), Ok(Value::from(2)));
    }

    #[test]
    fn non_callable_head_makes_data() {
        let (env, _) = env_with_counter();
        let form = Value::expr([Value::from(1), Value::symbol("one"), Value::string("x")]);
        assert_eq!(
            evaluate(&form, &env),
            Ok(Value::array([Value::from(1), Value::from(1), Value::string("x")]))
        );
    }

    #[test]
    fn head_is_evaluated_once() {
        let (env, calls) = env_with_counter();
        let form = Value::expr([Value::expr([Value::symbol("count")]), Value::from(2)]);
        assert_eq!(
            evaluate(&form, &env),
            Ok(Value::array([Value::from(1), Value::from(2)]))
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn eval_bytes_reads_then_evaluates() {
        let (env, _) = env_with_counter();
        assert_eq!(
            eval_bytes(b"one (count 1 2)", &env),
            Ok(Value::array([Value::from(1), Value::from(3)]))
        );
    }

    #[test]
    fn eval_reader_reads_a_stream() {
        let (env, _) = env_with_counter();
        let source: &[u8] = b"[one]";
        assert_eq!(
            eval_reader(source, &env),
            Ok(Value::array([Value::array([Value::from(1)])]))
        );
    }
}
