//! The builtin library: arithmetic, comparison, logic and definition.
//!
//! Every builtin receives the whole invocation, head included, and evaluates its own
//! arguments. That is what lets `and`/`or` stop early and `def!` leave its body unevaluated.

use im::Vector;
use tracing::debug;

use crate::{
    env::Env,
    eval::{evaluate, lazy_evaluate},
    future::Future,
    types::{
        error::{Error, OryxResult},
        value::{Number, QuoRemError, Value},
    },
};

/// A builtin operation, before it is wrapped as a [`Callable`](crate::types::Callable)
pub type Builtin = fn(&Vector<Value>, &Env) -> OryxResult<Value>;

/// Debug rendering of the invocation's head, used to name the form in errors
fn form(expr: &Vector<Value>) -> String {
    expr.front()
        .map(|head| format!("{head:?}"))
        .unwrap_or_default()
}

/// Fails unless `expr` has exactly `n` elements, head included
pub fn exact_arity(expr: &Vector<Value>, n: usize) -> OryxResult<()> {
    if expr.len() == n {
        return Ok(());
    }
    Err(Error::Arity {
        form: form(expr),
        wanted: n.saturating_sub(1),
        got: expr.len().saturating_sub(1),
    })
}

/// Fails unless `expr` has at least `n` elements, head included
pub fn min_arity(expr: &Vector<Value>, n: usize) -> OryxResult<()> {
    if expr.len() >= n {
        return Ok(());
    }
    Err(Error::MinArity {
        form: form(expr),
        wanted: n.saturating_sub(1),
        got: expr.len().saturating_sub(1),
    })
}

/// Evaluate `expr[i]`, which has to come out as a number
pub fn as_number(expr: &Vector<Value>, i: usize, env: &Env) -> OryxResult<Number> {
    match evaluate(expr.get(i).unwrap_or(&Value::Null), env)? {
        Value::Number(n) => Ok(n),
        other => Err(Error::Type {
            form: form(expr),
            reason: format!("called with non-number {other:?}"),
        }),
    }
}

/// All arguments as numbers, evaluated left to right
fn numbers(expr: &Vector<Value>, env: &Env) -> OryxResult<Vec<Number>> {
    (1..expr.len()).map(|i| as_number(expr, i, env)).collect()
}

fn add(expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
    let sum = numbers(expr, env)?
        .iter()
        .fold(Number::zero(), |acc, n| &acc + n);
    Ok(sum.into())
}

fn sub(expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
    let nums = numbers(expr, env)?;
    let Some((first, rest)) = nums.split_first() else {
        return Ok(Number::zero().into());
    };
    Ok(rest.iter().fold(first.clone(), |acc, n| &acc - n).into())
}

fn mul(expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
    let product = numbers(expr, env)?
        .iter()
        .fold(Number::one(), |acc, n| &acc * n);
    Ok(product.into())
}

fn div(expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
    let nums = numbers(expr, env)?;
    let Some((first, rest)) = nums.split_first() else {
        return Ok(Number::one().into());
    };
    rest.iter()
        .try_fold(first.clone(), |acc, n| acc.checked_div(n))
        .map(Value::Number)
        .ok_or_else(|| Error::DivisionByZero { form: form(expr) })
}

/// `(op a b scale)`, shared by `quo` and `rem`
fn quo_rem(expr: &Vector<Value>, env: &Env) -> OryxResult<(Number, Number)> {
    exact_arity(expr, 4)?;
    let dividend = as_number(expr, 1, env)?;
    let divisor = as_number(expr, 2, env)?;
    let scale = as_number(expr, 3, env)?;
    let places = scale
        .integer_part()
        .filter(|places| i32::try_from(*places).is_ok())
        .ok_or_else(|| Error::Type {
            form: form(expr),
            reason: format!("scale {scale} out of range"),
        })?;
    dividend
        .quo_rem(&divisor, places)
        .map_err(|err| match err {
            QuoRemError::DivisionByZero => Error::DivisionByZero { form: form(expr) },
            QuoRemError::ScaleOutOfRange => Error::Type {
                form: form(expr),
                reason: format!("scale {scale} out of range"),
            },
        })
}

fn quo(expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
    quo_rem(expr, env).map(|(quotient, _)| quotient.into())
}

fn rem(expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
    quo_rem(expr, env).map(|(_, remainder)| remainder.into())
}

fn compare(
    expr: &Vector<Value>,
    env: &Env,
    holds: fn(&Number, &Number) -> bool,
) -> OryxResult<Value> {
    exact_arity(expr, 3)?;
    let left = as_number(expr, 1, env)?;
    let right = as_number(expr, 2, env)?;
    Ok(holds(&left, &right).into())
}

fn lt(expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
    compare(expr, env, |a, b| a < b)
}

fn lteq(expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
    compare(expr, env, |a, b| a <= b)
}

fn gt(expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
    compare(expr, env, |a, b| a > b)
}

fn gteq(expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
    compare(expr, env, |a, b| a >= b)
}

/// First argument against each of the others, stopping at the first mismatch
fn equal(expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
    min_arity(expr, 3)?;
    let first = evaluate(&expr[1], env)?;
    for item in expr.iter().skip(2) {
        if evaluate(item, env)? != first {
            return Ok(false.into());
        }
    }
    Ok(true.into())
}

fn nequal(expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
    exact_arity(expr, 3)?;
    let left = evaluate(&expr[1], env)?;
    let right = evaluate(&expr[2], env)?;
    Ok((left != right).into())
}

/// Falsy arguments stop `and`, truthy ones stop `or`.
///
/// The last argument is never evaluated here: it comes back deferred, so a chain of
/// `and`/`or` in tail position is forced by the trampoline instead of nesting calls.
fn short_circuit(
    expr: &Vector<Value>,
    env: &Env,
    stops: fn(&Value) -> bool,
    empty: bool,
) -> OryxResult<Value> {
    let Some(last) = expr.back().filter(|_| expr.len() > 1) else {
        return Ok(empty.into());
    };
    for arg in expr.iter().skip(1).take(expr.len() - 2) {
        let value = evaluate(arg, env)?;
        if stops(&value) {
            return Ok(value);
        }
    }
    Ok(Value::Future(lazy_evaluate(last.clone(), env.clone())))
}

fn and(expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
    short_circuit(expr, env, Value::is_falsy, true)
}

fn or(expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
    short_circuit(expr, env, |value| !value.is_falsy(), false)
}

fn not(expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
    exact_arity(expr, 2)?;
    Ok(evaluate(&expr[1], env)?.is_falsy().into())
}

/// Bind a symbol in the calling scope to its deferred definition
fn def(expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
    exact_arity(expr, 3)?;
    let Value::Symbol(symbol) = &expr[1] else {
        return Err(Error::Type {
            form: form(expr),
            reason: format!("called with non-symbol {} {:?}", expr[1].type_name(), expr[1]),
        });
    };
    // the binding lives in `env`, so it may only hold `env` weakly
    let scope = env.downgrade();
    let body = expr[2].clone();
    let name = symbol.name.clone();
    env.set(
        &symbol.name,
        Value::Future(Future::new(move || match scope.upgrade() {
            Some(env) => lazy_evaluate(body.clone(), env).step(),
            None => Err(Error::ScopeDropped {
                symbol: name.clone(),
            }),
        })),
    );
    debug!(symbol = %symbol.name, "defined");
    Ok(Value::Null)
}

/// Evaluate the argument on its own thread; forcing the result waits for it
fn go(expr: &Vector<Value>, env: &Env) -> OryxResult<Value> {
    exact_arity(expr, 2)?;
    Ok(Value::Future(
        lazy_evaluate(expr[1].clone(), env.clone()).spawn(),
    ))
}

macro_rules! core_fns {
    ($($func:ident as $($name:literal)|+),+ $(,)?) => {
        vec![$((&[$($name),+] as &'static [&'static str], $func as Builtin)),+]
    };
}

/// Every builtin with the names it is bound under
pub fn base_lib() -> Vec<(&'static [&'static str], Builtin)> {
    core_fns![
        add as "+" | "add",
        sub as "-" | "sub",
        mul as "*" | "mul",
        div as "/" | "div",
        quo as "quo",
        rem as "rem",
        lt as "<" | "lt?",
        lteq as "<=" | "lteq?",
        gt as ">" | "gt?",
        gteq as ">=" | "gteq?",
        equal as "==" | "equal?",
        nequal as "!=",
        and as "&&" | "and",
        or as "||" | "or",
        not as "!" | "not",
        def as ":=" | "def!",
        go as "go",
    ]
}

/// A fresh scope, nested in `outer`, holding the builtin library
pub fn base_env(outer: Option<Env>) -> Env {
    Env::with_builtins(outer, base_lib())
}
