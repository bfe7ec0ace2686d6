//! This module contains all the types used within the program.
//! There are three sub modules: value, function and error.

pub mod error;
pub mod function;
pub mod value;

pub use error::{Error, OryxResult};
pub use function::Callable;
pub use value::{Number, Position, Symbol, Value};
