//! Source text to value tree: [`lexer`] splits it into tokens, [`parser`] builds the forms.

use std::{fs, io::Read, path::Path};

use crate::types::{
    error::{Error, OryxResult},
    value::Value,
};

pub mod lexer;
pub mod parser;

/// Read a whole program. The result is an `Array` of its top-level forms.
pub fn parse(bytes: &[u8]) -> OryxResult<Value> {
    let input = std::str::from_utf8(bytes).map_err(|err| {
        Error::syntax(
            format!("invalid UTF-8: {err}"),
            &String::from_utf8_lossy(bytes),
            err.valid_up_to(),
            1,
        )
    })?;
    parser::read_str(input)
}

pub fn parse_file(path: impl AsRef<Path>) -> OryxResult<Value> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| Error::Io {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;
    parse(&bytes)
}

pub fn parse_reader(mut read: impl Read) -> OryxResult<Value> {
    let mut bytes = Vec::new();
    read.read_to_end(&mut bytes).map_err(|err| Error::Io {
        path: "<stream>".to_owned(),
        reason: err.to_string(),
    })?;
    parse(&bytes)
}
