//! This module holds all functionality for the REPL (Read-Eval-Print-Loop).

use rustyline::{error::ReadlineError, DefaultEditor};
use tracing::{debug, warn};

use crate::{
    config::Config,
    env::Env,
    eval::eval_bytes,
    last,
    types::{error::Error, value::Value},
};

/// Read and evaluate one line in `env`. A line holding no forms has nothing to print.
pub fn rep(line: &str, env: &Env) -> Result<Option<Value>, Error> {
    match eval_bytes(line.as_bytes(), env).and_then(last) {
        Err(Error::EmptySequence) => Ok(None),
        other => other.map(Some),
    }
}

/// Runs the repl until end of input. Definitions persist between lines.
pub fn repl(config: &Config, env: &Env) -> rustyline::Result<()> {
    let mut rl = DefaultEditor::new()?;
    if let Some(history) = &config.history {
        // a missing file is normal on the first run
        if let Err(err) = rl.load_history(history) {
            debug!(path = %history.display(), %err, "no history loaded");
        }
    }
    loop {
        let line = match rl.readline(&config.prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => return Err(err),
        };
        if line.trim().is_empty() {
            continue;
        }
        rl.add_history_entry(line.as_str())?;
        match rep(&line, env) {
            Ok(Some(value)) => println!("{value}"),
            Ok(None) => {}
            Err(err) => eprintln!("{:?}", miette::Report::new(err)),
        }
    }
    if let Some(history) = &config.history {
        if let Err(err) = rl.save_history(history) {
            warn!(path = %history.display(), %err, "could not save history");
        }
    }
    Ok(())
}
