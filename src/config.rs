//! Settings for the `oryx` binary, read from the process environment.

use std::path::PathBuf;

pub const LOG_VAR: &str = "ORYX_LOG";
pub const PROMPT_VAR: &str = "ORYX_PROMPT";
pub const HISTORY_VAR: &str = "ORYX_HISTORY";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// `tracing` filter directive, e.g. `oryx=debug`
    pub log_filter: String,
    pub prompt: String,
    /// Where the REPL keeps its history; none means no history is kept across runs
    pub history: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_filter: "warn".to_owned(),
            prompt: "oryx> ".to_owned(),
            history: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset and empty values keep the defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key| lookup(key).filter(|value: &String| !value.is_empty());
        let defaults = Config::default();
        Config {
            log_filter: get(LOG_VAR).unwrap_or(defaults.log_filter),
            prompt: get(PROMPT_VAR).unwrap_or(defaults.prompt),
            history: get(HISTORY_VAR).map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(Config::from_lookup(lookup(&[])), Config::default());
    }

    #[test]
    fn reads_every_setting() {
        let config = Config::from_lookup(lookup(&[
            (LOG_VAR, "oryx=trace"),
            (PROMPT_VAR, "> "),
            (HISTORY_VAR, "/tmp/oryx_history"),
        ]));
        assert_eq!(config.log_filter, "oryx=trace");
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.history, Some(PathBuf::from("/tmp/oryx_history")));
    }

    #[test]
    fn empty_values_are_unset() {
        let config = Config::from_lookup(lookup(&[(PROMPT_VAR, ""), (HISTORY_VAR, "")]));
        assert_eq!(config.prompt, "oryx> ");
        assert_eq!(config.history, None);
    }
}
