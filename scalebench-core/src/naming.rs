//! File Naming Convention
//!
//! Study files are named `<prefix>_cores<N>.<ext>` or `<prefix>_cores<N>_run<R>.<ext>`.
//! Matching happens in two steps: a coarse pattern decides whether a name is
//! part of the study at all, then the tokens are parsed. A name that passes the
//! coarse pattern but carries unusable tokens is malformed, not ignored.

use crate::RunKey;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Prefix and extension that identify study files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingConvention {
    /// Leading part of the name, before `_cores`
    pub prefix: String,
    /// Extension without the dot
    pub extension: String,
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self {
            prefix: "data".to_string(),
            extension: "txt".to_string(),
        }
    }
}

impl NamingConvention {
    /// Create a convention
    pub fn new(prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            extension: extension.into().trim_start_matches('.').to_string(),
        }
    }

    /// Compile the convention into a matcher
    pub fn compile(&self) -> Result<FilenamePattern, regex::Error> {
        let coarse = Regex::new(&format!(
            r"^{}_cores([^_.]*)(?:_run([^_.]*))?\.{}$",
            regex::escape(&self.prefix),
            regex::escape(self.extension.trim_start_matches('.')),
        ))?;
        Ok(FilenamePattern { coarse })
    }

    /// Example file name for display, e.g. `data_cores<N>[_run<R>].txt`
    pub fn template(&self) -> String {
        format!("{}_cores<N>[_run<R>].{}", self.prefix, self.extension)
    }
}

/// Compiled form of a [`NamingConvention`]
#[derive(Debug, Clone)]
pub struct FilenamePattern {
    coarse: Regex,
}

impl FilenamePattern {
    /// Parse a bare file name.
    ///
    /// Returns `None` for names outside the study, `Some(Err(reason))` for
    /// malformed study names and `Some(Ok(key))` otherwise.
    pub fn parse(&self, file_name: &str) -> Option<Result<RunKey, String>> {
        let caps = self.coarse.captures(file_name)?;
        let cores = caps.get(1).map_or("", |m| m.as_str());
        let run = caps.get(2).map(|m| m.as_str());

        let result = parse_token("core count", cores).and_then(|core_count| {
            let run_index = match run {
                Some(token) => parse_token("run index", token)?,
                None => 1,
            };
            Ok(RunKey::new(core_count, run_index))
        });
        Some(result)
    }

    /// Whether a numeric token of the name carries leading zeros (`run01`)
    pub fn is_padded(&self, file_name: &str) -> bool {
        self.coarse.captures(file_name).is_some_and(|caps| {
            caps.iter()
                .skip(1)
                .flatten()
                .any(|m| m.as_str().len() > 1 && m.as_str().starts_with('0'))
        })
    }
}

fn parse_token(what: &str, token: &str) -> Result<u32, String> {
    if token.is_empty() {
        return Err(format!("missing {}", what));
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("{} '{}' is not a positive integer", what, token));
    }
    match token.parse::<u32>() {
        Ok(0) => Err(format!("{} must be positive, got '{}'", what, token)),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("{} '{}' is out of range", what, token)),
    }
}
