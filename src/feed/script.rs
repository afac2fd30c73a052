//! Line-oriented trace script parser.
//!
//! Each non-empty line is `<kind> <file> <line> [name=value ...]` where
//! `kind` is one of `call`, `line`, `return`, `exception`. Tokens are
//! shlex-split, so file paths and local values may be quoted. `#` starts a
//! comment line.

use super::types::{EventKind, TraceEvent};
use crate::location::SourceLocation;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("trace script line {line}: {message}")]
pub struct ScriptError {
    pub line: usize,
    pub message: String,
}

fn err(line: usize, message: impl Into<String>) -> ScriptError {
    ScriptError {
        line,
        message: message.into(),
    }
}

pub fn parse_script(text: &str) -> Result<Vec<TraceEvent>, ScriptError> {
    let mut events = Vec::new();

    for (i, raw) in text.lines().enumerate() {
        let line_no = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let tokens = shlex::split(trimmed)
            .ok_or_else(|| err(line_no, "unbalanced quoting"))?;
        if tokens.len() < 3 {
            return Err(err(line_no, "expected <kind> <file> <line>"));
        }

        let kind = match tokens[0].to_lowercase().as_str() {
            "call" => EventKind::Call,
            "line" => EventKind::Line,
            "return" => EventKind::Return,
            "exception" => EventKind::Exception,
            other => return Err(err(line_no, format!("unknown event kind: {}", other))),
        };

        let lineno: usize = tokens[2]
            .parse()
            .map_err(|_| err(line_no, format!("bad line number: {}", tokens[2])))?;
        if lineno == 0 {
            return Err(err(line_no, "line numbers are 1-based"));
        }

        let mut locals = Vec::new();
        for tok in &tokens[3..] {
            match tok.split_once('=') {
                Some((name, value)) => locals.push((name.to_string(), value.to_string())),
                None => return Err(err(line_no, format!("malformed local binding: {}", tok))),
            }
        }

        events.push(TraceEvent {
            kind,
            location: SourceLocation::new(tokens[1].as_str(), lineno),
            locals,
        });
    }

    Ok(events)
}
