//! Per-statement pattern matchers.
//!
//! A statement is recognised by its leading keyword, then its fields are
//! pulled out by the pattern for that keyword. A keyword whose pattern does
//! not match is a malformed statement rather than an unknown one.
//!
//! Quoted text may contain the escapes listed in [`ESCAPES`], including
//! `\"`. It is kept in source form and pasted into C++ literals as is.

use crate::error::CompileError;
use crate::model::{Action, END_STATE, ESCAPES, has_valid_escapes, is_valid_identifier};
use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    static ref INPUT: Regex = Regex::new(&format!(r#"^INPUT\s+([^\s"]*)\s+{QUOTED}"#)).unwrap();
    static ref FILE: Regex = Regex::new(&format!(r#"^FILE\s+([^\s"]*)\s+{QUOTED}"#)).unwrap();
    static ref STATE: Regex = Regex::new(r"^STATE\s+([^\s\[]*)\s*\[(.*?)\]").unwrap();
    static ref SCAN: Regex = Regex::new(&format!(r"^SCAN\s+{QUOTED}")).unwrap();
    static ref READ: Regex = Regex::new(&format!(r#"^READ\s+([^\s"]*)\s+{QUOTED}"#)).unwrap();
    static ref PRINT: Regex = Regex::new(&format!(r"^PRINT\s+{QUOTED}")).unwrap();
    static ref WRITE: Regex = Regex::new(&format!(r#"^WRITE\s+([^\s"]*)\s+{QUOTED}"#)).unwrap();
}

/// A double-quoted string in which `\` always escapes the next character.
const QUOTED: &str = r#""((?:[^"\\]|\\.)*)""#;

/// A classified source statement with its captured fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    Input { name: String, literal: String },
    File { name: String, path: String },
    /// `transitions` is the raw text between the brackets.
    State { name: String, transitions: String },
    InputAction(Action),
    OutputAction(Action),
}

/// Classifies one statement segment.
///
/// `in_block` selects the grammar: inside an action block only PRINT and
/// WRITE are accepted, outside it only declarations, states and the input
/// action. Blank text yields `None`.
pub fn classify(text: &str, line: usize, in_block: bool) -> Result<Option<Statement>, CompileError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let statement = if in_block {
        classify_block_line(text, line)?
    } else {
        classify_top_level(text, line)?
    };
    Ok(Some(statement))
}

fn classify_top_level(text: &str, line: usize) -> Result<Statement, CompileError> {
    match leading_keyword(text) {
        "INPUT" => {
            let caps = captures(&INPUT, text, line)?;
            Ok(Statement::Input {
                name: identifier(&caps[1], line)?,
                literal: quoted(&caps[2], text, line)?,
            })
        }
        "FILE" => {
            let caps = captures(&FILE, text, line)?;
            Ok(Statement::File {
                name: identifier(&caps[1], line)?,
                path: quoted(&caps[2], text, line)?,
            })
        }
        "STATE" => {
            let caps = captures(&STATE, text, line)?;
            let name = &caps[1];
            if name == END_STATE {
                return Err(CompileError::EndStateClash {
                    line,
                    name: name.to_string(),
                });
            }
            Ok(Statement::State {
                name: identifier(name, line)?,
                transitions: caps[2].to_string(),
            })
        }
        "SCAN" => {
            let caps = captures(&SCAN, text, line)?;
            Ok(Statement::InputAction(Action::scan(delimiter(&caps[1], line)?)))
        }
        "READ" => {
            let caps = captures(&READ, text, line)?;
            Ok(Statement::InputAction(Action::read(
                identifier(&caps[1], line)?,
                delimiter(&caps[2], line)?,
            )))
        }
        _ => Err(CompileError::UnknownStatement {
            line,
            text: text.to_string(),
        }),
    }
}

fn classify_block_line(text: &str, line: usize) -> Result<Statement, CompileError> {
    match leading_keyword(text) {
        "PRINT" => {
            let caps = captures(&PRINT, text, line)?;
            Ok(Statement::OutputAction(Action::print(quoted(&caps[1], text, line)?)))
        }
        "WRITE" => {
            let caps = captures(&WRITE, text, line)?;
            Ok(Statement::OutputAction(Action::write(
                identifier(&caps[1], line)?,
                quoted(&caps[2], text, line)?,
            )))
        }
        "SCAN" | "READ" => Err(CompileError::IncorrectlyPlacedInputAction { line }),
        _ => Err(CompileError::UnknownOutputAction {
            line,
            text: text.to_string(),
        }),
    }
}

/// The run of word characters the statement starts with.
fn leading_keyword(text: &str) -> &str {
    let end = text
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(text.len());
    &text[..end]
}

fn captures<'t>(pattern: &Regex, text: &'t str, line: usize) -> Result<Captures<'t>, CompileError> {
    pattern
        .captures(text)
        .ok_or_else(|| CompileError::MalformedAction {
            line,
            text: text.to_string(),
        })
}

fn identifier(token: &str, line: usize) -> Result<String, CompileError> {
    if is_valid_identifier(token) {
        Ok(token.to_string())
    } else {
        Err(CompileError::InvalidIdentifier {
            line,
            ident: token.to_string(),
        })
    }
}

/// Quoted text with only supported escapes.
fn quoted(value: &str, text: &str, line: usize) -> Result<String, CompileError> {
    if has_valid_escapes(value) {
        Ok(value.to_string())
    } else {
        Err(CompileError::MalformedAction {
            line,
            text: text.to_string(),
        })
    }
}

/// Normalises the text of a SCAN/READ delimiter to one character or one
/// escape sequence.
///
/// A lone `\` becomes `\\`, a supported escape `\x` stays `\x`, anything
/// else keeps only its first character, which must be ASCII.
pub fn delimiter(raw: &str, line: usize) -> Result<String, CompileError> {
    let invalid = || CompileError::InvalidDelimiter {
        line,
        delimiter: raw.to_string(),
    };
    let mut chars = raw.trim().chars();
    match (chars.next(), chars.next()) {
        (Some('\\'), None) => Ok(r"\\".to_string()),
        (Some('\\'), Some(escaped)) if ESCAPES.contains(&escaped) => Ok(format!("\\{escaped}")),
        (Some(first), _) if first != '\\' && first.is_ascii() => Ok(first.to_string()),
        _ => Err(invalid()),
    }
}
