//! Every diagnostic the compiler can raise.
//!
//! None of these are recoverable: the first one detected ends compilation.
//! Components hand them back as `Err` and the binary decides the exit code.

use std::io;
use std::path::PathBuf;

/// Tag printed in front of every diagnostic on stderr.
pub const ERROR_TAG: &str = "[ERROR]";

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    // ── Structural ────────────────────────────────────────────────────
    #[error("line {line}: missing closing brace, an action block is already open")]
    MissingClosingBrace { line: usize },

    #[error("line {line}: missing opening brace, no action block is open")]
    MissingOpeningBrace { line: usize },

    #[error("line {line}: malformed action `{text}`")]
    MalformedAction { line: usize, text: String },

    #[error("line {line}: unknown statement `{text}`")]
    UnknownStatement { line: usize, text: String },

    #[error("line {line}: unknown output action `{text}`")]
    UnknownOutputAction { line: usize, text: String },

    #[error("line {line}: input actions cannot be placed inside an action block")]
    IncorrectlyPlacedInputAction { line: usize },

    #[error("line {line}: action block opened before any STATE was declared")]
    ActionBlockWithoutState { line: usize },

    // ── Semantic ──────────────────────────────────────────────────────
    #[error("line {line}: invalid identifier `{ident}`")]
    InvalidIdentifier { line: usize, ident: String },

    #[error("line {line}: cannot create state named {name}, it is a reserved state name")]
    EndStateClash { line: usize, name: String },

    #[error("line {line}: multiple input actions, only one SCAN or READ is allowed")]
    MultipleInputActions { line: usize },

    #[error("line {line}: invalid delimiter `{delimiter}`")]
    InvalidDelimiter { line: usize, delimiter: String },

    // ── Referential ───────────────────────────────────────────────────
    #[error("referencing undeclared file `{file}`")]
    UndeclaredFile { file: String },

    #[error("state `{state}` is referencing undeclared input `{input}`")]
    UndeclaredInput { state: String, input: String },

    #[error("state `{state}` is referencing undeclared state `{target}`")]
    UndeclaredState { state: String, target: String },

    #[error("no inputs defined")]
    NoInputs,

    #[error("no states defined")]
    NoStates,

    #[error("no input action defined, expected one SCAN or READ")]
    NoInputAction,

    // ── Environment ───────────────────────────────────────────────────
    #[error("cannot open source file {}", path.display())]
    SourceOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read source file {} at line {line}", path.display())]
    SourceRead {
        path: PathBuf,
        line: usize,
        #[source]
        source: io::Error,
    },
}
