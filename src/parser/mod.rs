//! Component 1 – turns source lines into a [`ProgramModel`].
//!
//! Lines are fed one at a time. Each line is first split into brace events
//! and statement text, so `{ PRINT "x" }` and a lone `{` on its own line
//! behave the same.

pub mod statement;
pub mod transitions;

use crate::error::CompileError;
use crate::model::{ProgramModel, State};
use log::{debug, info};
use statement::Statement;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const COMMENT_MARKER: &str = "//";

/// Parse state threaded through every line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserState {
    /// 1-based number of the line being parsed.
    pub line: usize,
    pub block_open: bool,
    /// Most recently declared state; output actions attach to it.
    pub current_state: Option<String>,
}

/// Pieces of one physical line, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Piece<'a> {
    Open,
    Close,
    Text(&'a str),
}

pub struct Parser {
    state: ParserState,
    model: ProgramModel,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: ParserState::default(),
            model: ProgramModel::new(),
        }
    }

    pub fn state(&self) -> &ParserState {
        &self.state
    }

    pub fn feed_line(&mut self, line: &str) -> Result<(), CompileError> {
        self.state.line += 1;
        for piece in split_line(line) {
            match piece {
                Piece::Open => self.open_block()?,
                Piece::Close => self.close_block()?,
                Piece::Text(text) => {
                    if let Some(stmt) = statement::classify(text, self.state.line, self.state.block_open)? {
                        debug!("line {}: {:?}", self.state.line, stmt);
                        self.apply(stmt)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Ends the parse. An action block left open is an error.
    pub fn finish(self) -> Result<ProgramModel, CompileError> {
        if self.state.block_open {
            return Err(CompileError::MissingClosingBrace {
                line: self.state.line,
            });
        }
        Ok(self.model)
    }

    fn open_block(&mut self) -> Result<(), CompileError> {
        let line = self.state.line;
        if self.state.block_open {
            return Err(CompileError::MissingClosingBrace { line });
        }
        if self.state.current_state.is_none() {
            return Err(CompileError::ActionBlockWithoutState { line });
        }
        self.state.block_open = true;
        Ok(())
    }

    fn close_block(&mut self) -> Result<(), CompileError> {
        if !self.state.block_open {
            return Err(CompileError::MissingOpeningBrace {
                line: self.state.line,
            });
        }
        self.state.block_open = false;
        Ok(())
    }

    fn apply(&mut self, stmt: Statement) -> Result<(), CompileError> {
        let line = self.state.line;
        match stmt {
            Statement::Input { name, literal } => {
                self.model.inputs.insert(name, literal);
            }
            Statement::File { name, path } => {
                self.model.files.insert(name, path);
            }
            Statement::State { name, transitions } => {
                let transitions = transitions::parse_transitions(&transitions, &name, line)?;
                self.model.insert_state(State::new(name.clone(), transitions));
                self.state.current_state = Some(name);
            }
            Statement::InputAction(action) => {
                if self.model.input_action.is_some() {
                    return Err(CompileError::MultipleInputActions { line });
                }
                self.model.input_action = Some(action);
            }
            Statement::OutputAction(action) => {
                let state = self
                    .state
                    .current_state
                    .as_deref()
                    .and_then(|name| self.model.state_mut(name))
                    .ok_or(CompileError::ActionBlockWithoutState { line })?;
                state.actions.push(action);
            }
        }
        Ok(())
    }
}

/// Splits a line into brace events and statement text.
///
/// Braces and `//` inside a quoted literal are plain text, and so is a
/// quote escaped with `\`. A `//` outside quotes ends the line.
fn split_line(line: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut in_quotes = false;
    let mut start = 0;

    let mut chars = line.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '\\' if in_quotes => {
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            '{' | '}' if !in_quotes => {
                pieces.push(Piece::Text(&line[start..idx]));
                pieces.push(if c == '{' { Piece::Open } else { Piece::Close });
                start = idx + 1;
            }
            '/' if !in_quotes && line[idx..].starts_with(COMMENT_MARKER) => {
                pieces.push(Piece::Text(&line[start..idx]));
                start = line.len();
                break;
            }
            _ => {}
        }
    }
    pieces.push(Piece::Text(&line[start..]));

    pieces.retain(|p| !matches!(p, Piece::Text(t) if t.trim().is_empty()));
    pieces
}

/// Parses a whole source text.
pub fn parse_source(src: &str) -> Result<ProgramModel, CompileError> {
    let mut parser = Parser::new();
    for line in src.lines() {
        parser.feed_line(line)?;
    }
    parser.finish()
}

/// Reads and parses the source file at `path`, line by line.
pub fn load(path: &Path) -> Result<ProgramModel, CompileError> {
    let file = File::open(path).map_err(|source| CompileError::SourceOpen {
        path: path.to_path_buf(),
        source,
    })?;

    let mut parser = Parser::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|source| CompileError::SourceRead {
            path: path.to_path_buf(),
            line: parser.state().line + 1,
            source,
        })?;
        parser.feed_line(&line)?;
    }
    info!("Read {} lines from {}", parser.state().line, path.display());

    parser.finish()
}
