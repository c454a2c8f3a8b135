//! Reference interpreter for a processed program.
//!
//! Executes the machine with the same semantics as the generated C++:
//! the loop body runs before the first read, transitions are tested in
//! declaration order with the first match winning, and the actions that
//! fire belong to the state just entered.

use crate::model::{Action, ActionKind, END_STATE, Segment};
use crate::processor::ProcessedProgram;
use log::trace;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub final_state: String,
    /// Number of times the loop body ran.
    pub iterations: usize,
}

/// Runs `program` until it reaches the terminal state or `input` is
/// exhausted.
///
/// `input` stands for whatever the input action reads from. PRINT goes to
/// `console`, WRITE to the entry of `files` named by the action.
pub fn run<R, C, F>(
    program: &ProcessedProgram,
    input: &mut R,
    console: &mut C,
    files: &mut BTreeMap<String, F>,
) -> io::Result<Outcome>
where
    R: BufRead,
    C: Write,
    F: Write,
{
    let delimiter = delimiter_byte(&program.input_action().arg);
    let mut state = program.entry_state();
    let mut buffer = String::new();
    let mut iterations = 0;

    loop {
        if let Some(current) = program.model().state(state) {
            if let Some(t) = current
                .edges()
                .find(|t| buffer == unescape(program.literal(&t.input)))
            {
                trace!("{} --{:?}--> {}", state, buffer, t.target);
                state = t.target.as_str();
            }
        }

        if let Some(current) = program.model().state(state) {
            for action in &current.actions {
                perform(action, &buffer, console, files)?;
            }
        }
        iterations += 1;

        if state == END_STATE || !read_value(input, delimiter, &mut buffer)? {
            break;
        }
    }

    console.flush()?;
    for sink in files.values_mut() {
        sink.flush()?;
    }

    Ok(Outcome {
        final_state: state.to_string(),
        iterations,
    })
}

/// Runs `program` against the real console and the declared files.
///
/// Files are opened for reading and appending and created when missing.
pub fn run_with_system_io(program: &ProcessedProgram) -> io::Result<Outcome> {
    let mut files = BTreeMap::new();
    for (name, path) in &program.model().files {
        let file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(unescape(path))?;
        files.insert(name.clone(), file);
    }

    let mut console = io::stdout().lock();
    let action = program.input_action();
    match (action.kind, action.target.as_deref()) {
        (ActionKind::ReadInput, Some(file)) => {
            let source = File::open(unescape(program.path(file)))?;
            run(program, &mut BufReader::new(source), &mut console, &mut files)
        }
        _ => run(program, &mut io::stdin().lock(), &mut console, &mut files),
    }
}

fn perform<C: Write, F: Write>(
    action: &Action,
    buffer: &str,
    console: &mut C,
    files: &mut BTreeMap<String, F>,
) -> io::Result<()> {
    let text = render(action, buffer);
    match (action.kind, action.target.as_deref()) {
        (ActionKind::PrintOutput, _) => console.write_all(text.as_bytes()),
        (ActionKind::WriteOutput, Some(file)) => match files.get_mut(file) {
            Some(sink) => sink.write_all(text.as_bytes()),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no open handle for file `{file}`"),
            )),
        },
        _ => Ok(()),
    }
}

/// Output text with escapes resolved and every marker replaced by `buffer`.
pub fn render(action: &Action, buffer: &str) -> String {
    action
        .segments()
        .into_iter()
        .map(|segment| match segment {
            Segment::Text(text) => unescape(text),
            Segment::Input => buffer.to_string(),
        })
        .collect()
}

/// Reads up to and including `delimiter`, storing what came before it.
///
/// Like `std::getline`, this fails only when nothing at all could be read.
fn read_value<R: BufRead>(input: &mut R, delimiter: u8, buffer: &mut String) -> io::Result<bool> {
    let mut bytes = Vec::new();
    if input.read_until(delimiter, &mut bytes)? == 0 {
        return Ok(false);
    }
    if bytes.last() == Some(&delimiter) {
        bytes.pop();
    }
    *buffer = String::from_utf8_lossy(&bytes).into_owned();
    Ok(true)
}

fn delimiter_byte(arg: &str) -> u8 {
    unescape(arg).bytes().next().unwrap_or(b'\n')
}

/// Resolves C-style escape sequences.
pub fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let resolved = match chars.next() {
            Some('n') => '\n',
            Some('t') => '\t',
            Some('r') => '\r',
            Some('0') => '\0',
            Some('a') => '\x07',
            Some('b') => '\x08',
            Some('f') => '\x0c',
            Some('v') => '\x0b',
            Some(other) => other,
            None => '\\',
        };
        out.push(resolved);
    }
    out
}
