//! Emit the C++ program that runs the state machine.
//!
//! The loop body holds two switches on the same `state` variable: the first
//! picks a transition, the second runs the actions of whatever state that
//! left us in.

use crate::model::{Action, ActionKind, END_STATE, Segment};
use crate::processor::ProcessedProgram;
use log::trace;
use std::fs;
use std::io;
use std::path::Path;

/// Extension of the generated source file.
pub const EXTENSION: &str = "cpp";

const INCLUDES: &[&str] = &["fstream", "iostream", "string"];
const BUFFER: &str = "input";
const STATE_VAR: &str = "state";
const STATE_ENUM: &str = "State";
const FILE_MODE: &str = "std::ios::in | std::ios::out | std::ios::app";

pub fn emit(program: &ProcessedProgram, origin: &str, path: &Path) -> io::Result<()> {
    fs::write(path, render(program, origin))
}

/// Complete C++ source for `program`. `origin` only appears in the header.
pub fn render(program: &ProcessedProgram, origin: &str) -> String {
    let mut w = CodeWriter::default();

    w.line(format!("// Auto-generated by fsmc from {origin} - DO NOT EDIT"));
    for header in INCLUDES {
        w.line(format!("#include <{header}>"));
    }
    w.blank();

    declare_states(&mut w, program);
    w.blank();

    w.open("int main() {");
    declare_variables(&mut w, program);
    w.blank();

    w.open("do {");
    transition_switch(&mut w, program);
    w.blank();
    action_switch(&mut w, program);
    w.close(format!(
        "}} while ({STATE_VAR} != {} && {});",
        state_ref(END_STATE),
        read_call(program)
    ));
    w.blank();

    for name in program.model().files.keys() {
        w.line(format!("{}.close();", file_handle(name)));
    }
    w.line("return 0;");
    w.close("}");

    w.finish()
}

fn declare_states(w: &mut CodeWriter, program: &ProcessedProgram) {
    trace!("declaring {} states", program.states().len());
    w.open(format!("enum class {STATE_ENUM} {{"));
    for state in program.states() {
        w.line(format!("{},", state.name));
    }
    w.line(format!("{END_STATE},"));
    w.close("};");
}

fn declare_variables(w: &mut CodeWriter, program: &ProcessedProgram) {
    w.line(format!("std::string {BUFFER};"));
    for (name, path) in &program.model().files {
        w.line(format!(
            "std::fstream {}(\"{path}\", {FILE_MODE});",
            file_handle(name)
        ));
    }
    w.line(format!(
        "{STATE_ENUM} {STATE_VAR} = {};",
        state_ref(program.entry_state())
    ));
}

/// First switch: move to the target of the first transition whose literal
/// equals the value read.
fn transition_switch(w: &mut CodeWriter, program: &ProcessedProgram) {
    trace!("writing transition switch");
    w.line(format!("switch ({STATE_VAR}) {{"));
    for state in program.states() {
        let mut edges = state.edges().peekable();
        if edges.peek().is_none() {
            continue;
        }

        w.line(format!("case {}:", state_ref(&state.name)));
        w.indent();
        let mut keyword = "if";
        for t in edges {
            w.open(format!(
                "{keyword} ({BUFFER} == \"{}\") {{",
                program.literal(&t.input)
            ));
            w.line(format!("{STATE_VAR} = {};", state_ref(&t.target)));
            w.dedent();
            keyword = "} else if";
        }
        w.line("}");
        w.line("break;");
        w.dedent();
    }
    default_case(w);
    w.line("}");
}

/// Second switch: run the actions of the current state.
fn action_switch(w: &mut CodeWriter, program: &ProcessedProgram) {
    trace!("writing action switch");
    w.line(format!("switch ({STATE_VAR}) {{"));
    for state in program.states().iter().filter(|s| !s.actions.is_empty()) {
        w.line(format!("case {}:", state_ref(&state.name)));
        w.indent();
        for action in &state.actions {
            w.line(output_statement(action));
        }
        w.line("break;");
        w.dedent();
    }
    default_case(w);
    w.line("}");
}

fn default_case(w: &mut CodeWriter) {
    w.line("default:");
    w.indent();
    w.line("break;");
    w.dedent();
}

/// `std::cout << "a" << input << "b";` with one splice per marker.
fn output_statement(action: &Action) -> String {
    let stream = match (action.kind, action.target.as_deref()) {
        (ActionKind::WriteOutput, Some(file)) => file_handle(file),
        _ => "std::cout".to_string(),
    };

    let mut statement = stream;
    let segments = action.segments();
    if segments.is_empty() {
        statement.push_str(" << \"\"");
    }
    for segment in segments {
        match segment {
            Segment::Text(text) => statement.push_str(&format!(" << \"{text}\"")),
            Segment::Input => statement.push_str(&format!(" << {BUFFER}")),
        }
    }
    statement.push(';');
    statement
}

/// `std::getline(<stream>, input, '<delim>')`.
fn read_call(program: &ProcessedProgram) -> String {
    let action = program.input_action();
    let stream = match (action.kind, action.target.as_deref()) {
        (ActionKind::ReadInput, Some(file)) => file_handle(file),
        _ => "std::cin".to_string(),
    };
    format!(
        "std::getline({stream}, {BUFFER}, {})",
        char_literal(&action.arg)
    )
}

fn char_literal(delimiter: &str) -> String {
    match delimiter {
        "'" => r"'\''".to_string(),
        other => format!("'{other}'"),
    }
}

fn file_handle(name: &str) -> String {
    format!("file_{name}")
}

fn state_ref(name: &str) -> String {
    format!("{STATE_ENUM}::{name}")
}

/// Line-based text builder with four-space indentation.
#[derive(Default)]
struct CodeWriter {
    out: String,
    depth: usize,
}

impl CodeWriter {
    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.depth {
            self.out.push_str("    ");
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Writes `text` and indents what follows.
    fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.indent();
    }

    /// Dedents and writes `text`.
    fn close(&mut self, text: impl AsRef<str>) {
        self.dedent();
        self.line(text);
    }

    fn indent(&mut self) {
        self.depth += 1;
    }

    fn dedent(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }

    fn finish(self) -> String {
        self.out
    }
}
