//! The program model: symbol tables built by the parser, read by
//! everything after it.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

/// Built-in terminal state. Reaching it ends the generated loop.
pub const END_STATE: &str = "END";

/// Placeholder inside PRINT/WRITE text that is replaced by the value just read.
pub const INPUT_MARKER: &str = "$in";

/// Keywords of the language plus the terminal state name.
pub const RESERVED_WORDS: &[&str] = &[
    "IN", END_STATE, "INPUT", "STATE", "FILE", "PRINT", "WRITE", "SCAN", "READ",
];

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

pub fn is_reserved(word: &str) -> bool {
    RESERVED_WORDS.contains(&word)
}

/// `[A-Za-z_][A-Za-z0-9_]*` and not a reserved word.
pub fn is_valid_identifier(word: &str) -> bool {
    IDENTIFIER.is_match(word) && !is_reserved(word)
}

/// Characters allowed after `\` in quoted text. All of them are simple
/// escapes in C++ as well.
pub const ESCAPES: &[char] = &['n', 't', 'r', '0', 'a', 'b', 'f', 'v', '\\', '\'', '"', '?'];

/// Every `\` in `text` starts one of [`ESCAPES`].
pub fn has_valid_escapes(text: &str) -> bool {
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' && !chars.next().is_some_and(|e| ESCAPES.contains(&e)) {
            return false;
        }
    }
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    /// `SCAN "<delim>"` – read from the console.
    ScanInput,
    /// `READ <file> "<delim>"` – read from a declared file.
    ReadInput,
    /// `PRINT "<text>"` – write to the console.
    PrintOutput,
    /// `WRITE <file> "<text>"` – write to a declared file.
    WriteOutput,
}

/// One piece of an output action's text after splitting on [`INPUT_MARKER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Text(&'a str),
    Input,
}

/// A single input or output operation.
///
/// `target` names a file binding and is only set for READ and WRITE.
/// For input actions `arg` is the delimiter in source form (`:` or `\n`),
/// for output actions it is the literal text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    pub kind: ActionKind,
    pub target: Option<String>,
    pub arg: String,
}

impl Action {
    pub fn scan(delimiter: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::ScanInput,
            target: None,
            arg: delimiter.into(),
        }
    }

    pub fn read(file: impl Into<String>, delimiter: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::ReadInput,
            target: Some(file.into()),
            arg: delimiter.into(),
        }
    }

    pub fn print(text: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::PrintOutput,
            target: None,
            arg: text.into(),
        }
    }

    pub fn write(file: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::WriteOutput,
            target: Some(file.into()),
            arg: text.into(),
        }
    }

    /// Splits `arg` on every input marker, left to right, non-overlapping.
    /// Empty text pieces are dropped.
    pub fn segments(&self) -> Vec<Segment<'_>> {
        let mut segments = Vec::new();
        let mut pieces = self.arg.split(INPUT_MARKER).peekable();
        while let Some(piece) = pieces.next() {
            if !piece.is_empty() {
                segments.push(Segment::Text(piece));
            }
            if pieces.peek().is_some() {
                segments.push(Segment::Input);
            }
        }
        segments
    }
}

/// Edge from the enclosing state, taken when the value read equals the
/// literal of `input`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub input: String,
    pub target: String,
}

impl Transition {
    pub fn new(input: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            target: target.into(),
        }
    }

    /// Stand-in stored for a state declared with `[]`.
    pub fn sink() -> Self {
        Self::new("", "")
    }

    pub fn is_placeholder(&self) -> bool {
        self.input.is_empty() && self.target.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct State {
    pub name: String,
    /// Declaration order; a repeated input overwrites in place.
    pub transitions: Vec<Transition>,
    pub actions: Vec<Action>,
}

impl State {
    pub fn new(name: impl Into<String>, transitions: Vec<Transition>) -> Self {
        Self {
            name: name.into(),
            transitions,
            actions: Vec::new(),
        }
    }

    /// Declared with `[]`: no outgoing transitions at all.
    pub fn is_sink(&self) -> bool {
        matches!(self.transitions.as_slice(), [t] if t.is_placeholder())
    }

    /// Transitions that can actually fire, i.e. without the sink placeholder.
    pub fn edges(&self) -> impl Iterator<Item = &Transition> {
        self.transitions.iter().filter(|t| !t.input.is_empty())
    }
}

/// Everything the parser learned about a program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProgramModel {
    /// input name -> literal text
    pub inputs: BTreeMap<String, String>,
    /// file name -> path
    pub files: BTreeMap<String, String>,
    /// Declaration order.
    pub states: Vec<State>,
    /// The single SCAN or READ of the program.
    pub input_action: Option<Action>,
    /// First state declared in the source. Never overwritten.
    pub entry_state: Option<String>,
}

impl ProgramModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.iter().find(|s| s.name == name)
    }

    pub fn state_mut(&mut self, name: &str) -> Option<&mut State> {
        self.states.iter_mut().find(|s| s.name == name)
    }

    /// Adds a state. Redeclaring a state replaces its transitions in place
    /// and appends the new actions to the ones it already had.
    /// The first state ever inserted becomes the entry state.
    pub fn insert_state(&mut self, state: State) {
        if self.entry_state.is_none() {
            self.entry_state = Some(state.name.clone());
        }
        match self.state_mut(&state.name) {
            Some(existing) => {
                existing.transitions = state.transitions;
                existing.actions.extend(state.actions);
            }
            None => self.states.push(state),
        }
    }

    /// Declared state or the built-in terminal state.
    pub fn is_known_state(&self, name: &str) -> bool {
        name == END_STATE || self.state(name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_validity() {
        let test_cases = vec![
            ("Start", true),
            ("_hidden", true),
            ("s2", true),
            ("x_1_y", true),
            ("", false),
            ("2s", false),
            ("with-dash", false),
            ("sp ace", false),
            ("é", false),
            ("END", false),
            ("IN", false),
            ("STATE", false),
            ("SCAN", false),
            ("end", true),
        ];

        for (word, expected) in test_cases {
            assert_eq!(is_valid_identifier(word), expected, "identifier {word:?}");
        }
    }

    #[test]
    fn test_escapes() {
        let test_cases = vec![
            ("plain", true),
            (r"line\n", true),
            (r#"say \"hi\""#, true),
            (r"back\\slash", true),
            (r"dir\", false),
            (r"\$in", false),
            (r"\x41", false),
            (r"\\\", false),
        ];

        for (text, expected) in test_cases {
            assert_eq!(has_valid_escapes(text), expected, "text {text:?}");
        }
    }

    #[test]
    fn test_redeclared_state_keeps_actions() {
        let mut model = ProgramModel::new();
        let mut first = State::new("A", vec![Transition::sink()]);
        first.actions.push(Action::print("1"));
        model.insert_state(first);

        let mut second = State::new("A", vec![Transition::new("x", "B")]);
        second.actions.push(Action::print("2"));
        model.insert_state(second);

        let a = model.state("A").unwrap();
        assert_eq!(a.transitions, vec![Transition::new("x", "B")]);
        assert_eq!(a.actions, vec![Action::print("1"), Action::print("2")]);
    }

    #[test]
    fn test_segments() {
        let test_cases = vec![
            ("plain", vec![Segment::Text("plain")]),
            (
                "value=$in$in",
                vec![Segment::Text("value="), Segment::Input, Segment::Input],
            ),
            (
                "$in is $in!",
                vec![
                    Segment::Input,
                    Segment::Text(" is "),
                    Segment::Input,
                    Segment::Text("!"),
                ],
            ),
            ("$i$in", vec![Segment::Text("$i"), Segment::Input]),
            ("", vec![]),
        ];

        for (text, expected) in test_cases {
            assert_eq!(Action::print(text).segments(), expected, "text {text:?}");
        }
    }

    #[test]
    fn test_entry_state_is_first_inserted() {
        let mut model = ProgramModel::new();
        model.insert_state(State::new("A", vec![Transition::sink()]));
        model.insert_state(State::new("B", vec![]));
        model.insert_state(State::new("A", vec![Transition::new("x", "B")]));

        assert_eq!(model.entry_state.as_deref(), Some("A"));
        assert_eq!(model.states.len(), 2);
        assert_eq!(model.states[0].name, "A");
        assert!(!model.states[0].is_sink());
    }

    #[test]
    fn test_sink_is_distinct_from_real_transitions() {
        let sink = State::new("S", vec![Transition::sink()]);
        let live = State::new("L", vec![Transition::new("a", "S")]);

        assert!(sink.is_sink());
        assert_eq!(sink.edges().count(), 0);
        assert!(!live.is_sink());
        assert_eq!(live.edges().count(), 1);
    }
}
