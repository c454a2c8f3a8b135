//! Component 2 – the functional core between parsing and writing.
//!
//! Validates the parsed model and hands out a read-only program that the
//! writers and the interpreter can rely on.
pub mod validate;
pub mod vm;

use crate::error::CompileError;
use crate::model::{Action, ProgramModel, State};
use log::info;

/// A model that passed every validation pass.
///
/// Only [`run`] builds one, so holders may assume an entry state and an
/// input action exist and that every reference resolves.
#[derive(Debug, Clone)]
pub struct ProcessedProgram {
    model: ProgramModel,
    entry_state: String,
    input_action: Action,
}

impl ProcessedProgram {
    pub fn model(&self) -> &ProgramModel {
        &self.model
    }

    pub fn entry_state(&self) -> &str {
        &self.entry_state
    }

    pub fn input_action(&self) -> &Action {
        &self.input_action
    }

    pub fn states(&self) -> &[State] {
        &self.model.states
    }

    /// Literal compared against the value read for `input`.
    pub fn literal(&self, input: &str) -> &str {
        self.model.inputs.get(input).map(String::as_str).unwrap_or_default()
    }

    /// Path bound to `file`.
    pub fn path(&self, file: &str) -> &str {
        self.model.files.get(file).map(String::as_str).unwrap_or_default()
    }
}

/// Runs every processing pass and returns a read-only structure for writers.
pub fn run(model: ProgramModel) -> Result<ProcessedProgram, CompileError> {
    validate::validate(&model)?;

    let input_action = model.input_action.clone().ok_or(CompileError::NoInputAction)?;
    let entry_state = model.entry_state.clone().ok_or(CompileError::NoStates)?;
    info!(
        "Validated {} states, entry state `{}`",
        model.states.len(),
        entry_state
    );

    Ok(ProcessedProgram {
        model,
        entry_state,
        input_action,
    })
}
