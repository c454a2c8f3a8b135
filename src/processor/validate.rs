//! Whole-model checks that can only run once the full source is parsed.
//!
//! Checks run in a fixed order and stop at the first failure.

use crate::error::CompileError;
use crate::model::{ActionKind, ProgramModel};
use log::debug;

pub fn validate(model: &ProgramModel) -> Result<(), CompileError> {
    check_not_empty(model)?;
    check_input_action(model)?;
    check_write_targets(model)?;
    check_transition_inputs(model)?;
    check_transition_targets(model)?;
    Ok(())
}

fn check_not_empty(model: &ProgramModel) -> Result<(), CompileError> {
    if model.inputs.is_empty() {
        return Err(CompileError::NoInputs);
    }
    if model.states.is_empty() {
        return Err(CompileError::NoStates);
    }
    debug!(
        "{} inputs, {} files, {} states",
        model.inputs.len(),
        model.files.len(),
        model.states.len()
    );
    Ok(())
}

/// Exactly one SCAN or READ, and a READ must name a declared file.
fn check_input_action(model: &ProgramModel) -> Result<(), CompileError> {
    let action = model
        .input_action
        .as_ref()
        .ok_or(CompileError::NoInputAction)?;

    if action.kind == ActionKind::ReadInput {
        check_file(model, action.target.as_deref())?;
    }
    Ok(())
}

fn check_write_targets(model: &ProgramModel) -> Result<(), CompileError> {
    model
        .states
        .iter()
        .flat_map(|s| &s.actions)
        .filter(|a| a.kind == ActionKind::WriteOutput)
        .try_for_each(|a| check_file(model, a.target.as_deref()))
}

fn check_file(model: &ProgramModel, file: Option<&str>) -> Result<(), CompileError> {
    match file {
        Some(name) if model.files.contains_key(name) => Ok(()),
        other => Err(CompileError::UndeclaredFile {
            file: other.unwrap_or_default().to_string(),
        }),
    }
}

fn check_transition_inputs(model: &ProgramModel) -> Result<(), CompileError> {
    for state in &model.states {
        for t in &state.transitions {
            if !t.input.is_empty() && !model.inputs.contains_key(&t.input) {
                return Err(CompileError::UndeclaredInput {
                    state: state.name.clone(),
                    input: t.input.clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_transition_targets(model: &ProgramModel) -> Result<(), CompileError> {
    for state in &model.states {
        for t in &state.transitions {
            if !t.target.is_empty() && !model.is_known_state(&t.target) {
                return Err(CompileError::UndeclaredState {
                    state: state.name.clone(),
                    target: t.target.clone(),
                });
            }
        }
    }
    Ok(())
}
