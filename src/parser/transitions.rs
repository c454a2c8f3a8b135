//! Parser for the bracketed transition list of a STATE statement.

use crate::error::CompileError;
use crate::model::Transition;

const TRANSITION_SEPARATOR: char = ',';
const MAPPING_SEPARATOR: char = ':';

/// Parses `a:S2, b:S3` into transitions for the state `owner`.
///
/// An empty list makes `owner` a sink. Transitions back to `owner` are
/// dropped, and a repeated input overwrites the earlier target in place.
pub fn parse_transitions(raw: &str, owner: &str, line: usize) -> Result<Vec<Transition>, CompileError> {
    if raw.trim().is_empty() {
        return Ok(vec![Transition::sink()]);
    }

    let expected = raw.matches(TRANSITION_SEPARATOR).count() + 1;
    let mut transitions = Vec::<Transition>::with_capacity(expected);

    for fragment in raw.split(TRANSITION_SEPARATOR) {
        let (input, target) = split_fragment(fragment).ok_or_else(|| CompileError::MalformedAction {
            line,
            text: fragment.trim().to_string(),
        })?;

        if target == owner {
            continue;
        }

        match transitions.iter_mut().find(|t| t.input == input) {
            Some(existing) => existing.target = target.to_string(),
            None => transitions.push(Transition::new(input, target)),
        }
    }

    Ok(transitions)
}

/// `input:target`, both trimmed and non-empty.
fn split_fragment(fragment: &str) -> Option<(&str, &str)> {
    let mut parts = fragment.split(MAPPING_SEPARATOR);
    let input = parts.next()?.trim();
    let target = parts.next()?.trim();
    if parts.next().is_some() || input.is_empty() || target.is_empty() {
        return None;
    }
    Some((input, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(raw: &str, owner: &str) -> Vec<(String, String)> {
        parse_transitions(raw, owner, 1)
            .unwrap()
            .into_iter()
            .map(|t| (t.input, t.target))
            .collect()
    }

    fn pairs(list: &[(&str, &str)]) -> Vec<(String, String)> {
        list.iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_parse_transitions() {
        let test_cases = vec![
            ("a:S2, b:S3", pairs(&[("a", "S2"), ("b", "S3")])),
            ("  a :  S2  ", pairs(&[("a", "S2")])),
            ("a:S2,b:S3,c:END", pairs(&[("a", "S2"), ("b", "S3"), ("c", "END")])),
            // last write wins, position of the first one is kept
            ("a:S2, b:S3, a:S4", pairs(&[("a", "S4"), ("b", "S3")])),
        ];

        for (raw, expected) in test_cases {
            assert_eq!(edges(raw, "Owner"), expected, "list {raw:?}");
        }
    }

    #[test]
    fn test_self_loops_are_dropped() {
        assert_eq!(edges("a:Me, b:Other, c:Me", "Me"), pairs(&[("b", "Other")]));
        assert_eq!(edges("a:Me", "Me"), pairs(&[]));
    }

    #[test]
    fn test_empty_list_is_sink() {
        for raw in ["", "   "] {
            let transitions = parse_transitions(raw, "S", 1).unwrap();
            assert_eq!(transitions, vec![Transition::sink()]);
        }
    }

    #[test]
    fn test_malformed_fragments() {
        for raw in ["a", "a:B, c", "a:B,", ":B", "a:", "a:B:C", "a;B"] {
            assert!(
                matches!(
                    parse_transitions(raw, "S", 9),
                    Err(CompileError::MalformedAction { line: 9, .. })
                ),
                "list {raw:?}"
            );
        }
    }
}
