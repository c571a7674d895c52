//! This module provides the checks that decide whether a machine definition is well formed,
//! the input check performed before a run, and a non-fatal reachability lint.

use crate::spec::MachineSpec;
use crate::types::{State, Symbol, ValidationError};
use std::collections::BTreeSet;

/// Validates a machine definition, stopping at the first violated rule.
///
/// The checks run in a fixed order:
///
/// 1. start, accept and reject states belong to the state set;
/// 2. the blank symbol is in the tape alphabet and not in the input alphabet;
/// 3. the input alphabet is contained in the tape alphabet;
/// 4. every transition refers only to known states and tape symbols.
pub fn validate(spec: &MachineSpec) -> Result<(), ValidationError> {
    [
        check_distinguished_states,
        check_blank_symbol,
        check_alphabets,
        check_transitions,
    ]
    .iter()
    .try_for_each(|check| check(spec))
}

/// Checks that the start, accept and reject states are members of the state set.
fn check_distinguished_states(spec: &MachineSpec) -> Result<(), ValidationError> {
    let states = spec.states();

    if !states.contains(spec.start_state()) {
        return Err(ValidationError::UnknownStartState(
            spec.start_state().to_string(),
        ));
    }

    if !states.contains(spec.accept_state()) {
        return Err(ValidationError::UnknownAcceptState(
            spec.accept_state().to_string(),
        ));
    }

    if !states.contains(spec.reject_state()) {
        return Err(ValidationError::UnknownRejectState(
            spec.reject_state().to_string(),
        ));
    }

    Ok(())
}

/// Checks that the blank symbol is a tape symbol but never an input symbol.
fn check_blank_symbol(spec: &MachineSpec) -> Result<(), ValidationError> {
    let blank = spec.blank();

    if !spec.tape_alphabet().contains(&blank) {
        return Err(ValidationError::BlankNotInTapeAlphabet(blank));
    }

    if spec.input_alphabet().contains(&blank) {
        return Err(ValidationError::BlankInInputAlphabet(blank));
    }

    Ok(())
}

/// Checks that the tape alphabet is a superset of the input alphabet.
fn check_alphabets(spec: &MachineSpec) -> Result<(), ValidationError> {
    spec.input_alphabet()
        .difference(spec.tape_alphabet())
        .next()
        .map_or(Ok(()), |&symbol| {
            Err(ValidationError::InputSymbolNotInTapeAlphabet(symbol))
        })
}

/// Checks that every state and symbol referenced by the transition table is declared.
fn check_transitions(spec: &MachineSpec) -> Result<(), ValidationError> {
    let states = spec.states();
    let tape = spec.tape_alphabet();

    for (state, row) in spec.transitions() {
        if !states.contains(state) {
            return Err(ValidationError::UnknownSourceState(state.clone()));
        }

        for (&read, transition) in row {
            if !tape.contains(&read) {
                return Err(ValidationError::UnknownReadSymbol {
                    state: state.clone(),
                    symbol: read,
                });
            }

            if !states.contains(&transition.next_state) {
                return Err(ValidationError::UnknownTargetState {
                    state: state.clone(),
                    read,
                    target: transition.next_state.clone(),
                });
            }

            if !tape.contains(&transition.write_symbol) {
                return Err(ValidationError::UnknownWriteSymbol {
                    state: state.clone(),
                    read,
                    symbol: transition.write_symbol,
                });
            }
        }
    }

    Ok(())
}

/// Splits `input` into symbols, checking each against the input alphabet.
///
/// The blank check is repeated here so that a corrupted definition can never
/// produce a tape whose input region contains blanks.
pub fn validate_input(spec: &MachineSpec, input: &str) -> Result<Vec<Symbol>, ValidationError> {
    if spec.input_alphabet().contains(&spec.blank()) {
        return Err(ValidationError::BlankInInputAlphabet(spec.blank()));
    }

    input
        .chars()
        .enumerate()
        .map(|(position, symbol)| {
            if spec.input_alphabet().contains(&symbol) {
                Ok(symbol)
            } else {
                Err(ValidationError::SymbolNotInInputAlphabet { symbol, position })
            }
        })
        .collect()
}

/// Returns the states that can never be entered from the start state, sorted.
///
/// This is advisory only: unreachable states are legal.
pub fn unreachable_states(spec: &MachineSpec) -> Vec<State> {
    let mut visited = BTreeSet::new();
    let mut queue = vec![spec.start_state().to_string()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state.clone()) {
            continue;
        }

        // Terminal states are never left, whatever their rules say.
        if spec.is_terminal(&state) {
            continue;
        }

        if let Some(row) = spec.transitions().get(&state) {
            queue.extend(
                row.values()
                    .filter(|t| !visited.contains(&t.next_state))
                    .map(|t| t.next_state.clone()),
            );
        }
    }

    spec.states().difference(&visited).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SpecParts;
    use crate::types::{Direction, Rule};

    fn valid_parts() -> SpecParts {
        SpecParts {
            states: ["q0", "q1", "accept", "reject"]
                .into_iter()
                .map(String::from)
                .collect(),
            input_alphabet: ['a', 'b'].into_iter().collect(),
            tape_alphabet: ['a', 'b', 'X', '_'].into_iter().collect(),
            rules: vec![
                Rule::new("q0", 'a', "q1", 'X', Direction::Right),
                Rule::new("q1", '_', "accept", '_', Direction::Stay),
            ],
            start_state: "q0".to_string(),
            accept_state: "accept".to_string(),
            reject_state: "reject".to_string(),
            blank: '_',
        }
    }

    fn build_err(parts: SpecParts) -> ValidationError {
        MachineSpec::build(parts).expect_err("expected a validation error")
    }

    #[test]
    fn test_valid_definition() {
        assert!(MachineSpec::build(valid_parts()).is_ok());
    }

    #[test]
    fn test_unknown_distinguished_states() {
        let mut parts = valid_parts();
        parts.start_state = "nowhere".to_string();
        assert_eq!(
            build_err(parts),
            ValidationError::UnknownStartState("nowhere".to_string())
        );

        let mut parts = valid_parts();
        parts.accept_state = "yes".to_string();
        assert_eq!(
            build_err(parts),
            ValidationError::UnknownAcceptState("yes".to_string())
        );

        let mut parts = valid_parts();
        parts.reject_state = "no".to_string();
        assert_eq!(
            build_err(parts),
            ValidationError::UnknownRejectState("no".to_string())
        );
    }

    #[test]
    fn test_blank_symbol_rules() {
        let mut parts = valid_parts();
        parts.tape_alphabet.remove(&'_');
        parts.rules.pop();
        assert_eq!(build_err(parts), ValidationError::BlankNotInTapeAlphabet('_'));

        let mut parts = valid_parts();
        parts.input_alphabet.insert('_');
        let err = build_err(parts);
        assert_eq!(err, ValidationError::BlankInInputAlphabet('_'));
        assert_eq!(err.invariant(), "blank-not-in-input-alphabet");
    }

    #[test]
    fn test_input_alphabet_subset_of_tape() {
        let mut parts = valid_parts();
        parts.input_alphabet.insert('c');
        assert_eq!(
            build_err(parts),
            ValidationError::InputSymbolNotInTapeAlphabet('c')
        );
    }

    #[test]
    fn test_transition_references() {
        let mut parts = valid_parts();
        parts
            .rules
            .push(Rule::new("ghost", 'a', "q0", 'a', Direction::Left));
        assert_eq!(
            build_err(parts),
            ValidationError::UnknownSourceState("ghost".to_string())
        );

        let mut parts = valid_parts();
        parts
            .rules
            .push(Rule::new("q0", 'z', "q0", 'a', Direction::Left));
        assert_eq!(
            build_err(parts),
            ValidationError::UnknownReadSymbol {
                state: "q0".to_string(),
                symbol: 'z'
            }
        );

        let mut parts = valid_parts();
        parts
            .rules
            .push(Rule::new("q0", 'b', "ghost", 'a', Direction::Left));
        let err = build_err(parts);
        assert_eq!(err.invariant(), "transition-states-known");
        assert!(err.to_string().contains("ghost"));

        let mut parts = valid_parts();
        parts
            .rules
            .push(Rule::new("q0", 'b', "q1", 'z', Direction::Left));
        assert_eq!(
            build_err(parts),
            ValidationError::UnknownWriteSymbol {
                state: "q0".to_string(),
                read: 'b',
                symbol: 'z'
            }
        );
    }

    #[test]
    fn test_validation_fails_fast_in_order() {
        // Both the start state and the blank are broken; the state check runs first.
        let mut parts = valid_parts();
        parts.start_state = "nowhere".to_string();
        parts.input_alphabet.insert('_');

        assert_eq!(
            build_err(parts),
            ValidationError::UnknownStartState("nowhere".to_string())
        );
    }

    #[test]
    fn test_validate_input() {
        let spec = MachineSpec::build(valid_parts()).unwrap();

        assert_eq!(validate_input(&spec, "abba").unwrap(), vec!['a', 'b', 'b', 'a']);
        assert!(validate_input(&spec, "").unwrap().is_empty());
        assert_eq!(
            validate_input(&spec, "abXa").unwrap_err(),
            ValidationError::SymbolNotInInputAlphabet {
                symbol: 'X',
                position: 2
            }
        );
        // Blank is a tape symbol but not an input symbol.
        assert!(validate_input(&spec, "a_").is_err());
    }

    #[test]
    fn test_unreachable_states() {
        let mut parts = valid_parts();
        parts.states.insert("island".to_string());
        parts
            .rules
            .push(Rule::new("island", 'a', "q0", 'a', Direction::Right));
        // Rules out of the accept state are never followed.
        parts
            .rules
            .push(Rule::new("accept", 'a', "island", 'a', Direction::Right));

        let spec = MachineSpec::build(parts).unwrap();
        assert_eq!(
            unreachable_states(&spec),
            vec!["island".to_string(), "reject".to_string()]
        );
    }
}
