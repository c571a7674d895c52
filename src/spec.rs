//! This module defines `MachineSpec`, the immutable description of a single-tape machine,
//! together with `SpecParts` and `SpecBuilder` for assembling one from editor-supplied data.
//!
//! A `MachineSpec` can only be obtained through a validating build, so every value of the
//! type satisfies the invariants checked in [`crate::analyzer::validate`].

use crate::analyzer::validate;
use crate::types::{
    Direction, Rule, State, Symbol, Transition, ValidationError, DEFAULT_BLANK_SYMBOL,
};
use std::collections::{BTreeMap, BTreeSet};

/// The transition table: source state, then symbol read, to the transition taken.
pub type TransitionTable = BTreeMap<State, BTreeMap<Symbol, Transition>>;

/// An immutable, validated machine definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineSpec {
    states: BTreeSet<State>,
    input_alphabet: BTreeSet<Symbol>,
    tape_alphabet: BTreeSet<Symbol>,
    transitions: TransitionTable,
    start_state: State,
    accept_state: State,
    reject_state: State,
    blank: Symbol,
}

/// The raw ingredients of a machine definition, prior to validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecParts {
    pub states: BTreeSet<State>,
    pub input_alphabet: BTreeSet<Symbol>,
    /// Must contain the input alphabet and the blank.
    pub tape_alphabet: BTreeSet<Symbol>,
    /// Flat transition rows. A later row for the same `(from, read)` pair
    /// replaces an earlier one.
    pub rules: Vec<Rule>,
    pub start_state: State,
    pub accept_state: State,
    pub reject_state: State,
    pub blank: Symbol,
}

impl Default for SpecParts {
    fn default() -> Self {
        Self {
            states: BTreeSet::new(),
            input_alphabet: BTreeSet::new(),
            tape_alphabet: BTreeSet::new(),
            rules: Vec::new(),
            start_state: State::new(),
            accept_state: State::new(),
            reject_state: State::new(),
            blank: DEFAULT_BLANK_SYMBOL,
        }
    }
}

impl MachineSpec {
    /// Builds a machine definition from its parts, checking every well-formedness rule.
    ///
    /// Fails on the first violated rule. Duplicate `(from, read)` rows are resolved
    /// in favour of the last one.
    pub fn build(parts: SpecParts) -> Result<Self, ValidationError> {
        let mut transitions = TransitionTable::new();
        for rule in parts.rules {
            transitions.entry(rule.from).or_default().insert(
                rule.read,
                Transition {
                    next_state: rule.to,
                    write_symbol: rule.write,
                    direction: rule.direction,
                },
            );
        }

        let spec = Self {
            states: parts.states,
            input_alphabet: parts.input_alphabet,
            tape_alphabet: parts.tape_alphabet,
            transitions,
            start_state: parts.start_state,
            accept_state: parts.accept_state,
            reject_state: parts.reject_state,
            blank: parts.blank,
        };

        validate(&spec)?;

        log::debug!(
            "built machine with {} states and {} transitions",
            spec.states.len(),
            spec.transition_count()
        );

        Ok(spec)
    }

    /// Returns every declared state, terminal ones included.
    pub fn states(&self) -> &BTreeSet<State> {
        &self.states
    }

    /// Returns the symbols an input string may contain.
    pub fn input_alphabet(&self) -> &BTreeSet<Symbol> {
        &self.input_alphabet
    }

    /// Returns every symbol that may appear on the tape, blank included.
    pub fn tape_alphabet(&self) -> &BTreeSet<Symbol> {
        &self.tape_alphabet
    }

    /// Returns the transition table, keyed by state then symbol.
    pub fn transitions(&self) -> &TransitionTable {
        &self.transitions
    }

    /// Returns the state a new runtime starts in.
    pub fn start_state(&self) -> &str {
        &self.start_state
    }

    /// Returns the state that halts with acceptance.
    pub fn accept_state(&self) -> &str {
        &self.accept_state
    }

    /// Returns the state that halts with rejection, explicit or for lack of a rule.
    pub fn reject_state(&self) -> &str {
        &self.reject_state
    }

    /// Returns the symbol read from cells that were never written.
    pub fn blank(&self) -> Symbol {
        self.blank
    }

    /// Looks up the transition for `state` reading `symbol`, if one is defined.
    pub fn transition(&self, state: &str, symbol: Symbol) -> Option<&Transition> {
        self.transitions.get(state)?.get(&symbol)
    }

    /// Whether `state` is the accept or the reject state.
    pub fn is_terminal(&self, state: &str) -> bool {
        state == self.accept_state || state == self.reject_state
    }

    /// Returns the number of defined `(state, symbol)` entries.
    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(BTreeMap::len).sum()
    }

    /// Flattens the transition table back into editable rows, ordered by state then symbol.
    pub fn rules(&self) -> impl Iterator<Item = Rule> + '_ {
        self.transitions.iter().flat_map(|(from, row)| {
            row.iter().map(move |(&read, transition)| Rule {
                from: from.clone(),
                read,
                to: transition.next_state.clone(),
                write: transition.write_symbol,
                direction: transition.direction,
            })
        })
    }

    /// Returns the parts this definition was built from, with duplicates already resolved.
    pub fn to_parts(&self) -> SpecParts {
        SpecParts {
            states: self.states.clone(),
            input_alphabet: self.input_alphabet.clone(),
            tape_alphabet: self.tape_alphabet.clone(),
            rules: self.rules().collect(),
            start_state: self.start_state.clone(),
            accept_state: self.accept_state.clone(),
            reject_state: self.reject_state.clone(),
            blank: self.blank,
        }
    }
}

/// A fluent builder over `SpecParts`.
///
/// ```
/// use tmsim::{Direction, SpecBuilder};
///
/// let spec = SpecBuilder::new()
///     .states(["q0", "accept", "reject"])
///     .input_alphabet(['a'])
///     .tape_alphabet(['a', '_'])
///     .blank('_')
///     .rule("q0", 'a', "accept", 'a', Direction::Stay)
///     .start("q0")
///     .accept("accept")
///     .reject("reject")
///     .build()
///     .unwrap();
///
/// assert_eq!(spec.transition_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpecBuilder {
    parts: SpecParts,
}

impl SpecBuilder {
    /// Creates a builder with empty sets and the default blank symbol.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds states to the state set.
    pub fn states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<State>,
    {
        self.parts.states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Adds symbols to the input alphabet.
    pub fn input_alphabet(mut self, symbols: impl IntoIterator<Item = Symbol>) -> Self {
        self.parts.input_alphabet.extend(symbols);
        self
    }

    /// Adds symbols to the tape alphabet.
    pub fn tape_alphabet(mut self, symbols: impl IntoIterator<Item = Symbol>) -> Self {
        self.parts.tape_alphabet.extend(symbols);
        self
    }

    /// Appends one transition row; a later row for the same state and symbol wins.
    pub fn rule(
        mut self,
        from: impl Into<State>,
        read: Symbol,
        to: impl Into<State>,
        write: Symbol,
        direction: Direction,
    ) -> Self {
        self.parts
            .rules
            .push(Rule::new(from, read, to, write, direction));
        self
    }

    /// Appends several transition rows, in order.
    pub fn rules(mut self, rules: impl IntoIterator<Item = Rule>) -> Self {
        self.parts.rules.extend(rules);
        self
    }

    /// Sets the start state.
    pub fn start(mut self, state: impl Into<State>) -> Self {
        self.parts.start_state = state.into();
        self
    }

    /// Sets the accept state.
    pub fn accept(mut self, state: impl Into<State>) -> Self {
        self.parts.accept_state = state.into();
        self
    }

    /// Sets the reject state.
    pub fn reject(mut self, state: impl Into<State>) -> Self {
        self.parts.reject_state = state.into();
        self
    }

    /// Sets the blank symbol.
    pub fn blank(mut self, symbol: Symbol) -> Self {
        self.parts.blank = symbol;
        self
    }

    /// Validates the collected parts. See [`MachineSpec::build`].
    pub fn build(self) -> Result<MachineSpec, ValidationError> {
        MachineSpec::build(self.parts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> SpecBuilder {
        SpecBuilder::new()
            .states(["q0", "q1", "qAccept", "qReject"])
            .input_alphabet(['0', '1'])
            .tape_alphabet(['0', '1', '□'])
            .start("q0")
            .accept("qAccept")
            .reject("qReject")
    }

    #[test]
    fn test_last_rule_wins() {
        let spec = base()
            .rule("q0", '0', "q1", '1', Direction::Right)
            .rule("q0", '0', "qAccept", '0', Direction::Left)
            .build()
            .unwrap();

        assert_eq!(spec.transition_count(), 1);
        assert_eq!(
            spec.transition("q0", '0'),
            Some(&Transition {
                next_state: "qAccept".to_string(),
                write_symbol: '0',
                direction: Direction::Left,
            })
        );
    }

    #[test]
    fn test_absent_transition_is_none() {
        let spec = base()
            .rule("q0", '0', "q1", '1', Direction::Right)
            .build()
            .unwrap();

        assert!(spec.transition("q0", '1').is_none());
        assert!(spec.transition("q1", '0').is_none());
        assert!(spec.transition("missing", '0').is_none());
    }

    #[test]
    fn test_terminal_states() {
        let spec = base().build().unwrap();

        assert!(spec.is_terminal("qAccept"));
        assert!(spec.is_terminal("qReject"));
        assert!(!spec.is_terminal("q0"));
    }

    #[test]
    fn test_rules_round_trip_through_parts() {
        let spec = base()
            .rule("q1", '1', "q0", '0', Direction::Stay)
            .rule("q0", '0', "q1", '1', Direction::Right)
            .build()
            .unwrap();

        let parts = spec.to_parts();
        assert_eq!(parts.rules.len(), 2);
        assert_eq!(parts.rules[0].from, "q0");
        assert_eq!(MachineSpec::build(parts).unwrap(), spec);
    }

    #[test]
    fn test_build_does_not_require_terminal_rules() {
        // Rules leaving the accept state are allowed even though they never run.
        let spec = base()
            .rule("qAccept", '0', "q0", '0', Direction::Right)
            .build();

        assert!(spec.is_ok());
    }

    #[test]
    fn test_default_blank() {
        let spec = base().build().unwrap();
        assert_eq!(spec.blank(), DEFAULT_BLANK_SYMBOL);
    }
}
