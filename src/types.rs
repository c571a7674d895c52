//! This module defines the core data structures and types used throughout the simulator,
//! including symbols, states, transitions, step outcomes, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A tape symbol. By convention every symbol is a single character.
pub type Symbol = char;
/// A control state identifier.
pub type State = String;

/// The default blank symbol used when a builder is not given one.
pub const DEFAULT_BLANK_SYMBOL: Symbol = '□';
/// The maximum allowed size for a persisted machine document in bytes.
pub const MAX_DOCUMENT_SIZE: usize = 65536; // 64KB
/// The default number of steps a bounded driver executes before giving up.
pub const MAX_EXECUTION_STEPS: usize = 10000;

/// Represents the possible directions the head can move.
///
/// Serialized as the single-letter tags `"L"`, `"R"` and `"S"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    #[serde(rename = "L")]
    Left,
    /// Move the head one position to the right.
    #[serde(rename = "R")]
    Right,
    /// Keep the head in the same position.
    #[serde(rename = "S")]
    Stay,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Direction::Left => "L",
            Direction::Right => "R",
            Direction::Stay => "S",
        };
        f.write_str(tag)
    }
}

/// The action taken when the machine is in a given state reading a given symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    /// The state the machine moves to.
    pub next_state: State,
    /// The symbol written under the head.
    pub write_symbol: Symbol,
    /// The direction the head moves after writing.
    pub direction: Direction,
}

/// A single row of an editable transition table.
///
/// Rules are the flat form handed over by an editor; they are folded into a
/// `(state, symbol) -> Transition` table when a specification is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// The state the rule applies in.
    pub from: State,
    /// The symbol that must be under the head.
    pub read: Symbol,
    /// The state the machine moves to.
    pub to: State,
    /// The symbol written under the head.
    pub write: Symbol,
    /// The direction the head moves after writing.
    pub direction: Direction,
}

impl Rule {
    /// Creates a rule from its five columns, in table order.
    pub fn new(
        from: impl Into<State>,
        read: Symbol,
        to: impl Into<State>,
        write: Symbol,
        direction: Direction,
    ) -> Self {
        Self {
            from: from.into(),
            read,
            to: to.into(),
            write,
            direction,
        }
    }
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The machine performed a transition and can continue.
    Continue,
    /// The machine is halted.
    Halt(Halt),
}

/// Why a machine halted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Halt {
    /// The machine entered the accept state.
    Accepted,
    /// The machine entered the reject state through a defined transition.
    Rejected,
    /// No transition was defined for the current state and symbol, so the
    /// machine was moved to the reject state.
    NoRule(Rejection),
}

impl Halt {
    /// Whether the machine halted in the accept state.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Halt::Accepted)
    }

    /// Both explicit rejection and a missing rule count as rejection.
    pub fn is_rejected(&self) -> bool {
        !self.is_accepted()
    }
}

impl fmt::Display for Halt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Halt::Accepted => write!(f, "accepted"),
            Halt::Rejected => write!(f, "rejected"),
            Halt::NoRule(rejection) => write!(
                f,
                "rejected (no rule for state {} reading {:?})",
                rejection.state, rejection.symbol
            ),
        }
    }
}

/// Details of an implicit rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    /// The state the machine was in when no rule matched.
    pub state: State,
    /// The symbol that was under the head.
    pub symbol: Symbol,
}

/// The halting status reported alongside every snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// The machine has not reached a terminal state.
    Running,
    /// The machine has halted and will not change again.
    Halted(Halt),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Running => write!(f, "running"),
            Status::Halted(halt) => write!(f, "{}", halt),
        }
    }
}

/// The result of driving a runtime with a step budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The machine halted within the budget.
    Halted(Halt),
    /// The budget ran out before the machine halted.
    Exhausted {
        /// Total steps taken by the runtime so far.
        steps: usize,
    },
}

/// Violations of the well-formedness rules of a machine specification or of
/// an input string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Start state {0} is not in the state set")]
    UnknownStartState(State),
    #[error("Accept state {0} is not in the state set")]
    UnknownAcceptState(State),
    #[error("Reject state {0} is not in the state set")]
    UnknownRejectState(State),
    #[error("Blank symbol {0:?} is not in the tape alphabet")]
    BlankNotInTapeAlphabet(Symbol),
    #[error("Blank symbol {0:?} must not be in the input alphabet")]
    BlankInInputAlphabet(Symbol),
    #[error("Input symbol {0:?} is not in the tape alphabet")]
    InputSymbolNotInTapeAlphabet(Symbol),
    #[error("Transition source state {0} is not in the state set")]
    UnknownSourceState(State),
    #[error("Transition from state {state} reads symbol {symbol:?} which is not in the tape alphabet")]
    UnknownReadSymbol { state: State, symbol: Symbol },
    #[error("Transition from state {state} on {read:?} targets state {target} which is not in the state set")]
    UnknownTargetState {
        state: State,
        read: Symbol,
        target: State,
    },
    #[error("Transition from state {state} on {read:?} writes symbol {symbol:?} which is not in the tape alphabet")]
    UnknownWriteSymbol {
        state: State,
        read: Symbol,
        symbol: Symbol,
    },
    #[error("Input symbol {symbol:?} at position {position} is not in the input alphabet")]
    SymbolNotInInputAlphabet { symbol: Symbol, position: usize },
}

impl ValidationError {
    /// A short, stable name for the invariant that was broken.
    pub fn invariant(&self) -> &'static str {
        match self {
            ValidationError::UnknownStartState(_) => "start-state-member",
            ValidationError::UnknownAcceptState(_) => "accept-state-member",
            ValidationError::UnknownRejectState(_) => "reject-state-member",
            ValidationError::BlankNotInTapeAlphabet(_) => "blank-in-tape-alphabet",
            ValidationError::BlankInInputAlphabet(_) => "blank-not-in-input-alphabet",
            ValidationError::InputSymbolNotInTapeAlphabet(_) => "input-subset-of-tape",
            ValidationError::UnknownSourceState(_) | ValidationError::UnknownTargetState { .. } => {
                "transition-states-known"
            }
            ValidationError::UnknownReadSymbol { .. } | ValidationError::UnknownWriteSymbol { .. } => {
                "transition-symbols-known"
            }
            ValidationError::SymbolNotInInputAlphabet { .. } => "input-in-input-alphabet",
        }
    }
}

/// Represents the errors that can surface from the library as a whole.
#[derive(Debug, Error)]
pub enum MachineError {
    /// The machine definition or the input string is malformed.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    /// A persisted document could not be parsed.
    #[error("Document parsing error: {0}")]
    Json(#[from] serde_json::Error),
    /// A persisted document lacks one of its required top-level collections.
    #[error("Document is missing required field `{0}`")]
    MissingField(&'static str),
    /// A persisted document exceeds `MAX_DOCUMENT_SIZE`.
    #[error("Document is {size} bytes, larger than the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
    /// A file system operation failed.
    #[error("File error: {0}")]
    FileError(String),
    /// A named or indexed machine does not exist.
    #[error("Machine not found: {0}")]
    NotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        assert_eq!(serde_json::to_string(&Direction::Left).unwrap(), "\"L\"");
        assert_eq!(serde_json::to_string(&Direction::Right).unwrap(), "\"R\"");
        assert_eq!(serde_json::to_string(&Direction::Stay).unwrap(), "\"S\"");

        let stay: Direction = serde_json::from_str("\"S\"").unwrap();
        assert_eq!(stay, Direction::Stay);
        assert!(serde_json::from_str::<Direction>("\"Left\"").is_err());
    }

    #[test]
    fn test_transition_serialization() {
        let transition = Transition {
            next_state: "q1".to_string(),
            write_symbol: 'X',
            direction: Direction::Right,
        };

        let json = serde_json::to_value(&transition).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"nextState": "q1", "writeSymbol": "X", "direction": "R"})
        );
    }

    #[test]
    fn test_halt_classification() {
        let no_rule = Halt::NoRule(Rejection {
            state: "q0".to_string(),
            symbol: '1',
        });

        assert!(Halt::Accepted.is_accepted());
        assert!(Halt::Rejected.is_rejected());
        assert!(no_rule.is_rejected());
        assert!(no_rule.to_string().contains("no rule"));
    }

    #[test]
    fn test_error_display() {
        let error = ValidationError::UnknownStartState("q9".to_string());

        let error_msg = format!("{}", error);
        assert!(error_msg.contains("Start state"));
        assert!(error_msg.contains("q9"));
        assert_eq!(error.invariant(), "start-state-member");

        let wrapped: MachineError = error.into();
        assert!(wrapped.to_string().starts_with("Validation error"));
    }
}
