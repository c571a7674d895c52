//! This module defines the `Runtime` struct, which executes a `MachineSpec` against an
//! input string. It owns the tape, the head position, the current state and the step
//! counter, and advances them one transition at a time.

use crate::analyzer::validate_input;
use crate::spec::MachineSpec;
use crate::types::{
    Direction, Halt, Rejection, RunOutcome, State, Status, Step, Symbol, ValidationError,
};
use std::fmt;
use std::sync::Arc;

/// The mutable configuration of one simulation session.
///
/// A runtime is never reset: starting over means building a new one from the
/// same definition and input.
#[derive(Debug, Clone)]
pub struct Runtime {
    spec: Arc<MachineSpec>,
    tape: Vec<Symbol>,
    head: usize,
    state: State,
    step_count: usize,
    halt: Option<Halt>,
}

/// An owned copy of everything a display needs after a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// The materialized tape, leftmost cell first.
    pub tape: Vec<Symbol>,
    /// Index of the head into `tape`.
    pub head: usize,
    pub state: State,
    pub step_count: usize,
    pub status: Status,
}

impl Runtime {
    /// Creates a runtime for `spec` with `input` written on the tape.
    ///
    /// The head starts on the first input symbol, or on a single blank cell
    /// when the input is empty.
    ///
    /// # Errors
    ///
    /// * `ValidationError::BlankInInputAlphabet` if the definition lets the blank be input.
    /// * `ValidationError::SymbolNotInInputAlphabet` for the first foreign input character.
    pub fn new(spec: impl Into<Arc<MachineSpec>>, input: &str) -> Result<Self, ValidationError> {
        let spec = spec.into();
        let mut tape = validate_input(&spec, input)?;
        if tape.is_empty() {
            tape.push(spec.blank());
        }

        let state = spec.start_state().to_string();
        // A machine whose start state is terminal is halted before its first step.
        let halt = terminal_halt(&spec, &state);

        log::debug!(
            "created runtime in state {} with {} input symbols",
            state,
            input.chars().count()
        );

        Ok(Self {
            spec,
            tape,
            head: 0,
            state,
            step_count: 0,
            halt,
        })
    }

    /// Returns the symbol under the head.
    pub fn read(&self) -> Symbol {
        self.tape.get(self.head).copied().unwrap_or(self.spec.blank())
    }

    /// Overwrites the cell under the head.
    pub fn write(&mut self, symbol: Symbol) {
        match self.tape.get_mut(self.head) {
            Some(cell) => *cell = symbol,
            None => {
                self.tape.resize(self.head, self.spec.blank());
                self.tape.push(symbol);
            }
        }
    }

    /// Moves the head one cell, growing the tape with a blank when it steps past either end.
    ///
    /// Growing on the left shifts every existing cell one index to the right and
    /// leaves the head at index 0.
    pub fn move_head(&mut self, direction: Direction) {
        match direction {
            Direction::Left => {
                if self.head == 0 {
                    self.tape.insert(0, self.spec.blank());
                } else {
                    self.head -= 1;
                }
            }
            Direction::Right => {
                self.head += 1;
                if self.head >= self.tape.len() {
                    self.tape.push(self.spec.blank());
                }
            }
            Direction::Stay => {}
        }
    }

    /// Executes a single transition.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a transition ran and the machine is not in a terminal state.
    /// * `Step::Halt(_)` if the machine is, or has just become, halted. Once halted,
    ///   further calls return the same `Halt` and change nothing.
    pub fn step(&mut self) -> Step {
        if let Some(halt) = &self.halt {
            return Step::Halt(halt.clone());
        }

        let symbol = self.read();
        let transition = match self.spec.transition(&self.state, symbol) {
            Some(t) => t.clone(),
            None => {
                let halt = Halt::NoRule(Rejection {
                    state: std::mem::replace(
                        &mut self.state,
                        self.spec.reject_state().to_string(),
                    ),
                    symbol,
                });
                self.step_count += 1;
                log::debug!("halted after {} steps: {}", self.step_count, halt);
                self.halt = Some(halt.clone());
                return Step::Halt(halt);
            }
        };

        log::trace!(
            "step {}: ({}, {:?}) -> ({}, {:?}, {})",
            self.step_count + 1,
            self.state,
            symbol,
            transition.next_state,
            transition.write_symbol,
            transition.direction
        );

        self.write(transition.write_symbol);
        self.move_head(transition.direction);
        self.state = transition.next_state;
        self.step_count += 1;

        match terminal_halt(&self.spec, &self.state) {
            Some(halt) => {
                log::debug!("halted after {} steps: {}", self.step_count, halt);
                self.halt = Some(halt.clone());
                Step::Halt(halt)
            }
            None => Step::Continue,
        }
    }

    /// Steps until the machine halts or `max_steps` further steps have run.
    ///
    /// A machine that is already halted reports its halt without stepping.
    pub fn run(&mut self, max_steps: usize) -> RunOutcome {
        for _ in 0..max_steps {
            if let Step::Halt(halt) = self.step() {
                return RunOutcome::Halted(halt);
            }
        }

        match &self.halt {
            Some(halt) => RunOutcome::Halted(halt.clone()),
            None => {
                log::warn!(
                    "step budget of {} exhausted in state {} after {} total steps",
                    max_steps,
                    self.state,
                    self.step_count
                );
                RunOutcome::Exhausted {
                    steps: self.step_count,
                }
            }
        }
    }

    /// Returns the definition this runtime executes.
    pub fn spec(&self) -> &MachineSpec {
        &self.spec
    }

    /// Returns the materialized tape. Cells outside it read as blank.
    pub fn tape(&self) -> &[Symbol] {
        &self.tape
    }

    /// Returns the head's index into [`Runtime::tape`].
    pub fn head(&self) -> usize {
        self.head
    }

    /// Returns the current control state.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns how many steps have completed, including a final no-rule step.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Whether the machine has reached a terminal state.
    pub fn is_halted(&self) -> bool {
        self.halt.is_some()
    }

    /// Returns `Status::Running` or the halt that ended the run.
    pub fn status(&self) -> Status {
        match &self.halt {
            Some(halt) => Status::Halted(halt.clone()),
            None => Status::Running,
        }
    }

    /// Returns the tape contents with leading and trailing blanks removed.
    pub fn tape_string(&self) -> String {
        let blank = self.spec.blank();
        let start = self.tape.iter().position(|&s| s != blank);
        let end = self.tape.iter().rposition(|&s| s != blank);

        match (start, end) {
            (Some(start), Some(end)) => self.tape[start..=end].iter().collect(),
            _ => String::new(),
        }
    }

    /// Copies the observable configuration for display.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tape: self.tape.clone(),
            head: self.head,
            state: self.state.clone(),
            step_count: self.step_count,
            status: self.status(),
        }
    }
}

/// The halt reported for entering `state`, if it is terminal. Accept is checked first.
fn terminal_halt(spec: &MachineSpec, state: &str) -> Option<Halt> {
    if state == spec.accept_state() {
        Some(Halt::Accepted)
    } else if state == spec.reject_state() {
        Some(Halt::Rejected)
    } else {
        None
    }
}

impl fmt::Display for Snapshot {
    /// Renders the tape on one line with the head cell bracketed, followed by the state.
    ///
    /// `step 3 [q1] 1 0 [1] □ (running)`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} [{}]", self.step_count, self.state)?;
        for (i, symbol) in self.tape.iter().enumerate() {
            if i == self.head {
                write!(f, " [{}]", symbol)?;
            } else {
                write!(f, " {}", symbol)?;
            }
        }
        write!(f, " ({})", self.status)
    }
}
