//! This crate provides the core logic for a single-tape Turing machine simulator.
//! It includes modules for describing and validating machine definitions, executing them
//! step by step against an input string, persisting definitions as JSON, and a small
//! catalog of built-in machines.

pub mod analyzer;
pub mod document;
pub mod library;
pub mod loader;
pub mod machine;
pub mod sample;
pub mod spec;
pub mod types;

/// Re-exports the validation entry points from the analyzer module.
pub use analyzer::{unreachable_states, validate, validate_input};
/// Re-exports the persistence functions and types from the document module.
pub use document::{decode, encode, Document, Metadata};
/// Re-exports the built-in machine catalog.
pub use library::{LibraryEntry, MachineInfo, MachineLibrary, MACHINES};
/// Re-exports the `SpecLoader` struct from the loader module.
pub use loader::SpecLoader;
/// Re-exports the execution engine.
pub use machine::{Runtime, Snapshot};
/// Re-exports the random input generators.
pub use sample::{random_input, seeded_input};
/// Re-exports the machine definition and its builders.
pub use spec::{MachineSpec, SpecBuilder, SpecParts, TransitionTable};
/// Re-exports the shared types.
pub use types::{
    Direction, Halt, MachineError, Rejection, Rule, RunOutcome, State, Status, Step, Symbol,
    Transition, ValidationError, DEFAULT_BLANK_SYMBOL, MAX_DOCUMENT_SIZE, MAX_EXECUTION_STEPS,
};
