//! A catalog of built-in machine definitions, embedded at compile time and parsed on first use.

use crate::document::decode;
use crate::spec::MachineSpec;
use crate::types::MachineError;

use std::sync::{Arc, RwLock};

// Embedded machine documents
const MACHINE_TEXTS: [&str; 4] = [
    include_str!("../machines/binary-increment.json"),
    include_str!("../machines/even-parity.json"),
    include_str!("../machines/a-then-b.json"),
    include_str!("../machines/endless-scan.json"),
];

/// A built-in machine together with its display name.
#[derive(Debug, Clone)]
pub struct LibraryEntry {
    pub name: String,
    pub description: Option<String>,
    /// Shared with every runtime started from this entry.
    pub spec: Arc<MachineSpec>,
    text: &'static str,
}

lazy_static::lazy_static! {
    pub static ref MACHINES: RwLock<Vec<LibraryEntry>> = RwLock::new(Vec::new());
}

/// Lookup functions over the built-in catalog.
pub struct MachineLibrary;

impl MachineLibrary {
    /// Parses the embedded machines into `MACHINES` unless that has already happened.
    pub fn load() -> Result<(), MachineError> {
        let mut machines = MACHINES
            .write()
            .map_err(|_| MachineError::FileError("Failed to acquire write lock".to_string()))?;

        if !machines.is_empty() {
            return Ok(());
        }

        for (index, text) in MACHINE_TEXTS.into_iter().enumerate() {
            match decode(text) {
                Ok((spec, metadata)) => {
                    let metadata = metadata.unwrap_or_default();
                    machines.push(LibraryEntry {
                        name: metadata.name.unwrap_or_else(|| format!("Machine {}", index + 1)),
                        description: metadata.description,
                        spec: Arc::new(spec),
                        text,
                    });
                }
                Err(e) => log::error!("failed to load built-in machine {}: {}", index, e),
            }
        }

        log::debug!("loaded {} built-in machines", machines.len());
        Ok(())
    }

    /// Loads the catalog for the infallible listing functions, which fall back to an
    /// empty catalog.
    fn ensure_loaded() {
        if let Err(e) = Self::load() {
            log::error!("failed to load built-in machines: {}", e);
        }
    }

    /// Get the number of available machines
    pub fn count() -> usize {
        Self::ensure_loaded();

        MACHINES.read().map(|machines| machines.len()).unwrap_or(0)
    }

    /// Get a machine by its index
    pub fn get_by_index(index: usize) -> Result<LibraryEntry, MachineError> {
        Self::load()?;

        MACHINES
            .read()
            .map_err(|_| MachineError::FileError("Failed to acquire read lock".to_string()))?
            .get(index)
            .cloned()
            .ok_or_else(|| MachineError::NotFound(format!("index {} out of range", index)))
    }

    /// Get a machine by name, ignoring case
    pub fn get_by_name(name: &str) -> Result<LibraryEntry, MachineError> {
        Self::load()?;

        MACHINES
            .read()
            .map_err(|_| MachineError::FileError("Failed to acquire read lock".to_string()))?
            .iter()
            .find(|entry| entry.name.eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| MachineError::NotFound(format!("'{}'", name)))
    }

    /// List all machine names
    pub fn list_names() -> Vec<String> {
        Self::ensure_loaded();

        MACHINES
            .read()
            .map(|machines| machines.iter().map(|entry| entry.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Search for machines whose name contains `query`, ignoring case
    pub fn search(query: &str) -> Vec<usize> {
        Self::ensure_loaded();
        let query = query.to_lowercase();

        MACHINES
            .read()
            .map(|machines| {
                machines
                    .iter()
                    .enumerate()
                    .filter(|(_, entry)| entry.name.to_lowercase().contains(&query))
                    .map(|(index, _)| index)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Summarize the machine at `index`
    pub fn info(index: usize) -> Result<MachineInfo, MachineError> {
        let entry = Self::get_by_index(index)?;

        Ok(MachineInfo {
            index,
            name: entry.name.clone(),
            start_state: entry.spec.start_state().to_string(),
            state_count: entry.spec.states().len(),
            transition_count: entry.spec.transition_count(),
        })
    }
}

impl LibraryEntry {
    /// The embedded document this entry was parsed from.
    pub fn text(&self) -> &'static str {
        self.text
    }
}

#[derive(Debug, Clone)]
pub struct MachineInfo {
    pub index: usize,
    pub name: String,
    pub start_state: String,
    pub state_count: usize,
    pub transition_count: usize,
}
