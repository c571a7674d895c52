//! This module provides the `SpecLoader` struct, responsible for reading and writing
//! persisted machine definitions on disk.

use crate::document::{decode, encode, Metadata};
use crate::spec::MachineSpec;
use crate::types::MachineError;
use std::fs;
use std::path::Path;

/// `SpecLoader` is a utility struct for loading and saving machine definitions.
pub struct SpecLoader;

impl SpecLoader {
    /// Loads a single machine definition from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok((MachineSpec, Option<Metadata>))` if the file is read, parsed and validated.
    /// * `Err(MachineError::FileError)` if the file cannot be read.
    /// * Any error from [`decode`] if the content is not a valid definition.
    pub fn load_spec(path: &Path) -> Result<(MachineSpec, Option<Metadata>), MachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        decode(&content)
    }

    /// Loads a single machine definition from string content, e.g. piped from stdin.
    pub fn load_spec_from_string(
        content: &str,
    ) -> Result<(MachineSpec, Option<Metadata>), MachineError> {
        decode(content)
    }

    /// Writes a machine definition to `path`, replacing any existing file.
    pub fn save_spec(
        path: &Path,
        spec: &MachineSpec,
        metadata: Option<Metadata>,
    ) -> Result<(), MachineError> {
        let content = encode(spec, metadata)?;
        fs::write(path, content).map_err(|e| {
            MachineError::FileError(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        log::debug!("saved machine definition to {}", path.display());
        Ok(())
    }
}
