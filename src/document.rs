//! This module provides the persisted JSON form of a machine definition and the functions
//! that convert between it and a validated `MachineSpec`.
//!
//! A document looks like:
//!
//! ```json
//! {
//!   "states": ["q0", "accept", "reject"],
//!   "inputAlphabet": ["a"],
//!   "tapeAlphabet": ["a", "_"],
//!   "transitions": { "q0": { "a": { "nextState": "accept", "writeSymbol": "a", "direction": "S" } } },
//!   "startState": "q0",
//!   "acceptState": "accept",
//!   "rejectState": "reject",
//!   "blankSymbol": "_",
//!   "metadata": { "name": "Accept a", "exportedAt": 1760000000 }
//! }
//! ```

use crate::spec::{MachineSpec, SpecParts, TransitionTable};
use crate::types::{MachineError, Rule, State, Symbol, ValidationError, MAX_DOCUMENT_SIZE};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// The top-level collections a document must carry.
const REQUIRED_FIELDS: [&str; 4] = ["states", "inputAlphabet", "tapeAlphabet", "transitions"];

/// Free-form information stored alongside a definition. It is never interpreted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the document was exported. Kept as written, so both epoch seconds
    /// and timestamp strings survive a load and save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<serde_json::Value>,
}

impl Metadata {
    /// Creates metadata carrying only a display name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Attaches a description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Records the current time, in seconds since the Unix epoch, as the export time.
    pub fn stamped(mut self) -> Self {
        self.exported_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .ok()
            .map(|d| serde_json::Value::from(d.as_secs()));
        self
    }
}

/// The serialized shape of a machine definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub states: Vec<State>,
    pub input_alphabet: Vec<Symbol>,
    pub tape_alphabet: Vec<Symbol>,
    pub transitions: TransitionTable,
    pub start_state: State,
    pub accept_state: State,
    pub reject_state: State,
    pub blank_symbol: Symbol,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

impl Document {
    /// Captures a validated definition in its persisted shape.
    pub fn from_spec(spec: &MachineSpec, metadata: Option<Metadata>) -> Self {
        Self {
            states: spec.states().iter().cloned().collect(),
            input_alphabet: spec.input_alphabet().iter().copied().collect(),
            tape_alphabet: spec.tape_alphabet().iter().copied().collect(),
            transitions: spec.transitions().clone(),
            start_state: spec.start_state().to_string(),
            accept_state: spec.accept_state().to_string(),
            reject_state: spec.reject_state().to_string(),
            blank_symbol: spec.blank(),
            metadata,
        }
    }

    /// Validates the document and turns it into a `MachineSpec`, returning the metadata alongside.
    pub fn into_spec(self) -> Result<(MachineSpec, Option<Metadata>), ValidationError> {
        let rules = self
            .transitions
            .into_iter()
            .flat_map(|(from, row)| {
                row.into_iter().map(move |(read, t)| Rule {
                    from: from.clone(),
                    read,
                    to: t.next_state,
                    write: t.write_symbol,
                    direction: t.direction,
                })
            })
            .collect();

        let spec = MachineSpec::build(SpecParts {
            states: self.states.into_iter().collect(),
            input_alphabet: self.input_alphabet.into_iter().collect(),
            tape_alphabet: self.tape_alphabet.into_iter().collect(),
            rules,
            start_state: self.start_state,
            accept_state: self.accept_state,
            reject_state: self.reject_state,
            blank: self.blank_symbol,
        })?;

        Ok((spec, self.metadata))
    }
}

/// Serializes a definition as pretty-printed JSON.
pub fn encode(spec: &MachineSpec, metadata: Option<Metadata>) -> Result<String, MachineError> {
    let document = Document::from_spec(spec, metadata);
    Ok(serde_json::to_string_pretty(&document)?)
}

/// Parses and validates a persisted definition.
///
/// # Errors
///
/// * `MachineError::TooLarge` if `text` exceeds `MAX_DOCUMENT_SIZE` bytes.
/// * `MachineError::MissingField` if one of the four required collections is absent.
/// * `MachineError::Json` if the document is not well-typed JSON.
/// * `MachineError::Validation` if the definition breaks a well-formedness rule.
pub fn decode(text: &str) -> Result<(MachineSpec, Option<Metadata>), MachineError> {
    if text.len() > MAX_DOCUMENT_SIZE {
        return Err(MachineError::TooLarge {
            size: text.len(),
            limit: MAX_DOCUMENT_SIZE,
        });
    }

    let value: serde_json::Value = serde_json::from_str(text)?;
    if let Some(field) = REQUIRED_FIELDS
        .into_iter()
        .find(|field| value.get(field).is_none())
    {
        return Err(MachineError::MissingField(field));
    }

    let document: Document = serde_json::from_value(value)?;
    Ok(document.into_spec()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SpecBuilder;
    use crate::types::Direction;
    use serde_json::json;

    fn create_test_spec() -> MachineSpec {
        SpecBuilder::new()
            .states(["even", "odd", "accept", "reject"])
            .input_alphabet(['0', '1'])
            .tape_alphabet(['0', '1', '_'])
            .blank('_')
            .rule("even", '0', "even", '0', Direction::Right)
            .rule("even", '1', "odd", '1', Direction::Right)
            .rule("odd", '0', "odd", '0', Direction::Right)
            .rule("odd", '1', "even", '1', Direction::Right)
            .rule("even", '_', "accept", '_', Direction::Stay)
            .rule("odd", '_', "reject", '_', Direction::Left)
            .start("even")
            .accept("accept")
            .reject("reject")
            .build()
            .unwrap()
    }

    fn document_json() -> serde_json::Value {
        json!({
            "states": ["q0", "accept", "reject"],
            "inputAlphabet": ["a"],
            "tapeAlphabet": ["a", "_"],
            "transitions": {
                "q0": { "a": { "nextState": "accept", "writeSymbol": "a", "direction": "S" } }
            },
            "startState": "q0",
            "acceptState": "accept",
            "rejectState": "reject",
            "blankSymbol": "_"
        })
    }

    #[test]
    fn test_round_trip() {
        let spec = create_test_spec();
        let metadata = Metadata::named("Parity").with_description("Even number of ones");

        let text = encode(&spec, Some(metadata.clone())).unwrap();
        let (decoded, decoded_metadata) = decode(&text).unwrap();

        assert_eq!(decoded, spec);
        assert_eq!(decoded_metadata, Some(metadata));
    }

    #[test]
    fn test_encoded_shape() {
        let text = encode(&create_test_spec(), None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();

        assert_eq!(value["startState"], "even");
        assert_eq!(value["blankSymbol"], "_");
        assert_eq!(value["transitions"]["odd"]["_"]["direction"], "L");
        assert_eq!(value["transitions"]["even"]["1"]["nextState"], "odd");
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn test_decode_document() {
        let (spec, metadata) = decode(&document_json().to_string()).unwrap();

        assert_eq!(spec.start_state(), "q0");
        assert_eq!(spec.blank(), '_');
        assert_eq!(spec.transition("q0", 'a').unwrap().direction, Direction::Stay);
        assert!(metadata.is_none());
    }

    #[test]
    fn test_set_order_is_not_significant() {
        let mut reordered = document_json();
        reordered["states"] = json!(["reject", "q0", "accept", "q0"]);
        reordered["tapeAlphabet"] = json!(["_", "a"]);

        let (a, _) = decode(&document_json().to_string()).unwrap();
        let (b, _) = decode(&reordered.to_string()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_collections() {
        for field in REQUIRED_FIELDS {
            let mut value = document_json();
            value.as_object_mut().unwrap().remove(field);

            match decode(&value.to_string()) {
                Err(MachineError::MissingField(missing)) => assert_eq!(missing, field),
                other => panic!("Expected MissingField({}), got {:?}", field, other),
            }
        }
    }

    #[test]
    fn test_decode_rejects_invalid_definition() {
        let mut value = document_json();
        value["inputAlphabet"] = json!(["a", "_"]);

        assert!(matches!(
            decode(&value.to_string()),
            Err(MachineError::Validation(ValidationError::BlankInInputAlphabet('_')))
        ));
    }

    #[test]
    fn test_decode_bad_direction() {
        let mut value = document_json();
        value["transitions"]["q0"]["a"]["direction"] = json!("Up");

        assert!(matches!(
            decode(&value.to_string()),
            Err(MachineError::Json(_))
        ));
    }

    #[test]
    fn test_decode_too_large() {
        let text = " ".repeat(MAX_DOCUMENT_SIZE + 1);

        assert!(matches!(decode(&text), Err(MachineError::TooLarge { .. })));
    }

    #[test]
    fn test_metadata_stamp() {
        let metadata = Metadata::named("x").stamped();
        assert!(metadata.exported_at.unwrap().is_u64());
    }

    #[test]
    fn test_decode_string_timestamp() {
        let mut value = document_json();
        value["metadata"] = json!({"name": "x", "exportedAt": "2024-05-01T12:00:00.000Z"});

        let (spec, metadata) = decode(&value.to_string()).unwrap();
        let metadata = metadata.unwrap();
        assert_eq!(metadata.name.as_deref(), Some("x"));
        assert_eq!(metadata.exported_at, Some(json!("2024-05-01T12:00:00.000Z")));

        let text = encode(&spec, Some(metadata)).unwrap();
        let saved: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(saved["metadata"]["exportedAt"], "2024-05-01T12:00:00.000Z");
    }
}
