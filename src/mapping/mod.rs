//! Mapping system for drum note conversion
//!
//! Mapping documents are compiled into an immutable rule table that
//! resolves (note, velocity) pairs to their remapped values.

mod compiler;
mod document;
mod error;
mod library;
mod rule;
mod table;
mod xml;

pub use compiler::{compile, resolve, Defaults};
pub use document::{ConditionElement, DocumentFormat, GroupElement, MappingDocument, NoteElement};
pub use error::MalformedMappingError;
pub use library::{load_mapping, MappingLibrary, MappingSelection, AS_SOURCE};
pub use rule::{NoteNumber, Resolution, ResolvedOutput, Rule, Velocity, MIDI_MAX};
pub use table::{Lookup, RuleEntry, RuleTable};
