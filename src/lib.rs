//! drumremap - Drum note remapping for MIDI files
//!
//! Mapping documents describe how one kit's note numbers translate to
//! another's. They compile into an immutable rule table, which the remap
//! engine applies to note events read from MIDI files.

pub mod config;
pub mod engine;
pub mod mapping;

pub use config::RemapperConfig;
pub use engine::{remap, Event, NoteEvent, RemapOutcome, Remapper, UnmappedReport};
pub use mapping::{compile, Lookup, MalformedMappingError, MappingDocument, RuleTable};
