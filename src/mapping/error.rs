//! Mapping compilation errors

use thiserror::Error;

use super::rule::{NoteNumber, Resolution, Velocity};

/// A mapping document that cannot be turned into a rule table
///
/// Any of these rejects the whole document; a table is never partially built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedMappingError {
    /// The document could not be decoded at all (syntax, non-integer values)
    #[error("could not decode mapping document: {0}")]
    Decode(String),

    #[error("{element} attribute `{attribute}` = {value} is outside 0-127")]
    OutOfRange {
        element: &'static str,
        attribute: &'static str,
        value: i64,
    },

    #[error("note from={from} has no `to` and no enclosing group supplies one")]
    MissingTarget { from: NoteNumber },

    #[error(
        "conflicting rules for note {from}{}: {first} vs {second}",
        .condition.map(|v| format!(" at input velocity {v}")).unwrap_or_default()
    )]
    Conflict {
        from: NoteNumber,
        condition: Option<Velocity>,
        first: Resolution,
        second: Resolution,
    },

    #[error("mapping contains no note rules")]
    Empty,
}

impl From<serde_yaml::Error> for MalformedMappingError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<serde_json::Error> for MalformedMappingError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

impl From<quick_xml::DeError> for MalformedMappingError {
    fn from(err: quick_xml::DeError) -> Self {
        Self::Decode(err.to_string())
    }
}
