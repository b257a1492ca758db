//! Mapping compiler
//!
//! Turns a decoded [`MappingDocument`] into a [`RuleTable`]. Group defaults
//! are merged into each nested note up front, so lookups never have to walk
//! back up to an enclosing element.

use tracing::debug;

use super::document::{ConditionElement, GroupElement, MappingDocument, NoteElement};
use super::error::MalformedMappingError;
use super::rule::{NoteNumber, Resolution, Rule, Velocity};
use super::table::RuleTable;

/// Defaults an enclosing group hands down to its notes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Defaults {
    pub to: Option<NoteNumber>,
    pub velocity: Option<Velocity>,
}

impl Defaults {
    /// Defaults for notes outside any group
    pub const NONE: Defaults = Defaults {
        to: None,
        velocity: None,
    };
}

/// A note element with its own attributes range-checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CheckedNote {
    from: NoteNumber,
    to: Option<NoteNumber>,
    velocity: Option<Velocity>,
}

/// Merge a note's own attributes over its group's defaults
///
/// Each attribute is overridden independently: a note that only sets
/// `velocity` still inherits the group's `to`.
pub fn resolve(
    from: NoteNumber,
    to: Option<NoteNumber>,
    velocity: Option<Velocity>,
    parent: Defaults,
) -> Result<Resolution, MalformedMappingError> {
    let to = to
        .or(parent.to)
        .ok_or(MalformedMappingError::MissingTarget { from })?;
    Ok(Resolution::new(to, velocity.or(parent.velocity)))
}

/// Compile a mapping document into a rule table
pub fn compile(document: &MappingDocument) -> Result<RuleTable, MalformedMappingError> {
    let mut table = RuleTable::new();
    if let Some(name) = &document.name {
        table = table.with_name(name.clone());
    }

    for group in &document.groups {
        compile_group(&mut table, group, None)?;
    }
    for note in &document.notes {
        compile_note(&mut table, note, Defaults::NONE, None)?;
    }
    for condition in &document.conditions {
        compile_condition(&mut table, condition)?;
    }

    if table.is_empty() {
        return Err(MalformedMappingError::Empty);
    }

    debug!(
        name = table.name().unwrap_or("<unnamed>"),
        rules = table.len(),
        "compiled mapping"
    );
    Ok(table)
}

fn compile_condition(
    table: &mut RuleTable,
    condition: &ConditionElement,
) -> Result<(), MalformedMappingError> {
    let velocity = check_velocity("If", "velocity", condition.velocity)?;

    for group in &condition.groups {
        compile_group(table, group, Some(velocity))?;
    }
    for note in &condition.notes {
        compile_note(table, note, Defaults::NONE, Some(velocity))?;
    }
    Ok(())
}

fn compile_group(
    table: &mut RuleTable,
    group: &GroupElement,
    condition: Option<Velocity>,
) -> Result<(), MalformedMappingError> {
    let defaults = Defaults {
        to: group.to.map(|v| check_note("Group", "to", v)).transpose()?,
        velocity: group
            .velocity
            .map(|v| check_velocity("Group", "velocity", v))
            .transpose()?,
    };

    for note in &group.notes {
        compile_note(table, note, defaults, condition)?;
    }
    Ok(())
}

fn compile_note(
    table: &mut RuleTable,
    note: &NoteElement,
    parent: Defaults,
    condition: Option<Velocity>,
) -> Result<(), MalformedMappingError> {
    let checked = check_note_element(note)?;
    let resolution = resolve(checked.from, checked.to, checked.velocity, parent)?;
    table.insert(Rule {
        from: checked.from,
        resolution,
        condition,
    })
}

fn check_note_element(note: &NoteElement) -> Result<CheckedNote, MalformedMappingError> {
    Ok(CheckedNote {
        from: check_note("Note", "from", note.from)?,
        to: note.to.map(|v| check_note("Note", "to", v)).transpose()?,
        velocity: note
            .velocity
            .map(|v| check_velocity("Note", "velocity", v))
            .transpose()?,
    })
}

fn check_note(
    element: &'static str,
    attribute: &'static str,
    value: i64,
) -> Result<NoteNumber, MalformedMappingError> {
    NoteNumber::from_int(value).ok_or(MalformedMappingError::OutOfRange {
        element,
        attribute,
        value,
    })
}

fn check_velocity(
    element: &'static str,
    attribute: &'static str,
    value: i64,
) -> Result<Velocity, MalformedMappingError> {
    Velocity::from_int(value).ok_or(MalformedMappingError::OutOfRange {
        element,
        attribute,
        value,
    })
}
