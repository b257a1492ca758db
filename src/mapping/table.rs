//! Compiled rule table
//!
//! Maps a source note to its resolved rules. Built once by the compiler and
//! read-only afterwards, so a table can be shared between threads by plain
//! reference.

use std::collections::BTreeMap;

use super::error::MalformedMappingError;
use super::rule::{NoteNumber, Resolution, ResolvedOutput, Rule, Velocity};

/// Result of looking up a (note, velocity) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Mapped(ResolvedOutput),
    NotMapped,
}

impl Lookup {
    pub fn is_mapped(&self) -> bool {
        matches!(self, Lookup::Mapped(_))
    }

    pub fn mapped(self) -> Option<ResolvedOutput> {
        match self {
            Lookup::Mapped(out) => Some(out),
            Lookup::NotMapped => None,
        }
    }
}

/// Rules for one source note
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleEntry {
    unconditional: Option<Resolution>,
    conditional: BTreeMap<Velocity, Resolution>,
}

impl RuleEntry {
    /// The rule restricted to exactly this input velocity, if any
    pub fn condition(&self, velocity: Velocity) -> Option<Resolution> {
        self.conditional.get(&velocity).copied()
    }

    fn resolve(&self, velocity: Velocity) -> Option<&Resolution> {
        self.conditional
            .get(&velocity)
            .or(self.unconditional.as_ref())
    }
}

/// The queryable form of a mapping document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleTable {
    name: Option<String>,
    entries: BTreeMap<NoteNumber, RuleEntry>,
}

impl RuleTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// A table that maps every note to itself and keeps velocities
    pub fn identity() -> Self {
        let mut table = Self::new().with_name("as Source");
        for note in NoteNumber::all() {
            table.entries.insert(
                note,
                RuleEntry {
                    unconditional: Some(Resolution::new(note, None)),
                    conditional: BTreeMap::new(),
                },
            );
        }
        table
    }

    /// Set the table name (builder pattern)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Resolve a (note, velocity) pair
    ///
    /// A conditional rule for exactly this velocity wins; otherwise the
    /// unconditional rule applies; otherwise the pair is not mapped.
    pub fn lookup(&self, note: NoteNumber, velocity: Velocity) -> Lookup {
        self.entries
            .get(&note)
            .and_then(|entry| entry.resolve(velocity))
            .map_or(Lookup::NotMapped, |res| Lookup::Mapped(res.apply(velocity)))
    }

    /// Rules for one source note, if any
    pub fn entry(&self, note: NoteNumber) -> Option<&RuleEntry> {
        self.entries.get(&note)
    }

    /// Iterate over every rule, unconditional rules before conditional ones
    pub fn rules(&self) -> impl Iterator<Item = Rule> + '_ {
        self.entries.iter().flat_map(|(from, entry)| {
            let unconditional = entry.unconditional.map(|resolution| Rule {
                from: *from,
                resolution,
                condition: None,
            });
            let conditional = entry.conditional.iter().map(move |(v, resolution)| Rule {
                from: *from,
                resolution: *resolution,
                condition: Some(*v),
            });
            unconditional.into_iter().chain(conditional)
        })
    }

    /// Number of rules in the table
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .map(|e| e.conditional.len() + usize::from(e.unconditional.is_some()))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert a resolved rule
    ///
    /// Re-inserting an identical rule is a no-op. A second rule for the same
    /// (from, condition) pair that resolves differently is a conflict.
    pub(crate) fn insert(&mut self, rule: Rule) -> Result<(), MalformedMappingError> {
        let entry = self.entries.entry(rule.from).or_default();
        let slot = match rule.condition {
            Some(velocity) => entry.conditional.entry(velocity).or_insert(rule.resolution),
            None => entry.unconditional.get_or_insert(rule.resolution),
        };

        if *slot != rule.resolution {
            return Err(MalformedMappingError::Conflict {
                from: rule.from,
                condition: rule.condition,
                first: *slot,
                second: rule.resolution,
            });
        }
        Ok(())
    }
}
