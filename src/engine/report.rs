//! Unmapped note report

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::mapping::{NoteNumber, Velocity};

/// Distinct (note, velocity) pairs that had no rule, with hit counts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnmappedReport {
    hits: BTreeMap<(NoteNumber, Velocity), usize>,
}

impl UnmappedReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one unmapped event
    pub fn record(&mut self, note: NoteNumber, velocity: Velocity) {
        *self.hits.entry((note, velocity)).or_insert(0) += 1;
    }

    /// Fold another report into this one
    pub fn merge(&mut self, other: &UnmappedReport) {
        for (key, count) in &other.hits {
            *self.hits.entry(*key).or_insert(0) += count;
        }
    }

    /// Number of distinct (note, velocity) pairs
    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Total number of unmapped events
    pub fn total(&self) -> usize {
        self.hits.values().sum()
    }

    /// How often a pair was seen
    pub fn count(&self, note: NoteNumber, velocity: Velocity) -> usize {
        self.hits.get(&(note, velocity)).copied().unwrap_or(0)
    }

    /// Distinct source notes, ignoring velocity
    pub fn notes(&self) -> BTreeSet<NoteNumber> {
        self.hits.keys().map(|(note, _)| *note).collect()
    }

    /// Iterate as (note, velocity, count) in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (NoteNumber, Velocity, usize)> + '_ {
        self.hits.iter().map(|((n, v), c)| (*n, *v, *c))
    }
}

impl fmt::Display for UnmappedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "all notes mapped");
        }
        write!(f, "{} unmapped event(s):", self.total())?;
        for (note, velocity, count) in self.iter() {
            write!(f, " {note}@{velocity}x{count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(n: u8, v: u8) -> (NoteNumber, Velocity) {
        (NoteNumber::new(n).unwrap(), Velocity::new(v).unwrap())
    }

    #[test]
    fn test_record_and_count() {
        let mut report = UnmappedReport::new();
        let (n, v) = key(33, 90);
        report.record(n, v);
        report.record(n, v);
        let (n2, v2) = key(33, 10);
        report.record(n2, v2);

        assert_eq!(report.len(), 2);
        assert_eq!(report.total(), 3);
        assert_eq!(report.count(n, v), 2);
        assert_eq!(report.notes().len(), 1);
    }

    #[test]
    fn test_merge() {
        let mut a = UnmappedReport::new();
        let mut b = UnmappedReport::new();
        let (n, v) = key(60, 100);
        a.record(n, v);
        b.record(n, v);
        let (n2, v2) = key(61, 100);
        b.record(n2, v2);

        a.merge(&b);
        assert_eq!(a.count(n, v), 2);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_display() {
        let mut report = UnmappedReport::new();
        assert_eq!(report.to_string(), "all notes mapped");

        let (n, v) = key(33, 90);
        report.record(n, v);
        assert_eq!(report.to_string(), "1 unmapped event(s): 33@90x1");
    }
}
