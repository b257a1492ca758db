//! Remap engine
//!
//! Applies a rule table to a stream of note events. The engine keeps no
//! state between events; every event is transformed on its own and the
//! output keeps the input's order and timing.

pub mod batch;
pub mod midi;
mod report;

pub use report::UnmappedReport;

use crate::mapping::{Lookup, NoteNumber, RuleTable, Velocity};

/// A decoded note-on or note-off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEvent {
    /// Absolute time in ticks
    pub timestamp: u64,
    /// MIDI channel (0-15)
    pub channel: u8,
    pub note: NoteNumber,
    pub velocity: Velocity,
    pub is_note_on: bool,
}

impl NoteEvent {
    pub fn note_on(timestamp: u64, channel: u8, note: NoteNumber, velocity: Velocity) -> Self {
        Self {
            timestamp,
            channel,
            note,
            velocity,
            is_note_on: true,
        }
    }

    pub fn note_off(timestamp: u64, channel: u8, note: NoteNumber, velocity: Velocity) -> Self {
        Self {
            timestamp,
            channel,
            note,
            velocity,
            is_note_on: false,
        }
    }

    /// A note-on with velocity 0, which many producers send instead of note-off
    pub fn is_silent_note_on(&self) -> bool {
        self.is_note_on && self.velocity.is_zero()
    }
}

/// An event in a stream: a note to remap, or anything else to pass along
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event<T> {
    Note(NoteEvent),
    Other(T),
}

/// Transformed events plus the notes that had no rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapOutcome<T> {
    pub events: Vec<Event<T>>,
    pub report: UnmappedReport,
}

/// Applies a rule table to note events
#[derive(Debug, Clone, Copy)]
pub struct Remapper<'a> {
    table: &'a RuleTable,
}

impl<'a> Remapper<'a> {
    pub fn new(table: &'a RuleTable) -> Self {
        Self { table }
    }

    /// Remap a single note event
    ///
    /// Note-offs are matched against their own release velocity. A note-on
    /// with velocity 0 keeps velocity 0 under a plain or group fixed
    /// velocity, so it still ends the note; only a rule conditioned on input
    /// velocity 0 may give it another velocity. Unmapped events come back
    /// unchanged and are counted in `report`.
    pub fn remap_note(&self, event: NoteEvent, report: &mut UnmappedReport) -> NoteEvent {
        match self.table.lookup(event.note, event.velocity) {
            Lookup::Mapped(out) => {
                let keep_silent = event.is_silent_note_on()
                    && !self.has_condition_for(event.note, event.velocity);
                let velocity = if keep_silent { event.velocity } else { out.velocity };
                NoteEvent {
                    note: out.note,
                    velocity,
                    ..event
                }
            }
            Lookup::NotMapped => {
                if report.count(event.note, event.velocity) == 0 {
                    tracing::debug!(
                        note = event.note.get(),
                        velocity = event.velocity.get(),
                        "no rule for note, passing through"
                    );
                }
                report.record(event.note, event.velocity);
                event
            }
        }
    }

    fn has_condition_for(&self, note: NoteNumber, velocity: Velocity) -> bool {
        self.table
            .entry(note)
            .is_some_and(|entry| entry.condition(velocity).is_some())
    }

    /// Remap a stream of events
    pub fn remap<T, I>(&self, events: I) -> RemapOutcome<T>
    where
        I: IntoIterator<Item = Event<T>>,
    {
        let mut report = UnmappedReport::new();
        let events = events
            .into_iter()
            .map(|event| match event {
                Event::Note(note) => Event::Note(self.remap_note(note, &mut report)),
                other => other,
            })
            .collect();
        RemapOutcome { events, report }
    }
}

/// Remap a stream of events with the given table
pub fn remap<T, I>(table: &RuleTable, events: I) -> RemapOutcome<T>
where
    I: IntoIterator<Item = Event<T>>,
{
    Remapper::new(table).remap(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{compile, MappingDocument};

    fn note(n: u8) -> NoteNumber {
        NoteNumber::new(n).unwrap()
    }

    fn vel(v: u8) -> Velocity {
        Velocity::new(v).unwrap()
    }

    fn table(yaml: &str) -> RuleTable {
        compile(&MappingDocument::from_yaml_str(yaml).unwrap()).unwrap()
    }

    fn notes<T>(events: &[Event<T>]) -> Vec<NoteEvent> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Note(n) => Some(*n),
                Event::Other(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_remap_mapped_note() {
        let table = table("notes:\n  - { from: 36, to: 35 }\n");
        let input = vec![Event::<()>::Note(NoteEvent::note_on(10, 9, note(36), vel(100)))];

        let outcome = remap(&table, input);
        let out = notes(&outcome.events);
        assert_eq!(out[0], NoteEvent::note_on(10, 9, note(35), vel(100)));
        assert!(outcome.report.is_empty());
    }

    #[test]
    fn test_remap_unmapped_note_passes_through() {
        let table = table("notes:\n  - { from: 36, to: 35 }\n");
        let original = NoteEvent::note_on(0, 2, note(33), vel(90));

        let outcome = remap(&table, vec![Event::<()>::Note(original)]);
        assert_eq!(outcome.events, vec![Event::Note(original)]);
        assert_eq!(outcome.report.len(), 1);
        assert_eq!(outcome.report.count(note(33), vel(90)), 1);
    }

    #[test]
    fn test_other_events_untouched() {
        let table = table("notes:\n  - { from: 36, to: 35 }\n");
        let input = vec![
            Event::Other("tempo"),
            Event::Note(NoteEvent::note_on(0, 9, note(36), vel(64))),
            Event::Other("cc"),
        ];

        let outcome = remap(&table, input);
        assert_eq!(outcome.events[0], Event::Other("tempo"));
        assert_eq!(outcome.events[2], Event::Other("cc"));
    }

    #[test]
    fn test_fixed_velocity_applies_to_note_on() {
        let table = table("notes:\n  - { from: 38, to: 40, velocity: 127 }\n");
        let mut report = UnmappedReport::new();
        let out = Remapper::new(&table).remap_note(NoteEvent::note_on(0, 9, note(38), vel(20)), &mut report);
        assert_eq!((out.note, out.velocity), (note(40), vel(127)));
    }

    #[test]
    fn test_fixed_velocity_applies_to_release_velocity() {
        let table = table("notes:\n  - { from: 38, to: 40, velocity: 127 }\n");
        let mut report = UnmappedReport::new();
        let out = Remapper::new(&table).remap_note(NoteEvent::note_off(0, 9, note(38), vel(64)), &mut report);
        assert_eq!((out.note, out.velocity), (note(40), vel(127)));
        assert!(!out.is_note_on);
    }

    #[test]
    fn test_silent_note_on_keeps_zero_velocity() {
        let table = table("notes:\n  - { from: 38, to: 40, velocity: 127 }\n");
        let mut report = UnmappedReport::new();
        let out = Remapper::new(&table).remap_note(NoteEvent::note_on(0, 9, note(38), vel(0)), &mut report);
        assert_eq!((out.note, out.velocity), (note(40), vel(0)));
    }

    #[test]
    fn test_zero_velocity_condition_sets_velocity_of_silent_note_on() {
        let table = table(
            "notes:\n  - { from: 38, to: 38, velocity: 90 }\nconditions:\n  - velocity: 0\n    notes: [{ from: 38, to: 37, velocity: 100 }]\n",
        );
        let mut report = UnmappedReport::new();
        let remapper = Remapper::new(&table);

        let out = remapper.remap_note(NoteEvent::note_on(0, 9, note(38), vel(0)), &mut report);
        assert_eq!((out.note, out.velocity), (note(37), vel(100)));

        let out = remapper.remap_note(NoteEvent::note_on(0, 9, note(38), vel(5)), &mut report);
        assert_eq!((out.note, out.velocity), (note(38), vel(90)));
    }

    #[test]
    fn test_note_off_matches_on_release_velocity() {
        let table = table(
            "notes:\n  - { from: 38, to: 38 }\nconditions:\n  - velocity: 0\n    notes: [{ from: 38, to: 37 }]\n",
        );
        let input = vec![
            Event::<()>::Note(NoteEvent::note_off(0, 9, note(38), vel(0))),
            Event::Note(NoteEvent::note_off(1, 9, note(38), vel(64))),
        ];
        let out = notes(&remap(&table, input).events);
        assert_eq!(out[0].note, note(37));
        assert_eq!(out[1].note, note(38));
    }

    #[test]
    fn test_order_and_timing_preserved() {
        let table = table(
            "groups:\n  - to: 38\n    notes: [{ from: 36 }, { from: 40, velocity: 1 }]\n",
        );
        let input: Vec<Event<u32>> = (0..40u8)
            .map(|i| {
                if i % 5 == 0 {
                    Event::Other(i as u32)
                } else {
                    let n = [36, 40, 42, 36][(i % 4) as usize];
                    Event::Note(NoteEvent::note_on(i as u64 * 3, i % 16, note(n), vel(i * 3)))
                }
            })
            .collect();

        let outcome = remap(&table, input.clone());
        assert_eq!(outcome.events.len(), input.len());

        for (before, after) in input.iter().zip(&outcome.events) {
            match (before, after) {
                (Event::Other(a), Event::Other(b)) => assert_eq!(a, b),
                (Event::Note(a), Event::Note(b)) => {
                    assert_eq!(a.timestamp, b.timestamp);
                    assert_eq!(a.channel, b.channel);
                    assert_eq!(a.is_note_on, b.is_note_on);
                }
                _ => panic!("event kind changed"),
            }
        }
        assert_eq!(outcome.report.notes().into_iter().collect::<Vec<_>>(), vec![note(42)]);
    }

    #[test]
    fn test_table_shared_across_threads() {
        let table = table("notes:\n  - { from: 36, to: 35 }\n");
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let outcome = remap(
                        &table,
                        vec![Event::<()>::Note(NoteEvent::note_on(0, 9, note(36), vel(1)))],
                    );
                    assert_eq!(notes(&outcome.events)[0].note, note(35));
                });
            }
        });
    }
}
