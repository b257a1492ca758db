//! Note numbers, velocities and resolved rules

use std::fmt;

/// Highest value a MIDI data byte may carry
pub const MIDI_MAX: u8 = 127;

/// A MIDI note number (0-127), identifying a drum voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NoteNumber(u8);

impl NoteNumber {
    /// Create a note number, returning None if out of range
    pub fn new(value: u8) -> Option<Self> {
        (value <= MIDI_MAX).then_some(Self(value))
    }

    /// Create a note number from any integer in range
    pub fn from_int(value: i64) -> Option<Self> {
        u8::try_from(value).ok().and_then(Self::new)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// All 128 note numbers in ascending order
    pub fn all() -> impl Iterator<Item = NoteNumber> {
        (0..=MIDI_MAX).map(NoteNumber)
    }
}

impl fmt::Display for NoteNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A MIDI velocity (0-127)
///
/// Velocity 0 on a note-on is a common note-off convention, so it is a
/// regular value here and is never rewritten unless a rule says so.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Velocity(u8);

impl Velocity {
    /// Create a velocity, returning None if out of range
    pub fn new(value: u8) -> Option<Self> {
        (value <= MIDI_MAX).then_some(Self(value))
    }

    /// Create a velocity from any integer in range
    pub fn from_int(value: i64) -> Option<Self> {
        u8::try_from(value).ok().and_then(Self::new)
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// All 128 velocities in ascending order
    pub fn all() -> impl Iterator<Item = Velocity> {
        (0..=MIDI_MAX).map(Velocity)
    }
}

impl fmt::Display for Velocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What a rule resolves to once Group defaults have been merged in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Destination note
    pub to: NoteNumber,
    /// Constant output velocity; None passes the input velocity through
    pub fixed_velocity: Option<Velocity>,
}

impl Resolution {
    pub fn new(to: NoteNumber, fixed_velocity: Option<Velocity>) -> Self {
        Self { to, fixed_velocity }
    }

    /// Apply this resolution to an input velocity
    pub fn apply(&self, velocity: Velocity) -> ResolvedOutput {
        ResolvedOutput {
            note: self.to,
            velocity: self.fixed_velocity.unwrap_or(velocity),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.fixed_velocity {
            Some(v) => write!(f, "to={} velocity={}", self.to, v),
            None => write!(f, "to={}", self.to),
        }
    }
}

/// A fully resolved mapping instruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub from: NoteNumber,
    pub resolution: Resolution,
    /// Input velocity this rule is restricted to
    pub condition: Option<Velocity>,
}

/// Output of a successful lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedOutput {
    pub note: NoteNumber,
    pub velocity: Velocity,
}
