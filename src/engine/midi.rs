//! Standard MIDI File glue.
//!
//! Decodes note-on/note-off events from each track, runs them through the
//! remap engine and writes the result back in place. Every other event
//! (meta, sysex, controllers) is left exactly as it was.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use midly::num::{u4, u7};
use midly::{MidiMessage, Smf, TrackEventKind};

use super::{NoteEvent, Remapper, UnmappedReport};
use crate::mapping::{NoteNumber, Velocity};

/// General MIDI percussion channel (channel 10, zero-based)
pub const GM_DRUM_CHANNEL: u8 = 9;

/// Options for the file layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileOptions {
    /// Channel (0-15) written onto every note event; None keeps the source channel
    pub drum_channel: Option<u8>,
}

impl Default for FileOptions {
    fn default() -> Self {
        Self {
            drum_channel: Some(GM_DRUM_CHANNEL),
        }
    }
}

/// What happened while remapping a file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSummary {
    pub tracks: usize,
    /// Note-on and note-off events seen
    pub note_events: usize,
    /// Note events whose note, velocity or channel changed
    pub changed: usize,
    pub report: UnmappedReport,
}

/// Note usage in a file, for checking a conversion by eye.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteStats {
    /// Sounding note-ons (velocity > 0)
    pub note_ons: usize,
    pub notes: BTreeSet<u8>,
    pub channels: BTreeSet<u8>,
}

fn decode_note(timestamp: u64, channel: u4, message: MidiMessage) -> Option<NoteEvent> {
    let (key, vel, is_note_on) = match message {
        MidiMessage::NoteOn { key, vel } => (key, vel, true),
        MidiMessage::NoteOff { key, vel } => (key, vel, false),
        _ => return None,
    };
    Some(NoteEvent {
        timestamp,
        channel: channel.as_int(),
        note: NoteNumber::new(key.as_int())?,
        velocity: Velocity::new(vel.as_int())?,
        is_note_on,
    })
}

fn encode_note(event: &NoteEvent) -> MidiMessage {
    let key = u7::new(event.note.get());
    let vel = u7::new(event.velocity.get());
    if event.is_note_on {
        MidiMessage::NoteOn { key, vel }
    } else {
        MidiMessage::NoteOff { key, vel }
    }
}

/// Remap every note event of a parsed file in place.
pub fn remap_smf(smf: &mut Smf, remapper: &Remapper, options: FileOptions) -> FileSummary {
    let mut summary = FileSummary {
        tracks: smf.tracks.len(),
        ..FileSummary::default()
    };

    for track in smf.tracks.iter_mut() {
        let mut tick: u64 = 0;
        for event in track.iter_mut() {
            tick += u64::from(event.delta.as_int());
            let TrackEventKind::Midi { channel, message } = &mut event.kind else {
                continue;
            };
            let Some(input) = decode_note(tick, *channel, *message) else {
                continue;
            };

            let mut output = remapper.remap_note(input, &mut summary.report);
            if let Some(drum_channel) = options.drum_channel {
                output.channel = drum_channel & 0x0F;
            }

            summary.note_events += 1;
            if output != input {
                summary.changed += 1;
            }
            *channel = u4::new(output.channel);
            *message = encode_note(&output);
        }
    }

    summary
}

/// Read a MIDI file, remap it and save the result to `output`.
pub fn remap_file(
    input: &Path,
    output: &Path,
    remapper: &Remapper,
    options: FileOptions,
) -> Result<FileSummary> {
    let data = std::fs::read(input)
        .with_context(|| format!("failed to read MIDI file: {}", input.display()))?;
    let mut smf = Smf::parse(&data)
        .with_context(|| format!("failed to parse MIDI file: {}", input.display()))?;

    let summary = remap_smf(&mut smf, remapper, options);

    smf.save(output)
        .with_context(|| format!("failed to write MIDI file: {}", output.display()))?;

    if !summary.report.is_empty() {
        tracing::warn!(
            file = %input.display(),
            distinct = summary.report.len(),
            events = summary.report.total(),
            "notes without a mapping rule were left unchanged"
        );
    }
    Ok(summary)
}

/// Collect note usage from a MIDI file.
pub fn note_stats(path: &Path) -> Result<NoteStats> {
    let data = std::fs::read(path)
        .with_context(|| format!("failed to read MIDI file: {}", path.display()))?;
    let smf = Smf::parse(&data)
        .with_context(|| format!("failed to parse MIDI file: {}", path.display()))?;

    let mut stats = NoteStats::default();
    for event in smf.tracks.iter().flatten() {
        if let TrackEventKind::Midi {
            channel,
            message: MidiMessage::NoteOn { key, vel },
        } = event.kind
        {
            if vel.as_int() > 0 {
                stats.note_ons += 1;
                stats.notes.insert(key.as_int());
                stats.channels.insert(channel.as_int());
            }
        }
    }
    Ok(stats)
}

/// Default output path: `<stem><suffix>.<ext>` next to the input.
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mid".to_string());
    input.with_file_name(format!("{stem}{suffix}.{ext}"))
}
