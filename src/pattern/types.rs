//! Event data model — the musical instructions a Pattern is made of.
//!
//! The primitives map directly onto a MIDI-like stream: notes carry their
//! own pitch-bend, control changes carry a controller id, and voices select a
//! parallel track.

use crate::pitch::Chord;

/// Combined coarse/fine volume controller.
pub const VOLUME_CONTROLLER: u16 = 935;
/// Pan controller.
pub const PAN_CONTROLLER: u16 = 10;
/// Voice reserved for percussion.
pub const PERCUSSION_VOICE: u8 = 9;

/// A pitched note.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    /// MIDI note number (0–127).
    pub note: u8,
    /// 14-bit pitch-bend applied before the note; 8192 is neutral.
    pub bend: u16,
    /// Duration in whole notes.
    pub duration: f64,
    pub attack: u8,
    pub decay: u8,
    /// When set, the note sounds as this chord instead of a single pitch.
    pub chord: Option<Chord>,
}

/// One instruction in a [`Pattern`](super::Pattern).
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Note(NoteEvent),
    /// Silence for the given duration in whole notes.
    Rest(f64),
    ControlChange { controller: u16, value: u16 },
    /// Switch subsequent events to a parallel voice.
    Voice(u8),
    /// Select an instrument by General MIDI name or program number.
    Instrument(String),
    /// Tempo in beats per minute.
    Tempo(u32),
    /// A drum hit on the percussion voice.
    Percussion { key: u8, duration: f64 },
    /// The word a run of notes belongs to.
    Lyric(String),
    /// Free-form annotation (sentiment, category codes, sentence ends).
    Marker(String),
}

impl Event {
    pub fn volume(value: f64) -> Self {
        Event::ControlChange {
            controller: VOLUME_CONTROLLER,
            value: value.round().clamp(0.0, 16383.0) as u16,
        }
    }

    pub fn pan(value: f64) -> Self {
        Event::ControlChange {
            controller: PAN_CONTROLLER,
            value: value.round().clamp(0.0, 127.0) as u16,
        }
    }

    pub fn is_note(&self) -> bool {
        matches!(self, Event::Note(_))
    }
}
