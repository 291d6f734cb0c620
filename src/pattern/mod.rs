//! Pattern assembly — the append-only event stream a transform run produces.
//!
//! Every entry records the time cursor and voice at which it was appended, so
//! output collaborators can schedule it without replaying voice switches.
//! Time is measured in whole notes.

pub mod staccato;
pub mod types;

pub use types::{Event, NoteEvent, PAN_CONTROLLER, PERCUSSION_VOICE, VOLUME_CONTROLLER};

/// An event stamped with where it was appended.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub time: f64,
    pub voice: u8,
    pub event: Event,
}

/// An ordered event stream with a monotonically advancing time cursor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pattern {
    entries: Vec<Entry>,
    elapsed: f64,
    /// Two-decimal cursor, rounded after every step.
    time: f64,
    voice: u8,
}

/// Round to the cursor's two-decimal resolution.
pub fn round_time(t: f64) -> f64 {
    (t * 100.0).round() / 100.0
}

impl Pattern {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event at the current cursor. A [`Event::Voice`] switches the
    /// voice for itself and everything after it.
    pub fn push(&mut self, event: Event) {
        if let Event::Voice(v) = event {
            self.voice = v;
        }
        self.entries.push(Entry {
            time: self.elapsed,
            voice: self.voice,
            event,
        });
    }

    /// Move the cursor forward. Negative or non-finite deltas are ignored.
    pub fn advance(&mut self, delta: f64) {
        if delta.is_finite() && delta > 0.0 {
            self.elapsed += delta;
            self.time = round_time(self.time + delta);
        }
    }

    /// The cursor at two-decimal resolution. Rounding is applied after each
    /// advance, so on long streams this can trail [`Pattern::elapsed`] by a
    /// few hundredths.
    pub fn current_time(&self) -> f64 {
        self.time
    }

    /// The exact, unrounded cursor. Entry times and MIDI scheduling use it.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// The voice new events land on.
    pub fn voice(&self) -> u8 {
        self.voice
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All note events, in append order.
    pub fn notes(&self) -> impl Iterator<Item = &NoteEvent> {
        self.entries.iter().filter_map(|e| match &e.event {
            Event::Note(n) => Some(n),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn note(n: u8) -> Event {
        Event::Note(NoteEvent {
            note: n,
            bend: 8192,
            duration: 0.25,
            attack: 64,
            decay: 64,
            chord: None,
        })
    }

    #[test]
    fn entries_are_stamped_with_cursor_and_voice() {
        let mut p = Pattern::new();
        p.push(note(60));
        p.advance(0.5);
        p.push(Event::Voice(2));
        p.push(note(64));

        let e = p.entries();
        assert_eq!(e.len(), 3);
        assert_eq!((e[0].time, e[0].voice), (0.0, 0));
        assert_eq!((e[1].time, e[1].voice), (0.5, 2));
        assert_eq!((e[2].time, e[2].voice), (0.5, 2));
        assert_eq!(p.voice(), 2);
    }

    #[test]
    fn cursor_never_moves_backwards() {
        let mut p = Pattern::new();
        p.advance(0.25);
        p.advance(-1.0);
        p.advance(f64::NAN);
        assert_approx_eq!(p.elapsed(), 0.25);
    }

    #[test]
    fn current_time_has_two_decimals() {
        let mut p = Pattern::new();
        p.advance(1.0 / 16.0);
        assert_approx_eq!(p.elapsed(), 0.0625);
        assert_approx_eq!(p.current_time(), 0.06);
    }

    #[test]
    fn current_time_rounds_after_every_step() {
        let mut p = Pattern::new();
        for _ in 0..3 {
            p.advance(0.34375);
        }
        // 0.34, then round(0.68375) = 0.68, then round(1.02375) = 1.02
        assert_approx_eq!(p.current_time(), 1.02);
        assert_approx_eq!(p.elapsed(), 1.03125);
    }

    #[test]
    fn notes_filters_other_events() {
        let mut p = Pattern::new();
        p.push(Event::Tempo(120));
        p.push(note(60));
        p.push(Event::Rest(0.1));
        p.push(note(62));
        let notes: Vec<u8> = p.notes().map(|n| n.note).collect();
        assert_eq!(notes, vec![60, 62]);
    }
}
