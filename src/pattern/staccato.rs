//! Staccato-style text rendering of a Pattern.
//!
//! One whitespace-separated token group per entry, e.g.
//! `I[Piano] :CE(935,10200) :PW(6729) 55/0.25a64d64 R/0.031250 V0`.

use std::fmt;

use super::types::{Event, PERCUSSION_VOICE};
use super::{round_time, Entry, Pattern};

fn write_entry(f: &mut fmt::Formatter<'_>, entry: &Entry) -> fmt::Result {
    match &entry.event {
        Event::Note(n) => {
            write!(f, ":PW({}) ", n.bend)?;
            match &n.chord {
                Some(chord) => write!(f, "{chord}")?,
                None => write!(f, "{}", n.note)?,
            }
            write!(f, "/{}a{}d{}", n.duration, n.attack, n.decay)
        }
        Event::Rest(d) => write!(f, "R/{d:.6}"),
        Event::ControlChange { controller, value } => write!(f, ":CE({controller},{value})"),
        Event::Voice(v) => {
            if *v == 0 {
                write!(f, "V0")
            } else {
                write!(f, "V{v} @{}", round_time(entry.time))
            }
        }
        Event::Instrument(name) => write!(f, "I[{name}]"),
        Event::Tempo(bpm) => write!(f, "T{bpm}"),
        Event::Percussion { key, duration } => {
            write!(f, "V{PERCUSSION_VOICE} [{key}]/{duration} V{}", entry.voice)
        }
        Event::Lyric(text) => write!(f, "'({text})"),
        Event::Marker(text) => write!(f, "#({text})"),
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.entries().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write_entry(f, entry)?;
        }
        Ok(())
    }
}
