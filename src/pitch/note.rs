//! Note names — "C4", "eb3", "F#2" to MIDI numbers and frequencies.

use super::{A4_FREQUENCY, A4_MIDI};

/// Parse a note name into a MIDI note number.
///
/// Format: `<letter><optional accidental><octave>`, letter case-insensitive,
/// accidental `#` or `b`, octave -1 to 9 (C4 = 60, A4 = 69).
pub fn parse_note_name(name: &str) -> Option<u8> {
    let mut chars = name.trim().chars().peekable();

    let base = match chars.next()?.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };

    let accidental: i32 = match chars.peek() {
        Some('#') => {
            chars.next();
            1
        }
        Some('b') => {
            chars.next();
            -1
        }
        _ => 0,
    };

    let octave: i32 = chars.collect::<String>().parse().ok()?;
    let midi = (octave + 1) * 12 + base + accidental;

    if (0..=127).contains(&midi) {
        Some(midi as u8)
    } else {
        None
    }
}

/// Equal-tempered frequency of a MIDI note number.
pub fn midi_to_frequency(midi: u8) -> f64 {
    A4_FREQUENCY * 2f64.powf((midi as i32 - A4_MIDI) as f64 / 12.0)
}
