//! Standard MIDI File export.
//!
//! A pattern is first flattened into a [`Timeline`] of channel messages at
//! absolute ticks; the same timeline drives the live player. Output is SMF
//! format 1: a conductor track with tempo, lyric and marker meta events,
//! then one track per channel in use.

use std::path::Path;

use log::warn;
use midly::{
    num::{u14, u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, PitchBend, Smf, Timing, Track, TrackEvent,
    TrackEventKind,
};

use super::program::program_number;
use crate::error::SonifyError;
use crate::pattern::{Event, Pattern, PAN_CONTROLLER, PERCUSSION_VOICE, VOLUME_CONTROLLER};

/// Ticks per quarter note.
pub const TICKS_PER_QUARTER: u16 = 480;
/// Ticks per whole note, the unit pattern times are measured in.
pub const TICKS_PER_WHOLE: u32 = TICKS_PER_QUARTER as u32 * 4;

/// Velocity of percussion hits.
const PERCUSSION_VELOCITY: u8 = 100;

/// Coarse and fine channel-volume controllers.
const CC_VOLUME: u8 = 7;
const CC_VOLUME_FINE: u8 = 39;
const CC_PAN: u8 = 10;

/// A channel message at an absolute tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedMessage {
    pub tick: u32,
    pub channel: u8,
    pub message: MidiMessage,
}

/// Lyric or marker text at an absolute tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TimedText {
    Lyric { tick: u32, text: String },
    Marker { tick: u32, text: String },
}

impl TimedText {
    fn tick(&self) -> u32 {
        match self {
            TimedText::Lyric { tick, .. } | TimedText::Marker { tick, .. } => *tick,
        }
    }
}

/// A pattern flattened to absolute ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    /// `(tick, beats per minute)`, ascending.
    pub tempos: Vec<(u32, u32)>,
    pub texts: Vec<TimedText>,
    /// Channel messages in playback order.
    pub messages: Vec<TimedMessage>,
}

fn to_ticks(whole_notes: f64) -> u32 {
    let ticks = (whole_notes * TICKS_PER_WHOLE as f64).round();
    if ticks.is_finite() && ticks > 0.0 {
        ticks.min(u32::MAX as f64) as u32
    } else {
        0
    }
}

fn seven(value: u16) -> u7 {
    u7::new(value.min(127) as u8)
}

impl Timeline {
    /// Flatten `pattern`. Each entry plays on the channel of the voice it
    /// was appended on; percussion always plays on channel 9.
    pub fn from_pattern(pattern: &Pattern) -> Self {
        let mut timeline = Timeline::default();
        for entry in pattern.entries() {
            let tick = to_ticks(entry.time);
            let channel = entry.voice.min(15);
            let mut push = |channel: u8, tick: u32, message: MidiMessage| {
                timeline.messages.push(TimedMessage {
                    tick,
                    channel,
                    message,
                });
            };
            match &entry.event {
                Event::Note(note) => {
                    push(
                        channel,
                        tick,
                        MidiMessage::PitchBend {
                            bend: PitchBend(u14::new(note.bend.min(16383))),
                        },
                    );
                    let keys = match &note.chord {
                        Some(chord) => chord.notes(),
                        None => vec![note.note],
                    };
                    let end = tick.saturating_add(to_ticks(note.duration));
                    for key in keys {
                        push(
                            channel,
                            tick,
                            MidiMessage::NoteOn {
                                key: u7::new(key.min(127)),
                                vel: u7::new(note.attack.clamp(1, 127)),
                            },
                        );
                        push(
                            channel,
                            end,
                            MidiMessage::NoteOff {
                                key: u7::new(key.min(127)),
                                vel: u7::new(note.decay.min(127)),
                            },
                        );
                    }
                }
                Event::ControlChange { controller, value } => match *controller {
                    VOLUME_CONTROLLER => {
                        push(
                            channel,
                            tick,
                            MidiMessage::Controller {
                                controller: u7::new(CC_VOLUME),
                                value: seven(*value >> 7),
                            },
                        );
                        push(
                            channel,
                            tick,
                            MidiMessage::Controller {
                                controller: u7::new(CC_VOLUME_FINE),
                                value: seven(*value & 0x7F),
                            },
                        );
                    }
                    PAN_CONTROLLER => push(
                        channel,
                        tick,
                        MidiMessage::Controller {
                            controller: u7::new(CC_PAN),
                            value: seven(*value),
                        },
                    ),
                    other if other < 128 => push(
                        channel,
                        tick,
                        MidiMessage::Controller {
                            controller: u7::new(other as u8),
                            value: seven(*value),
                        },
                    ),
                    other => warn!("controller {other} has no MIDI equivalent"),
                },
                Event::Instrument(name) => {
                    let program = program_number(name).unwrap_or_else(|| {
                        warn!("unknown instrument '{name}', using program 0");
                        0
                    });
                    push(
                        channel,
                        tick,
                        MidiMessage::ProgramChange {
                            program: u7::new(program),
                        },
                    );
                }
                Event::Percussion { key, duration } => {
                    let end = tick.saturating_add(to_ticks(*duration));
                    push(
                        PERCUSSION_VOICE,
                        tick,
                        MidiMessage::NoteOn {
                            key: u7::new((*key).min(127)),
                            vel: u7::new(PERCUSSION_VELOCITY),
                        },
                    );
                    push(
                        PERCUSSION_VOICE,
                        end,
                        MidiMessage::NoteOff {
                            key: u7::new((*key).min(127)),
                            vel: u7::new(0),
                        },
                    );
                }
                Event::Tempo(bpm) => timeline.tempos.push((tick, (*bpm).max(1))),
                Event::Lyric(text) => timeline.texts.push(TimedText::Lyric {
                    tick,
                    text: text.clone(),
                }),
                Event::Marker(text) => timeline.texts.push(TimedText::Marker {
                    tick,
                    text: text.clone(),
                }),
                Event::Rest(_) | Event::Voice(_) => {}
            }
        }

        // note-offs go first at equal ticks so repeated keys retrigger
        timeline.messages.sort_by_key(|m| {
            let order = u8::from(!matches!(m.message, MidiMessage::NoteOff { .. }));
            (m.tick, order)
        });
        timeline.tempos.sort_by_key(|(tick, _)| *tick);
        timeline
    }

    /// Channels with at least one message, ascending.
    pub fn channels(&self) -> Vec<u8> {
        let mut used = [false; 16];
        for m in &self.messages {
            used[m.channel as usize & 0x0F] = true;
        }
        (0..16u8).filter(|c| used[*c as usize]).collect()
    }
}

fn delta(tick: u32, last: &mut u32) -> u28 {
    let d = tick.saturating_sub(*last);
    *last = tick.max(*last);
    u28::new(d.min(0x0FFF_FFFF))
}

fn tempo_meta(bpm: u32) -> MetaMessage<'static> {
    MetaMessage::Tempo(u24::new(60_000_000 / bpm.max(1)))
}

/// Build an in-memory SMF borrowing text from `timeline`.
pub fn to_smf(timeline: &Timeline) -> Smf<'_> {
    let mut smf = Smf::new(Header::new(
        Format::Parallel,
        Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
    ));

    let mut conductor: Vec<(u32, MetaMessage<'_>)> = timeline
        .tempos
        .iter()
        .map(|&(tick, bpm)| (tick, tempo_meta(bpm)))
        .collect();
    conductor.extend(timeline.texts.iter().map(|t| {
        let meta = match t {
            TimedText::Lyric { text, .. } => MetaMessage::Lyric(text.as_bytes()),
            TimedText::Marker { text, .. } => MetaMessage::Marker(text.as_bytes()),
        };
        (t.tick(), meta)
    }));
    conductor.sort_by_key(|(tick, _)| *tick);

    let mut track: Track<'_> = Vec::new();
    let mut last = 0;
    for (tick, meta) in conductor {
        track.push(TrackEvent {
            delta: delta(tick, &mut last),
            kind: TrackEventKind::Meta(meta),
        });
    }
    track.push(TrackEvent {
        delta: u28::new(0),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });
    smf.tracks.push(track);

    for channel in timeline.channels() {
        let mut track: Track<'_> = Vec::new();
        let mut last = 0;
        for m in timeline.messages.iter().filter(|m| m.channel == channel) {
            track.push(TrackEvent {
                delta: delta(m.tick, &mut last),
                kind: TrackEventKind::Midi {
                    channel: u4::new(channel),
                    message: m.message,
                },
            });
        }
        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });
        smf.tracks.push(track);
    }
    smf
}

/// Encode `pattern` as SMF bytes.
pub fn to_bytes(pattern: &Pattern) -> Result<Vec<u8>, SonifyError> {
    let timeline = Timeline::from_pattern(pattern);
    let smf = to_smf(&timeline);
    let mut buf = Vec::new();
    smf.write(&mut buf)
        .map_err(|e| SonifyError::Midi(e.to_string()))?;
    Ok(buf)
}

/// Write `pattern` to a `.mid` file.
pub fn write_midi(pattern: &Pattern, path: &Path) -> Result<(), SonifyError> {
    let bytes = to_bytes(pattern)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::NoteEvent;
    use crate::pitch::{Chord, ChordQuality};

    fn note(n: u8, chord: Option<Chord>) -> Event {
        Event::Note(NoteEvent {
            note: n,
            bend: 6731,
            duration: 0.25,
            attack: 64,
            decay: 30,
            chord,
        })
    }

    fn simple_pattern() -> Pattern {
        let mut p = Pattern::new();
        p.push(Event::Voice(0));
        p.push(Event::Instrument("Violin".into()));
        p.push(Event::Tempo(120));
        p.push(Event::Lyric("Cat".into()));
        p.push(Event::volume(10200.0));
        p.push(note(55, None));
        p.advance(0.34375);
        p.push(Event::Voice(2));
        p.push(note(60, None));
        p.push(Event::Voice(0));
        p.push(Event::Marker("SENTENCE[2]".into()));
        p
    }

    #[test]
    fn whole_note_is_1920_ticks() {
        assert_eq!(to_ticks(1.0), 1920);
        assert_eq!(to_ticks(0.25), 480);
        assert_eq!(to_ticks(-1.0), 0);
        assert_eq!(to_ticks(f64::NAN), 0);
    }

    #[test]
    fn notes_carry_bend_velocity_and_release() {
        let t = Timeline::from_pattern(&simple_pattern());
        let first: Vec<&TimedMessage> = t.messages.iter().filter(|m| m.channel == 0).collect();
        assert!(first.iter().any(|m| m.message
            == MidiMessage::ProgramChange {
                program: u7::new(40)
            }));
        assert!(first.iter().any(|m| m.message
            == MidiMessage::Controller {
                controller: u7::new(7),
                value: u7::new(79)
            }));
        let bend_at = first
            .iter()
            .position(|m| matches!(m.message, MidiMessage::PitchBend { .. }))
            .unwrap();
        let on_at = first
            .iter()
            .position(|m| matches!(m.message, MidiMessage::NoteOn { .. }))
            .unwrap();
        assert!(bend_at < on_at);
        let off = first
            .iter()
            .find(|m| matches!(m.message, MidiMessage::NoteOff { .. }))
            .unwrap();
        assert_eq!(off.tick, 480);
        assert_eq!(
            off.message,
            MidiMessage::NoteOff {
                key: u7::new(55),
                vel: u7::new(30)
            }
        );
    }

    #[test]
    fn voices_map_to_channels() {
        let t = Timeline::from_pattern(&simple_pattern());
        assert_eq!(t.channels(), vec![0, 2]);
        let second_on = t
            .messages
            .iter()
            .find(|m| m.channel == 2 && matches!(m.message, MidiMessage::NoteOn { .. }))
            .unwrap();
        assert_eq!(second_on.tick, 660);
    }

    #[test]
    fn chords_expand_to_all_tones() {
        let mut p = Pattern::new();
        p.push(note(60, Some(Chord::new(60, ChordQuality::Major, 0.2))));
        let t = Timeline::from_pattern(&p);
        let keys: Vec<u8> = t
            .messages
            .iter()
            .filter_map(|m| match m.message {
                MidiMessage::NoteOn { key, .. } => Some(key.as_int()),
                _ => None,
            })
            .collect();
        assert_eq!(keys, vec![60, 64, 67, 71]);
    }

    #[test]
    fn percussion_goes_to_channel_nine() {
        let mut p = Pattern::new();
        p.push(Event::Percussion {
            key: 36,
            duration: 0.25,
        });
        let t = Timeline::from_pattern(&p);
        assert!(t.messages.iter().all(|m| m.channel == PERCUSSION_VOICE));
    }

    #[test]
    fn note_off_sorts_before_note_on_at_same_tick() {
        let mut p = Pattern::new();
        p.push(note(60, None));
        p.advance(0.25);
        p.push(note(60, None));
        let t = Timeline::from_pattern(&p);
        let at_480: Vec<bool> = t
            .messages
            .iter()
            .filter(|m| m.tick == 480)
            .map(|m| matches!(m.message, MidiMessage::NoteOff { .. }))
            .collect();
        assert_eq!(at_480.first(), Some(&true));
    }

    #[test]
    fn smf_has_conductor_and_channel_tracks() {
        let bytes = to_bytes(&simple_pattern()).unwrap();
        let smf = Smf::parse(&bytes).unwrap();
        assert_eq!(smf.header.format, Format::Parallel);
        assert_eq!(smf.tracks.len(), 3);
        assert!(smf.tracks[0].iter().any(|e| matches!(
            e.kind,
            TrackEventKind::Meta(MetaMessage::Tempo(t)) if t.as_int() == 500_000
        )));
        assert!(smf.tracks[0]
            .iter()
            .any(|e| matches!(e.kind, TrackEventKind::Meta(MetaMessage::Lyric(b"Cat")))));
    }

    #[test]
    fn write_midi_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.mid");
        write_midi(&simple_pattern(), &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"MThd");
    }
}
