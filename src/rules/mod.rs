//! Instruction rule pipeline.
//!
//! Instructions are evaluated in order against each unit. A firing
//! instruction mutates the playback state, routing every numeric result
//! through the parameter store, and may append events to the pattern.

pub mod file;
pub mod instruction;

pub use file::{load_instructions, load_specs, parse_instructions, InstructionSpec, Scalar};
pub use instruction::{
    ChangeMode, CharacterClass, Comparison, Instruction, Polarity, SoundModifier, Trigger,
};

use log::debug;

use crate::param::{Axis, ParameterStore};
use crate::pattern::{Event, Pattern};
use crate::pitch::{midi_to_frequency, ChordQuality};
use crate::state::{BendAdjust, ChordChoice, PlaybackState};
use crate::unit::LinguisticUnit;

/// A trigger that fired, with the sentiment magnitude when it was a
/// sentiment trigger.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fired {
    pub magnitude: Option<f64>,
}

impl Fired {
    const PLAIN: Fired = Fired { magnitude: None };
}

/// Test `trigger` against `unit`. `code` is the lexical code being sounded,
/// if any.
pub fn evaluate(trigger: &Trigger, unit: &LinguisticUnit, code: Option<u32>) -> Option<Fired> {
    let fired = match (trigger, unit) {
        (Trigger::CategoryMatch(class), LinguisticUnit::Word(w)) => w.class() == *class,
        (Trigger::LengthCompare { op, length }, LinguisticUnit::Word(w)) => op.holds(w.len(), *length),
        (Trigger::CodeEquals(value), LinguisticUnit::Word(_)) => code == Some(*value),
        (Trigger::LiteralMatch(text), LinguisticUnit::Word(w)) => w.lemma == *text,
        (Trigger::LiteralMatch(text), LinguisticUnit::Character(c)) => text.chars().next() == Some(c.ch),
        (Trigger::SentimentPolarity(polarity), LinguisticUnit::Word(w)) => {
            return w
                .sentiment
                .filter(|s| polarity.matches(*s))
                .map(|s| Fired {
                    magnitude: Some(s.abs()),
                });
        }
        (Trigger::CharacterClass(class), LinguisticUnit::Character(c)) => class.matches(c),
        _ => false,
    };
    fired.then_some(Fired::PLAIN)
}

/// Mutable context a pipeline run works on.
pub struct Pipeline<'a> {
    pub state: &'a mut PlaybackState,
    pub store: &'a mut ParameterStore,
    pub pattern: &'a mut Pattern,
    /// Sound is currently silenced by the mute note operation.
    pub mute: bool,
}

impl Pipeline<'_> {
    /// Evaluate every instruction against `unit`, applying those that fire.
    /// Returns how many fired.
    pub fn run(&mut self, instructions: &[Instruction], unit: &LinguisticUnit, code: Option<u32>) -> usize {
        let mut count = 0;
        for (i, instruction) in instructions.iter().enumerate() {
            if let Some(fired) = evaluate(&instruction.trigger, unit, code) {
                debug!("instruction #{i} fired: {:?}", instruction.modifier);
                self.apply(instruction, fired);
                count += 1;
            }
        }
        count
    }

    /// Apply one fired instruction.
    pub fn apply(&mut self, instruction: &Instruction, fired: Fired) {
        if self.mute {
            self.pattern.push(Event::volume(self.state.current.volume));
        }

        let mode = instruction.mode;
        let current = &mut self.state.current;
        let base = &mut self.state.base;
        let store = &mut *self.store;

        match &instruction.modifier {
            SoundModifier::Tempo(v) => {
                let tempo = store.keep_in_range(Axis::Tempo, mode.combine(current.tempo, *v));
                current.tempo = tempo;
                base.tempo = tempo;
                self.pattern.push(Event::Tempo(tempo.trunc() as u32));
            }
            SoundModifier::NoteDuration(v) => {
                let length = store.keep_in_range(Axis::NoteLength, mode.combine(current.note_length, *v));
                current.note_length = length;
                if mode == ChangeMode::Add {
                    base.note_length = length;
                }
            }
            SoundModifier::Octave(v) => {
                let octaves = store.keep_in_range(Axis::Octaves, mode.combine(current.octaves, *v));
                current.octaves = octaves;
                if mode == ChangeMode::Add {
                    base.octaves = octaves;
                }
            }
            SoundModifier::Instrument(name) => {
                current.instrument.clone_from(name);
                self.pattern.push(Event::Instrument(name.clone()));
            }
            SoundModifier::Volume(v) => {
                current.volume = store.keep_in_range(Axis::Volume, mode.combine(current.volume, *v));
                self.pattern.push(Event::volume(current.volume));
            }
            SoundModifier::Percussion(key) => {
                self.pattern.push(Event::Percussion {
                    key: *key,
                    duration: current.note_length,
                });
            }
            SoundModifier::NoteByName(note) => {
                current.frequency = store.keep_in_range(Axis::BaseFrequency, midi_to_frequency(*note));
            }
            SoundModifier::Attack(v) => {
                current.attack = store.keep_in_range(Axis::Attack, mode.combine(current.attack, *v));
            }
            SoundModifier::Decay(v) => {
                current.decay = store.keep_in_range(Axis::Decay, mode.combine(current.decay, *v));
            }
            SoundModifier::PitchBend(v) => {
                current.bend = match (mode, current.bend) {
                    (ChangeMode::Set, _) => BendAdjust::Fixed(store.keep_in_range(Axis::PitchBend, *v)),
                    (ChangeMode::Add, BendAdjust::Computed) => BendAdjust::Offset(*v),
                    (ChangeMode::Add, BendAdjust::Offset(o)) => BendAdjust::Offset(o + v),
                    (ChangeMode::Add, BendAdjust::Fixed(f)) => {
                        BendAdjust::Fixed(store.keep_in_range(Axis::PitchBend, f + v))
                    }
                };
            }
            SoundModifier::Pan(v) => {
                current.pan = store.keep_in_range(Axis::Pan, mode.combine(current.pan, *v));
                self.pattern.push(Event::pan(current.pan));
            }
            SoundModifier::MajorChord(v) => {
                current.chord = Some(ChordChoice {
                    quality: ChordQuality::Major,
                    magnitude: fired.magnitude.unwrap_or(*v),
                });
            }
            SoundModifier::MinorChord(v) => {
                current.chord = Some(ChordChoice {
                    quality: ChordQuality::Minor,
                    magnitude: fired.magnitude.unwrap_or(*v),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Settings;
    use crate::unit::{CharUnit, LetterOrdering, WordClass, WordUnit};
    use assert_approx_eq::assert_approx_eq;

    fn base() -> Settings {
        Settings {
            tempo: 120.0,
            note_length: 0.25,
            frequency: 128.0,
            octaves: 5.0,
            instrument: "Piano".into(),
            volume: 10200.0,
            attack: 64.0,
            decay: 64.0,
            pan: 64.0,
            bend: BendAdjust::Computed,
            chord: None,
        }
    }

    struct Fixture {
        state: PlaybackState,
        store: ParameterStore,
        pattern: Pattern,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                state: PlaybackState::new(base()),
                store: ParameterStore::default(),
                pattern: Pattern::new(),
            }
        }

        fn run(&mut self, instructions: &[Instruction], unit: &LinguisticUnit, mute: bool) -> usize {
            Pipeline {
                state: &mut self.state,
                store: &mut self.store,
                pattern: &mut self.pattern,
                mute,
            }
            .run(instructions, unit, Some(5))
        }
    }

    fn noun(text: &str) -> LinguisticUnit {
        LinguisticUnit::Word(WordUnit::new(text, text.to_lowercase(), "NN"))
    }

    fn on_nouns(modifier: SoundModifier, mode: ChangeMode) -> Instruction {
        Instruction::new(Trigger::CategoryMatch(WordClass::Noun), modifier, mode)
    }

    #[test]
    fn word_triggers() {
        let cat = noun("Cat");
        assert!(evaluate(&Trigger::CategoryMatch(WordClass::Noun), &cat, None).is_some());
        assert!(evaluate(&Trigger::CategoryMatch(WordClass::Verb), &cat, None).is_none());
        assert!(evaluate(
            &Trigger::LengthCompare {
                op: Comparison::Equal,
                length: 3
            },
            &cat,
            None
        )
        .is_some());
        assert!(evaluate(&Trigger::CodeEquals(5), &cat, Some(5)).is_some());
        assert!(evaluate(&Trigger::CodeEquals(5), &cat, Some(6)).is_none());
        assert!(evaluate(&Trigger::LiteralMatch("cat".into()), &cat, None).is_some());
        assert!(evaluate(&Trigger::CharacterClass(CharacterClass::Vowel), &cat, None).is_none());
    }

    #[test]
    fn sentiment_trigger_carries_magnitude() {
        let mut w = WordUnit::new("awful", "awful", "JJ");
        w.sentiment = Some(-0.6);
        let unit = LinguisticUnit::Word(w);
        let fired = evaluate(&Trigger::SentimentPolarity(Polarity::Negative), &unit, None).unwrap();
        assert_approx_eq!(fired.magnitude.unwrap(), 0.6);
        assert!(evaluate(&Trigger::SentimentPolarity(Polarity::Positive), &unit, None).is_none());
        assert!(evaluate(&Trigger::SentimentPolarity(Polarity::Positive), &noun("cat"), None).is_none());
    }

    #[test]
    fn character_triggers() {
        let e = LinguisticUnit::Character(CharUnit::new('e', LetterOrdering::Mayzner));
        assert!(evaluate(&Trigger::CharacterClass(CharacterClass::Vowel), &e, None).is_some());
        assert!(evaluate(&Trigger::CharacterClass(CharacterClass::Lowercase), &e, None).is_some());
        assert!(evaluate(&Trigger::LiteralMatch("e".into()), &e, None).is_some());
        assert!(evaluate(&Trigger::CategoryMatch(WordClass::Noun), &e, None).is_none());
    }

    #[test]
    fn set_then_add_tempo_is_clamped_once_more() {
        let mut f = Fixture::new();
        let rules = vec![
            on_nouns(SoundModifier::Tempo(120.0), ChangeMode::Set),
            on_nouns(SoundModifier::Tempo(10.0), ChangeMode::Add),
        ];
        assert_eq!(f.run(&rules, &noun("cat"), false), 2);
        let expected = ParameterStore::default().keep_in_range(Axis::Tempo, 130.0);
        assert_approx_eq!(f.state.current.tempo, expected);
        assert_approx_eq!(f.state.base.tempo, expected);
        assert_eq!(f.pattern.entries().last().unwrap().event, Event::Tempo(130));
    }

    #[test]
    fn fractional_tempo_is_truncated_in_the_stream() {
        let mut f = Fixture::new();
        let rules = vec![on_nouns(SoundModifier::Tempo(99.9), ChangeMode::Set)];
        f.run(&rules, &noun("cat"), false);
        assert_approx_eq!(f.state.current.tempo, 99.9);
        assert_eq!(f.pattern.entries().last().unwrap().event, Event::Tempo(99));
    }

    #[test]
    fn tempo_past_maximum_reflects() {
        let mut f = Fixture::new();
        let rules = vec![
            on_nouns(SoundModifier::Tempo(590.0), ChangeMode::Set),
            on_nouns(SoundModifier::Tempo(20.0), ChangeMode::Add),
        ];
        f.run(&rules, &noun("cat"), false);
        assert_approx_eq!(f.state.current.tempo, 590.0);
    }

    #[test]
    fn add_mode_moves_the_base_for_duration_and_octave() {
        let mut f = Fixture::new();
        let rules = vec![
            on_nouns(SoundModifier::NoteDuration(0.25), ChangeMode::Add),
            on_nouns(SoundModifier::Octave(2.0), ChangeMode::Set),
        ];
        f.run(&rules, &noun("cat"), false);
        assert_approx_eq!(f.state.current.note_length, 0.5);
        assert_approx_eq!(f.state.base.note_length, 0.5);
        assert_approx_eq!(f.state.current.octaves, 2.0);
        assert_approx_eq!(f.state.base.octaves, 5.0);
    }

    #[test]
    fn unchanged_axes_survive_reset() {
        let mut f = Fixture::new();
        let rules = vec![on_nouns(SoundModifier::Volume(3000.0), ChangeMode::Set)];
        f.run(&rules, &noun("cat"), false);
        assert_approx_eq!(f.state.current.volume, 3000.0);
        f.state.reset();
        assert_approx_eq!(f.state.current.volume, 10200.0);
    }

    #[test]
    fn control_modifiers_emit_events() {
        let mut f = Fixture::new();
        let rules = vec![
            on_nouns(SoundModifier::Volume(3000.0), ChangeMode::Set),
            on_nouns(SoundModifier::Pan(10.0), ChangeMode::Add),
            on_nouns(SoundModifier::Instrument("Violin".into()), ChangeMode::Set),
            on_nouns(SoundModifier::Percussion(36), ChangeMode::Set),
        ];
        f.run(&rules, &noun("cat"), false);
        let events: Vec<&Event> = f.pattern.entries().iter().map(|e| &e.event).collect();
        assert_eq!(
            events,
            vec![
                &Event::volume(3000.0),
                &Event::pan(74.0),
                &Event::Instrument("Violin".into()),
                &Event::Percussion {
                    key: 36,
                    duration: 0.25
                },
            ]
        );
        assert_eq!(f.state.current.instrument, "Violin");
    }

    #[test]
    fn mute_is_lifted_by_any_firing_instruction() {
        let mut f = Fixture::new();
        let rules = vec![on_nouns(SoundModifier::Attack(100.0), ChangeMode::Set)];
        f.run(&rules, &noun("cat"), true);
        assert_eq!(f.pattern.entries()[0].event, Event::volume(10200.0));
        assert_approx_eq!(f.state.current.attack, 100.0);
    }

    #[test]
    fn note_by_name_sets_frequency() {
        let mut f = Fixture::new();
        let rules = vec![on_nouns(SoundModifier::NoteByName(69), ChangeMode::Set)];
        f.run(&rules, &noun("cat"), false);
        assert_approx_eq!(f.state.current.frequency, 440.0);
    }

    #[test]
    fn pitch_bend_set_and_add_compose() {
        let mut f = Fixture::new();
        let rules = vec![
            on_nouns(SoundModifier::PitchBend(100.0), ChangeMode::Add),
            on_nouns(SoundModifier::PitchBend(50.0), ChangeMode::Add),
        ];
        f.run(&rules, &noun("cat"), false);
        assert_eq!(f.state.current.bend, BendAdjust::Offset(150.0));

        let rules = vec![
            on_nouns(SoundModifier::PitchBend(8000.0), ChangeMode::Set),
            on_nouns(SoundModifier::PitchBend(500.0), ChangeMode::Add),
        ];
        f.state.reset();
        f.run(&rules, &noun("cat"), false);
        assert_eq!(f.state.current.bend, BendAdjust::Fixed(8500.0));
    }

    #[test]
    fn chord_magnitude_comes_from_sentiment_when_available() {
        let mut f = Fixture::new();
        let mut w = WordUnit::new("joy", "joy", "NN");
        w.sentiment = Some(0.3);
        let unit = LinguisticUnit::Word(w);
        let rules = vec![Instruction::new(
            Trigger::SentimentPolarity(Polarity::Positive),
            SoundModifier::MajorChord(0.0),
            ChangeMode::Set,
        )];
        f.run(&rules, &unit, false);
        let chord = f.state.current.chord.unwrap();
        assert_eq!(chord.quality, ChordQuality::Major);
        assert_approx_eq!(chord.magnitude, 0.3);

        let rules = vec![on_nouns(SoundModifier::MinorChord(0.7), ChangeMode::Set)];
        f.run(&rules, &unit, false);
        assert_approx_eq!(f.state.current.chord.unwrap().magnitude, 0.7);
    }
}
