//! Sonification session — turns linguistic units into a [`Pattern`].
//!
//! A [`Session`] owns the parameter store, the validated instructions and
//! the lexicon. Each run re-seeds the playback state from the configuration
//! and returns a finished pattern; a failed run returns an error and no
//! pattern.

mod character;
mod word;

use log::{debug, info};

use crate::config::{Granularity, NoteOperation, SessionConfig};
use crate::error::{SonifyError, Stage};
use crate::lexicon::LexicalLookup;
use crate::nlp::{Segmenter, Sentence, SentimentClassifier, NEUTRAL_SENTIMENT};
use crate::param::{Axis, ParameterStore};
use crate::pattern::{Event, NoteEvent, Pattern};
use crate::pitch::{self, Chord, Code};
use crate::rules::{parse_instructions, Instruction, InstructionSpec, Pipeline};
use crate::state::{BendAdjust, PlaybackState, Settings};
use crate::unit::{CharUnit, LinguisticUnit};

/// Working state of one run.
struct Run {
    state: PlaybackState,
    pattern: Pattern,
    units: usize,
}

fn seven_bit(value: f64) -> u8 {
    value.round().clamp(0.0, 127.0) as u8
}

pub struct Session<L> {
    config: SessionConfig,
    instructions: Vec<Instruction>,
    lexicon: L,
    store: ParameterStore,
    seed: Settings,
    note_gap: f64,
    rest_length: f64,
}

impl<L: LexicalLookup> Session<L> {
    /// Build a session. Configured values are clamped to their axis bounds.
    pub fn new(
        config: SessionConfig,
        instructions: Vec<Instruction>,
        lexicon: L,
    ) -> Result<Self, SonifyError> {
        let mut store = ParameterStore::with_bounds(&config.bounds)?;
        let seed = Settings {
            tempo: store.keep_in_range(Axis::Tempo, config.tempo),
            note_length: store.keep_in_range(Axis::NoteLength, config.note_length),
            frequency: store.keep_in_range(Axis::BaseFrequency, config.base_frequency),
            octaves: store.keep_in_range(Axis::Octaves, config.octaves),
            instrument: config.instrument.clone(),
            volume: store.keep_in_range(Axis::Volume, config.volume),
            attack: store.keep_in_range(Axis::Attack, config.attack),
            decay: store.keep_in_range(Axis::Decay, config.decay),
            pan: store.keep_in_range(Axis::Pan, config.pan),
            bend: BendAdjust::Computed,
            chord: None,
        };
        let note_gap = store.keep_in_range(Axis::ArpeggiateGap, config.note_gap);
        let rest_length = store.keep_in_range(Axis::RestLength, config.rest_length);
        Ok(Self {
            config,
            instructions,
            lexicon,
            store,
            seed,
            note_gap,
            rest_length,
        })
    }

    /// Validate `specs` and build a session from them.
    pub fn from_specs(
        config: SessionConfig,
        specs: &[InstructionSpec],
        lexicon: L,
    ) -> Result<Self, SonifyError> {
        let instructions = parse_instructions(specs)?;
        Self::new(config, instructions, lexicon)
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    pub fn store(&self) -> &ParameterStore {
        &self.store
    }

    /// The values every run starts from, after clamping.
    pub fn base_settings(&self) -> &Settings {
        &self.seed
    }

    pub fn note_gap(&self) -> f64 {
        self.note_gap
    }

    pub fn rest_length(&self) -> f64 {
        self.rest_length
    }

    fn begin(&self) -> Run {
        let mut pattern = Pattern::new();
        pattern.push(Event::Voice(0));
        pattern.push(Event::Instrument(self.seed.instrument.clone()));
        pattern.push(Event::Tempo(self.seed.tempo.trunc() as u32));
        Run {
            state: PlaybackState::new(self.seed.clone()),
            pattern,
            units: 0,
        }
    }

    fn finish(&self, run: Run) -> Pattern {
        info!(
            "sonified {} units into {} events over {:.2} whole notes",
            run.units,
            run.pattern.len(),
            run.pattern.elapsed()
        );
        run.pattern
    }

    fn sonify_unit(&mut self, run: &mut Run, unit: &LinguisticUnit) -> Result<(), SonifyError> {
        run.units += 1;
        match unit {
            LinguisticUnit::Word(w) => self.sonify_word(run, unit, w),
            LinguisticUnit::Character(c) => {
                self.sonify_character(run, unit, c);
                Ok(())
            }
        }
    }

    /// Sonify units in order, with no sentence markers.
    pub fn sonify_units(&mut self, units: &[LinguisticUnit]) -> Result<Pattern, SonifyError> {
        let mut run = self.begin();
        for unit in units {
            self.sonify_unit(&mut run, unit)?;
        }
        Ok(self.finish(run))
    }

    /// Sonify tagged sentences word by word, closing each with a
    /// `SENTENCE[class]` marker.
    pub fn sonify_sentences(&mut self, sentences: &[Sentence]) -> Result<Pattern, SonifyError> {
        let mut run = self.begin();
        for sentence in sentences {
            for word in sentence.word_units() {
                self.sonify_unit(&mut run, &LinguisticUnit::Word(word))?;
            }
            let class = sentence.sentiment.unwrap_or(NEUTRAL_SENTIMENT);
            run.pattern.push(Event::Marker(format!("SENTENCE[{class}]")));
        }
        Ok(self.finish(run))
    }

    /// Sonify every character of `text` using the configured letter ordering.
    pub fn sonify_characters(&mut self, text: &str) -> Pattern {
        let ordering = self.config.ordering;
        let mut run = self.begin();
        for ch in text.chars() {
            let c = CharUnit::new(ch, ordering);
            run.units += 1;
            self.sonify_character(&mut run, &LinguisticUnit::Character(c), &c);
        }
        self.finish(run)
    }

    /// Analyse and sonify raw text at the configured granularity.
    ///
    /// In word mode the segmenter and classifier run over the whole text
    /// before any event is produced. The classifier rates every sentence and
    /// every word; a collaborator failure returns the error and nothing else.
    pub fn sonify_text(
        &mut self,
        text: &str,
        segmenter: &dyn Segmenter,
        classifier: &dyn SentimentClassifier,
    ) -> Result<Pattern, SonifyError> {
        if self.config.granularity == Granularity::Character {
            return Ok(self.sonify_characters(text));
        }
        let mut sentences = segmenter
            .segment(text)
            .map_err(|e| e.at_stage(Stage::Segmentation))?;
        for sentence in &mut sentences {
            if sentence.sentiment.is_none() {
                let class = classifier
                    .classify(&sentence.text())
                    .map_err(|e| e.at_stage(Stage::Classification))?;
                sentence.sentiment = Some(class);
            }
            for token in &mut sentence.tokens {
                if token.class.is_none() {
                    let class = classifier
                        .classify(&token.word)
                        .map_err(|e| e.at_stage(Stage::Classification))?;
                    token.class = Some(class);
                }
                if token.sentiment.is_none() {
                    token.sentiment = classifier.word_score(&token.word);
                }
            }
        }
        self.sonify_sentences(&sentences)
    }

    /// Run the instructions for one code and append its note. Returns the
    /// note length used.
    fn sound_code(&mut self, run: &mut Run, unit: &LinguisticUnit, code: Code) -> f64 {
        let operation = self.config.note_operation;
        let base_frequency = run.state.base.frequency;
        run.state.current.frequency = match operation {
            NoteOperation::LexNameFreq => code.harmonic() * base_frequency,
            NoteOperation::StaticFreq | NoteOperation::Mute => base_frequency,
        };
        let mute = operation == NoteOperation::Mute;
        if mute {
            run.pattern.push(Event::volume(0.0));
        }

        let lexical = match code {
            Code::Lexical(c) => Some(c),
            Code::Alphabet(_) => None,
        };
        Pipeline {
            state: &mut run.state,
            store: &mut self.store,
            pattern: &mut run.pattern,
            mute,
        }
        .run(&self.instructions, unit, lexical);

        let current = &run.state.current;
        let octave = code.target_octave(current.octaves);
        let resolved = pitch::resolve(current.frequency, base_frequency, octave);
        let bend = current.bend.resolve(resolved.bend, &mut self.store);
        let note = resolved.midi_u8();
        let chord = current
            .chord
            .map(|c| Chord::new(note, c.quality, c.magnitude));

        debug!(
            "code {code:?}: {:.2} Hz under {:.2} Hz -> note {note} bend {bend}",
            resolved.frequency,
            resolved.top_frequency
        );
        run.pattern.push(Event::Note(NoteEvent {
            note,
            bend,
            duration: current.note_length,
            attack: seven_bit(current.attack),
            decay: seven_bit(current.decay),
            chord,
        }));
        current.note_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::MemoryLexicon;
    use crate::nlp::Token;
    use crate::rules::{ChangeMode, SoundModifier, Trigger};
    use crate::unit::{PartOfSpeech, WordClass};
    use assert_approx_eq::assert_approx_eq;

    fn lexicon() -> MemoryLexicon {
        MemoryLexicon::new()
            .with("cat", PartOfSpeech::Noun, [5])
            .with("run", PartOfSpeech::Verb, [38])
    }

    fn cat_runs() -> Sentence {
        Sentence::new(vec![
            Token::new("Cat", "cat", "NN"),
            Token::new("runs", "run", "VBZ"),
            Token::new(".", ".", "."),
        ])
    }

    #[test]
    fn configured_values_are_clamped() {
        let config = SessionConfig {
            tempo: 1000.0,
            ..SessionConfig::default()
        };
        let session = Session::new(config, Vec::new(), lexicon()).unwrap();
        assert_approx_eq!(session.base_settings().tempo, 200.0);
    }

    #[test]
    fn invalid_bounds_fail_construction() {
        let mut config = SessionConfig::default();
        config.bounds.insert(Axis::Volume, (100.0, 10.0));
        assert!(Session::new(config, Vec::new(), lexicon()).is_err());
    }

    #[test]
    fn negative_frequency_bounds_fail_construction() {
        let mut config = SessionConfig::default();
        config.bounds.insert(Axis::BaseFrequency, (-10.0, 1000.0));
        config.base_frequency = 0.0;
        let err = Session::new(config, Vec::new(), lexicon()).err().unwrap();
        assert!(matches!(err, SonifyError::InvalidParameter(_)));
    }

    #[test]
    fn zero_frequency_floor_still_sonifies() {
        let mut config = SessionConfig::default();
        config.bounds.insert(Axis::BaseFrequency, (0.0, 1000.0));
        config.base_frequency = 0.0;
        let mut session = Session::new(config, Vec::new(), lexicon()).unwrap();
        assert!(session.base_settings().frequency > 0.0);
        let pattern = session.sonify_sentences(&[cat_runs()]).unwrap();
        assert_eq!(pattern.notes().count(), 3);
        assert!(pattern.notes().all(|n| n.note == 0));
    }

    #[test]
    fn opening_tempo_truncates() {
        let config = SessionConfig {
            tempo: 119.9,
            ..SessionConfig::default()
        };
        let mut session = Session::new(config, Vec::new(), lexicon()).unwrap();
        let pattern = session.sonify_units(&[]).unwrap();
        assert_eq!(pattern.entries()[2].event, Event::Tempo(119));
    }

    #[test]
    fn run_starts_with_voice_instrument_and_tempo() {
        let mut session = Session::new(SessionConfig::default(), Vec::new(), lexicon()).unwrap();
        let pattern = session.sonify_units(&[]).unwrap();
        let events: Vec<&Event> = pattern.entries().iter().map(|e| &e.event).collect();
        assert_eq!(
            events,
            vec![
                &Event::Voice(0),
                &Event::Instrument("Piano".into()),
                &Event::Tempo(120)
            ]
        );
    }

    #[test]
    fn runs_are_repeatable() {
        let rules = vec![Instruction::new(
            Trigger::CategoryMatch(WordClass::Noun),
            SoundModifier::Tempo(20.0),
            ChangeMode::Add,
        )];
        let mut session = Session::new(SessionConfig::default(), rules, lexicon()).unwrap();
        let first = session.sonify_sentences(&[cat_runs()]).unwrap();
        let second = session.sonify_sentences(&[cat_runs()]).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn sentence_ends_with_marker() {
        let mut session = Session::new(SessionConfig::default(), Vec::new(), lexicon()).unwrap();
        let mut s = cat_runs();
        s.sentiment = Some(1);
        let pattern = session.sonify_sentences(&[s]).unwrap();
        assert_eq!(
            pattern.entries().last().unwrap().event,
            Event::Marker("SENTENCE[1]".into())
        );
    }

    struct Offline;

    impl SentimentClassifier for Offline {
        fn classify(&self, _sentence: &str) -> Result<i32, SonifyError> {
            Err(SonifyError::Config("model not loaded".into()))
        }
    }

    #[test]
    fn classifier_failure_aborts_the_run() {
        let doc = crate::nlp::AnnotatedDocument::new(vec![cat_runs()]);
        let mut session = Session::new(SessionConfig::default(), Vec::new(), lexicon()).unwrap();
        let err = session.sonify_text("Cat runs.", &doc, &Offline).unwrap_err();
        assert!(matches!(
            err,
            SonifyError::Collaborator {
                stage: Stage::Classification,
                ..
            }
        ));
    }

    /// Longer texts read as positive, single words as negative.
    struct ByLength;

    impl SentimentClassifier for ByLength {
        fn classify(&self, text: &str) -> Result<i32, SonifyError> {
            Ok(if text.contains(' ') { 4 } else { 0 })
        }
    }

    #[test]
    fn words_and_sentences_are_classified_separately() {
        let doc = crate::nlp::AnnotatedDocument::new(vec![cat_runs()]);
        let mut session = Session::new(SessionConfig::default(), Vec::new(), lexicon()).unwrap();
        let pattern = session.sonify_text("Cat runs.", &doc, &ByLength).unwrap();
        let text = pattern.to_string();
        assert!(text.contains("#(SA[0], LGC[5], POS[N])"));
        assert!(text.contains("#(SA[0], LGC[38], POS[V])"));
        assert!(!text.contains("SA[4]"));
        assert!(text.ends_with("#(SENTENCE[4])"));
    }

    #[test]
    fn recorded_word_classes_are_kept() {
        let mut sentence = cat_runs();
        sentence.tokens[0].class = Some(3);
        let doc = crate::nlp::AnnotatedDocument::new(vec![sentence]);
        let mut session = Session::new(SessionConfig::default(), Vec::new(), lexicon()).unwrap();
        let pattern = session.sonify_text("Cat runs.", &doc, &ByLength).unwrap();
        assert!(pattern.to_string().contains("#(SA[3], LGC[5], POS[N])"));
    }

    #[test]
    fn mute_silences_each_code() {
        let config = SessionConfig {
            note_operation: NoteOperation::Mute,
            ..SessionConfig::default()
        };
        let mut session = Session::new(config, Vec::new(), lexicon()).unwrap();
        let pattern = session.sonify_sentences(&[cat_runs()]).unwrap();
        let silences = pattern
            .entries()
            .iter()
            .filter(|e| e.event == Event::volume(0.0))
            .count();
        assert_eq!(silences, pattern.notes().count());
        // static frequency: every note sits on the base pitch
        assert!(pattern.notes().all(|n| n.note == 48));
    }
}
