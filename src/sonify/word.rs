//! Word units: category-code resolution, one voice per code, lyric and
//! annotation markers.

use std::collections::BTreeSet;

use log::debug;

use super::{Run, Session};
use crate::error::{SonifyError, Stage};
use crate::lexicon::LexicalLookup;
use crate::pattern::{Event, PERCUSSION_VOICE};
use crate::pitch::Code;
use crate::unit::{LinguisticUnit, WordUnit};

/// Voices available to a word's codes, the percussion voice excluded.
pub const VOICE_LIMIT: u8 = 15;

/// Voice for the `n`th code of a multi-code word, skipping percussion.
/// `None` once the voices run out.
fn voice_for(n: usize) -> Option<u8> {
    let n = u8::try_from(n).ok()?;
    let voice = if n >= PERCUSSION_VOICE { n.checked_add(1)? } else { n };
    (voice < VOICE_LIMIT).then_some(voice)
}

fn join_codes(codes: &BTreeSet<u32>) -> String {
    codes
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl<L: LexicalLookup> Session<L> {
    /// Category codes for a word: codes already on the unit, a fixed code
    /// for closed classes, or a lexicon lookup for open classes.
    pub(super) fn resolve_codes(&self, word: &WordUnit) -> Result<BTreeSet<u32>, SonifyError> {
        if !word.codes.is_empty() {
            return Ok(word.codes.clone());
        }
        let class = word.class();
        if let Some(code) = class.fixed_code() {
            return Ok(BTreeSet::from([code]));
        }
        match class.part_of_speech() {
            Some(pos) => self
                .lexicon
                .lookup(&word.lemma, pos)
                .map_err(|e| e.at_stage(Stage::LexicalLookup)),
            None => Ok(BTreeSet::new()),
        }
    }

    pub(super) fn sonify_word(
        &mut self,
        run: &mut Run,
        unit: &LinguisticUnit,
        word: &WordUnit,
    ) -> Result<(), SonifyError> {
        let codes = self.resolve_codes(word)?;
        run.state.reset();

        let sentiment = word
            .sentiment_class
            .map_or_else(|| "-".to_string(), |s| s.to_string());
        run.pattern.push(Event::Lyric(word.text.clone()));
        run.pattern.push(Event::Marker(format!(
            "SA[{sentiment}], LGC[{}], POS[{}]",
            join_codes(&codes),
            word.tag
        )));

        let multi_voice = codes.len() > 1;
        let mut longest: Option<f64> = None;
        for (n, &code) in codes.iter().enumerate() {
            let voice = if multi_voice {
                match voice_for(n) {
                    Some(v) => Some(v),
                    None => {
                        debug!(
                            "'{}': dropping {} codes past voice {}",
                            word.text,
                            codes.len() - n,
                            VOICE_LIMIT - 1
                        );
                        break;
                    }
                }
            } else {
                None
            };

            run.state.reset();
            if let Some(v) = voice {
                run.pattern.push(Event::Voice(v));
            }
            let current = &run.state.current;
            run.pattern.push(Event::Instrument(current.instrument.clone()));
            run.pattern.push(Event::volume(current.volume));
            run.pattern.push(Event::pan(current.pan));

            let length = self.sound_code(run, unit, Code::Lexical(code));
            longest = Some(longest.map_or(length, |l: f64| l.max(length)));
        }

        run.pattern.push(Event::Rest(self.note_gap));
        run.pattern.push(Event::Voice(0));
        run.pattern.advance(longest.unwrap_or(0.0) + self.note_gap);

        run.pattern.push(Event::Rest(self.rest_length));
        run.pattern.advance(self.rest_length);

        debug!(
            "'{}' [{}] codes {:?} -> t={:.2}",
            word.text,
            word.tag,
            codes,
            run.pattern.current_time()
        );
        Ok(())
    }
}
