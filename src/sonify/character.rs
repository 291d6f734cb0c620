//! Character units: one note per letter or punctuation mark, a rest for
//! everything else.

use log::debug;

use super::{Run, Session};
use crate::lexicon::LexicalLookup;
use crate::pattern::Event;
use crate::pitch::{Code, PUNCTUATION_CODE};
use crate::unit::{CharUnit, LinguisticUnit};

impl<L: LexicalLookup> Session<L> {
    pub(super) fn sonify_character(&mut self, run: &mut Run, unit: &LinguisticUnit, ch: &CharUnit) {
        run.state.reset();
        let code = match ch.position {
            Some(position) => Code::Alphabet(position),
            // Same lexical code as a punctuation token in word mode: ceiling
            // ceil(47/45 * octaves), harmonic 47 of the base.
            None if ch.is_punctuation() => Code::Lexical(PUNCTUATION_CODE),
            None => {
                run.pattern.push(Event::Rest(self.rest_length));
                run.pattern.advance(self.rest_length);
                return;
            }
        };

        let length = self.sound_code(run, unit, code);
        run.pattern.push(Event::Rest(self.note_gap));
        run.pattern.advance(length + self.note_gap);

        run.state.reset();
        let current = &run.state.current;
        run.pattern.push(Event::Instrument(current.instrument.clone()));
        run.pattern.push(Event::Voice(0));
        run.pattern.push(Event::volume(current.volume));
        run.pattern.push(Event::pan(current.pan));
        debug!("'{}' {code:?} -> t={:.2}", ch.ch, run.pattern.current_time());
    }
}
