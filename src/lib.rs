//! Textsound — deterministic sonification of linguistically annotated text.
//!
//! Words (or characters) are mapped to pitches through their lexical
//! category codes, shaped by user instructions, and collected into a
//! [`pattern::Pattern`] that renders as Staccato text, a Standard MIDI
//! File, or live MIDI output.

pub mod config;
pub mod error;
pub mod lexicon;
pub mod midi;
pub mod nlp;
pub mod param;
pub mod pattern;
pub mod pitch;
pub mod rules;
pub mod sonify;
pub mod state;
pub mod unit;

pub use config::SessionConfig;
pub use error::SonifyError;
pub use pattern::Pattern;
pub use sonify::Session;
