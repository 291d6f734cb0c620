//! MIDI output — Standard MIDI File export and live playback of patterns.

pub mod export;
pub mod player;
pub mod program;

pub use export::{to_bytes, write_midi, Timeline};
pub use player::{PlayState, Player, PlayerHandle};
pub use program::{percussion_key, program_number};
