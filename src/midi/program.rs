//! General MIDI names — instrument programs and percussion keys.

/// General MIDI program names, indexed by program number.
pub const PROGRAM_NAMES: [&str; 128] = [
    "PIANO",
    "BRIGHT_ACOUSTIC",
    "ELECTRIC_GRAND",
    "HONKEY_TONK",
    "ELECTRIC_PIANO",
    "ELECTRIC_PIANO_2",
    "HARPSICHORD",
    "CLAVINET",
    "CELESTA",
    "GLOCKENSPIEL",
    "MUSIC_BOX",
    "VIBRAPHONE",
    "MARIMBA",
    "XYLOPHONE",
    "TUBULAR_BELLS",
    "DULCIMER",
    "DRAWBAR_ORGAN",
    "PERCUSSIVE_ORGAN",
    "ROCK_ORGAN",
    "CHURCH_ORGAN",
    "REED_ORGAN",
    "ACCORDION",
    "HARMONICA",
    "TANGO_ACCORDION",
    "GUITAR",
    "STEEL_STRING_GUITAR",
    "ELECTRIC_JAZZ_GUITAR",
    "ELECTRIC_CLEAN_GUITAR",
    "ELECTRIC_MUTED_GUITAR",
    "OVERDRIVEN_GUITAR",
    "DISTORTION_GUITAR",
    "GUITAR_HARMONICS",
    "ACOUSTIC_BASS",
    "ELECTRIC_BASS_FINGER",
    "ELECTRIC_BASS_PICK",
    "FRETLESS_BASS",
    "SLAP_BASS_1",
    "SLAP_BASS_2",
    "SYNTH_BASS_1",
    "SYNTH_BASS_2",
    "VIOLIN",
    "VIOLA",
    "CELLO",
    "CONTRABASS",
    "TREMOLO_STRINGS",
    "PIZZICATO_STRINGS",
    "ORCHESTRAL_STRINGS",
    "TIMPANI",
    "STRING_ENSEMBLE_1",
    "STRING_ENSEMBLE_2",
    "SYNTH_STRINGS_1",
    "SYNTH_STRINGS_2",
    "CHOIR_AAHS",
    "VOICE_OOHS",
    "SYNTH_VOICE",
    "ORCHESTRA_HIT",
    "TRUMPET",
    "TROMBONE",
    "TUBA",
    "MUTED_TRUMPET",
    "FRENCH_HORN",
    "BRASS_SECTION",
    "SYNTH_BRASS_1",
    "SYNTH_BRASS_2",
    "SOPRANO_SAX",
    "ALTO_SAX",
    "TENOR_SAX",
    "BARITONE_SAX",
    "OBOE",
    "ENGLISH_HORN",
    "BASSOON",
    "CLARINET",
    "PICCOLO",
    "FLUTE",
    "RECORDER",
    "PAN_FLUTE",
    "BLOWN_BOTTLE",
    "SHAKUHACHI",
    "WHISTLE",
    "OCARINA",
    "SQUARE",
    "SAWTOOTH",
    "CALLIOPE",
    "CHIFF",
    "CHARANG",
    "VOICE",
    "FIFTHS",
    "BASSLEAD",
    "NEW_AGE",
    "WARM",
    "POLYSYNTH",
    "CHOIR",
    "BOWED",
    "METALLIC",
    "HALO",
    "SWEEP",
    "RAIN",
    "SOUNDTRACK",
    "CRYSTAL",
    "ATMOSPHERE",
    "BRIGHTNESS",
    "GOBLIN",
    "ECHOES",
    "SCI_FI",
    "SITAR",
    "BANJO",
    "SHAMISEN",
    "KOTO",
    "KALIMBA",
    "BAGPIPE",
    "FIDDLE",
    "SHANAI",
    "TINKLE_BELL",
    "AGOGO",
    "STEEL_DRUMS",
    "WOODBLOCK",
    "TAIKO_DRUM",
    "MELODIC_TOM",
    "SYNTH_DRUM",
    "REVERSE_CYMBAL",
    "GUITAR_FRET_NOISE",
    "BREATH_NOISE",
    "SEASHORE",
    "BIRD_TWEET",
    "TELEPHONE_RING",
    "HELICOPTER",
    "APPLAUSE",
    "GUNSHOT",
];

/// Percussion names for keys 35 through 81.
const PERCUSSION_NAMES: [&str; 47] = [
    "ACOUSTIC_BASS_DRUM",
    "BASS_DRUM",
    "SIDE_STICK",
    "ACOUSTIC_SNARE",
    "HAND_CLAP",
    "ELECTRIC_SNARE",
    "LOW_FLOOR_TOM",
    "CLOSED_HI_HAT",
    "HIGH_FLOOR_TOM",
    "PEDAL_HI_HAT",
    "LOW_TOM",
    "OPEN_HI_HAT",
    "LOW_MID_TOM",
    "HI_MID_TOM",
    "CRASH_CYMBAL_1",
    "HIGH_TOM",
    "RIDE_CYMBAL_1",
    "CHINESE_CYMBAL",
    "RIDE_BELL",
    "TAMBOURINE",
    "SPLASH_CYMBAL",
    "COWBELL",
    "CRASH_CYMBAL_2",
    "VIBRASLAP",
    "RIDE_CYMBAL_2",
    "HI_BONGO",
    "LOW_BONGO",
    "MUTE_HI_CONGA",
    "OPEN_HI_CONGA",
    "LOW_CONGA",
    "HIGH_TIMBALE",
    "LOW_TIMBALE",
    "HIGH_AGOGO",
    "LOW_AGOGO",
    "CABASA",
    "MARACAS",
    "SHORT_WHISTLE",
    "LONG_WHISTLE",
    "SHORT_GUIRO",
    "LONG_GUIRO",
    "CLAVES",
    "HI_WOOD_BLOCK",
    "LOW_WOOD_BLOCK",
    "MUTE_CUICA",
    "OPEN_CUICA",
    "MUTE_TRIANGLE",
    "OPEN_TRIANGLE",
];

const FIRST_PERCUSSION_KEY: u8 = 35;

fn normalise(name: &str) -> String {
    name.trim()
        .to_ascii_uppercase()
        .replace([' ', '-'], "_")
}

/// Program number for an instrument given by name ("Piano", "french horn")
/// or by number ("40").
pub fn program_number(name: &str) -> Option<u8> {
    if let Ok(n) = name.trim().parse::<u8>() {
        return (n < 128).then_some(n);
    }
    let wanted = normalise(name);
    PROGRAM_NAMES
        .iter()
        .position(|p| *p == wanted)
        .map(|i| i as u8)
}

/// Percussion key for a drum given by name ("bass drum") or key number.
pub fn percussion_key(name: &str) -> Option<u8> {
    if let Ok(n) = name.trim().parse::<u8>() {
        return (n < 128).then_some(n);
    }
    let wanted = normalise(name);
    PERCUSSION_NAMES
        .iter()
        .position(|p| *p == wanted)
        .map(|i| FIRST_PERCUSSION_KEY + i as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn programs_by_name() {
        assert_eq!(program_number("Piano"), Some(0));
        assert_eq!(program_number("violin"), Some(40));
        assert_eq!(program_number("French Horn"), Some(60));
        assert_eq!(program_number("GUNSHOT"), Some(127));
        assert_eq!(program_number("kazoo"), None);
    }

    #[test]
    fn programs_by_number() {
        assert_eq!(program_number("73"), Some(73));
        assert_eq!(program_number("200"), None);
    }

    #[test]
    fn percussion_by_name() {
        assert_eq!(percussion_key("bass drum"), Some(36));
        assert_eq!(percussion_key("ACOUSTIC_SNARE"), Some(38));
        assert_eq!(percussion_key("closed-hi-hat"), Some(42));
        assert_eq!(percussion_key("open triangle"), Some(81));
        assert_eq!(percussion_key("gong"), None);
    }

    #[test]
    fn percussion_by_number() {
        assert_eq!(percussion_key("49"), Some(49));
    }
}
