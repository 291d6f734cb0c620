//! Instruction files — the serde form users author, validated into
//! [`Instruction`]s before any run starts.
//!
//! ```yaml
//! - trigger: category
//!   value: noun
//!   modifier: octave
//!   mode: add
//!   amount: 1
//! - trigger: length
//!   operator: greater
//!   value: 6
//!   modifier: instrument
//!   amount: Violin
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::instruction::{
    ChangeMode, CharacterClass, Comparison, Instruction, Polarity, SoundModifier, Trigger,
};
use crate::error::SonifyError;
use crate::midi::program::percussion_key;
use crate::pitch::parse_note_name;
use crate::unit::WordClass;

/// A number or a piece of text, as written in an instruction file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    /// The value as a number; numeric text parses too.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::Text(String::new())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Number(n) => write!(f, "{n}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// One instruction as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstructionSpec {
    pub trigger: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(default)]
    pub value: Scalar,
    pub modifier: String,
    #[serde(default)]
    pub mode: ChangeMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Scalar>,
}

fn kind(s: &str) -> String {
    s.trim().to_ascii_lowercase().replace(['-', ' '], "_")
}

impl InstructionSpec {
    /// Validate into a typed instruction. `index` is reported in errors.
    pub fn validate(&self, index: usize) -> Result<Instruction, SonifyError> {
        let trigger = self.trigger_of(index)?;
        let modifier = self.modifier_of(index)?;
        Ok(Instruction::new(trigger, modifier, self.mode))
    }

    fn trigger_of(&self, index: usize) -> Result<Trigger, SonifyError> {
        let text = self.value.to_string();
        let trigger = match kind(&self.trigger).as_str() {
            "category" | "word_type" => WordClass::from_name(&text)
                .map(Trigger::CategoryMatch)
                .ok_or_else(|| {
                    SonifyError::instruction(index, format!("unknown category '{text}'"))
                })?,
            "length" | "word_length" => {
                let op = self
                    .operator
                    .as_deref()
                    .ok_or_else(|| SonifyError::instruction(index, "length trigger needs an operator"))?;
                let op = Comparison::parse(op).ok_or_else(|| {
                    SonifyError::instruction(index, format!("unknown operator '{op}'"))
                })?;
                Trigger::LengthCompare {
                    op,
                    length: whole_number(&self.value, index)? as usize,
                }
            }
            "code" | "lexical_code" => Trigger::CodeEquals(whole_number(&self.value, index)?),
            "literal" | "punctuation" => {
                if text.is_empty() {
                    return Err(SonifyError::instruction(index, "literal trigger needs a value"));
                }
                Trigger::LiteralMatch(text)
            }
            "sentiment" => Polarity::parse(&text)
                .map(Trigger::SentimentPolarity)
                .ok_or_else(|| {
                    SonifyError::instruction(index, format!("unknown polarity '{text}'"))
                })?,
            "character" | "character_class" => CharacterClass::parse(&text)
                .map(Trigger::CharacterClass)
                .ok_or_else(|| {
                    SonifyError::instruction(index, format!("unknown character class '{text}'"))
                })?,
            other => {
                return Err(SonifyError::instruction(
                    index,
                    format!("unknown trigger '{other}'"),
                ))
            }
        };
        Ok(trigger)
    }

    fn modifier_of(&self, index: usize) -> Result<SoundModifier, SonifyError> {
        let amount = self.amount.clone().unwrap_or_default();
        let number = || {
            amount.as_number().filter(|n| n.is_finite()).ok_or_else(|| {
                SonifyError::instruction(index, format!("cannot parse '{amount}' as a number"))
            })
        };
        let modifier = match kind(&self.modifier).as_str() {
            "tempo" => SoundModifier::Tempo(number()?),
            "note_duration" | "duration" => SoundModifier::NoteDuration(number()?),
            "octave" | "octaves" => SoundModifier::Octave(number()?),
            "instrument" => {
                let name = amount.to_string();
                if name.trim().is_empty() {
                    return Err(SonifyError::instruction(index, "instrument needs a name"));
                }
                SoundModifier::Instrument(name.trim().to_string())
            }
            "volume" => SoundModifier::Volume(number()?),
            "percussion" => {
                let name = amount.to_string();
                let key = percussion_key(&name).ok_or_else(|| {
                    SonifyError::instruction(index, format!("unknown percussion '{name}'"))
                })?;
                SoundModifier::Percussion(key)
            }
            "note" | "note_by_name" | "midi_note" => {
                let name = amount.to_string();
                let note = parse_note_name(&name).ok_or_else(|| {
                    SonifyError::instruction(index, format!("unknown note name '{name}'"))
                })?;
                SoundModifier::NoteByName(note)
            }
            "attack" => SoundModifier::Attack(number()?),
            "decay" => SoundModifier::Decay(number()?),
            "pitch_bend" | "pitchbend" => SoundModifier::PitchBend(number()?),
            "pan" => SoundModifier::Pan(number()?),
            "major" | "major_chord" => SoundModifier::MajorChord(optional_number(&self.amount, index)?),
            "minor" | "minor_chord" => SoundModifier::MinorChord(optional_number(&self.amount, index)?),
            other => {
                return Err(SonifyError::instruction(
                    index,
                    format!("unknown modifier '{other}'"),
                ))
            }
        };
        Ok(modifier)
    }
}

fn whole_number(value: &Scalar, index: usize) -> Result<u32, SonifyError> {
    value
        .as_number()
        .filter(|n| n.is_finite() && *n >= 0.0 && n.fract() == 0.0 && *n <= u32::MAX as f64)
        .map(|n| n as u32)
        .ok_or_else(|| {
            SonifyError::instruction(index, format!("'{value}' is not a whole number"))
        })
}

fn optional_number(value: &Option<Scalar>, index: usize) -> Result<f64, SonifyError> {
    match value {
        None => Ok(0.0),
        Some(v) => v.as_number().filter(|n| n.is_finite()).ok_or_else(|| {
            SonifyError::instruction(index, format!("cannot parse '{v}' as a number"))
        }),
    }
}

/// Validate every spec, failing on the first bad one.
pub fn parse_instructions(specs: &[InstructionSpec]) -> Result<Vec<Instruction>, SonifyError> {
    specs
        .iter()
        .enumerate()
        .map(|(i, spec)| spec.validate(i))
        .collect()
}

/// Read instruction specs from a YAML file, or JSON when the extension is
/// `.json`.
pub fn load_specs(path: &Path) -> Result<Vec<InstructionSpec>, SonifyError> {
    let content = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        serde_json::from_str(&content)
            .map_err(|e| SonifyError::Config(format!("{}: {e}", path.display())))
    } else {
        serde_yaml::from_str(&content)
            .map_err(|e| SonifyError::Config(format!("{}: {e}", path.display())))
    }
}

/// Read and validate an instruction file.
pub fn load_instructions(path: &Path) -> Result<Vec<Instruction>, SonifyError> {
    parse_instructions(&load_specs(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(trigger: &str, value: Scalar, modifier: &str, amount: Option<Scalar>) -> InstructionSpec {
        InstructionSpec {
            trigger: trigger.into(),
            operator: None,
            value,
            modifier: modifier.into(),
            mode: ChangeMode::Set,
            amount,
        }
    }

    fn text(s: &str) -> Scalar {
        Scalar::Text(s.into())
    }

    #[test]
    fn category_trigger_with_octave_modifier() {
        let i = spec("category", text("noun"), "octave", Some(Scalar::Number(3.0)))
            .validate(0)
            .unwrap();
        assert_eq!(i.trigger, Trigger::CategoryMatch(WordClass::Noun));
        assert_eq!(i.modifier, SoundModifier::Octave(3.0));
    }

    #[test]
    fn length_trigger_needs_operator() {
        let mut s = spec("length", Scalar::Number(5.0), "tempo", Some(Scalar::Number(200.0)));
        assert!(matches!(
            s.validate(4),
            Err(SonifyError::InvalidInstruction { index: 4, .. })
        ));
        s.operator = Some(">".into());
        assert_eq!(
            s.validate(4).unwrap().trigger,
            Trigger::LengthCompare {
                op: Comparison::Greater,
                length: 5
            }
        );
    }

    #[test]
    fn unparsable_amount_is_rejected() {
        let err = spec("category", text("verb"), "tempo", Some(text("fast")))
            .validate(2)
            .unwrap_err();
        assert_eq!(err.to_string(), "instruction #2: cannot parse 'fast' as a number");
    }

    #[test]
    fn numeric_text_is_accepted() {
        let i = spec("code", text("5"), "volume", Some(text(" 9000 ")))
            .validate(0)
            .unwrap();
        assert_eq!(i.trigger, Trigger::CodeEquals(5));
        assert_eq!(i.modifier, SoundModifier::Volume(9000.0));
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(spec("category", text("conjunction"), "tempo", Some(Scalar::Number(1.0)))
            .validate(0)
            .is_err());
        assert!(spec("literal", text("."), "note", Some(text("H9")))
            .validate(0)
            .is_err());
        assert!(spec("literal", text("."), "wobble", None).validate(0).is_err());
        assert!(spec("colour", text("red"), "tempo", Some(Scalar::Number(1.0)))
            .validate(0)
            .is_err());
    }

    #[test]
    fn named_values_resolve() {
        let i = spec("literal", text("!"), "percussion", Some(text("crash cymbal 1")))
            .validate(0)
            .unwrap();
        assert_eq!(i.modifier, SoundModifier::Percussion(49));

        let i = spec("sentiment", text("negative"), "note", Some(text("Eb4")))
            .validate(0)
            .unwrap();
        assert_eq!(i.trigger, Trigger::SentimentPolarity(Polarity::Negative));
        assert_eq!(i.modifier, SoundModifier::NoteByName(63));
    }

    #[test]
    fn chord_modifiers_default_to_zero() {
        let i = spec("sentiment", text("positive"), "major", None)
            .validate(0)
            .unwrap();
        assert_eq!(i.modifier, SoundModifier::MajorChord(0.0));
    }

    #[test]
    fn parse_reports_first_bad_index() {
        let specs = vec![
            spec("category", text("noun"), "tempo", Some(Scalar::Number(100.0))),
            spec("category", text("noun"), "tempo", Some(text("x"))),
        ];
        let err = parse_instructions(&specs).unwrap_err();
        assert!(matches!(err, SonifyError::InvalidInstruction { index: 1, .. }));
    }

    #[test]
    fn yaml_specs_deserialize() {
        let yaml = r#"
- trigger: category
  value: noun
  modifier: octave
  mode: add
  amount: 1
- trigger: word-length
  operator: less
  value: 3
  modifier: instrument
  amount: Violin
"#;
        let specs: Vec<InstructionSpec> = serde_yaml::from_str(yaml).unwrap();
        let parsed = parse_instructions(&specs).unwrap();
        assert_eq!(parsed[0].mode, ChangeMode::Add);
        assert_eq!(parsed[1].modifier, SoundModifier::Instrument("Violin".into()));
    }
}
