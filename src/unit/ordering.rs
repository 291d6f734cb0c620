//! Letter orderings — the 26-letter tables that give each character its code.

use serde::{Deserialize, Serialize};

/// A frequency-ranked ordering of the alphabet. Each gives a different
/// character to per-character sonification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LetterOrdering {
    /// Mayzner's letter frequencies.
    #[default]
    Mayzner,
    /// The typesetters' "etaoin shrdlu" order.
    Typesetter,
    /// Letter frequency in Oxford dictionary headwords.
    Oxford,
}

impl LetterOrdering {
    pub const ALL: [LetterOrdering; 3] = [
        LetterOrdering::Mayzner,
        LetterOrdering::Typesetter,
        LetterOrdering::Oxford,
    ];

    pub fn table(self) -> &'static str {
        match self {
            LetterOrdering::Mayzner => "ETAOINSRHLDCUMFPGWYBVKXJQZ",
            LetterOrdering::Typesetter => "ETAONRISHDLFCMUGYPWBVKXJQZ",
            LetterOrdering::Oxford => "EARIOTNSLCUDPMHGBFYWKVXZJQ",
        }
    }

    /// 1-based position of `ch` in this ordering, ignoring case. `None` for
    /// anything outside A–Z.
    pub fn position(self, ch: char) -> Option<u32> {
        let upper = ch.to_ascii_uppercase();
        self.table()
            .chars()
            .position(|c| c == upper)
            .map(|i| i as u32 + 1)
    }
}
