//! WordNet database reader.
//!
//! Reads a WordNet 3.x `dict/` directory. The `index.<pos>` files are loaded
//! up front; synset records in `data.<pos>` are read on demand by byte
//! offset. A word's codes are the lexicographer file numbers of all its
//! synsets.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::{normalise, LexicalLookup};
use crate::error::{SonifyError, Stage};
use crate::unit::PartOfSpeech;

fn file_suffix(pos: PartOfSpeech) -> &'static str {
    match pos {
        PartOfSpeech::Noun => "noun",
        PartOfSpeech::Verb => "verb",
        PartOfSpeech::Adjective => "adj",
        PartOfSpeech::Adverb => "adv",
    }
}

const PARTS_OF_SPEECH: [PartOfSpeech; 4] = [
    PartOfSpeech::Noun,
    PartOfSpeech::Verb,
    PartOfSpeech::Adjective,
    PartOfSpeech::Adverb,
];

/// Synset offsets from one `index.<pos>` line.
fn parse_index_line(line: &str) -> Option<(String, Vec<u64>)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let lemma = fields.first()?.to_string();
    let synset_count: usize = fields.get(2)?.parse().ok()?;
    let pointer_count: usize = fields.get(3)?.parse().ok()?;
    // pointer symbols, then sense_cnt and tagsense_cnt
    let first_offset = 4 + pointer_count + 2;
    let offsets = fields
        .get(first_offset..first_offset + synset_count)?
        .iter()
        .map(|o| o.parse().ok())
        .collect::<Option<Vec<u64>>>()?;
    Some((lemma, offsets))
}

/// Lexicographer file number from one `data.<pos>` record.
fn parse_data_line(line: &str) -> Option<u32> {
    line.split_whitespace().nth(1)?.parse().ok()
}

/// A WordNet dictionary on disk.
#[derive(Debug)]
pub struct WordNetLexicon {
    dir: PathBuf,
    index: HashMap<(PartOfSpeech, String), Vec<u64>>,
}

impl WordNetLexicon {
    /// Load the index files from `dir`. Parts of speech whose index file is
    /// missing simply have no entries.
    pub fn open(dir: &Path) -> Result<Self, SonifyError> {
        if !dir.is_dir() {
            return Err(SonifyError::Config(format!(
                "{} is not a WordNet dict directory",
                dir.display()
            )));
        }
        let mut index = HashMap::new();
        for pos in PARTS_OF_SPEECH {
            let path = dir.join(format!("index.{}", file_suffix(pos)));
            let file = match File::open(&path) {
                Ok(f) => f,
                Err(e) => {
                    warn!("skipping {}: {e}", path.display());
                    continue;
                }
            };
            let mut count = 0usize;
            for (n, line) in BufReader::new(file).lines().enumerate() {
                let line = line?;
                // license header lines start with a space
                if line.starts_with(' ') || line.is_empty() {
                    continue;
                }
                match parse_index_line(&line) {
                    Some((lemma, offsets)) => {
                        index.insert((pos, lemma), offsets);
                        count += 1;
                    }
                    None => warn!("{}:{}: unreadable index line", path.display(), n + 1),
                }
            }
            debug!("loaded {count} {} lemmas", file_suffix(pos));
        }
        Ok(Self {
            dir: dir.to_path_buf(),
            index,
        })
    }

    /// Number of indexed (lemma, part of speech) pairs.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn lex_file_number(reader: &mut BufReader<File>, offset: u64) -> Result<Option<u32>, SonifyError> {
        reader.seek(SeekFrom::Start(offset))?;
        let mut line = String::new();
        reader.read_line(&mut line)?;
        Ok(parse_data_line(&line))
    }
}

impl LexicalLookup for WordNetLexicon {
    fn lookup(&self, lemma: &str, pos: PartOfSpeech) -> Result<BTreeSet<u32>, SonifyError> {
        let Some(offsets) = self.index.get(&(pos, normalise(lemma))) else {
            return Ok(BTreeSet::new());
        };
        let path = self.dir.join(format!("data.{}", file_suffix(pos)));
        let file = File::open(&path).map_err(|e| {
            SonifyError::collaborator(Stage::LexicalLookup, format!("{}: {e}", path.display()))
        })?;
        let mut reader = BufReader::new(file);
        let mut codes = BTreeSet::new();
        for &offset in offsets {
            match Self::lex_file_number(&mut reader, offset)? {
                Some(code) => {
                    codes.insert(code);
                }
                None => warn!("{}: no synset at offset {offset}", path.display()),
            }
        }
        Ok(codes)
    }
}
