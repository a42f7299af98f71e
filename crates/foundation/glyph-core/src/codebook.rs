//! Codebook
//!
//! Bidirectional mapping between source characters and glyph sequences.
//!
//! ```text
//! 0 🔴      4 🔵🔵    8 ⚪🟢    C 🟡🔴
//! 1 🟢      5 🔵⚪    9 ⚪🔵    D 🟡🟢
//! 2 🔵🔴    6 🔵🟡    A ⚪⚪    E 🟡🔵
//! 3 🔵🟢    7 ⚪🔴    B ⚪🟡    F 🟡⚪
//!
//! \n 🚦     | 💡
//! ```
//!
//! The table is prefix-free: `0` and `1` take the single glyphs 🔴 and 🟢,
//! and every other digit starts with 🔵, ⚪ or 🟡. The incremental decoder
//! depends on this. The newline and separator markers own glyphs that no
//! other entry uses, so rows and characters can be split on them directly.
//!
//! Lookups never fail: characters outside the table pass through unchanged.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::glyph::{is_joining, sequence_len, Glyph};

/// Row break character on the source side
pub const NEWLINE: char = '\n';

/// Separator character on the source side
pub const SEPARATOR: char = '|';

/// Longest glyph sequence a single character may map to
pub const MAX_SEQUENCE_LEN: usize = 3;

const STANDARD_ENTRIES: &[(char, &str)] = &[
    ('0', "🔴"),
    ('1', "🟢"),
    ('2', "🔵🔴"),
    ('3', "🔵🟢"),
    ('4', "🔵🔵"),
    ('5', "🔵⚪"),
    ('6', "🔵🟡"),
    ('7', "⚪🔴"),
    ('8', "⚪🟢"),
    ('9', "⚪🔵"),
    ('A', "⚪⚪"),
    ('B', "⚪🟡"),
    ('C', "🟡🔴"),
    ('D', "🟡🟢"),
    ('E', "🟡🔵"),
    ('F', "🟡⚪"),
    (NEWLINE, "🚦"),
    (SEPARATOR, "💡"),
];

lazy_static! {
    static ref STANDARD: Codebook = Codebook::assemble(
        STANDARD_ENTRIES
            .iter()
            .map(|(c, s)| (*c, s.to_string()))
            .collect(),
        NEWLINE,
        SEPARATOR,
    );
}

/// Errors raised while building a codebook from a table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodebookError {
    #[error("Invalid symbol {0:?}: expected exactly one character")]
    InvalidSymbol(String),

    #[error("Sequence for {symbol:?} contains joining code point {code_point:?}")]
    JoiningCodePoint { symbol: char, code_point: char },

    #[error("Sequence for {symbol:?} has {len} glyphs, expected 1 to {max}", max = MAX_SEQUENCE_LEN)]
    SequenceLength { symbol: char, len: usize },

    #[error("Missing entry for marker {0:?}")]
    MissingEntry(char),

    #[error("Newline and separator are both {0:?}")]
    MarkersCollide(char),

    #[error("Sequence {sequence} is shared by {first:?} and {second:?}")]
    DuplicateSequence {
        sequence: String,
        first: char,
        second: char,
    },

    #[error("Sequence {prefix} ({short:?}) is a prefix of {sequence} ({long:?})")]
    PrefixConflict {
        prefix: String,
        short: char,
        sequence: String,
        long: char,
    },

    #[error("Glyph {glyph} of the {role} marker is also used by {other:?}")]
    ReservedGlyphShared {
        role: &'static str,
        glyph: char,
        other: char,
    },
}

/// Serializable literal table a codebook is built from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodebookTable {
    /// Character that separates rows in source text
    pub newline: char,
    /// Character used as the textual separator marker
    pub separator: char,
    /// Source character (as a one-character string) to glyph sequence
    pub entries: BTreeMap<String, String>,
}

impl CodebookTable {
    /// The built-in table
    pub fn standard() -> Self {
        Codebook::standard().to_table()
    }
}

/// Immutable character/glyph-sequence mapping with its derived lookups
#[derive(Debug, Clone)]
pub struct Codebook {
    forward: BTreeMap<char, String>,
    reverse: HashMap<String, char>,
    /// Every non-empty proper prefix of every sequence
    prefixes: HashSet<String>,
    alphabet: BTreeSet<Glyph>,
    newline: char,
    separator: char,
    newline_seq: String,
    separator_seq: String,
}

impl Codebook {
    /// The process-wide standard codebook
    pub fn standard() -> &'static Codebook {
        &STANDARD
    }

    /// Build and validate a codebook from a literal table
    pub fn from_table(table: &CodebookTable) -> Result<Self, CodebookError> {
        let mut forward = BTreeMap::new();
        for (key, sequence) in &table.entries {
            let mut chars = key.chars();
            let symbol = match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(CodebookError::InvalidSymbol(key.clone())),
            };
            forward.insert(symbol, sequence.clone());
        }

        let codebook = Self::assemble(forward, table.newline, table.separator);
        codebook.validate()?;
        Ok(codebook)
    }

    fn assemble(forward: BTreeMap<char, String>, newline: char, separator: char) -> Self {
        let reverse = forward.iter().map(|(c, s)| (s.clone(), *c)).collect();

        let mut prefixes = HashSet::new();
        for sequence in forward.values() {
            let ends = sequence.char_indices().map(|(i, _)| i).skip(1);
            for end in ends {
                prefixes.insert(sequence[..end].to_string());
            }
        }

        let alphabet = forward
            .values()
            .flat_map(|s| s.chars())
            .map(Glyph)
            .collect();

        let newline_seq = forward.get(&newline).cloned().unwrap_or_default();
        let separator_seq = forward.get(&separator).cloned().unwrap_or_default();

        Self {
            forward,
            reverse,
            prefixes,
            alphabet,
            newline,
            separator,
            newline_seq,
            separator_seq,
        }
    }

    /// Check every structural invariant of the table
    pub fn validate(&self) -> Result<(), CodebookError> {
        if self.newline == self.separator {
            return Err(CodebookError::MarkersCollide(self.newline));
        }

        for (symbol, sequence) in &self.forward {
            if let Some(code_point) = sequence.chars().find(|c| is_joining(*c)) {
                return Err(CodebookError::JoiningCodePoint {
                    symbol: *symbol,
                    code_point,
                });
            }
            let len = sequence_len(sequence);
            if !(1..=MAX_SEQUENCE_LEN).contains(&len) {
                return Err(CodebookError::SequenceLength {
                    symbol: *symbol,
                    len,
                });
            }
        }

        for marker in [self.newline, self.separator] {
            if !self.forward.contains_key(&marker) {
                return Err(CodebookError::MissingEntry(marker));
            }
        }

        let mut seen: HashMap<&str, char> = HashMap::new();
        for (symbol, sequence) in &self.forward {
            if let Some(first) = seen.insert(sequence.as_str(), *symbol) {
                return Err(CodebookError::DuplicateSequence {
                    sequence: sequence.clone(),
                    first,
                    second: *symbol,
                });
            }
        }

        for (short, prefix) in &self.forward {
            for (long, sequence) in &self.forward {
                if short != long && sequence != prefix && sequence.starts_with(prefix.as_str()) {
                    return Err(CodebookError::PrefixConflict {
                        prefix: prefix.clone(),
                        short: *short,
                        sequence: sequence.clone(),
                        long: *long,
                    });
                }
            }
        }

        for (role, marker, sequence) in [
            ("newline", self.newline, &self.newline_seq),
            ("separator", self.separator, &self.separator_seq),
        ] {
            for glyph in sequence.chars() {
                let shared = self
                    .forward
                    .iter()
                    .find(|(other, s)| **other != marker && s.contains(glyph));
                if let Some((other, _)) = shared {
                    return Err(CodebookError::ReservedGlyphShared {
                        role,
                        glyph,
                        other: *other,
                    });
                }
            }
        }

        Ok(())
    }

    /// Export back to a serializable table
    pub fn to_table(&self) -> CodebookTable {
        CodebookTable {
            newline: self.newline,
            separator: self.separator,
            entries: self
                .forward
                .iter()
                .map(|(c, s)| (c.to_string(), s.clone()))
                .collect(),
        }
    }

    /// Sequence for `c`, folding hex digits to uppercase
    pub fn sequence_for(&self, c: char) -> Option<&str> {
        self.forward
            .get(&c)
            .or_else(|| {
                if c.is_ascii_hexdigit() {
                    self.forward.get(&c.to_ascii_uppercase())
                } else {
                    None
                }
            })
            .map(String::as_str)
    }

    /// Encode one character; unmapped characters pass through unchanged
    pub fn encode_char(&self, c: char) -> String {
        let mut out = String::new();
        self.push_encoded(c, &mut out);
        out
    }

    pub(crate) fn push_encoded(&self, c: char, out: &mut String) {
        match self.sequence_for(c) {
            Some(sequence) => out.push_str(sequence),
            None => out.push(c),
        }
    }

    /// Exact reverse lookup
    pub fn lookup(&self, sequence: &str) -> Option<char> {
        self.reverse.get(sequence).copied()
    }

    /// Decode one sequence; unknown sequences pass through unchanged
    pub fn decode_sequence(&self, sequence: &str) -> String {
        match self.lookup(sequence) {
            Some(c) => c.to_string(),
            None => sequence.to_string(),
        }
    }

    /// True if `buffer` is a proper prefix of some sequence
    pub fn is_prefix(&self, buffer: &str) -> bool {
        self.prefixes.contains(buffer)
    }

    pub fn contains_glyph(&self, c: char) -> bool {
        self.alphabet.contains(&Glyph(c))
    }

    /// True iff every character of `s` belongs to the alphabet
    pub fn is_allowed_glyph_string(&self, s: &str) -> bool {
        s.chars().all(|c| self.contains_glyph(c))
    }

    /// First character outside the alphabet, with its byte offset
    pub fn first_disallowed(&self, s: &str) -> Option<(usize, char)> {
        s.char_indices().find(|(_, c)| !self.contains_glyph(*c))
    }

    /// Remove every character outside the alphabet
    pub fn strip_disallowed(&self, s: &str) -> String {
        s.chars().filter(|c| self.contains_glyph(*c)).collect()
    }

    /// Number of alphabet glyphs in `s`
    pub fn count_glyphs(&self, s: &str) -> usize {
        s.chars().filter(|c| self.contains_glyph(*c)).count()
    }

    pub fn alphabet(&self) -> impl Iterator<Item = Glyph> + '_ {
        self.alphabet.iter().copied()
    }

    pub fn newline_char(&self) -> char {
        self.newline
    }

    pub fn separator_char(&self) -> char {
        self.separator
    }

    pub fn newline_sequence(&self) -> &str {
        &self.newline_seq
    }

    pub fn separator_sequence(&self) -> &str {
        &self.separator_seq
    }

    /// Entries in character order
    pub fn entries(&self) -> impl Iterator<Item = (char, &str)> + '_ {
        self.forward.iter().map(|(c, s)| (*c, s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }
}
