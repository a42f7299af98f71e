//! Matrix Codec
//!
//! Row-by-row encode/decode over a [`Codebook`].
//!
//! ## Encode
//!
//! ```text
//! 1010          🟢🔴🟢                 binary row, trailing zeros stripped
//! 10100000  →   🚦🟢🔴🟢🔴🔴🔴🔴🔴     reference row, kept at full width
//! FF            🚦🟡⚪💡🟡⚪           textual row, characters joined by 💡
//! ```
//!
//! Binary rows (only `0`/`1`) are bitmap rows. All of them except the
//! reference row (the widest, then the one with the longest trailing run
//! of zeros, then the first) lose their trailing zeros before encoding.
//! Binary rows are concatenated glyph sequences; textual rows put the
//! separator sequence between characters.
//!
//! ## Decode
//!
//! Rows are split on the newline sequence. Rows holding a separator are
//! split on it and each piece is looked up exactly. Other rows go through
//! the incremental matcher, which relies on the codebook being prefix-free.
//! Every decoded binary row is then right-padded with zeros to the widest
//! one, which is the reference row when the input came from [`encode`].
//!
//! Input holding anything outside the glyph alphabet decodes to nothing.
//! Glyphs that do not form a sequence are handled by [`ResiduePolicy`].

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::codebook::Codebook;

lazy_static! {
    static ref BINARY_ROW: Regex = Regex::new(r"^[01]*$").unwrap();
    static ref PIXEL_ROW: Regex = Regex::new(r"^[01]+$").unwrap();
}

/// What decode does with glyphs that do not complete a sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResiduePolicy {
    /// Fail the whole decode, same as a disallowed glyph
    #[default]
    Reject,
    /// Copy the glyphs to the output unchanged
    PassThrough,
}

/// Codec settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    pub residue: ResiduePolicy,
}

/// Result of one encode or decode call
///
/// Units differ per direction: encode counts source characters before and
/// glyphs after, decode counts glyphs before and characters after.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcoded {
    pub output: String,
    pub before: usize,
    pub after: usize,
}

impl Transcoded {
    pub fn stats(&self) -> String {
        format!("{} → {}", self.before, self.after)
    }
}

/// Reasons a strict decode fails
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Character {glyph:?} at byte {offset} is not in the glyph alphabet")]
    DisallowedGlyph { glyph: char, offset: usize },

    #[error("Row {row}: {residue} is not a codebook sequence")]
    UnmatchedResidue { row: usize, residue: String },

    #[error("Row {row}: unpaired separator")]
    OrphanSeparator { row: usize },
}

/// Classification of a source row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Binary,
    Textual,
}

impl RowKind {
    pub fn classify(row: &str) -> Self {
        if BINARY_ROW.is_match(row) {
            RowKind::Binary
        } else {
            RowKind::Textual
        }
    }
}

fn trailing_zeros(row: &str) -> usize {
    row.len() - row.trim_end_matches('0').len()
}

/// Index of the binary row that keeps its full width during encode
pub fn reference_row(rows: &[&str]) -> Option<usize> {
    let mut best: Option<(usize, (usize, usize))> = None;
    for (index, row) in rows.iter().enumerate() {
        if RowKind::classify(row) != RowKind::Binary {
            continue;
        }
        let key = (row.len(), trailing_zeros(row));
        match best {
            Some((_, current)) if current >= key => {}
            _ => best = Some((index, key)),
        }
    }
    best.map(|(index, _)| index)
}

/// Strip trailing zeros; an all-zero row keeps one zero so it survives decode
fn compact(row: &str) -> &str {
    let trimmed = row.trim_end_matches('0');
    if trimmed.is_empty() && !row.is_empty() {
        &row[..1]
    } else {
        trimmed
    }
}

/// Right-pad every binary row with zeros to the widest binary row
pub fn restore_width(rows: &mut [String]) {
    let width = rows
        .iter()
        .filter(|row| PIXEL_ROW.is_match(row))
        .map(String::len)
        .max();

    if let Some(width) = width {
        for row in rows.iter_mut() {
            if PIXEL_ROW.is_match(row) {
                while row.len() < width {
                    row.push('0');
                }
            }
        }
    }
}

enum Step {
    Pending,
    Emit(char),
    /// Buffer is neither a sequence nor a prefix of one
    Dead,
}

/// Incremental matcher for rows without separators
struct Matcher<'c> {
    codebook: &'c Codebook,
    buffer: String,
}

impl<'c> Matcher<'c> {
    fn new(codebook: &'c Codebook) -> Self {
        Self {
            codebook,
            buffer: String::new(),
        }
    }

    fn push(&mut self, glyph: char) -> Step {
        self.buffer.push(glyph);
        if let Some(c) = self.codebook.lookup(&self.buffer) {
            self.buffer.clear();
            Step::Emit(c)
        } else if self.codebook.is_prefix(&self.buffer) {
            Step::Pending
        } else {
            Step::Dead
        }
    }

    /// Emit the first glyph of a dead buffer verbatim and rescan the rest
    fn shed(&mut self, out: &mut String) {
        if self.buffer.is_empty() {
            return;
        }
        out.push(self.buffer.remove(0));
        let rest = std::mem::take(&mut self.buffer);
        for glyph in rest.chars() {
            match self.push(glyph) {
                Step::Emit(c) => out.push(c),
                Step::Pending => {}
                Step::Dead => self.shed(out),
            }
        }
    }

    fn finish(self) -> String {
        self.buffer
    }
}

/// Encoder/decoder bound to one codebook
#[derive(Debug, Clone, Copy)]
pub struct MatrixCodec<'a> {
    codebook: &'a Codebook,
    config: CodecConfig,
}

impl<'a> MatrixCodec<'a> {
    pub fn new(codebook: &'a Codebook) -> Self {
        Self::with_config(codebook, CodecConfig::default())
    }

    pub fn with_config(codebook: &'a Codebook, config: CodecConfig) -> Self {
        Self { codebook, config }
    }

    pub fn codebook(&self) -> &'a Codebook {
        self.codebook
    }

    pub fn config(&self) -> CodecConfig {
        self.config
    }

    /// Encode source text into glyph text
    pub fn encode(&self, text: &str) -> Transcoded {
        let rows: Vec<&str> = text.split(self.codebook.newline_char()).collect();
        let reference = reference_row(&rows);
        if let Some(index) = reference {
            tracing::debug!(row = index, width = rows[index].len(), "reference row");
        }

        let encoded: Vec<String> = rows
            .iter()
            .enumerate()
            .map(|(index, row)| match RowKind::classify(row) {
                RowKind::Binary if reference == Some(index) => self.encode_binary(row),
                RowKind::Binary => self.encode_binary(compact(row)),
                RowKind::Textual => self.encode_textual(row),
            })
            .collect();

        let output = encoded.join(self.codebook.newline_sequence());
        Transcoded {
            before: text.chars().count(),
            after: self.codebook.count_glyphs(&output),
            output,
        }
    }

    fn encode_binary(&self, row: &str) -> String {
        let mut out = String::new();
        for c in row.chars() {
            self.codebook.push_encoded(c, &mut out);
        }
        out
    }

    fn encode_textual(&self, row: &str) -> String {
        let separator = self.codebook.separator_sequence();
        let mut out = String::new();
        for (i, c) in row.chars().enumerate() {
            if i > 0 {
                out.push_str(separator);
            }
            self.codebook.push_encoded(c, &mut out);
        }
        out
    }

    /// Decode glyph text; any failure yields an empty output
    pub fn decode(&self, text: &str) -> Transcoded {
        match self.try_decode(text) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!(error = %e, "decode rejected");
                Transcoded {
                    output: String::new(),
                    before: self.codebook.count_glyphs(text),
                    after: 0,
                }
            }
        }
    }

    /// Decode glyph text, reporting why it was rejected
    pub fn try_decode(&self, text: &str) -> Result<Transcoded, DecodeError> {
        if let Some((offset, glyph)) = self.codebook.first_disallowed(text) {
            return Err(DecodeError::DisallowedGlyph { glyph, offset });
        }

        let separator = self.codebook.separator_sequence();
        let mut rows = Vec::new();
        for (index, row) in text.split(self.codebook.newline_sequence()).enumerate() {
            let mut out = String::new();
            if row.contains(separator) {
                self.decode_textual(index, row, &mut out)?;
            } else {
                self.decode_incremental(index, row, &mut out)?;
            }
            rows.push(out);
        }

        restore_width(&mut rows);

        let newline = self.codebook.newline_char();
        let mut output = rows.join(newline.to_string().as_str());
        if output.ends_with(newline) {
            output.pop();
        }

        Ok(Transcoded {
            before: self.codebook.count_glyphs(text),
            after: output.chars().count(),
            output,
        })
    }

    fn decode_textual(
        &self,
        row: usize,
        glyphs: &str,
        out: &mut String,
    ) -> Result<(), DecodeError> {
        // A separator character encodes to the separator sequence itself,
        // so each one shows up as two empty pieces.
        let mut empty_run = 0;
        for piece in glyphs.split(self.codebook.separator_sequence()) {
            if piece.is_empty() {
                empty_run += 1;
                continue;
            }
            self.flush_separators(row, &mut empty_run, out)?;
            match self.codebook.lookup(piece) {
                Some(c) => out.push(c),
                None => {
                    self.check_residue(row, piece)?;
                    out.push_str(piece);
                }
            }
        }
        self.flush_separators(row, &mut empty_run, out)
    }

    fn flush_separators(
        &self,
        row: usize,
        empty_run: &mut usize,
        out: &mut String,
    ) -> Result<(), DecodeError> {
        for _ in 0..*empty_run / 2 {
            out.push(self.codebook.separator_char());
        }
        if *empty_run % 2 == 1 {
            match self.config.residue {
                ResiduePolicy::Reject => return Err(DecodeError::OrphanSeparator { row }),
                ResiduePolicy::PassThrough => {
                    tracing::warn!(row, "unpaired separator passed through");
                    out.push_str(self.codebook.separator_sequence());
                }
            }
        }
        *empty_run = 0;
        Ok(())
    }

    fn decode_incremental(
        &self,
        row: usize,
        glyphs: &str,
        out: &mut String,
    ) -> Result<(), DecodeError> {
        let mut matcher = Matcher::new(self.codebook);
        for glyph in glyphs.chars() {
            match matcher.push(glyph) {
                Step::Emit(c) => out.push(c),
                Step::Pending => {}
                Step::Dead => {
                    self.check_residue(row, &matcher.buffer)?;
                    matcher.shed(out);
                }
            }
        }

        let rest = matcher.finish();
        if !rest.is_empty() {
            self.check_residue(row, &rest)?;
            out.push_str(&rest);
        }
        Ok(())
    }

    fn check_residue(&self, row: usize, residue: &str) -> Result<(), DecodeError> {
        match self.config.residue {
            ResiduePolicy::Reject => Err(DecodeError::UnmatchedResidue {
                row,
                residue: residue.to_string(),
            }),
            ResiduePolicy::PassThrough => {
                tracing::warn!(row, residue, "unmatched glyphs passed through");
                Ok(())
            }
        }
    }
}

/// Encode with default settings
pub fn encode(text: &str, codebook: &Codebook) -> Transcoded {
    MatrixCodec::new(codebook).encode(text)
}

/// Decode with default settings
pub fn decode(text: &str, codebook: &Codebook) -> Transcoded {
    MatrixCodec::new(codebook).decode(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> &'static Codebook {
        Codebook::standard()
    }

    fn lenient() -> MatrixCodec<'static> {
        MatrixCodec::with_config(
            standard(),
            CodecConfig {
                residue: ResiduePolicy::PassThrough,
            },
        )
    }

    #[test]
    fn test_classify() {
        assert_eq!(RowKind::classify("0101"), RowKind::Binary);
        assert_eq!(RowKind::classify(""), RowKind::Binary);
        assert_eq!(RowKind::classify("0121"), RowKind::Textual);
        assert_eq!(RowKind::classify("FF"), RowKind::Textual);
    }

    #[test]
    fn test_reference_row_prefers_width_then_zeros_then_first() {
        assert_eq!(reference_row(&["1010", "10100000"]), Some(1));
        assert_eq!(reference_row(&["1100", "1000", "0111"]), Some(1));
        assert_eq!(reference_row(&["1000", "0100", "1000"]), Some(0));
        assert_eq!(reference_row(&["FFFFFFFF", "11"]), Some(1));
        assert_eq!(reference_row(&["AB"]), None);
    }

    #[test]
    fn test_compact() {
        assert_eq!(compact("1010"), "101");
        assert_eq!(compact("10100000"), "101");
        assert_eq!(compact("0000"), "0");
        assert_eq!(compact(""), "");
        assert_eq!(compact("0111"), "0111");
    }

    #[test]
    fn test_empty_input() {
        let encoded = encode("", standard());
        assert_eq!(encoded, Transcoded::default());

        let decoded = decode("", standard());
        assert_eq!(decoded, Transcoded::default());
    }

    #[test]
    fn test_hex_row() {
        let encoded = encode("FF", standard());
        assert_eq!(encoded.output, "🟡⚪💡🟡⚪");
        assert_eq!(encoded.before, 2);
        assert_eq!(encoded.after, 5);

        let decoded = decode(&encoded.output, standard());
        assert_eq!(decoded.output, "FF");
        assert_eq!(decoded.before, 5);
        assert_eq!(decoded.after, 2);
    }

    #[test]
    fn test_bitmap_rows_restore_reference_width() {
        let encoded = encode("1010\n10100000", standard());
        assert_eq!(encoded.output, "🟢🔴🟢🚦🟢🔴🟢🔴🔴🔴🔴🔴");
        assert_eq!(encoded.before, 13);
        assert_eq!(encoded.after, 12);

        // the first row was 4 wide; its width is not recoverable
        let decoded = decode(&encoded.output, standard());
        assert_eq!(decoded.output, "10100000\n10100000");
    }

    #[test]
    fn test_equal_width_bitmap_roundtrip() {
        let source = "11000000\n10100000\n00000000\n11111111";
        let encoded = encode(source, standard());
        assert_eq!(decode(&encoded.output, standard()).output, source);
    }

    #[test]
    fn test_mixed_document() {
        let source = "C0FFEE\n1100\n1000\n7|9";
        let encoded = encode(source, standard());
        let decoded = decode(&encoded.output, standard());
        assert_eq!(decoded.output, source);
    }

    #[test]
    fn test_separator_characters_roundtrip() {
        for source in ["|", "||", "A|B", "|A", "A||", "1|0"] {
            let encoded = encode(source, standard());
            assert_eq!(decode(&encoded.output, standard()).output, source, "{source}");
        }
    }

    #[test]
    fn test_lowercase_hex_decodes_uppercase() {
        let encoded = encode("beef", standard());
        assert_eq!(decode(&encoded.output, standard()).output, "BEEF");
    }

    #[test]
    fn test_trailing_newline_trimmed() {
        let encoded = encode("1\n", standard());
        assert_eq!(encoded.output, "🟢🚦");
        assert_eq!(decode(&encoded.output, standard()).output, "1");

        let encoded = encode("AB\n\n", standard());
        assert_eq!(decode(&encoded.output, standard()).output, "AB\n");
    }

    #[test]
    fn test_unmapped_characters_pass_through_encode() {
        let encoded = encode("A?", standard());
        assert_eq!(encoded.output, "⚪⚪💡?");
        assert_eq!(encoded.after, 3);
    }

    #[test]
    fn test_disallowed_glyph_rejects_everything() {
        let codec = MatrixCodec::new(standard());
        let err = codec.try_decode("🟢🔴x🟢").unwrap_err();
        assert_eq!(err, DecodeError::DisallowedGlyph { glyph: 'x', offset: 8 });

        let decoded = codec.decode("🟢🔴x🟢");
        assert_eq!(decoded.output, "");
        assert_eq!(decoded.before, 3);
        assert_eq!(decoded.after, 0);

        // lenient residue handling does not relax the alphabet check
        assert_eq!(lenient().decode("🟢\n").output, "");
    }

    #[test]
    fn test_trailing_residue_policy() {
        let strict = MatrixCodec::new(standard());
        assert_eq!(
            strict.try_decode("🟢🔵").unwrap_err(),
            DecodeError::UnmatchedResidue {
                row: 0,
                residue: "🔵".to_string(),
            }
        );
        assert_eq!(strict.decode("🟢🔵").output, "");

        assert_eq!(lenient().decode("🟢🔵").output, "1🔵");
    }

    #[test]
    fn test_dead_buffer_resynchronises() {
        let strict = MatrixCodec::new(standard());
        assert_eq!(
            strict.try_decode("🟡🟡🔴").unwrap_err(),
            DecodeError::UnmatchedResidue {
                row: 0,
                residue: "🟡🟡".to_string(),
            }
        );

        // first 🟡 leaks, the second starts C
        assert_eq!(lenient().decode("🟡🟡🔴").output, "🟡C");
    }

    #[test]
    fn test_textual_piece_residue() {
        let strict = MatrixCodec::new(standard());
        assert!(strict.try_decode("⚪⚪💡🔴🟢").is_err());
        assert_eq!(lenient().decode("⚪⚪💡🔴🟢").output, "A🔴🟢");
    }

    #[test]
    fn test_orphan_separator() {
        let strict = MatrixCodec::new(standard());
        assert_eq!(
            strict.try_decode("⚪⚪💡💡⚪⚪").unwrap_err(),
            DecodeError::OrphanSeparator { row: 0 }
        );
        // the extra separator glyph survives instead of vanishing
        let decoded = lenient().decode("⚪⚪💡💡⚪⚪");
        assert_eq!(decoded.output, "A💡A");
        assert_eq!(decoded.after, 3);

        assert_eq!(lenient().decode("⚪⚪💡").output, "A💡");
    }

    #[test]
    fn test_restore_width_leaves_textual_rows() {
        let mut rows = vec![
            "1".to_string(),
            "AB".to_string(),
            "".to_string(),
            "0110".to_string(),
        ];
        restore_width(&mut rows);
        assert_eq!(rows, vec!["1000", "AB", "", "0110"]);
    }

    #[test]
    fn test_stats() {
        let encoded = encode("FF", standard());
        assert_eq!(encoded.stats(), "2 → 5");
    }
}
