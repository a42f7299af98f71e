//! # glyph-core
//!
//! Reversible text-to-glyph codec for hex text and bitmap matrices.
//!
//! ```text
//! Source:              Glyphs:
//! 1010                 🟢🔴🟢
//! 10100000       →     🚦🟢🔴🟢🔴🔴🔴🔴🔴
//! FF                   🚦🟡⚪💡🟡⚪
//! ```
//!
//! - **Codebook**: prefix-free mapping from hex digits, newline and the
//!   separator marker to sequences of one to three glyphs.
//! - **Matrix codec**: row-wise encode/decode with trailing-zero
//!   compaction of bitmap rows and width reconstruction on decode.
//!
//! Both operations are pure functions of the input and an immutable
//! codebook, so a codebook can be shared freely between threads.

pub mod codebook;
pub mod codec;
pub mod glyph;

pub use codebook::{
    Codebook, CodebookError, CodebookTable, MAX_SEQUENCE_LEN, NEWLINE, SEPARATOR,
};
pub use codec::{
    decode, encode, reference_row, restore_width, CodecConfig, DecodeError, MatrixCodec,
    ResiduePolicy, RowKind, Transcoded,
};
pub use glyph::Glyph;
