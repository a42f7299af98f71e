//! Glyph alphabet
//!
//! A glyph is one unit of the encoded output and always a single code
//! point, so a glyph is a `char` and glyph counts are counts of alphabet
//! characters. Code points that join onto a neighbour (variation selectors,
//! zero-width joiners, skin-tone modifiers, combining marks) would turn one
//! visible symbol into several glyphs and are never glyphs themselves.
//!
//! ```text
//! data:      🔴 🟢 🔵 ⚪ 🟡
//! newline:   🚦
//! separator: 💡
//! ```

/// A single symbol of the encoded alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Glyph(pub char);

impl Glyph {
    pub const RED: Glyph = Glyph('🔴');
    pub const GREEN: Glyph = Glyph('🟢');
    pub const BLUE: Glyph = Glyph('🔵');
    pub const WHITE: Glyph = Glyph('⚪');
    pub const YELLOW: Glyph = Glyph('🟡');
    /// Row break marker
    pub const SIGNAL: Glyph = Glyph('🚦');
    /// Character separator inside textual rows
    pub const BULB: Glyph = Glyph('💡');

    pub fn as_char(&self) -> char {
        self.0
    }

    /// Short human name, used by the codebook listing
    pub fn name(&self) -> &'static str {
        match self.0 {
            '🔴' => "red",
            '🟢' => "green",
            '🔵' => "blue",
            '⚪' => "white",
            '🟡' => "yellow",
            '🚦' => "signal",
            '💡' => "bulb",
            _ => "custom",
        }
    }
}

impl std::fmt::Display for Glyph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of glyphs in a sequence string
pub fn sequence_len(sequence: &str) -> usize {
    sequence.chars().count()
}

/// True for code points that only modify the symbol before or after them
pub fn is_joining(c: char) -> bool {
    matches!(
        c as u32,
        0x0300..=0x036F     // combining diacritical marks
            | 0x1AB0..=0x1AFF
            | 0x1DC0..=0x1DFF
            | 0x200C..=0x200D // zero-width non-joiner / joiner
            | 0x20D0..=0x20FF // combining marks for symbols, keycap
            | 0xFE00..=0xFE0F // variation selectors
            | 0xFE20..=0xFE2F
            | 0x1F1E6..=0x1F1FF // regional indicators pair into flags
            | 0x1F3FB..=0x1F3FF // skin tone modifiers
            | 0xE0020..=0xE007F // tags
            | 0xE0100..=0xE01EF
    )
}
