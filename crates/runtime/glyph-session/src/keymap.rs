//! Keyboard glyph input
//!
//! Each hand gets every glyph on keys near its home row, so glyph text can
//! be typed without an emoji picker. In parallel input the hand also picks
//! the channel the glyph goes to.

use std::collections::HashMap;

use glyph_core::Glyph;
use lazy_static::lazy_static;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    /// Parallel input channel fed by this hand
    pub fn channel(&self) -> usize {
        match self {
            Hand::Left => 0,
            Hand::Right => 1,
        }
    }
}

/// One key of the layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    /// Lowercase key character
    pub key: char,
    pub glyph: Glyph,
    pub hand: Hand,
}

const fn bind(key: char, glyph: Glyph, hand: Hand) -> KeyBinding {
    KeyBinding { key, glyph, hand }
}

pub const KEY_BINDINGS: &[KeyBinding] = &[
    bind('q', Glyph::BULB, Hand::Left),
    bind('w', Glyph::GREEN, Hand::Left),
    bind('e', Glyph::SIGNAL, Hand::Left),
    bind('a', Glyph::RED, Hand::Left),
    bind('s', Glyph::WHITE, Hand::Left),
    bind('d', Glyph::BLUE, Hand::Left),
    bind('f', Glyph::YELLOW, Hand::Left),
    bind('i', Glyph::BULB, Hand::Right),
    bind('o', Glyph::GREEN, Hand::Right),
    bind('p', Glyph::SIGNAL, Hand::Right),
    bind('j', Glyph::YELLOW, Hand::Right),
    bind('k', Glyph::RED, Hand::Right),
    bind('l', Glyph::WHITE, Hand::Right),
    bind('ñ', Glyph::BLUE, Hand::Right),
];

lazy_static! {
    static ref KEY_TO_BINDING: HashMap<char, KeyBinding> =
        KEY_BINDINGS.iter().map(|b| (b.key, *b)).collect();
}

/// Binding for a key, case-insensitive
pub fn glyph_for_key(key: char) -> Option<KeyBinding> {
    let lower = key.to_lowercase().next()?;
    KEY_TO_BINDING.get(&lower).copied()
}

/// Keys that type `glyph`, left hand first
pub fn keys_for_glyph(glyph: Glyph) -> Vec<char> {
    KEY_BINDINGS
        .iter()
        .filter(|b| b.glyph == glyph)
        .map(|b| b.key)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyph_core::Codebook;

    #[test]
    fn test_case_insensitive() {
        assert_eq!(glyph_for_key('a').map(|b| b.glyph), Some(Glyph::RED));
        assert_eq!(glyph_for_key('A').map(|b| b.glyph), Some(Glyph::RED));
        assert_eq!(glyph_for_key('Ñ').map(|b| b.glyph), Some(Glyph::BLUE));
        assert_eq!(glyph_for_key('z'), None);
    }

    #[test]
    fn test_hands() {
        assert_eq!(glyph_for_key('s').map(|b| b.hand), Some(Hand::Left));
        assert_eq!(glyph_for_key('l').map(|b| b.hand), Some(Hand::Right));
        assert_eq!(Hand::Right.channel(), 1);
    }

    #[test]
    fn test_each_hand_covers_the_alphabet() {
        for glyph in Codebook::standard().alphabet() {
            let keys = keys_for_glyph(glyph);
            assert_eq!(keys.len(), 2, "{glyph} should have one key per hand");
            let hands: Vec<Hand> = keys
                .iter()
                .filter_map(|k| glyph_for_key(*k))
                .map(|b| b.hand)
                .collect();
            assert!(hands.contains(&Hand::Left) && hands.contains(&Hand::Right));
        }
    }
}
