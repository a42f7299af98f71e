//! Editor session
//!
//! Explicit state for one editor: which direction it runs, what has been
//! typed, and the last codec result. Every change to the input re-runs the
//! codec and, when a [`DraftStore`] is attached, persists the draft.
//!
//! ```text
//! Encode: input (hex + newlines) ──encode──► output (glyphs)
//! Decode: input (glyphs)         ──decode──► output (text)
//!         or channel 0 🚦 channel 1   (parallel input)
//! ```

use glyph_core::{Codebook, MatrixCodec, Transcoded};

use crate::draft::DraftStore;
use crate::keymap::glyph_for_key;
use crate::{Error, Result};

/// Direction the session runs the codec in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Encode,
    Decode,
}

impl Mode {
    /// Name used for draft storage
    pub fn key(&self) -> &'static str {
        match self {
            Mode::Encode => "encode",
            Mode::Decode => "decode",
        }
    }
}

/// How glyph keystrokes are collected in decode mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// One input string
    #[default]
    Serial,
    /// Two rows, one per hand
    Parallel,
}

/// Clean raw input for `mode`
///
/// Encode keeps hex digits and the newline character, uppercased. Decode
/// keeps only glyphs of the codebook alphabet.
pub fn sanitize(mode: Mode, value: &str, codebook: &Codebook) -> String {
    match mode {
        Mode::Encode => value
            .chars()
            .filter(|c| c.is_ascii_hexdigit() || *c == codebook.newline_char())
            .map(|c| c.to_ascii_uppercase())
            .collect(),
        Mode::Decode => codebook.strip_disallowed(value),
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    mode: Mode,
    input_mode: InputMode,
    input: String,
    channels: [String; 2],
    result: Transcoded,
    store: Option<DraftStore>,
}

impl Session {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            input_mode: InputMode::default(),
            input: String::new(),
            channels: [String::new(), String::new()],
            result: Transcoded::default(),
            store: None,
        }
    }

    /// Session backed by a draft store, restoring the draft for `mode`
    pub fn with_store(mode: Mode, store: DraftStore, codec: &MatrixCodec) -> Result<Self> {
        let mut session = Self::new(mode);
        session.input = store.load(mode)?.unwrap_or_default();
        session.store = Some(store);
        session.process(codec);
        Ok(session)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn channels(&self) -> &[String; 2] {
        &self.channels
    }

    pub fn result(&self) -> &Transcoded {
        &self.result
    }

    pub fn output(&self) -> &str {
        &self.result.output
    }

    /// Text the codec runs on in the current mode
    pub fn source(&self, codebook: &Codebook) -> String {
        match (self.mode, self.input_mode) {
            (Mode::Decode, InputMode::Parallel) => {
                self.channels.join(codebook.newline_sequence())
            }
            _ => self.input.clone(),
        }
    }

    /// Glyph text a copy action would export: the output when encoding,
    /// the typed glyphs when decoding
    pub fn copy_target(&self) -> &str {
        match self.mode {
            Mode::Encode => &self.result.output,
            Mode::Decode => &self.input,
        }
    }

    /// Re-run the codec on the current source
    pub fn process(&mut self, codec: &MatrixCodec) {
        let source = self.source(codec.codebook());
        self.result = match self.mode {
            Mode::Encode => codec.encode(&source),
            Mode::Decode => codec.decode(&source),
        };
    }

    /// Replace the serial input
    pub fn set_input(&mut self, value: &str, codec: &MatrixCodec) -> Result<()> {
        self.input = sanitize(self.mode, value, codec.codebook());
        self.process(codec);
        self.persist()
    }

    /// Replace one parallel channel
    pub fn set_channel(&mut self, index: usize, value: &str, codec: &MatrixCodec) -> Result<()> {
        let channel = self
            .channels
            .get_mut(index)
            .ok_or(Error::InvalidChannel(index))?;
        *channel = codec.codebook().strip_disallowed(value);
        self.process(codec);
        Ok(())
    }

    pub fn set_input_mode(&mut self, input_mode: InputMode, codec: &MatrixCodec) {
        self.input_mode = input_mode;
        self.process(codec);
    }

    /// Type a key; returns whether it produced a glyph
    ///
    /// Only decode mode takes glyph keystrokes. In parallel input the hand
    /// that owns the key picks the channel.
    pub fn press_key(&mut self, key: char, codec: &MatrixCodec) -> Result<bool> {
        if self.mode != Mode::Decode {
            return Ok(false);
        }
        let Some(binding) = glyph_for_key(key) else {
            return Ok(false);
        };

        match self.input_mode {
            InputMode::Serial => {
                self.input.push(binding.glyph.as_char());
                self.process(codec);
                self.persist()?;
            }
            InputMode::Parallel => {
                self.channels[binding.hand.channel()].push(binding.glyph.as_char());
                self.process(codec);
            }
        }
        Ok(true)
    }

    /// Switch direction, restoring the draft saved for the new mode
    pub fn switch_mode(&mut self, mode: Mode, codec: &MatrixCodec) -> Result<()> {
        if mode == self.mode {
            return Ok(());
        }
        self.mode = mode;
        self.input = match &self.store {
            Some(store) => store.load(mode)?.unwrap_or_default(),
            None => String::new(),
        };
        self.process(codec);
        tracing::debug!(mode = mode.key(), "switched mode");
        Ok(())
    }

    /// Clear input, channels and result, and drop the saved draft
    pub fn reset(&mut self) -> Result<()> {
        self.input.clear();
        self.channels = [String::new(), String::new()];
        self.result = Transcoded::default();
        if let Some(store) = &self.store {
            store.clear(self.mode)?;
        }
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        match &self.store {
            Some(store) => store.save(self.mode, &self.input),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> MatrixCodec<'static> {
        MatrixCodec::new(Codebook::standard())
    }

    #[test]
    fn test_encode_sanitizes_and_processes() {
        let codec = codec();
        let mut session = Session::new(Mode::Encode);
        session.set_input("ff zz\n10", &codec).unwrap();

        assert_eq!(session.input(), "FF\n10");
        assert_eq!(session.output(), "🟡⚪💡🟡⚪🚦🟢🔴");
        assert_eq!(session.result().before, 5);
        assert_eq!(session.copy_target(), session.output());
    }

    #[test]
    fn test_decode_strips_foreign_characters() {
        let codec = codec();
        let mut session = Session::new(Mode::Decode);
        session.set_input("🟡⚪ 💡x🟡⚪", &codec).unwrap();

        assert_eq!(session.input(), "🟡⚪💡🟡⚪");
        assert_eq!(session.output(), "FF");
        assert_eq!(session.copy_target(), "🟡⚪💡🟡⚪");
    }

    #[test]
    fn test_keys_ignored_in_encode_mode() {
        let codec = codec();
        let mut session = Session::new(Mode::Encode);
        assert!(!session.press_key('a', &codec).unwrap());
        assert_eq!(session.input(), "");
    }

    #[test]
    fn test_serial_keys() {
        let codec = codec();
        let mut session = Session::new(Mode::Decode);
        for key in "wakjx".chars() {
            session.press_key(key, &codec).unwrap();
        }
        // w a k -> 🟢🔴🔴, j -> 🟡 pending, x unbound
        assert_eq!(session.input(), "🟢🔴🔴🟡");
        assert_eq!(session.output(), "");

        session.press_key('l', &codec).unwrap();
        assert_eq!(session.output(), "100F");
    }

    #[test]
    fn test_parallel_keys_split_by_hand() {
        let codec = codec();
        let mut session = Session::new(Mode::Decode);
        session.set_input_mode(InputMode::Parallel, &codec);

        // left: 1 0 1 0, right: 1 0 1
        for key in "waokwoa".chars() {
            session.press_key(key, &codec).unwrap();
        }
        assert_eq!(session.channels()[0], "🟢🔴🟢🔴");
        assert_eq!(session.channels()[1], "🟢🔴🟢");
        assert_eq!(session.output(), "1010\n1010");
    }

    #[test]
    fn test_set_channel_bounds() {
        let codec = codec();
        let mut session = Session::new(Mode::Decode);
        assert!(matches!(
            session.set_channel(2, "🟢", &codec),
            Err(Error::InvalidChannel(2))
        ));
        session.set_input_mode(InputMode::Parallel, &codec);
        session.set_channel(1, "🟢🟢", &codec).unwrap();
        // the empty left row is not a bitmap row and stays empty
        assert_eq!(session.output(), "\n11");
    }

    #[test]
    fn test_reset() {
        let codec = codec();
        let mut session = Session::new(Mode::Encode);
        session.set_input("ABC", &codec).unwrap();
        session.reset().unwrap();
        assert_eq!(session.input(), "");
        assert_eq!(session.result(), &Transcoded::default());
    }

    #[test]
    fn test_drafts_follow_mode() {
        let dir = tempfile::tempdir().unwrap();
        let store = DraftStore::at_path(dir.path().join("drafts.json"));
        let codec = codec();

        let mut session = Session::with_store(Mode::Encode, store.clone(), &codec).unwrap();
        session.set_input("C0DE", &codec).unwrap();

        session.switch_mode(Mode::Decode, &codec).unwrap();
        assert_eq!(session.input(), "");
        session.press_key('w', &codec).unwrap();

        session.switch_mode(Mode::Encode, &codec).unwrap();
        assert_eq!(session.input(), "C0DE");
        assert_eq!(session.output(), codec.encode("C0DE").output);

        // a fresh session picks the saved draft back up
        let restored = Session::with_store(Mode::Decode, store.clone(), &codec).unwrap();
        assert_eq!(restored.input(), "🟢");
        assert_eq!(restored.output(), "1");

        session.reset().unwrap();
        assert_eq!(store.load(Mode::Encode).unwrap(), None);
    }

    #[test]
    fn test_mode_keys() {
        assert_eq!(Mode::Encode.key(), "encode");
        assert_eq!(Mode::Decode.key(), "decode");
    }
}
