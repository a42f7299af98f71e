//! # glyph-session
//!
//! Everything the editor around the codec needs, as plain state:
//!
//! - **keymap**: two-handed keyboard layout that types glyphs directly
//! - **session**: current mode, input, parallel channels and last result
//! - **draft**: one persisted draft string per mode
//!
//! ```text
//!   left hand           right hand
//!   Q💡 W🟢 E🚦         I💡 O🟢 P🚦
//!   A🔴 S⚪ D🔵 F🟡    J🟡 K🔴 L⚪ Ñ🔵
//! ```
//!
//! The session never calls the codec on its own: every operation that
//! changes input takes the [`glyph_core::MatrixCodec`] to run.

pub mod draft;
pub mod keymap;
pub mod session;

pub use draft::DraftStore;
pub use keymap::{glyph_for_key, keys_for_glyph, Hand, KeyBinding, KEY_BINDINGS};
pub use session::{sanitize, InputMode, Mode, Session};

/// Result type for glyph-session operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in glyph-session
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("No input channel {0} (parallel input has channels 0 and 1)")]
    InvalidChannel(usize),
}
