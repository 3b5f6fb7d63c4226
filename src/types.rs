//! The action taxonomy dispatched from the ten-item menu.
//!
//! Replaces a duck-typed "action data" grab-bag with a tagged union: each
//! variant carries only the typed fields its action actually needs, instead
//! of one shared struct with fields that are meaningless for most actions.

use std::path::PathBuf;

/// One fully-specified menu action, ready to hand to
/// [`crate::ui::menu`]'s dispatcher. Built up from a sequence of prompts;
/// never constructed partially filled.
pub enum Action {
    Encrypt { input: PathBuf, output: PathBuf, comments: String, keyfiles: Vec<PathBuf>, passphrase: String, time_cost: u32 },
    Decrypt { input: PathBuf, output: PathBuf, keyfiles: Vec<PathBuf>, passphrase: String, time_cost: u32 },
    Embed { input: PathBuf, container: PathBuf, start_pos: u64 },
    Extract { container: PathBuf, output: PathBuf, start_pos: u64, end_pos: u64 },
    EncryptEmbed { input: PathBuf, container: PathBuf, start_pos: u64, comments: String, keyfiles: Vec<PathBuf>, passphrase: String, time_cost: u32 },
    ExtractDecrypt { container: PathBuf, output: PathBuf, start_pos: u64, end_pos: u64, keyfiles: Vec<PathBuf>, passphrase: String, time_cost: u32 },
    CreateRandom { output: PathBuf, size: u64 },
    OverwriteRandom { path: PathBuf, start_pos: u64, end_pos: u64 },
}

impl Action {
    /// Short label used in progress-bar/log messages.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Encrypt { .. } => "Encrypting",
            Self::Decrypt { .. } => "Decrypting",
            Self::Embed { .. } => "Embedding",
            Self::Extract { .. } => "Extracting",
            Self::EncryptEmbed { .. } => "Encrypting & embedding",
            Self::ExtractDecrypt { .. } => "Extracting & decrypting",
            Self::CreateRandom { .. } => "Writing random bytes",
            Self::OverwriteRandom { .. } => "Overwriting with random bytes",
        }
    }
}
