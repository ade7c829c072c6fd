//! Clipboard writes via the OSC 52 escape sequence.
//!
//! Works over SSH and in most modern terminals; the terminal owns the
//! clipboard, so there is no read side.

use std::io::{self, Write};

use base64::Engine;

/// `ESC ] 52 ; c ; <base64> BEL`
pub fn osc52_sequence(text: &str) -> String {
    let encoded = base64::engine::general_purpose::STANDARD.encode(text.as_bytes());
    format!("\x1b]52;c;{encoded}\x07")
}

/// Copy `text` to the system clipboard, bypassing the ratatui backend buffer.
pub fn copy(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(osc52_sequence(text).as_bytes())?;
    stdout.flush()
}
