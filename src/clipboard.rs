use std::io::{self, Write};
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::ClipboardError;

/// How long a copied address stays marked in the table.
pub const COPY_FEEDBACK: Duration = Duration::from_secs(2);

pub trait ClipboardSink {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// Copies through the terminal with an OSC 52 escape, which also works over SSH
/// and inside tmux when passthrough is enabled.
pub struct Osc52Clipboard<W: Write> {
    out: W,
}

impl Osc52Clipboard<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Osc52Clipboard<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ClipboardSink for Osc52Clipboard<W> {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        if text.is_empty() {
            return Ok(());
        }
        let encoded = STANDARD.encode(text.as_bytes());
        write!(self.out, "\x1b]52;c;{encoded}\x07")?;
        self.out.flush()?;
        Ok(())
    }
}

/// The single address currently shown as copied, and until when.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopiedIndicator {
    pub address: String,
    pub until: Instant,
}

impl CopiedIndicator {
    pub fn new(address: impl Into<String>, now: Instant) -> Self {
        Self {
            address: address.into(),
            until: now + COPY_FEEDBACK,
        }
    }

    pub fn is_active(&self, now: Instant) -> bool {
        now < self.until
    }

    pub fn matches(&self, address: &str, now: Instant) -> bool {
        self.is_active(now) && self.address == address
    }
}
