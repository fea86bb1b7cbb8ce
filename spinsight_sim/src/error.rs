use std::fmt::Display;
use thiserror::Error;

/// Delimiter of the simulation block of a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// The line opening the block.
    Start,
    /// The line closing the block.
    End,
}

impl Marker {
    /// The literal marker text.
    pub const fn text(self) -> &'static str {
        match self {
            Marker::Start => "===start Sim===",
            Marker::End => "===end Sim===",
        }
    }
}

impl Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// Errors from reading simulation formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SimError {
    /// A marker of the simulation block is missing.
    #[error("simulation block not found: no `{0}` line")]
    BlockNotFound(Marker),
}
