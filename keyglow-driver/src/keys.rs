//! Symbolic key names understood by the vendor SDK
//!
//! Scan codes cover most of the board, but the top row is only addressable
//! through the SDK's symbolic names on several device generations. The set
//! here is that row.

use std::fmt;

/// Key addressed by symbolic name rather than scan code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Escape,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    PrintScreen,
    ScrollLock,
    PauseBreak,
}

impl NamedKey {
    /// Get the display name for this key
    pub fn name(&self) -> &'static str {
        match self {
            Self::Escape => "Esc",
            Self::F1 => "F1",
            Self::F2 => "F2",
            Self::F3 => "F3",
            Self::F4 => "F4",
            Self::F5 => "F5",
            Self::F6 => "F6",
            Self::F7 => "F7",
            Self::F8 => "F8",
            Self::F9 => "F9",
            Self::F10 => "F10",
            Self::F11 => "F11",
            Self::F12 => "F12",
            Self::PrintScreen => "PrtSc",
            Self::ScrollLock => "ScrLk",
            Self::PauseBreak => "Pause",
        }
    }
}

impl fmt::Display for NamedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
