//! Key identity shared between the host boundary and the device session.
//!
//! The host reports key bindings as keysyms (GLFW-style key codes) plus an
//! optional hardware scan code it resolved for the current platform. The
//! device side addresses keys either by scan code or, for the top row, by
//! the driver's symbolic [`NamedKey`] names. This module holds the keysym
//! constants the crate needs and the keysym-to-named-key table.

use keyglow_driver::NamedKey;

// ---------------------------------------------------------------------------
// Keysym constants (GLFW key code values)
// ---------------------------------------------------------------------------

pub const KEY_SPACE: i32 = 32;
pub const KEY_1: i32 = 49;
pub const KEY_2: i32 = 50;
pub const KEY_3: i32 = 51;
pub const KEY_4: i32 = 52;
pub const KEY_5: i32 = 53;
pub const KEY_6: i32 = 54;
pub const KEY_7: i32 = 55;
pub const KEY_8: i32 = 56;
pub const KEY_9: i32 = 57;
pub const KEY_A: i32 = 65;
pub const KEY_D: i32 = 68;
pub const KEY_E: i32 = 69;
pub const KEY_F: i32 = 70;
pub const KEY_Q: i32 = 81;
pub const KEY_S: i32 = 83;
pub const KEY_T: i32 = 84;
pub const KEY_W: i32 = 87;
pub const KEY_ESCAPE: i32 = 256;
pub const KEY_TAB: i32 = 258;
pub const KEY_SCROLL_LOCK: i32 = 281;
pub const KEY_PRINT_SCREEN: i32 = 283;
pub const KEY_PAUSE: i32 = 284;
pub const KEY_F1: i32 = 290;
pub const KEY_F2: i32 = 291;
pub const KEY_F3: i32 = 292;
pub const KEY_F4: i32 = 293;
pub const KEY_F5: i32 = 294;
pub const KEY_F6: i32 = 295;
pub const KEY_F7: i32 = 296;
pub const KEY_F8: i32 = 297;
pub const KEY_F9: i32 = 298;
pub const KEY_F10: i32 = 299;
pub const KEY_F11: i32 = 300;
pub const KEY_F12: i32 = 301;
pub const KEY_LEFT_SHIFT: i32 = 340;
pub const KEY_LEFT_CONTROL: i32 = 341;

/// Map a keysym to the driver's symbolic key name, for the keys that have
/// one. Everything outside the top row returns `None` and is addressed by
/// scan code only.
pub fn named_key_for_keysym(keysym: i32) -> Option<NamedKey> {
    match keysym {
        KEY_ESCAPE => Some(NamedKey::Escape),
        KEY_F1 => Some(NamedKey::F1),
        KEY_F2 => Some(NamedKey::F2),
        KEY_F3 => Some(NamedKey::F3),
        KEY_F4 => Some(NamedKey::F4),
        KEY_F5 => Some(NamedKey::F5),
        KEY_F6 => Some(NamedKey::F6),
        KEY_F7 => Some(NamedKey::F7),
        KEY_F8 => Some(NamedKey::F8),
        KEY_F9 => Some(NamedKey::F9),
        KEY_F10 => Some(NamedKey::F10),
        KEY_F11 => Some(NamedKey::F11),
        KEY_F12 => Some(NamedKey::F12),
        KEY_PRINT_SCREEN => Some(NamedKey::PrintScreen),
        KEY_SCROLL_LOCK => Some(NamedKey::ScrollLock),
        KEY_PAUSE => Some(NamedKey::PauseBreak),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Key bindings as reported by the host
// ---------------------------------------------------------------------------

/// Physical input a host binding is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundKey {
    /// Keyboard key. `scan_code` is the hardware code the host resolved for
    /// this keysym on the current platform, when it could resolve one.
    Key { keysym: i32, scan_code: Option<u16> },
    /// Mouse button. Not addressable on the keyboard.
    Mouse(u8),
    /// Binding left unassigned by the user.
    Unbound,
}

impl BoundKey {
    /// Scan code for the device's per-key path, if this input has one.
    pub fn scan_code(&self) -> Option<u16> {
        match self {
            Self::Key { scan_code, .. } => *scan_code,
            _ => None,
        }
    }

    /// Symbolic name for the device's named-key path, if this input has one.
    pub fn named_key(&self) -> Option<NamedKey> {
        match self {
            Self::Key { keysym, .. } => named_key_for_keysym(*keysym),
            _ => None,
        }
    }
}

/// Both device addressing paths of one binding, resolved independently. A
/// binding may carry either path, both, or neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedKey {
    pub scan_code: Option<u16>,
    pub named: Option<NamedKey>,
}

impl ResolvedKey {
    pub fn is_unresolved(&self) -> bool {
        self.scan_code.is_none() && self.named.is_none()
    }
}

/// One host key binding: what it is bound to, and the host-side category
/// label that decides its base color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub category: String,
    pub key: BoundKey,
}

impl KeyBinding {
    pub fn key(category: impl Into<String>, keysym: i32, scan_code: Option<u16>) -> Self {
        Self {
            category: category.into(),
            key: BoundKey::Key { keysym, scan_code },
        }
    }

    pub fn mouse(category: impl Into<String>, button: u8) -> Self {
        Self {
            category: category.into(),
            key: BoundKey::Mouse(button),
        }
    }

    pub fn unbound(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            key: BoundKey::Unbound,
        }
    }

    /// Resolve both device addressing paths at once.
    pub fn resolve(&self) -> ResolvedKey {
        ResolvedKey {
            scan_code: self.key.scan_code(),
            named: self.key.named_key(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
