//! Typed command model for the driver boundary
//!
//! Every [`LedDriver`](crate::LedDriver) entry point has a corresponding
//! `Command` variant, so a recording implementation can keep a replayable
//! log of what the controller asked for.

use std::fmt;

use crate::{DeviceTarget, NamedKey, Rgb};

/// One driver call, as recorded by [`RecordingDriver`](crate::RecordingDriver).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Init,
    Shutdown,
    SetTarget(DeviceTarget),
    SolidAll(Rgb),
    SolidKey {
        scan_code: u16,
        color: Rgb,
    },
    SolidNamed {
        key: NamedKey,
        color: Rgb,
    },
    FlashAll {
        color: Rgb,
        interval_ms: u32,
    },
    PulseAll {
        color: Rgb,
        interval_ms: u32,
    },
    FlashKey {
        scan_code: u16,
        color: Rgb,
        interval_ms: u32,
    },
    PulseKey {
        scan_code: u16,
        from: Rgb,
        to: Rgb,
        interval_ms: u32,
    },
    SaveLighting,
    RestoreLighting,
    StopEffects,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Shutdown => write!(f, "shutdown"),
            Self::SetTarget(target) => write!(f, "target {:?}", target),
            Self::SolidAll(color) => write!(f, "solid all {}", color),
            Self::SolidKey { scan_code, color } => {
                write!(f, "solid key 0x{:02X} {}", scan_code, color)
            }
            Self::SolidNamed { key, color } => write!(f, "solid key {} {}", key, color),
            Self::FlashAll { color, interval_ms } => {
                write!(f, "flash all {} every {}ms", color, interval_ms)
            }
            Self::PulseAll { color, interval_ms } => {
                write!(f, "pulse all {} every {}ms", color, interval_ms)
            }
            Self::FlashKey {
                scan_code,
                color,
                interval_ms,
            } => write!(f, "flash key 0x{:02X} {} every {}ms", scan_code, color, interval_ms),
            Self::PulseKey {
                scan_code,
                from,
                to,
                interval_ms,
            } => write!(
                f,
                "pulse key 0x{:02X} {} -> {} every {}ms",
                scan_code, from, to, interval_ms
            ),
            Self::SaveLighting => write!(f, "save lighting"),
            Self::RestoreLighting => write!(f, "restore lighting"),
            Self::StopEffects => write!(f, "stop effects"),
        }
    }
}
