//! In-memory recording driver
//!
//! Drives no hardware at all: every call is appended to a command log that
//! tests and dry-run tooling can inspect. Commands are recorded regardless
//! of init state, so a caller that emits while the driver is down shows up
//! in the log instead of being silently dropped.

use tracing::trace;

use crate::{Command, DeviceTarget, DriverError, LedDriver, NamedKey, Rgb};

/// How `init` should behave, for exercising degraded paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitBehavior {
    #[default]
    Succeed,
    NativeUnavailable,
    InitFailed,
}

/// [`LedDriver`] implementation that records commands instead of driving
/// hardware.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    init_behavior: InitBehavior,
    initialized: bool,
    commands: Vec<Command>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Driver whose `init` fails the given way.
    pub fn failing(behavior: InitBehavior) -> Self {
        Self {
            init_behavior: behavior,
            ..Default::default()
        }
    }

    /// Change how future `init` calls behave, for scripting link loss and
    /// recovery.
    pub fn set_init_behavior(&mut self, behavior: InitBehavior) {
        self.init_behavior = behavior;
    }

    /// Recorded command log, oldest first.
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Drain the command log.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.commands)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn push(&mut self, command: Command) {
        trace!(%command, "led command");
        self.commands.push(command);
    }
}

impl LedDriver for RecordingDriver {
    fn init(&mut self) -> Result<(), DriverError> {
        match self.init_behavior {
            InitBehavior::Succeed => {
                self.initialized = true;
                self.push(Command::Init);
                Ok(())
            }
            InitBehavior::NativeUnavailable => Err(DriverError::NativeUnavailable(
                "recording driver configured without a native library".into(),
            )),
            InitBehavior::InitFailed => Err(DriverError::InitFailed(
                "recording driver configured to refuse initialization".into(),
            )),
        }
    }

    fn shutdown(&mut self) {
        self.initialized = false;
        self.push(Command::Shutdown);
    }

    fn set_target(&mut self, target: DeviceTarget) {
        self.push(Command::SetTarget(target));
    }

    fn set_all(&mut self, color: Rgb) {
        self.push(Command::SolidAll(color));
    }

    fn set_key(&mut self, scan_code: u16, color: Rgb) {
        self.push(Command::SolidKey { scan_code, color });
    }

    fn set_named_key(&mut self, key: NamedKey, color: Rgb) {
        self.push(Command::SolidNamed { key, color });
    }

    fn flash_all(&mut self, color: Rgb, interval_ms: u32) {
        self.push(Command::FlashAll { color, interval_ms });
    }

    fn pulse_all(&mut self, color: Rgb, interval_ms: u32) {
        self.push(Command::PulseAll { color, interval_ms });
    }

    fn flash_key(&mut self, scan_code: u16, color: Rgb, interval_ms: u32) {
        self.push(Command::FlashKey {
            scan_code,
            color,
            interval_ms,
        });
    }

    fn pulse_key(&mut self, scan_code: u16, from: Rgb, to: Rgb, interval_ms: u32) {
        self.push(Command::PulseKey {
            scan_code,
            from,
            to,
            interval_ms,
        });
    }

    fn save_lighting(&mut self) {
        self.push(Command::SaveLighting);
    }

    fn restore_lighting(&mut self) {
        self.push(Command::RestoreLighting);
    }

    fn stop_effects(&mut self) {
        self.push(Command::StopEffects);
    }
}
