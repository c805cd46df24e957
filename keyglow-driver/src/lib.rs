//! Vendor LED driver boundary for keyglow
//!
//! This crate defines the opaque interface between the lighting controller
//! and a vendor per-key RGB SDK. Concrete bindings (FFI against a native
//! lighting library) live outside this workspace; what ships here is the
//! trait plus an in-memory recording implementation used by tests and dry
//! runs.

pub mod command;
pub mod error;
pub mod keys;
pub mod led;
pub mod recording;

pub use command::Command;
pub use error::DriverError;
pub use keys::NamedKey;
pub use led::Rgb;
pub use recording::{InitBehavior, RecordingDriver};

/// Lighting device class selector.
///
/// Per-key animations require [`DeviceTarget::PerKeyRgb`]; the other targets
/// exist so a driver can fan commands out to simpler devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceTarget {
    /// Single-zone devices that only carry brightness.
    Monochrome,
    /// Single-zone full-color devices.
    FullColor,
    /// Devices with individually addressable keys.
    PerKeyRgb,
    /// Every connected device class at once.
    All,
}

/// Per-key RGB lighting driver.
///
/// Everything except `init` is fire-and-forget: the vendor SDKs this models
/// report delivery failures asynchronously, if at all, so the controller
/// treats command submission as best-effort. Implementations must tolerate
/// calls after `shutdown` (and before a successful `init`) by ignoring them
/// or recording them for inspection.
pub trait LedDriver {
    /// Bring up the native SDK connection.
    ///
    /// Distinguishes a missing native library
    /// ([`DriverError::NativeUnavailable`]) from the library loading but
    /// refusing to start ([`DriverError::InitFailed`]); callers degrade the
    /// same way in both cases and only the diagnostics differ.
    fn init(&mut self) -> Result<(), DriverError>;

    /// Tear down the SDK connection. Idempotent.
    fn shutdown(&mut self);

    /// Select which device class subsequent commands address.
    fn set_target(&mut self, target: DeviceTarget);

    /// Set every key on the device to one color.
    fn set_all(&mut self, color: Rgb);

    /// Set a single key addressed by hardware scan code.
    fn set_key(&mut self, scan_code: u16, color: Rgb);

    /// Set a single key addressed by symbolic name.
    ///
    /// Some keys (the function row in particular) are only reachable this
    /// way; most keys are only reachable by scan code.
    fn set_named_key(&mut self, key: NamedKey, color: Rgb);

    /// Flash the whole device between `color` and black until stopped.
    fn flash_all(&mut self, color: Rgb, interval_ms: u32);

    /// Pulse the whole device through `color` until stopped.
    fn pulse_all(&mut self, color: Rgb, interval_ms: u32);

    /// Flash a single key between `color` and black until stopped.
    fn flash_key(&mut self, scan_code: u16, color: Rgb, interval_ms: u32);

    /// Pulse a single key between `from` and `to` until stopped.
    fn pulse_key(&mut self, scan_code: u16, from: Rgb, to: Rgb, interval_ms: u32);

    /// Snapshot the current lighting state on the device.
    fn save_lighting(&mut self);

    /// Restore the last saved lighting snapshot.
    fn restore_lighting(&mut self);

    /// Cancel any running flash/pulse effects.
    fn stop_effects(&mut self);
}
