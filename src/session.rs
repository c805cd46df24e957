//! Device session: lifecycle and command emission for one LED device.
//!
//! [`LightSession`] wraps a [`LedDriver`] and tracks whether the device link
//! is up. While the session is inactive every color-emitting call is a no-op,
//! so callers never need to guard their own emission paths. The session also
//! remembers the last solid color applied per scan code; per-key pulses fade
//! from that remembered color, and the effect engine captures its working
//! key set from it.

use std::collections::HashMap;

use tracing::{debug, error, info, warn};

use keyglow_driver::{DeviceTarget, DriverError, LedDriver, NamedKey, Rgb};

use crate::config::{
    ConfigManager, CATEGORY_DEAD, CATEGORY_INVENTORY, CATEGORY_SELECTED, CATEGORY_UNKNOWN,
};
use crate::host::HostAdapter;
use crate::keymap::{KeyBinding, ResolvedKey};

/// Callback fired after an inactive-to-active restart.
pub type RestartCallback = Box<dyn FnMut() -> Result<(), Box<dyn std::error::Error>>>;

/// One lighting session against a per-key RGB device.
pub struct LightSession<D: LedDriver> {
    driver: D,
    active: bool,
    generation: u64,
    key_colors: HashMap<u16, Rgb>,
    restart_callbacks: Vec<RestartCallback>,
}

impl<D: LedDriver> LightSession<D> {
    /// Wrap a driver without touching the device. The session starts out
    /// inactive; [`restart`](Self::restart) brings it up.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            active: false,
            generation: 0,
            key_colors: HashMap::new(),
            restart_callbacks: Vec::new(),
        }
    }

    /// Wrap a driver and bring the device up immediately. A failed init is
    /// logged and leaves the session inactive rather than failing
    /// construction, so a later [`restart`](Self::restart) can recover.
    pub fn open(driver: D) -> Self {
        let mut session = Self::new(driver);
        session.start_device(false);
        session
    }

    fn start_device(&mut self, silent: bool) -> bool {
        match self.driver.init() {
            Ok(()) => {}
            Err(DriverError::NativeUnavailable(reason)) => {
                if !silent {
                    warn!(%reason, "LED driver bindings unavailable");
                }
                return false;
            }
            Err(DriverError::InitFailed(reason)) => {
                if !silent {
                    error!(%reason, "LED driver failed to initialize");
                }
                return false;
            }
        }

        self.driver.set_target(DeviceTarget::PerKeyRgb);
        self.active = true;
        self.generation = self.generation.wrapping_add(1);
        self.set_solid_color(Rgb::BLACK);
        true
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Count of successful device starts. Consumers compare this across
    /// calls to notice restarts they did not trigger themselves.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Last solid color applied per scan code while the session was active.
    pub fn key_colors(&self) -> &HashMap<u16, Rgb> {
        &self.key_colors
    }

    pub(crate) fn clear_key_record(&mut self) {
        self.key_colors.clear();
    }

    /// Register a restart callback. Callbacks run in registration order on
    /// every inactive-to-active transition; one failing does not stop the
    /// rest.
    pub fn add_restart_callback(&mut self, callback: RestartCallback) {
        self.restart_callbacks.push(callback);
    }

    // --- base lighting ---

    /// Paint every bound key with its category color and rebuild the
    /// per-key color record. Every first-seen category gets a default color
    /// in the config, which is written out right away if that dirtied it.
    pub fn init_base_lighting(&mut self, host: &dyn HostAdapter, config: &mut ConfigManager) {
        if !self.active {
            return;
        }

        let bindings = host.key_bindings();
        let mut categories: Vec<&str> = bindings.iter().map(category_of).collect();
        categories.extend([
            CATEGORY_UNKNOWN,
            CATEGORY_DEAD,
            CATEGORY_INVENTORY,
            CATEGORY_SELECTED,
        ]);
        config.ensure_defaults(categories);
        config.save_if_dirty();

        self.key_colors.clear();
        for binding in &bindings {
            let color = config.color_for(category_of(binding));
            self.set_solid_on_resolved(binding.resolve(), color);
        }
        debug!(bindings = bindings.len(), "base lighting applied");
    }

    // --- emission ---

    /// Solid color across the whole device.
    pub fn set_solid_color(&mut self, color: Rgb) {
        if !self.active {
            return;
        }
        self.driver.set_all(color);
    }

    /// Whole-device flash between `color` and dark.
    pub fn set_flashing(&mut self, color: Rgb, interval_ms: u32) {
        if !self.active {
            return;
        }
        self.driver.flash_all(color, interval_ms);
    }

    /// Whole-device pulse towards `color` and back.
    pub fn set_pulsing(&mut self, color: Rgb, interval_ms: u32) {
        if !self.active {
            return;
        }
        self.driver.pulse_all(color, interval_ms);
    }

    /// Solid color on one key by scan code. Records the color so later
    /// pulses can fade from it.
    pub fn set_solid_on_scan_code(&mut self, scan_code: u16, color: Rgb) {
        if !self.active {
            return;
        }
        self.key_colors.insert(scan_code, color);
        self.driver.set_key(scan_code, color);
    }

    /// Solid color on one key by symbolic name. Named keys live outside the
    /// scan-code record.
    pub fn set_solid_on_named_key(&mut self, key: NamedKey, color: Rgb) {
        if !self.active {
            return;
        }
        self.driver.set_named_key(key, color);
    }

    /// Solid color through both addressing paths of a resolved binding.
    /// Keys that resolve to neither path are skipped.
    pub fn set_solid_on_resolved(&mut self, key: ResolvedKey, color: Rgb) {
        if let Some(scan_code) = key.scan_code {
            self.set_solid_on_scan_code(scan_code, color);
        }
        if let Some(named) = key.named {
            self.set_solid_on_named_key(named, color);
        }
    }

    pub fn set_flashing_on_scan_code(&mut self, scan_code: u16, color: Rgb, interval_ms: u32) {
        if !self.active {
            return;
        }
        self.driver.flash_key(scan_code, color, interval_ms);
    }

    /// Pulse one key from its recorded color towards `color`. Keys never
    /// painted solid fade up from dark. The record itself is left untouched,
    /// the pulse stays transient.
    pub fn set_pulsing_on_scan_code(&mut self, scan_code: u16, color: Rgb, interval_ms: u32) {
        if !self.active {
            return;
        }
        let from = self
            .key_colors
            .get(&scan_code)
            .copied()
            .unwrap_or(Rgb::BLACK);
        self.driver.pulse_key(scan_code, from, color, interval_ms);
    }

    /// Cancel device-side flash and pulse playback.
    pub fn stop_effects(&mut self) {
        if !self.active {
            return;
        }
        self.driver.stop_effects();
    }

    /// Snapshot the device-side lighting state.
    pub fn save_lighting(&mut self) {
        if !self.active {
            return;
        }
        self.driver.save_lighting();
    }

    /// Return to the last device-side snapshot, then rebuild base lighting
    /// on top of it.
    pub fn restore_lighting(&mut self, host: &dyn HostAdapter, config: &mut ConfigManager) {
        if !self.active {
            return;
        }
        self.driver.stop_effects();
        self.driver.restore_lighting();
        self.init_base_lighting(host, config);
    }

    // --- lifecycle ---

    /// Close the device link and drop the key-color record. Safe to call
    /// repeatedly.
    pub fn shutdown(&mut self, silent: bool) {
        if !self.active {
            return;
        }
        if !silent {
            info!("shutting down LED driver");
        }
        self.active = false;
        self.key_colors.clear();
        self.driver.shutdown();
    }

    /// Bring the session up if it is down. Already active is a quiet
    /// success. An actual inactive-to-active transition rebuilds base
    /// lighting and fires the restart callbacks.
    pub fn restart(
        &mut self,
        silent: bool,
        host: &dyn HostAdapter,
        config: &mut ConfigManager,
    ) -> bool {
        if self.active {
            return true;
        }
        if !self.start_device(silent) {
            return false;
        }
        self.init_base_lighting(host, config);
        self.fire_restart_callbacks();
        true
    }

    /// Cycle the device link so stale key resolutions get dropped.
    pub fn on_resource_reload(&mut self, host: &dyn HostAdapter, config: &mut ConfigManager) {
        if !self.active {
            return;
        }
        self.shutdown(true);
        self.restart(true, host, config);
    }

    fn fire_restart_callbacks(&mut self) {
        let mut callbacks = std::mem::take(&mut self.restart_callbacks);
        for callback in callbacks.iter_mut() {
            if let Err(error) = callback() {
                error!(%error, "restart callback failed");
            }
        }
        // Callbacks registered while firing queue up behind the existing
        // ones and are not invoked this round.
        callbacks.append(&mut self.restart_callbacks);
        self.restart_callbacks = callbacks;
    }
}

/// Category label of a binding, with the unknown fallback for hosts that
/// report none.
fn category_of(binding: &KeyBinding) -> &str {
    if binding.category.is_empty() {
        CATEGORY_UNKNOWN
    } else {
        &binding.category
    }
}
