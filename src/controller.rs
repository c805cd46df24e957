//! Client-facing lifecycle surface.
//!
//! [`LightController`] bundles the config provider, the device session and
//! the effect engine behind the handful of entry points a host client
//! actually calls: construction, the per-tick drive, world join and leave,
//! resource reloads, and settings changes.

use std::path::PathBuf;

use tracing::{info, warn};

use keyglow_driver::LedDriver;

use crate::config::{ConfigManager, Settings};
use crate::effect::{EffectEngine, SpecialEffect};
use crate::host::HostAdapter;
use crate::session::LightSession;

/// One controller instance per host client. Owns the host adapter so the
/// tick path needs no arguments.
pub struct LightController<D: LedDriver, H: HostAdapter> {
    host: H,
    config: ConfigManager,
    session: LightSession<D>,
    engine: EffectEngine,
}

impl<D: LedDriver, H: HostAdapter> LightController<D, H> {
    /// Load configuration, claim the device, and paint the opening scene.
    /// A device that cannot be claimed leaves the controller dormant; the
    /// engine keeps retrying through its focus path.
    pub fn new(driver: D, host: H, config_path: impl Into<PathBuf>) -> Self {
        let mut config = ConfigManager::load(config_path);
        let mut session = LightSession::open(driver);

        if !session.is_active() {
            warn!("LED device unavailable, lighting stays dormant until the link recovers");
        } else if !config.settings().enabled {
            session.shutdown(true);
        } else {
            session.init_base_lighting(&host, &mut config);
        }
        config.save_if_dirty();
        info!(config = %config.path().display(), "lighting controller ready");

        Self {
            host,
            config,
            session,
            engine: EffectEngine::new(),
        }
    }

    // --- host events ---

    /// Advance one client tick.
    pub fn on_tick(&mut self) {
        self.engine
            .tick(&self.host, &mut self.session, &mut self.config);
    }

    /// The player joined a world.
    pub fn on_join(&mut self) {
        self.engine
            .on_join(&self.host, &mut self.session, &mut self.config);
    }

    /// The player left the server.
    pub fn on_disconnect(&mut self) {
        self.engine
            .on_disconnect(&self.host, &mut self.session, &mut self.config);
    }

    /// Host resources reloaded; key resolutions may be stale, so cycle the
    /// device link.
    pub fn on_reload(&mut self) {
        self.session.on_resource_reload(&self.host, &mut self.config);
    }

    /// Settings changed outside [`update_settings`](Self::update_settings).
    pub fn on_config_changed(&mut self) {
        self.engine
            .on_config_changed(&self.host, &mut self.session, &mut self.config);
    }

    /// Apply a settings change, re-sync the lighting to it, and persist.
    pub fn update_settings(&mut self, f: impl FnOnce(&mut Settings)) {
        self.config.update_settings(f);
        self.on_config_changed();
        self.config.save_if_dirty();
    }

    /// Release the device and persist outstanding config changes.
    pub fn shutdown(&mut self) {
        self.session.shutdown(false);
        self.config.save_if_dirty();
    }

    // --- accessors ---

    pub fn active_effect(&self) -> SpecialEffect {
        self.engine.active_effect()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &ConfigManager {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut ConfigManager {
        &mut self.config
    }

    pub fn session(&self) -> &LightSession<D> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut LightSession<D> {
        &mut self.session
    }
}
