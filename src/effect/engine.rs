//! Tick-driven effect state machine.
//!
//! One [`EffectEngine`] sits between the host adapter and the device
//! session. Every client tick it folds the player snapshot into a desired
//! [`SpecialEffect`], applies the transition, and drives the ancillary
//! behaviors around it: death save/restore, the selected-slot highlight,
//! window-focus handling, and the diagnostic-key indicator.

use tracing::debug;

use keyglow_driver::{LedDriver, NamedKey, Rgb};

use super::render::EffectRenderer;
use super::SpecialEffect;
use crate::config::{ConfigManager, Settings, CATEGORY_DEAD, CATEGORY_INVENTORY};
use crate::host::{HostAdapter, PlayerSnapshot};
use crate::keymap::ResolvedKey;
use crate::session::LightSession;

/// Ticks the damage flash stays saturated after a hit registers.
pub(crate) const DAMAGE_FLASH_TICKS: u32 = 12;

/// Ticks the diagnostic key must stay held before the indicator lights.
const DIAG_HOLD_THRESHOLD_TICKS: u32 = 5;

/// Key carrying the diagnostic indicator.
const INDICATOR_KEY: NamedKey = NamedKey::F4;

/// The effect tick counter wraps at this mask so renderer phase math never
/// sees a discontinuity from overflow.
const EFFECT_TICK_MASK: u32 = (1 << 14) - 1;

/// Hotbar slots tracked for the selected-slot highlight.
const HOTBAR_SLOTS: usize = 9;

/// Health plus absorption at or below this counts as low health.
const LOW_HEALTH_THRESHOLD: f32 = 4.0;

// ── Engine ───────────────────────────────────────────────────────────

/// Per-tick lighting brain. Owns all effect and ancillary state; the
/// session and config are borrowed per call so the controller stays in
/// charge of their lifetimes.
pub struct EffectEngine {
    renderer: EffectRenderer,
    active_effect: SpecialEffect,
    effect_ticks: u32,
    /// Scan codes the active effect animates over, captured from the
    /// session's key-color record when the effect started.
    effect_scan_codes: Vec<u16>,
    damage_flash_ticks: u32,
    dead: bool,
    window_focused: bool,
    last_selected_slot: Option<usize>,
    hotbar_keys: [ResolvedKey; HOTBAR_SLOTS],
    hotbar_initialized: bool,
    diag_held: bool,
    diag_hold_ticks: u32,
    indicator_lit: bool,
    /// Session generation seen last tick. A mismatch means the session
    /// restarted without the engine driving it.
    last_generation: Option<u64>,
}

impl EffectEngine {
    pub fn new() -> Self {
        Self {
            renderer: EffectRenderer::new(),
            active_effect: SpecialEffect::None,
            effect_ticks: 0,
            effect_scan_codes: Vec::new(),
            damage_flash_ticks: 0,
            dead: false,
            window_focused: true,
            last_selected_slot: None,
            hotbar_keys: [ResolvedKey::default(); HOTBAR_SLOTS],
            hotbar_initialized: false,
            diag_held: false,
            diag_hold_ticks: 0,
            indicator_lit: false,
            last_generation: None,
        }
    }

    pub fn active_effect(&self) -> SpecialEffect {
        self.active_effect
    }

    // ── Host events ──────────────────────────────────────────────────

    /// Advance one client tick.
    pub fn tick<D: LedDriver>(
        &mut self,
        host: &dyn HostAdapter,
        session: &mut LightSession<D>,
        config: &mut ConfigManager,
    ) {
        if self.sync_generation(session) {
            self.on_session_restarted(host, session, config);
        }

        self.handle_focus(host, session, config);

        if !config.settings().enabled {
            return;
        }
        if !session.is_active() {
            return;
        }
        let Some(player) = host.player() else {
            return;
        };

        self.ensure_hotbar_keys(host);
        self.handle_death_state(&player, host, session, config);

        if !self.dead {
            self.update_special_effects(&player, host, session, config);
        } else {
            self.clear_special_effects(false, host, session, config);
        }

        if self.active_effect == SpecialEffect::None {
            self.handle_selected_slot(&player, session, config);
        }

        self.update_function_key_lighting(host, session, config);
    }

    /// The player joined a world. Lighting state from the previous world
    /// is stale, so rebuild from scratch.
    pub fn on_join<D: LedDriver>(
        &mut self,
        host: &dyn HostAdapter,
        session: &mut LightSession<D>,
        config: &mut ConfigManager,
    ) {
        self.dead = false;
        self.reset_hotbar_cache();
        self.reset_function_key_lighting(session);
        self.clear_special_effects(false, host, session, config);
        session.init_base_lighting(host, config);
    }

    /// The player left the server. The base scene stays on the device, but
    /// per-session state and the key-color record are dropped.
    pub fn on_disconnect<D: LedDriver>(
        &mut self,
        host: &dyn HostAdapter,
        session: &mut LightSession<D>,
        config: &mut ConfigManager,
    ) {
        if self.dead {
            self.dead = false;
            session.restore_lighting(host, config);
        }
        self.reset_hotbar_cache();
        self.reset_function_key_lighting(session);
        session.clear_key_record();
    }

    /// Settings changed. Re-resolve everything that depends on them,
    /// bringing the device up or down to match the master toggle.
    pub fn on_config_changed<D: LedDriver>(
        &mut self,
        host: &dyn HostAdapter,
        session: &mut LightSession<D>,
        config: &mut ConfigManager,
    ) {
        self.reset_hotbar_cache();
        self.reset_function_key_lighting(session);

        if !config.settings().enabled {
            self.clear_special_effects(false, host, session, config);
            if session.is_active() {
                session.stop_effects();
                session.shutdown(true);
            }
            return;
        }

        if !session.is_active()
            && session.restart(true, host, config)
            && self.sync_generation(session)
        {
            self.on_session_restarted(host, session, config);
        }
        self.clear_special_effects(true, host, session, config);
    }

    // ── Session generation tracking ──────────────────────────────────

    /// Adopt the session's generation counter. Returns true when the
    /// session restarted since the last look; the first look adopts
    /// silently.
    fn sync_generation<D: LedDriver>(&mut self, session: &LightSession<D>) -> bool {
        let generation = session.generation();
        let changed = self
            .last_generation
            .is_some_and(|last| last != generation);
        self.last_generation = Some(generation);
        changed
    }

    /// The session came up on a fresh device link. Key resolutions and the
    /// effect capture are stale; re-establish the scene around whatever
    /// effect is supposed to be active.
    fn on_session_restarted<D: LedDriver>(
        &mut self,
        host: &dyn HostAdapter,
        session: &mut LightSession<D>,
        config: &mut ConfigManager,
    ) {
        self.reset_hotbar_cache();
        self.reset_function_key_lighting(session);
        self.effect_ticks = 0;
        self.effect_scan_codes.clear();
        if self.active_effect != SpecialEffect::None {
            let effect = self.active_effect;
            self.apply_special_effect(effect, false, host, session, config);
        } else {
            session.init_base_lighting(host, config);
            self.reset_hotbar_highlight(session, config);
        }
    }

    // ── Window focus ─────────────────────────────────────────────────

    /// Release the device while the window is unfocused and reclaim it on
    /// regain. A failed reclaim leaves the focus flag unset so the next
    /// tick retries.
    fn handle_focus<D: LedDriver>(
        &mut self,
        host: &dyn HostAdapter,
        session: &mut LightSession<D>,
        config: &mut ConfigManager,
    ) {
        let focused = host.window_focused();
        if self.window_focused && !focused {
            self.window_focused = false;
            self.reset_function_key_lighting(session);
            session.shutdown(true);
        } else if !self.window_focused && focused {
            if !config.settings().enabled {
                self.window_focused = true;
                return;
            }
            if session.restart(true, host, config) {
                if self.sync_generation(session) {
                    self.on_session_restarted(host, session, config);
                }
                self.window_focused = true;
                if self.dead {
                    session.set_solid_color(config.color_for(CATEGORY_DEAD));
                }
            }
        }
    }

    // ── Death handling ───────────────────────────────────────────────

    /// Swap the whole device to the dead color while the player is dead,
    /// restoring the saved scene on respawn.
    fn handle_death_state<D: LedDriver>(
        &mut self,
        player: &PlayerSnapshot,
        host: &dyn HostAdapter,
        session: &mut LightSession<D>,
        config: &mut ConfigManager,
    ) {
        let player_dead = is_player_dead(player);
        if player_dead && !self.dead {
            self.dead = true;
            self.clear_special_effects(false, host, session, config);
            session.save_lighting();
            session.set_solid_color(config.color_for(CATEGORY_DEAD));
        } else if !player_dead && self.dead {
            self.dead = false;
            session.restore_lighting(host, config);
            self.last_selected_slot = None;
        }
    }

    // ── Special effects ──────────────────────────────────────────────

    /// Advance the damage counter, resolve the desired effect, apply the
    /// transition if there is one, then render the next frame.
    fn update_special_effects<D: LedDriver>(
        &mut self,
        player: &PlayerSnapshot,
        host: &dyn HostAdapter,
        session: &mut LightSession<D>,
        config: &mut ConfigManager,
    ) {
        let settings = *config.settings();

        if settings.damage_effect && player.hurt_time > 0 {
            self.damage_flash_ticks = DAMAGE_FLASH_TICKS;
        } else if !settings.damage_effect {
            self.damage_flash_ticks = 0;
        } else if self.damage_flash_ticks > 0 {
            self.damage_flash_ticks -= 1;
        }

        let desired = self.desired_effect(player, &settings);
        if desired != self.active_effect {
            debug!(from = ?self.active_effect, to = ?desired, "effect transition");
            self.apply_special_effect(desired, true, host, session, config);
        }
        self.tick_active_effect(session);
    }

    /// Resolve the effect this tick wants. The order is fixed: damage wins
    /// over everything, low health over the status effects, then portal,
    /// wither, poison, frost and water.
    fn desired_effect(&self, player: &PlayerSnapshot, settings: &Settings) -> SpecialEffect {
        if settings.damage_effect && self.damage_flash_ticks > 0 {
            return SpecialEffect::DamageFlash;
        }
        if settings.low_health_blink && is_low_health(player) {
            return SpecialEffect::LowHealth;
        }
        if settings.nether_portal_effect && player.in_portal {
            return SpecialEffect::NetherPortal;
        }
        if settings.wither_effect && player.has_wither {
            return SpecialEffect::Wither;
        }
        if settings.poison_effect && player.has_poison {
            return SpecialEffect::Poison;
        }
        if settings.frozen_effect && player.frozen_ticks > 0 {
            return SpecialEffect::Frozen;
        }
        if settings.underwater_effect && player.underwater {
            return SpecialEffect::Underwater;
        }
        SpecialEffect::None
    }

    /// Switch the active effect. Entering an effect captures the working
    /// key set and paints an opening frame; leaving one optionally rebuilds
    /// the base scene.
    fn apply_special_effect<D: LedDriver>(
        &mut self,
        effect: SpecialEffect,
        restore_base_after_none: bool,
        host: &dyn HostAdapter,
        session: &mut LightSession<D>,
        config: &mut ConfigManager,
    ) {
        if !session.is_active() {
            self.active_effect = effect;
            return;
        }
        session.stop_effects();
        self.effect_ticks = 0;
        self.effect_scan_codes.clear();
        self.active_effect = effect;
        if effect == SpecialEffect::None {
            if restore_base_after_none {
                session.init_base_lighting(host, config);
                self.reset_hotbar_highlight(session, config);
            }
        } else {
            self.capture_effect_scan_codes(session);
            self.tick_active_effect(session);
        }
    }

    /// Drop all effect state. `restore_base` additionally rebuilds the
    /// base scene when no transition does it already.
    fn clear_special_effects<D: LedDriver>(
        &mut self,
        restore_base: bool,
        host: &dyn HostAdapter,
        session: &mut LightSession<D>,
        config: &mut ConfigManager,
    ) {
        self.damage_flash_ticks = 0;
        if self.active_effect != SpecialEffect::None {
            self.apply_special_effect(SpecialEffect::None, restore_base, host, session, config);
        } else if restore_base {
            session.stop_effects();
            session.init_base_lighting(host, config);
            self.reset_hotbar_highlight(session, config);
        }
        self.active_effect = SpecialEffect::None;
        self.effect_ticks = 0;
        self.effect_scan_codes.clear();
    }

    /// Render the next frame of the active effect, recapturing the key set
    /// if it went missing.
    fn tick_active_effect<D: LedDriver>(&mut self, session: &mut LightSession<D>) {
        if !session.is_active() || self.active_effect == SpecialEffect::None {
            return;
        }
        self.effect_ticks = (self.effect_ticks + 1) & EFFECT_TICK_MASK;
        if self.effect_scan_codes.is_empty() {
            self.capture_effect_scan_codes(session);
        }
        self.renderer.render(
            self.active_effect,
            self.effect_ticks,
            self.damage_flash_ticks,
            &self.effect_scan_codes,
            session,
        );
    }

    /// Capture the scan codes the base lighting touched, in stable order,
    /// as the working set for per-key animation.
    fn capture_effect_scan_codes<D: LedDriver>(&mut self, session: &LightSession<D>) {
        let mut codes: Vec<u16> = session.key_colors().keys().copied().collect();
        codes.sort_unstable();
        self.effect_scan_codes = codes;
    }

    // ── Hotbar highlight ─────────────────────────────────────────────

    /// Resolve the hotbar bindings once and reuse them; the cache is
    /// dropped whenever bindings may have changed.
    fn ensure_hotbar_keys(&mut self, host: &dyn HostAdapter) {
        if self.hotbar_initialized {
            return;
        }
        let bindings = host.hotbar_bindings();
        for (slot, binding) in bindings.iter().take(HOTBAR_SLOTS).enumerate() {
            self.hotbar_keys[slot] = binding.resolve();
        }
        self.hotbar_initialized = true;
    }

    fn reset_hotbar_cache(&mut self) {
        self.hotbar_initialized = false;
        self.hotbar_keys = [ResolvedKey::default(); HOTBAR_SLOTS];
        self.last_selected_slot = None;
    }

    /// Track the selected hotbar slot: restore the color of the slot the
    /// player left and highlight the one they moved to.
    fn handle_selected_slot<D: LedDriver>(
        &mut self,
        player: &PlayerSnapshot,
        session: &mut LightSession<D>,
        config: &mut ConfigManager,
    ) {
        if !config.settings().highlight_selected_slot {
            if let Some(previous) = self.last_selected_slot.take() {
                let key = self.hotbar_keys[previous];
                if !key.is_unresolved() {
                    session.set_solid_on_resolved(key, config.color_for(CATEGORY_INVENTORY));
                }
            }
            return;
        }

        let slot = player.selected_slot;
        if slot >= HOTBAR_SLOTS {
            return;
        }
        if self.last_selected_slot == Some(slot) {
            return;
        }
        if let Some(previous) = self.last_selected_slot {
            let key = self.hotbar_keys[previous];
            if !key.is_unresolved() {
                session.set_solid_on_resolved(key, config.color_for(CATEGORY_INVENTORY));
            }
        }
        self.last_selected_slot = Some(slot);
        let key = self.hotbar_keys[slot];
        if !key.is_unresolved() {
            session.set_solid_on_resolved(key, config.highlight_color());
        }
    }

    /// Reassert the highlight after something repainted the base scene
    /// over it.
    fn reset_hotbar_highlight<D: LedDriver>(
        &mut self,
        session: &mut LightSession<D>,
        config: &mut ConfigManager,
    ) {
        if !config.settings().highlight_selected_slot {
            return;
        }
        let Some(slot) = self.last_selected_slot else {
            return;
        };
        let key = self.hotbar_keys[slot];
        if !key.is_unresolved() {
            session.set_solid_on_resolved(key, config.highlight_color());
        }
    }

    // ── Diagnostic indicator ─────────────────────────────────────────

    /// Light the indicator key once the diagnostic key has been held past
    /// the threshold, and blank it on release.
    fn update_function_key_lighting<D: LedDriver>(
        &mut self,
        host: &dyn HostAdapter,
        session: &mut LightSession<D>,
        config: &mut ConfigManager,
    ) {
        if !session.is_active() {
            return;
        }
        if host.diagnostic_key_held() {
            if !self.diag_held {
                self.diag_held = true;
                self.diag_hold_ticks = 0;
            }
            if self.diag_hold_ticks < DIAG_HOLD_THRESHOLD_TICKS {
                self.diag_hold_ticks += 1;
            }
            if self.diag_hold_ticks >= DIAG_HOLD_THRESHOLD_TICKS {
                session
                    .set_solid_on_named_key(INDICATOR_KEY, config.color_for(CATEGORY_INVENTORY));
                self.indicator_lit = true;
            }
        } else {
            if self.indicator_lit {
                session.set_solid_on_named_key(INDICATOR_KEY, Rgb::BLACK);
                self.indicator_lit = false;
            }
            self.diag_held = false;
            self.diag_hold_ticks = 0;
        }
    }

    /// Forget the hold state and blank the indicator key outright.
    fn reset_function_key_lighting<D: LedDriver>(&mut self, session: &mut LightSession<D>) {
        self.diag_held = false;
        self.diag_hold_ticks = 0;
        self.indicator_lit = false;
        session.set_solid_on_named_key(INDICATOR_KEY, Rgb::BLACK);
    }
}

impl Default for EffectEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ── Player predicates ────────────────────────────────────────────────

fn is_player_dead(player: &PlayerSnapshot) -> bool {
    player.dead_or_dying || player.health <= 0.0 || player.removed
}

/// Low health means effective health at or under the threshold, outside
/// creative and spectator modes and only while actually alive.
fn is_low_health(player: &PlayerSnapshot) -> bool {
    if player.creative || player.spectator {
        return false;
    }
    if player.dead_or_dying || player.health <= 0.0 {
        return false;
    }
    player.health + player.absorption <= LOW_HEALTH_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    use keyglow_driver::{Command, DeviceTarget, InitBehavior, RecordingDriver};

    use crate::keymap::{KeyBinding, KEY_1, KEY_A, KEY_SPACE, KEY_W};

    struct TestHost {
        focused: bool,
        player: Option<PlayerSnapshot>,
        bindings: Vec<KeyBinding>,
        hotbar: Vec<KeyBinding>,
        diag_held: bool,
    }

    impl TestHost {
        fn new() -> Self {
            let hotbar: Vec<KeyBinding> = (0..HOTBAR_SLOTS)
                .map(|slot| {
                    KeyBinding::key("inventory", KEY_1 + slot as i32, Some(0x02 + slot as u16))
                })
                .collect();
            let mut bindings = vec![
                KeyBinding::key("movement", KEY_W, Some(0x11)),
                KeyBinding::key("movement", KEY_A, Some(0x1E)),
                KeyBinding::key("gameplay", KEY_SPACE, Some(0x39)),
            ];
            bindings.extend(hotbar.clone());
            Self {
                focused: true,
                player: Some(alive_player()),
                bindings,
                hotbar,
                diag_held: false,
            }
        }
    }

    impl HostAdapter for TestHost {
        fn window_focused(&self) -> bool {
            self.focused
        }

        fn player(&self) -> Option<PlayerSnapshot> {
            self.player
        }

        fn key_bindings(&self) -> Vec<KeyBinding> {
            self.bindings.clone()
        }

        fn hotbar_bindings(&self) -> Vec<KeyBinding> {
            self.hotbar.clone()
        }

        fn diagnostic_key_held(&self) -> bool {
            self.diag_held
        }
    }

    fn alive_player() -> PlayerSnapshot {
        PlayerSnapshot {
            health: 20.0,
            ..PlayerSnapshot::default()
        }
    }

    fn highlight() -> Rgb {
        Rgb::from_u32(0xFF7F00)
    }

    fn inventory_green() -> Rgb {
        Rgb::from_u32(0x00FF00)
    }

    fn movement_cyan() -> Rgb {
        Rgb::from_u32(0x00DCFF)
    }

    struct Fixture {
        host: TestHost,
        session: LightSession<RecordingDriver>,
        config: ConfigManager,
        engine: EffectEngine,
        _dir: tempfile::TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let mut config = ConfigManager::load(dir.path().join("keyglow.json"));
            let host = TestHost::new();
            let mut session = LightSession::open(RecordingDriver::new());
            session.init_base_lighting(&host, &mut config);
            session.driver_mut().take_commands();
            Self {
                host,
                session,
                config,
                engine: EffectEngine::new(),
                _dir: dir,
            }
        }

        fn tick(&mut self) {
            self.engine
                .tick(&self.host, &mut self.session, &mut self.config);
        }

        fn commands(&mut self) -> Vec<Command> {
            self.session.driver_mut().take_commands()
        }

        fn player_mut(&mut self) -> &mut PlayerSnapshot {
            self.host.player.as_mut().unwrap()
        }
    }

    #[test]
    fn hurt_player_triggers_the_damage_ripple_over_poison() {
        let mut fx = Fixture::new();
        fx.player_mut().has_poison = true;
        fx.player_mut().hurt_time = 10;

        fx.tick();

        assert_eq!(fx.engine.active_effect(), SpecialEffect::DamageFlash);
        let commands = fx.commands();
        assert_eq!(commands[0], Command::StopEffects);
        // The transition paints an opening frame and the tick another.
        let frames = commands
            .iter()
            .filter(|command| matches!(command, Command::SolidAll(_)))
            .count();
        assert_eq!(frames, 2);
    }

    #[test]
    fn damage_ripple_yields_to_poison_as_the_counter_decays() {
        let mut fx = Fixture::new();
        fx.player_mut().has_poison = true;
        fx.player_mut().hurt_time = 10;
        fx.tick();
        assert_eq!(fx.engine.active_effect(), SpecialEffect::DamageFlash);

        fx.player_mut().hurt_time = 0;
        for _ in 0..11 {
            fx.tick();
        }
        assert_eq!(fx.engine.active_effect(), SpecialEffect::DamageFlash);

        fx.tick();
        assert_eq!(fx.engine.active_effect(), SpecialEffect::Poison);
    }

    #[test]
    fn low_health_outranks_poison() {
        let mut fx = Fixture::new();
        fx.player_mut().health = 3.0;
        fx.player_mut().absorption = 0.5;
        fx.player_mut().has_poison = true;

        fx.tick();

        assert_eq!(fx.engine.active_effect(), SpecialEffect::LowHealth);
        assert!(fx.commands().contains(&Command::SolidAll(Rgb::RED)));
    }

    #[test]
    fn creative_mode_suppresses_the_low_health_blink() {
        let mut fx = Fixture::new();
        fx.player_mut().health = 2.0;
        fx.player_mut().creative = true;

        fx.tick();
        assert_eq!(fx.engine.active_effect(), SpecialEffect::None);

        fx.player_mut().has_poison = true;
        fx.tick();
        assert_eq!(fx.engine.active_effect(), SpecialEffect::Poison);
    }

    #[test]
    fn effect_toggles_gate_their_conditions() {
        let mut fx = Fixture::new();
        fx.config.update_settings(|s| s.underwater_effect = false);
        fx.player_mut().underwater = true;

        fx.tick();
        assert_eq!(fx.engine.active_effect(), SpecialEffect::None);

        fx.config.update_settings(|s| s.underwater_effect = true);
        fx.tick();
        assert_eq!(fx.engine.active_effect(), SpecialEffect::Underwater);
    }

    #[test]
    fn surfacing_restores_base_lighting() {
        let mut fx = Fixture::new();
        fx.player_mut().underwater = true;
        fx.tick();
        assert_eq!(fx.engine.active_effect(), SpecialEffect::Underwater);
        fx.commands();

        fx.player_mut().underwater = false;
        fx.tick();

        assert_eq!(fx.engine.active_effect(), SpecialEffect::None);
        let commands = fx.commands();
        assert_eq!(commands[0], Command::StopEffects);
        assert!(commands.contains(&Command::SolidKey {
            scan_code: 0x11,
            color: movement_cyan(),
        }));
        // The slot highlight lands on top of the rebuilt base scene.
        assert_eq!(
            commands.last(),
            Some(&Command::SolidKey {
                scan_code: 0x02,
                color: highlight(),
            })
        );
    }

    #[test]
    fn death_saves_the_scene_and_paints_the_dead_color() {
        let mut fx = Fixture::new();
        fx.tick();
        fx.commands();

        fx.player_mut().health = 0.0;
        fx.tick();
        assert_eq!(
            fx.commands(),
            vec![Command::SaveLighting, Command::SolidAll(Rgb::RED)]
        );

        // Staying dead repaints nothing.
        fx.tick();
        assert!(fx.commands().is_empty());
    }

    #[test]
    fn respawn_restores_the_saved_scene() {
        let mut fx = Fixture::new();
        fx.tick();
        fx.player_mut().health = 0.0;
        fx.tick();
        fx.commands();

        fx.player_mut().health = 20.0;
        fx.tick();

        let commands = fx.commands();
        assert_eq!(
            &commands[..2],
            &[Command::StopEffects, Command::RestoreLighting]
        );
        assert_eq!(
            commands.last(),
            Some(&Command::SolidKey {
                scan_code: 0x02,
                color: highlight(),
            })
        );
    }

    #[test]
    fn hotbar_highlight_follows_the_selected_slot() {
        let mut fx = Fixture::new();
        fx.tick();
        assert_eq!(
            fx.commands(),
            vec![Command::SolidKey {
                scan_code: 0x02,
                color: highlight(),
            }]
        );

        fx.player_mut().selected_slot = 4;
        fx.tick();
        assert_eq!(
            fx.commands(),
            vec![
                Command::SolidKey {
                    scan_code: 0x02,
                    color: inventory_green(),
                },
                Command::SolidKey {
                    scan_code: 0x06,
                    color: highlight(),
                },
            ]
        );

        // Slots past the hotbar leave the highlight alone.
        fx.player_mut().selected_slot = 9;
        fx.tick();
        assert!(fx.commands().is_empty());
    }

    #[test]
    fn disabling_the_highlight_restores_the_inventory_color() {
        let mut fx = Fixture::new();
        fx.tick();
        fx.commands();

        fx.config.update_settings(|s| s.highlight_selected_slot = false);
        fx.tick();
        assert_eq!(
            fx.commands(),
            vec![Command::SolidKey {
                scan_code: 0x02,
                color: inventory_green(),
            }]
        );

        fx.tick();
        assert!(fx.commands().is_empty());
    }

    #[test]
    fn diagnostic_hold_lights_the_indicator_after_five_ticks() {
        let mut fx = Fixture::new();
        fx.host.diag_held = true;

        for _ in 0..4 {
            fx.tick();
        }
        assert!(!fx
            .commands()
            .iter()
            .any(|command| matches!(command, Command::SolidNamed { .. })));

        fx.tick();
        assert!(fx.commands().contains(&Command::SolidNamed {
            key: NamedKey::F4,
            color: inventory_green(),
        }));

        fx.host.diag_held = false;
        fx.tick();
        assert_eq!(
            fx.commands(),
            vec![Command::SolidNamed {
                key: NamedKey::F4,
                color: Rgb::BLACK,
            }]
        );

        fx.tick();
        assert!(fx.commands().is_empty());
    }

    #[test]
    fn losing_focus_releases_the_device() {
        let mut fx = Fixture::new();
        fx.tick();
        fx.commands();

        fx.host.focused = false;
        fx.tick();

        assert_eq!(
            fx.commands(),
            vec![
                Command::SolidNamed {
                    key: NamedKey::F4,
                    color: Rgb::BLACK,
                },
                Command::Shutdown,
            ]
        );
        assert!(!fx.session.is_active());

        fx.tick();
        assert!(fx.commands().is_empty());
    }

    #[test]
    fn regaining_focus_brings_the_device_back_up() {
        let mut fx = Fixture::new();
        fx.tick();
        fx.host.focused = false;
        fx.tick();
        fx.commands();

        fx.host.focused = true;
        fx.tick();

        assert!(fx.session.is_active());
        let commands = fx.commands();
        assert_eq!(
            &commands[..3],
            &[
                Command::Init,
                Command::SetTarget(DeviceTarget::PerKeyRgb),
                Command::SolidAll(Rgb::BLACK),
            ]
        );
        assert!(commands.contains(&Command::SolidKey {
            scan_code: 0x11,
            color: movement_cyan(),
        }));
        assert_eq!(
            commands.last(),
            Some(&Command::SolidKey {
                scan_code: 0x02,
                color: highlight(),
            })
        );
    }

    #[test]
    fn regaining_focus_while_dead_reasserts_the_dead_color() {
        let mut fx = Fixture::new();
        fx.tick();
        fx.player_mut().health = 0.0;
        fx.tick();
        fx.host.focused = false;
        fx.tick();
        fx.commands();

        fx.host.focused = true;
        fx.tick();

        assert!(fx.session.is_active());
        let commands = fx.commands();
        let last_wash = commands.iter().rev().find_map(|command| match command {
            Command::SolidAll(color) => Some(*color),
            _ => None,
        });
        assert_eq!(last_wash, Some(Rgb::RED));
    }

    #[test]
    fn focus_regain_retries_while_the_device_stays_down() {
        let mut fx = Fixture::new();
        fx.host.focused = false;
        fx.tick();
        fx.commands();

        fx.session
            .driver_mut()
            .set_init_behavior(InitBehavior::InitFailed);
        fx.host.focused = true;
        fx.tick();
        assert!(fx.commands().is_empty());
        assert!(!fx.session.is_active());

        // The link recovers and the next tick claims it.
        fx.session
            .driver_mut()
            .set_init_behavior(InitBehavior::Succeed);
        fx.tick();
        assert!(fx.session.is_active());
        let commands = fx.commands();
        assert_eq!(
            &commands[..3],
            &[
                Command::Init,
                Command::SetTarget(DeviceTarget::PerKeyRgb),
                Command::SolidAll(Rgb::BLACK),
            ]
        );
    }

    #[test]
    fn disabling_the_controller_blanks_and_releases() {
        let mut fx = Fixture::new();
        fx.tick();
        fx.commands();

        fx.config.update_settings(|s| s.enabled = false);
        fx.engine
            .on_config_changed(&fx.host, &mut fx.session, &mut fx.config);
        assert_eq!(
            fx.commands(),
            vec![
                Command::SolidNamed {
                    key: NamedKey::F4,
                    color: Rgb::BLACK,
                },
                Command::StopEffects,
                Command::Shutdown,
            ]
        );

        fx.tick();
        assert!(fx.commands().is_empty());

        fx.config.update_settings(|s| s.enabled = true);
        fx.engine
            .on_config_changed(&fx.host, &mut fx.session, &mut fx.config);
        assert!(fx.session.is_active());
        let commands = fx.commands();
        assert_eq!(
            &commands[..3],
            &[
                Command::Init,
                Command::SetTarget(DeviceTarget::PerKeyRgb),
                Command::SolidAll(Rgb::BLACK),
            ]
        );
    }

    #[test]
    fn external_device_cycle_is_noticed_next_tick() {
        let mut fx = Fixture::new();
        fx.tick();
        fx.commands();

        fx.session.on_resource_reload(&fx.host, &mut fx.config);
        fx.commands();

        fx.tick();
        let commands = fx.commands();
        assert!(commands.contains(&Command::SolidNamed {
            key: NamedKey::F4,
            color: Rgb::BLACK,
        }));
        assert!(commands.contains(&Command::SolidKey {
            scan_code: 0x11,
            color: movement_cyan(),
        }));
        assert_eq!(
            commands.last(),
            Some(&Command::SolidKey {
                scan_code: 0x02,
                color: highlight(),
            })
        );
    }

    #[test]
    fn join_rebuilds_the_base_scene() {
        let mut fx = Fixture::new();
        fx.engine
            .on_join(&fx.host, &mut fx.session, &mut fx.config);

        let commands = fx.commands();
        assert_eq!(
            commands[0],
            Command::SolidNamed {
                key: NamedKey::F4,
                color: Rgb::BLACK,
            }
        );
        assert!(commands.contains(&Command::SolidKey {
            scan_code: 0x11,
            color: movement_cyan(),
        }));
    }

    #[test]
    fn disconnect_drops_the_key_record_and_restores_after_death() {
        let mut fx = Fixture::new();
        fx.tick();
        fx.player_mut().health = 0.0;
        fx.tick();
        fx.commands();

        fx.engine
            .on_disconnect(&fx.host, &mut fx.session, &mut fx.config);
        assert!(fx.commands().contains(&Command::RestoreLighting));
        assert!(fx.session.key_colors().is_empty());

        let mut fx = Fixture::new();
        fx.tick();
        fx.commands();
        fx.engine
            .on_disconnect(&fx.host, &mut fx.session, &mut fx.config);
        assert!(!fx.commands().contains(&Command::RestoreLighting));
        assert!(fx.session.key_colors().is_empty());
    }

    #[test]
    fn ticks_without_a_player_only_track_focus() {
        let mut fx = Fixture::new();
        fx.host.player = None;

        fx.tick();

        assert!(fx.commands().is_empty());
        assert_eq!(fx.engine.active_effect(), SpecialEffect::None);
    }
}
