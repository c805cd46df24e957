//! Host application boundary
//!
//! The controller never reaches into the game client directly; everything it
//! reacts to comes through this trait. Implementations must be cheap: every
//! method is called from inside the client's own tick callback.

use crate::keymap::KeyBinding;

/// Point-in-time view of the player character, taken once per tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerSnapshot {
    pub health: f32,
    /// Extra absorption hearts on top of `health`.
    pub absorption: f32,
    /// Remaining ticks of the client's hurt animation; nonzero right after
    /// taking damage.
    pub hurt_time: u32,
    pub has_poison: bool,
    pub has_wither: bool,
    /// Freeze progress in ticks; nonzero while freezing or thawing.
    pub frozen_ticks: u32,
    /// Eyes below the water surface.
    pub underwater: bool,
    /// Standing inside a portal block.
    pub in_portal: bool,
    pub dead_or_dying: bool,
    /// Entity already removed from the world (death/disconnect race).
    pub removed: bool,
    pub creative: bool,
    pub spectator: bool,
    /// Selected hotbar slot, 0-8.
    pub selected_slot: usize,
}

/// Live game-client surface the controller reads each tick.
pub trait HostAdapter {
    /// Whether the client window currently has input focus.
    fn window_focused(&self) -> bool;

    /// Snapshot of the player, or `None` while no world is loaded.
    fn player(&self) -> Option<PlayerSnapshot>;

    /// Every key binding the client exposes, in the client's own order,
    /// with category labels attached.
    fn key_bindings(&self) -> Vec<KeyBinding>;

    /// The nine hotbar slot bindings, slot 0 first.
    fn hotbar_bindings(&self) -> Vec<KeyBinding>;

    /// Whether the diagnostic overlay key is physically held right now.
    fn diagnostic_key_held(&self) -> bool;
}
