//! Game-state-driven lighting effects.
//!
//! [`engine`] folds per-tick player state into at most one active
//! [`SpecialEffect`] and owns the ancillary behaviors around it: death
//! lighting, hotbar highlight, window-focus handling, and the held-key
//! diagnostic indicator. [`render`] paints the active variant
//! procedurally over the keys the base lighting covered.

pub mod engine;
pub mod render;

pub use engine::EffectEngine;
pub use render::EffectRenderer;

// ── Effect states ────────────────────────────────────────────────────

/// The closed set of whole-device effects. At most one is active at a
/// time; the engine resolves competing conditions by fixed priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecialEffect {
    #[default]
    None,
    DamageFlash,
    LowHealth,
    Underwater,
    Poison,
    Wither,
    Frozen,
    NetherPortal,
}
