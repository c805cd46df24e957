//! Scripted game session for the terminal demo.
//!
//! [`SimHost`] implements [`HostAdapter`] over plain mutable state, and
//! [`Scenario`] drives that state through a fixed timeline touching every
//! lighting behavior: the base scene, hotbar scrolling, damage, each status
//! effect, low health, death and respawn, the diagnostic overlay, and focus
//! loss.

use crate::host::{HostAdapter, PlayerSnapshot};
use crate::keymap::{self, KeyBinding};

// ---------------------------------------------------------------------------
// Host
// ---------------------------------------------------------------------------

/// Stand-in game client with a fixed set of bindings.
pub struct SimHost {
    focused: bool,
    player: Option<PlayerSnapshot>,
    diag_held: bool,
    bindings: Vec<KeyBinding>,
    hotbar: Vec<KeyBinding>,
}

impl SimHost {
    pub fn new() -> Self {
        Self {
            focused: true,
            player: None,
            diag_held: false,
            bindings: demo_bindings(),
            hotbar: demo_hotbar(),
        }
    }

    /// Whether the script currently has a world loaded.
    pub fn in_world(&self) -> bool {
        self.player.is_some()
    }
}

impl Default for SimHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostAdapter for SimHost {
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

/// Bindings a typical client install reports, with set-1 scan codes the way
/// the platform layer resolves them on Linux. The hotbar digits are part of
/// the full set, as they are in a real client, and come again through
/// [`HostAdapter::hotbar_bindings`] in slot order.
fn demo_bindings() -> Vec<KeyBinding> {
    let mut bindings = vec![
        KeyBinding::key("movement", keymap::KEY_W, Some(0x11)),
        KeyBinding::key("movement", keymap::KEY_A, Some(0x1E)),
        KeyBinding::key("movement", keymap::KEY_S, Some(0x1F)),
        KeyBinding::key("movement", keymap::KEY_D, Some(0x20)),
        KeyBinding::key("movement", keymap::KEY_SPACE, Some(0x39)),
        KeyBinding::key("movement", keymap::KEY_LEFT_SHIFT, Some(0x2A)),
        KeyBinding::key("movement", keymap::KEY_LEFT_CONTROL, Some(0x1D)),
        KeyBinding::mouse("gameplay", 0),
        KeyBinding::mouse("gameplay", 1),
        KeyBinding::key("gameplay", keymap::KEY_Q, Some(0x10)),
        KeyBinding::key("gameplay", keymap::KEY_F, Some(0x21)),
        KeyBinding::key("inventory", keymap::KEY_E, Some(0x12)),
        KeyBinding::key("multiplayer", keymap::KEY_T, Some(0x14)),
        KeyBinding::key("multiplayer", keymap::KEY_TAB, Some(0x0F)),
        KeyBinding::key("ui", keymap::KEY_ESCAPE, Some(0x01)),
        // Function-row bindings resolve by name only on this platform.
        KeyBinding::key("misc", keymap::KEY_F2, None),
        KeyBinding::key("misc", keymap::KEY_F5, None),
        KeyBinding::unbound("creative"),
    ];
    bindings.extend(demo_hotbar());
    bindings
}

fn demo_hotbar() -> Vec<KeyBinding> {
    (0..9)
        .map(|slot| {
            KeyBinding::key(
                "inventory",
                keymap::KEY_1 + slot as i32,
                Some(0x02 + slot as u16),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

struct Phase {
    label: &'static str,
    ticks: u32,
    state: PhaseState,
}

enum PhaseState {
    /// No world loaded.
    Lobby,
    /// Healthy play on a fixed hotbar slot.
    Explore { slot: usize },
    /// One slot every half second, wrapping around the bar.
    HotbarScroll,
    /// A hit lands at phase entry and the hurt animation runs out.
    Damage,
    Poison,
    Wither,
    Underwater,
    Portal,
    /// Freeze progress ramps up for the whole phase.
    Frozen,
    /// One and a half hearts, no absorption.
    LowHealth,
    Dead,
    DiagnosticHold,
    Unfocused,
}

static PHASES: &[Phase] = &[
    Phase {
        label: "waiting for a world",
        ticks: 30,
        state: PhaseState::Lobby,
    },
    Phase {
        label: "spawned in",
        ticks: 70,
        state: PhaseState::Explore { slot: 0 },
    },
    Phase {
        label: "scrolling the hotbar",
        ticks: 90,
        state: PhaseState::HotbarScroll,
    },
    Phase {
        label: "taking damage",
        ticks: 50,
        state: PhaseState::Damage,
    },
    Phase {
        label: "poisoned",
        ticks: 80,
        state: PhaseState::Poison,
    },
    Phase {
        label: "withering",
        ticks: 80,
        state: PhaseState::Wither,
    },
    Phase {
        label: "diving underwater",
        ticks: 80,
        state: PhaseState::Underwater,
    },
    Phase {
        label: "standing in a nether portal",
        ticks: 80,
        state: PhaseState::Portal,
    },
    Phase {
        label: "freezing in powder snow",
        ticks: 80,
        state: PhaseState::Frozen,
    },
    Phase {
        label: "one and a half hearts",
        ticks: 60,
        state: PhaseState::LowHealth,
    },
    Phase {
        label: "ate a golden apple",
        ticks: 40,
        state: PhaseState::Explore { slot: 0 },
    },
    Phase {
        label: "died",
        ticks: 50,
        state: PhaseState::Dead,
    },
    Phase {
        label: "respawned",
        ticks: 60,
        state: PhaseState::Explore { slot: 2 },
    },
    Phase {
        label: "holding the diagnostic key",
        ticks: 40,
        state: PhaseState::DiagnosticHold,
    },
    Phase {
        label: "window lost focus",
        ticks: 50,
        state: PhaseState::Unfocused,
    },
    Phase {
        label: "focus back",
        ticks: 60,
        state: PhaseState::Explore { slot: 2 },
    },
    Phase {
        label: "logging out",
        ticks: 40,
        state: PhaseState::Lobby,
    },
];

/// Walks [`SimHost`] through the demo timeline one tick at a time.
pub struct Scenario {
    index: usize,
    tick_in_phase: u32,
}

impl Scenario {
    pub fn new() -> Self {
        Self {
            index: 0,
            tick_in_phase: 0,
        }
    }

    pub fn restart(&mut self) {
        self.index = 0;
        self.tick_in_phase = 0;
    }

    /// Apply the next tick of the script to `host`. Returns the label of the
    /// phase that ran, or `None` once the timeline is exhausted.
    pub fn advance(&mut self, host: &mut SimHost) -> Option<&'static str> {
        let phase = PHASES.get(self.index)?;
        apply(&phase.state, self.tick_in_phase, host);

        self.tick_in_phase += 1;
        if self.tick_in_phase >= phase.ticks {
            self.index += 1;
            self.tick_in_phase = 0;
        }
        Some(phase.label)
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self::new()
    }
}

fn healthy(slot: usize) -> PlayerSnapshot {
    PlayerSnapshot {
        health: 20.0,
        selected_slot: slot,
        ..PlayerSnapshot::default()
    }
}

fn apply(state: &PhaseState, t: u32, host: &mut SimHost) {
    host.focused = !matches!(state, PhaseState::Unfocused);
    host.diag_held = matches!(state, PhaseState::DiagnosticHold);
    host.player = match state {
        PhaseState::Lobby => None,
        PhaseState::Explore { slot } => Some(healthy(*slot)),
        PhaseState::HotbarScroll => Some(healthy((t / 10) as usize % 9)),
        PhaseState::Damage => Some(PlayerSnapshot {
            hurt_time: 10u32.saturating_sub(t),
            ..healthy(0)
        }),
        PhaseState::Poison => Some(PlayerSnapshot {
            has_poison: true,
            ..healthy(0)
        }),
        PhaseState::Wither => Some(PlayerSnapshot {
            has_wither: true,
            ..healthy(0)
        }),
        PhaseState::Underwater => Some(PlayerSnapshot {
            underwater: true,
            ..healthy(0)
        }),
        PhaseState::Portal => Some(PlayerSnapshot {
            in_portal: true,
            ..healthy(0)
        }),
        PhaseState::Frozen => Some(PlayerSnapshot {
            frozen_ticks: t + 1,
            ..healthy(0)
        }),
        PhaseState::LowHealth => Some(PlayerSnapshot {
            health: 3.0,
            ..healthy(0)
        }),
        PhaseState::Dead => Some(PlayerSnapshot {
            health: 0.0,
            dead_or_dying: true,
            ..healthy(0)
        }),
        PhaseState::DiagnosticHold | PhaseState::Unfocused => Some(healthy(0)),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeline_runs_to_completion_and_restarts() {
        let mut host = SimHost::new();
        let mut scenario = Scenario::new();

        let expected: u32 = PHASES.iter().map(|p| p.ticks).sum();
        let mut ticks = 0;
        while scenario.advance(&mut host).is_some() {
            ticks += 1;
        }
        assert_eq!(ticks, expected);

        scenario.restart();
        assert_eq!(scenario.advance(&mut host), Some("waiting for a world"));
    }

    #[test]
    fn damage_phase_lets_the_hurt_animation_run_out() {
        let mut host = SimHost::new();
        let mut scenario = Scenario::new();

        while scenario.advance(&mut host) != Some("taking damage") {}
        let player = host.player().unwrap();
        assert_eq!(player.hurt_time, 10);

        for _ in 0..10 {
            scenario.advance(&mut host);
        }
        let player = host.player().unwrap();
        assert_eq!(player.hurt_time, 0);
        assert_eq!(player.health, 20.0);
    }

    #[test]
    fn hotbar_scroll_visits_every_slot() {
        let mut host = SimHost::new();
        let mut scenario = Scenario::new();

        let mut seen = [false; 9];
        loop {
            match scenario.advance(&mut host) {
                Some("scrolling the hotbar") => {
                    seen[host.player().unwrap().selected_slot] = true;
                }
                Some("taking damage") | None => break,
                Some(_) => {}
            }
        }
        assert!(seen.iter().all(|s| *s));
    }

    #[test]
    fn lobby_and_death_report_the_right_player_state() {
        let mut host = SimHost::new();
        let mut scenario = Scenario::new();

        scenario.advance(&mut host);
        assert!(host.player().is_none());
        assert!(!host.in_world());

        while scenario.advance(&mut host) != Some("died") {}
        let player = host.player().unwrap();
        assert!(player.dead_or_dying);
        assert_eq!(player.health, 0.0);

        while scenario.advance(&mut host) != Some("window lost focus") {}
        assert!(!host.window_focused());
    }

    #[test]
    fn host_reports_the_demo_binding_set() {
        let host = SimHost::new();

        let hotbar = host.hotbar_bindings();
        assert_eq!(hotbar.len(), 9);
        assert!(hotbar.iter().all(|b| b.category == "inventory"));
        assert_eq!(hotbar[0].resolve().scan_code, Some(0x02));

        let bindings = host.key_bindings();
        for category in ["movement", "gameplay", "ui", "multiplayer", "misc"] {
            assert!(bindings.iter().any(|b| b.category == category));
        }
        assert!(bindings
            .iter()
            .any(|b| b.key == crate::keymap::BoundKey::Unbound));
    }
}
