// keyglow - Game-state-driven per-key keyboard lighting
// Controller, effect engine, and device session shared by the game-client
// integration and the demo binary

pub mod color;
pub mod config;
pub mod controller;
pub mod effect;
pub mod host;
pub mod keymap;
pub mod preview;
pub mod session;
pub mod sim;

pub use config::{ConfigManager, Settings};
pub use controller::LightController;
pub use effect::{EffectEngine, SpecialEffect};
pub use host::{HostAdapter, PlayerSnapshot};
pub use keymap::{BoundKey, KeyBinding, ResolvedKey};
pub use session::LightSession;
