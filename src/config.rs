//! Lighting configuration: category colors, effect toggles, persistence.
//!
//! Colors are stored per binding category as `"0xRRGGBB"` strings in a single
//! JSON file next to the rest of the user's config. Loading is deliberately
//! tolerant: a malformed entry is replaced by its default and the file is
//! rewritten on the next save, never discarded wholesale.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use keyglow_driver::Rgb;

use crate::color::{format_color, parse_color};

// ---------------------------------------------------------------------------
// Categories and defaults
// ---------------------------------------------------------------------------

/// Category used for keys whose category label has no color yet.
pub const CATEGORY_UNKNOWN: &str = "unknown";
/// Category painted over the whole device while the player is dead.
pub const CATEGORY_DEAD: &str = "dead";
/// Category of the inventory and hotbar keys.
pub const CATEGORY_INVENTORY: &str = "inventory";
/// Synthetic category holding the selected-slot highlight color.
pub const CATEGORY_SELECTED: &str = "inventory.selected";

/// Colors a fresh install starts with. Categories first seen at runtime that
/// are not listed here get [`FALLBACK_COLOR`].
const DEFAULT_COLORS: &[(&str, u32)] = &[
    (CATEGORY_UNKNOWN, 0xFF0000),
    (CATEGORY_DEAD, 0xFF0000),
    (CATEGORY_INVENTORY, 0x00FF00),
    (CATEGORY_SELECTED, 0xFF7F00),
    ("movement", 0x00DCFF),
    ("gameplay", 0xFFFFFF),
    ("creative", 0x8000FF),
    ("multiplayer", 0xFFDC00),
    ("ui", 0x0000FF),
    ("misc", 0x0000FF),
];

const FALLBACK_COLOR: Rgb = Rgb::GREEN;

fn default_for(category: &str) -> Rgb {
    DEFAULT_COLORS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, rgb)| Rgb::from_u32(*rgb))
        .unwrap_or(FALLBACK_COLOR)
}

fn default_color_map() -> BTreeMap<String, Rgb> {
    DEFAULT_COLORS
        .iter()
        .map(|(name, rgb)| (name.to_string(), Rgb::from_u32(*rgb)))
        .collect()
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Behavior toggles. Everything defaults to on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Master switch; off keeps the whole controller dark.
    pub enabled: bool,
    pub damage_effect: bool,
    pub underwater_effect: bool,
    pub poison_effect: bool,
    pub wither_effect: bool,
    pub frozen_effect: bool,
    pub low_health_blink: bool,
    pub nether_portal_effect: bool,
    pub highlight_selected_slot: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            damage_effect: true,
            underwater_effect: true,
            poison_effect: true,
            wither_effect: true,
            frozen_effect: true,
            low_health_blink: true,
            nether_portal_effect: true,
            highlight_selected_slot: true,
        }
    }
}

// ---------------------------------------------------------------------------
// ConfigManager
// ---------------------------------------------------------------------------

/// Owns the color table and toggles, tracks whether anything diverged from
/// the file on disk.
pub struct ConfigManager {
    path: PathBuf,
    colors: BTreeMap<String, Rgb>,
    settings: Settings,
    dirty: bool,
}

impl ConfigManager {
    /// Load from `path`. Never fails: a missing or unreadable file yields
    /// defaults with the dirty flag set, a partially valid file keeps its
    /// valid entries.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Value>(&content) {
                Ok(root) => {
                    let (colors, settings, dirty) = Self::from_value(root);
                    Self {
                        path,
                        colors,
                        settings,
                        dirty,
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "config file is not valid JSON, using defaults");
                    Self::fresh(path)
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::fresh(path),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "config file unreadable, using defaults");
                Self::fresh(path)
            }
        }
    }

    /// Defaults, flagged for writing out.
    fn fresh(path: PathBuf) -> Self {
        Self {
            path,
            colors: default_color_map(),
            settings: Settings::default(),
            dirty: true,
        }
    }

    /// Interpret a parsed JSON root. Returns the color table, the settings,
    /// and whether the file needs rewriting.
    fn from_value(root: Value) -> (BTreeMap<String, Rgb>, Settings, bool) {
        let Value::Object(map) = root else {
            warn!("config root is not an object, using defaults");
            return (default_color_map(), Settings::default(), true);
        };

        // Current shape: { "colors": {..}, "settings": {..} }. Anything else
        // is treated as the legacy flat category-to-color map.
        let legacy = !map.contains_key("colors") && !map.contains_key("settings");
        if legacy {
            // Legacy files always get rewritten in the current shape.
            let (colors, _) = Self::read_color_map(&Value::Object(map));
            return (colors, Settings::default(), true);
        }

        let mut dirty = false;

        let (colors, colors_dirty) = match map.get("colors") {
            Some(value) => Self::read_color_map(value),
            None => (default_color_map(), true),
        };
        dirty |= colors_dirty;

        let mut settings = Settings::default();
        match map.get("settings") {
            Some(Value::Object(entries)) => {
                let mut read = |key: &str, slot: &mut bool| {
                    match entries.get(key) {
                        Some(Value::Bool(v)) => *slot = *v,
                        Some(other) => {
                            warn!(key, value = %other, "setting has wrong type, using default");
                            dirty = true;
                        }
                        None => dirty = true,
                    }
                };
                read("enabled", &mut settings.enabled);
                read("damageEffect", &mut settings.damage_effect);
                read("underwaterEffect", &mut settings.underwater_effect);
                read("poisonEffect", &mut settings.poison_effect);
                read("witherEffect", &mut settings.wither_effect);
                read("frozenEffect", &mut settings.frozen_effect);
                read("lowHealthBlink", &mut settings.low_health_blink);
                read("netherPortalEffect", &mut settings.nether_portal_effect);
                read("highlightSelectedSlot", &mut settings.highlight_selected_slot);
            }
            Some(other) => {
                warn!(value = %other, "settings is not an object, using defaults");
                dirty = true;
            }
            None => dirty = true,
        }

        (colors, settings, dirty)
    }

    /// Read a category-to-color object on top of the preset defaults.
    /// Malformed entries are replaced by their category default; the rest
    /// survive.
    fn read_color_map(value: &Value) -> (BTreeMap<String, Rgb>, bool) {
        let Value::Object(entries) = value else {
            warn!("color table is not an object, using defaults");
            return (default_color_map(), true);
        };

        let mut colors = default_color_map();
        let mut dirty = false;
        for (category, raw) in entries {
            let parsed = raw.as_str().and_then(parse_color);
            match parsed {
                Some(color) => {
                    colors.insert(category.clone(), color);
                }
                None => {
                    warn!(category = %category, value = %raw, "malformed color entry, using default");
                    colors.insert(category.clone(), default_for(category));
                    dirty = true;
                }
            }
        }
        (colors, dirty)
    }

    // --- colors ---

    /// Color for a binding category. First access to an unseen category
    /// installs its default and marks the store dirty.
    pub fn color_for(&mut self, category: &str) -> Rgb {
        if let Some(color) = self.colors.get(category) {
            return *color;
        }
        let color = default_for(category);
        self.colors.insert(category.to_string(), color);
        self.dirty = true;
        color
    }

    /// Vivify a default color for every listed category that has none yet.
    pub fn ensure_defaults<'a>(&mut self, categories: impl IntoIterator<Item = &'a str>) {
        for category in categories {
            self.color_for(category);
        }
    }

    /// Replace a category color. Only an actual change dirties the store.
    pub fn set_color(&mut self, category: &str, color: Rgb) {
        if self.colors.get(category) == Some(&color) {
            return;
        }
        self.colors.insert(category.to_string(), color);
        self.dirty = true;
    }

    /// Color of the selected-hotbar-slot highlight.
    pub fn highlight_color(&mut self) -> Rgb {
        self.color_for(CATEGORY_SELECTED)
    }

    /// Categories currently in the table, with their colors.
    pub fn colors(&self) -> impl Iterator<Item = (&str, Rgb)> {
        self.colors.iter().map(|(k, v)| (k.as_str(), *v))
    }

    // --- settings ---

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Mutate the toggles; dirties the store only when something changed.
    pub fn update_settings(&mut self, f: impl FnOnce(&mut Settings)) {
        let before = self.settings;
        f(&mut self.settings);
        if self.settings != before {
            self.dirty = true;
        }
    }

    // --- persistence ---

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Write the file if anything changed since the last successful save.
    pub fn save_if_dirty(&mut self) {
        if self.dirty {
            self.save();
        }
    }

    /// Write the file unconditionally. A failed write keeps the dirty flag
    /// so the next save retries.
    pub fn save(&mut self) {
        #[derive(Serialize)]
        struct ConfigFile<'a> {
            colors: BTreeMap<&'a str, String>,
            settings: &'a Settings,
        }

        let file = ConfigFile {
            colors: self
                .colors
                .iter()
                .map(|(category, color)| (category.as_str(), format_color(*color)))
                .collect(),
            settings: &self.settings,
        };

        let json = match serde_json::to_string_pretty(&file) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize config");
                return;
            }
        };

        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %e, "failed to create config dir");
                return;
            }
        }
        match std::fs::write(&self.path, json) {
            Ok(()) => self.dirty = false,
            Err(e) => warn!(path = %self.path.display(), error = %e, "failed to write config"),
        }
    }
}

/// Default config file location.
pub fn default_config_path() -> PathBuf {
    dirs_path().join("keyglow.json")
}

fn dirs_path() -> PathBuf {
    if let Some(config) = std::env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(config).join("keyglow")
    } else if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".config/keyglow")
    } else {
        PathBuf::from("/tmp/keyglow")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keyglow.json");
        (dir, path)
    }

    #[test]
    fn missing_file_yields_dirty_defaults() {
        let (_dir, path) = temp_config();
        let mut config = ConfigManager::load(&path);
        assert!(config.is_dirty());
        assert_eq!(config.color_for(CATEGORY_DEAD), Rgb::from_u32(0xFF0000));
        assert_eq!(config.color_for("movement"), Rgb::from_u32(0x00DCFF));
        assert!(config.settings().enabled);

        config.save_if_dirty();
        assert!(!config.is_dirty());
        assert!(path.exists());
    }

    #[test]
    fn save_and_reload_round_trip() {
        let (_dir, path) = temp_config();
        let mut config = ConfigManager::load(&path);
        config.set_color("movement", Rgb::new(1, 2, 3));
        config.update_settings(|s| s.poison_effect = false);
        config.save_if_dirty();

        let mut reloaded = ConfigManager::load(&path);
        assert!(!reloaded.is_dirty());
        assert_eq!(reloaded.color_for("movement"), Rgb::new(1, 2, 3));
        assert!(!reloaded.settings().poison_effect);
        assert!(reloaded.settings().wither_effect);
    }

    #[test]
    fn unseen_category_vivifies_once() {
        let (_dir, path) = temp_config();
        let mut config = ConfigManager::load(&path);
        config.save_if_dirty();
        assert!(!config.is_dirty());

        assert_eq!(config.color_for("modded.jetpack"), FALLBACK_COLOR);
        assert!(config.is_dirty());
        config.save_if_dirty();

        // Second access finds the stored entry and stays clean.
        assert_eq!(config.color_for("modded.jetpack"), FALLBACK_COLOR);
        assert!(!config.is_dirty());
    }

    #[test]
    fn set_color_only_dirties_on_change() {
        let (_dir, path) = temp_config();
        let mut config = ConfigManager::load(&path);
        config.save_if_dirty();

        let current = config.color_for("ui");
        config.save_if_dirty();
        config.set_color("ui", current);
        assert!(!config.is_dirty());
        config.set_color("ui", Rgb::new(9, 9, 9));
        assert!(config.is_dirty());
    }

    #[test]
    fn legacy_flat_map_is_imported_and_rewritten() {
        let (_dir, path) = temp_config();
        std::fs::write(
            &path,
            r#"{ "movement": "0x112233", "ui": "0x445566" }"#,
        )
        .unwrap();

        let mut config = ConfigManager::load(&path);
        assert!(config.is_dirty());
        assert_eq!(config.color_for("movement"), Rgb::from_u32(0x112233));
        assert_eq!(config.color_for("ui"), Rgb::from_u32(0x445566));

        config.save_if_dirty();
        let written = std::fs::read_to_string(&path).unwrap();
        let root: Value = serde_json::from_str(&written).unwrap();
        assert!(root.get("colors").is_some());
        assert!(root.get("settings").is_some());
    }

    #[test]
    fn malformed_color_entry_falls_back_and_keeps_the_rest() {
        let (_dir, path) = temp_config();
        std::fs::write(
            &path,
            r#"{
                "colors": { "dead": "not-a-color", "movement": "0x0A0B0C" },
                "settings": { "enabled": true, "damageEffect": true, "underwaterEffect": true,
                              "poisonEffect": true, "witherEffect": true, "frozenEffect": true,
                              "lowHealthBlink": true, "netherPortalEffect": true,
                              "highlightSelectedSlot": true }
            }"#,
        )
        .unwrap();

        let mut config = ConfigManager::load(&path);
        assert!(config.is_dirty());
        assert_eq!(config.color_for(CATEGORY_DEAD), Rgb::from_u32(0xFF0000));
        assert_eq!(config.color_for("movement"), Rgb::from_u32(0x0A0B0C));
    }

    #[test]
    fn wrong_typed_setting_uses_default() {
        let (_dir, path) = temp_config();
        std::fs::write(
            &path,
            r#"{
                "colors": {},
                "settings": { "enabled": "yes", "poisonEffect": false }
            }"#,
        )
        .unwrap();

        let config = ConfigManager::load(&path);
        assert!(config.settings().enabled);
        assert!(!config.settings().poison_effect);
        assert!(config.is_dirty());
    }

    #[test]
    fn colors_persist_in_hex_shape() {
        let (_dir, path) = temp_config();
        let mut config = ConfigManager::load(&path);
        config.set_color("gameplay", Rgb::from_u32(0x00DC12));
        config.save();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("\"0x00DC12\""));
    }
}
