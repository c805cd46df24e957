//! Frame painters for the special effects.
//!
//! Every painter layers per-key accents over a whole-device wash. Accents
//! animate across the scan codes captured when the effect started; the
//! tick counter drives all motion, so equal ticks paint equal frames apart
//! from the sparkle generator.

use keyglow_driver::{LedDriver, Rgb};

use super::engine::DAMAGE_FLASH_TICKS;
use super::SpecialEffect;
use crate::color::{blend, clamp01, hsv_to_rgb};
use crate::session::LightSession;

/// Width of the damage ripple band in keys.
const RIPPLE_BAND: usize = 6;

// ── Sparkle source ───────────────────────────────────────────────────

/// Xorshift64 generator for sparkle placement. The state must stay
/// nonzero, so the zero seed is remapped.
struct XorShift(u64);

impl XorShift {
    const DEFAULT_SEED: u64 = 0x9E37_79B9_7F4A_7C15;

    fn new(seed: u64) -> Self {
        Self(if seed == 0 { Self::DEFAULT_SEED } else { seed })
    }

    fn next_u32(&mut self) -> u32 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        (x >> 32) as u32
    }

    /// Uniform in `[0, 1)`.
    fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / (1 << 24) as f32
    }

    /// Uniform index below `bound`, which must be nonzero.
    fn next_index(&mut self, bound: usize) -> usize {
        self.next_u32() as usize % bound
    }
}

// ── Renderer ─────────────────────────────────────────────────────────

/// Paints one frame of the active effect per engine tick.
pub struct EffectRenderer {
    rng: XorShift,
}

impl EffectRenderer {
    pub fn new() -> Self {
        Self {
            rng: XorShift::new(XorShift::DEFAULT_SEED),
        }
    }

    /// Paint the frame for `effect` at `ticks` over `scan_codes`.
    /// `damage_ticks` is the remaining damage-flash budget and only feeds
    /// the ripple painter.
    pub fn render<D: LedDriver>(
        &mut self,
        effect: SpecialEffect,
        ticks: u32,
        damage_ticks: u32,
        scan_codes: &[u16],
        session: &mut LightSession<D>,
    ) {
        match effect {
            SpecialEffect::None => {}
            SpecialEffect::DamageFlash => {
                self.render_damage_ripple(ticks, damage_ticks, scan_codes, session)
            }
            SpecialEffect::LowHealth => self.render_low_health(ticks, session),
            SpecialEffect::Underwater => self.render_underwater(ticks, scan_codes, session),
            SpecialEffect::Poison => self.render_poison(scan_codes, session),
            SpecialEffect::Wither => self.render_wither(ticks, scan_codes, session),
            SpecialEffect::Frozen => self.render_frozen(ticks, session),
            SpecialEffect::NetherPortal => self.render_nether_portal(ticks, scan_codes, session),
        }
    }

    /// Dark red wash with a bright band marching across the key set. The
    /// whole frame dims as the damage budget decays; the band keeps its
    /// shape at zero decay so the effect fades out instead of snapping.
    fn render_damage_ripple<D: LedDriver>(
        &mut self,
        ticks: u32,
        damage_ticks: u32,
        scan_codes: &[u16],
        session: &mut LightSession<D>,
    ) {
        let decay = clamp01(damage_ticks as f32 / DAMAGE_FLASH_TICKS as f32);
        let base = blend(Rgb::from_u32(0x1A0000), Rgb::from_u32(0x360000), decay);
        let accent = blend(Rgb::from_u32(0xFF2A00), Rgb::from_u32(0xFF5A00), decay);
        session.set_solid_color(blend(base, accent, 0.35 + 0.25 * decay));

        let wave_index = ticks as usize % RIPPLE_BAND;
        for (i, &scan_code) in scan_codes.iter().enumerate() {
            let offset = (i + wave_index) % RIPPLE_BAND;
            let strength = if offset == 0 {
                1.0
            } else if offset == 1 || offset == RIPPLE_BAND - 1 {
                0.65
            } else {
                continue;
            };
            session.set_solid_on_scan_code(scan_code, blend(base, accent, strength * decay));
        }
    }

    /// Hard red/dark blink, three ticks per phase.
    fn render_low_health<D: LedDriver>(&mut self, ticks: u32, session: &mut LightSession<D>) {
        let color = if (ticks / 3) & 1 == 0 {
            Rgb::RED
        } else {
            Rgb::BLACK
        };
        session.set_solid_color(color);
    }

    /// Deep blue swell with a cyan wave running along the key set.
    fn render_underwater<D: LedDriver>(
        &mut self,
        ticks: u32,
        scan_codes: &[u16],
        session: &mut LightSession<D>,
    ) {
        let swell = 0.5 + 0.5 * (ticks as f32 * 0.05).sin();
        session.set_solid_color(blend(
            Rgb::from_u32(0x00162C),
            Rgb::from_u32(0x003A66),
            swell,
        ));
        for (i, &scan_code) in scan_codes.iter().enumerate() {
            let wave = 0.5 + 0.5 * (ticks as f32 * 0.12 - i as f32 * 0.18).sin();
            session.set_solid_on_scan_code(
                scan_code,
                blend(Rgb::from_u32(0x003253), Rgb::from_u32(0x00B2FF), wave),
            );
        }
    }

    /// Murky green wash with random bright sparkles.
    fn render_poison<D: LedDriver>(&mut self, scan_codes: &[u16], session: &mut LightSession<D>) {
        session.set_solid_color(blend(
            Rgb::from_u32(0x001904),
            Rgb::from_u32(0x003A0B),
            0.6,
        ));
        if scan_codes.is_empty() {
            return;
        }
        let sparkles = (scan_codes.len() / 12).max(4);
        for _ in 0..sparkles {
            let scan_code = scan_codes[self.rng.next_index(scan_codes.len())];
            let sparkle = self.rng.next_f32();
            session.set_solid_on_scan_code(
                scan_code,
                blend(Rgb::from_u32(0x047A1F), Rgb::from_u32(0x7CFF8A), sparkle),
            );
        }
    }

    /// Near-black violet swell, slow-moving purple echoes, and a burst of
    /// bright flickers every twelfth tick.
    fn render_wither<D: LedDriver>(
        &mut self,
        ticks: u32,
        scan_codes: &[u16],
        session: &mut LightSession<D>,
    ) {
        let swell = 0.5 + 0.5 * (ticks as f32 * 0.045 + 0.6).sin();
        session.set_solid_color(blend(
            Rgb::from_u32(0x050007),
            Rgb::from_u32(0x160022),
            swell,
        ));
        if scan_codes.is_empty() {
            return;
        }

        let count = scan_codes.len();
        let echoes = (count / 16).max(4);
        for echo in 0..echoes {
            let index = (ticks as usize / 4 + echo * 19) % count;
            let age = ((ticks as usize + echo * 13) % 48) as f32 / 48.0;
            let pulse = clamp01(1.0 - age);
            session.set_solid_on_scan_code(
                scan_codes[index],
                blend(Rgb::from_u32(0x26003A), Rgb::from_u32(0xB400FF), pulse * pulse),
            );
        }

        if ticks % 12 == 0 {
            let accent = blend(Rgb::from_u32(0x30004A), Rgb::from_u32(0xE000FF), 0.85);
            for _ in 0..count.min(3) {
                let scan_code = scan_codes[self.rng.next_index(count)];
                session.set_solid_on_scan_code(scan_code, accent);
            }
        }
    }

    /// Icy whole-device shimmer. No per-key motion, frost sits still.
    fn render_frozen<D: LedDriver>(&mut self, ticks: u32, session: &mut LightSession<D>) {
        let shimmer = 0.5 + 0.5 * (ticks as f32 * 0.08).sin();
        session.set_solid_color(blend(
            Rgb::from_u32(0x152D45),
            Rgb::from_u32(0xC9F4FF),
            shimmer,
        ));
    }

    /// Violet wash with a hue-shifting magenta wave along the key set.
    fn render_nether_portal<D: LedDriver>(
        &mut self,
        ticks: u32,
        scan_codes: &[u16],
        session: &mut LightSession<D>,
    ) {
        let hue_base = 0.78 + 0.04 * (ticks as f32 * 0.05).sin();
        session.set_solid_color(hsv_to_rgb(hue_base, 0.85, 0.35));
        for (i, &scan_code) in scan_codes.iter().enumerate() {
            let wave = 0.5 + 0.5 * (ticks as f32 * 0.17 - i as f32 * 0.25).sin();
            session.set_solid_on_scan_code(
                scan_code,
                hsv_to_rgb(0.74 + 0.1 * wave, 0.95, 0.6 + 0.3 * wave),
            );
        }
    }
}

impl Default for EffectRenderer {
    fn default() -> Self {
        Self::new()
    }
}
