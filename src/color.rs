//! Color math shared by the session and the effect renderers

use keyglow_driver::Rgb;

/// Clamp to the unit interval.
pub fn clamp01(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

/// Linearly interpolate between two colors, channel-wise, rounding to the
/// nearest step. Out-of-range factors clamp instead of extrapolating.
pub fn blend(a: Rgb, b: Rgb, t: f32) -> Rgb {
    let t = clamp01(t);
    let channel = |from: u8, to: u8| (from as f32 + (to as f32 - from as f32) * t + 0.5) as u8;
    Rgb {
        r: channel(a.r, b.r),
        g: channel(a.g, b.g),
        b: channel(a.b, b.b),
    }
}

/// Convert HSV to RGB
/// h: hue as a fraction of the wheel (wraps, negatives allowed)
/// s: saturation (0-1)
/// v: value/brightness (0-1)
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let s = clamp01(s);
    let v = clamp01(v);
    if s == 0.0 {
        let gray = (v * 255.0 + 0.5) as u8;
        return Rgb::new(gray, gray, gray);
    }

    let h6 = (h - h.floor()) * 6.0;
    let f = h6 - h6.floor();
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));

    let (r, g, b) = match h6 as u32 {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (t, p, v),
        _ => (v, p, q),
    };
    Rgb::new(
        (r * 255.0 + 0.5) as u8,
        (g * 255.0 + 0.5) as u8,
        (b * 255.0 + 0.5) as u8,
    )
}

/// Parse a color string: "0xRRGGBB", "#RRGGBB", or a bare decimal value.
pub fn parse_color(s: &str) -> Option<Rgb> {
    let s = s.trim();
    let value = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).ok()?
    } else if let Some(hex) = s.strip_prefix('#') {
        u32::from_str_radix(hex, 16).ok()?
    } else {
        s.parse::<u32>().ok()?
    };
    if value > 0xFF_FFFF {
        return None;
    }
    Some(Rgb::from_u32(value))
}

/// Format a color the way the config file stores it ("0xRRGGBB").
pub fn format_color(color: Rgb) -> String {
    format!("0x{:06X}", color.to_u32())
}
