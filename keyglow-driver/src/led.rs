//! RGB color value shared across the driver boundary

/// RGB color value (8 bits per channel).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpack a `0xRRGGBB` integer.
    pub const fn from_u32(rgb: u32) -> Self {
        Self {
            r: ((rgb >> 16) & 0xFF) as u8,
            g: ((rgb >> 8) & 0xFF) as u8,
            b: (rgb & 0xFF) as u8,
        }
    }

    /// Pack into a `0xRRGGBB` integer.
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Black (all LEDs off)
    pub const BLACK: Self = Self { r: 0, g: 0, b: 0 };
    /// White (all LEDs full)
    pub const WHITE: Self = Self {
        r: 255,
        g: 255,
        b: 255,
    };
    /// Red
    pub const RED: Self = Self { r: 255, g: 0, b: 0 };
    /// Green
    pub const GREEN: Self = Self { r: 0, g: 255, b: 0 };
    /// Blue
    pub const BLUE: Self = Self { r: 0, g: 0, b: 255 };
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}
