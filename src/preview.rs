//! Terminal keyboard driver using crossterm.
//!
//! [`PreviewDriver`] implements [`LedDriver`] against an in-memory frame
//! of a 16x6 keyboard grid instead of hardware. The demo loop repaints the
//! frame into an alternate screen with true-color cells once per tick, so
//! every lighting behavior can be watched without a device attached.

use std::io::{self, Write};

use crossterm::{
    cursor,
    style::{self, Color, Stylize},
    QueueableCommand,
};

use keyglow_driver::{DeviceTarget, DriverError, LedDriver, NamedKey, Rgb};

/// Grid columns.
pub const COLS: usize = 16;
/// Grid rows.
pub const ROWS: usize = 6;
/// Width of each cell in characters.
const CELL_W: usize = 5;
/// Dark gray for gap positions.
const DIM: Color = Color::Rgb {
    r: 40,
    g: 40,
    b: 40,
};
/// Background color.
const BG: Color = Color::Rgb {
    r: 20,
    g: 20,
    b: 20,
};

// ── Layout ───────────────────────────────────────────────────────────

/// One grid position: a key label plus the addressing paths that reach it.
struct KeyCell {
    label: &'static str,
    scan_code: Option<u16>,
    named: Option<NamedKey>,
}

impl KeyCell {
    const fn has_key(&self) -> bool {
        self.scan_code.is_some() || self.named.is_some()
    }
}

const fn key(label: &'static str, scan_code: u16) -> KeyCell {
    KeyCell {
        label,
        scan_code: Some(scan_code),
        named: None,
    }
}

const fn named(label: &'static str, named: NamedKey) -> KeyCell {
    KeyCell {
        label,
        scan_code: None,
        named: Some(named),
    }
}

const fn full(label: &'static str, scan_code: u16, named: NamedKey) -> KeyCell {
    KeyCell {
        label,
        scan_code: Some(scan_code),
        named: Some(named),
    }
}

const fn gap() -> KeyCell {
    KeyCell {
        label: "",
        scan_code: None,
        named: None,
    }
}

/// ANSI-style layout with set-1 scan codes. Rows shorter than [`COLS`]
/// pad out with gaps; the function row is reachable by name only, like on
/// the real device.
static LAYOUT: [&[KeyCell]; ROWS] = [
    &[
        full("Esc", 0x01, NamedKey::Escape),
        gap(),
        named("F1", NamedKey::F1),
        named("F2", NamedKey::F2),
        named("F3", NamedKey::F3),
        named("F4", NamedKey::F4),
        named("F5", NamedKey::F5),
        named("F6", NamedKey::F6),
        named("F7", NamedKey::F7),
        named("F8", NamedKey::F8),
        named("F9", NamedKey::F9),
        named("F10", NamedKey::F10),
        named("F11", NamedKey::F11),
        named("F12", NamedKey::F12),
    ],
    &[
        key("`", 0x29),
        key("1", 0x02),
        key("2", 0x03),
        key("3", 0x04),
        key("4", 0x05),
        key("5", 0x06),
        key("6", 0x07),
        key("7", 0x08),
        key("8", 0x09),
        key("9", 0x0A),
        key("0", 0x0B),
        key("-", 0x0C),
        key("=", 0x0D),
        key("Bks", 0x0E),
    ],
    &[
        key("Tab", 0x0F),
        key("Q", 0x10),
        key("W", 0x11),
        key("E", 0x12),
        key("R", 0x13),
        key("T", 0x14),
        key("Y", 0x15),
        key("U", 0x16),
        key("I", 0x17),
        key("O", 0x18),
        key("P", 0x19),
        key("[", 0x1A),
        key("]", 0x1B),
        key("\\", 0x2B),
    ],
    &[
        key("Cap", 0x3A),
        key("A", 0x1E),
        key("S", 0x1F),
        key("D", 0x20),
        key("F", 0x21),
        key("G", 0x22),
        key("H", 0x23),
        key("J", 0x24),
        key("K", 0x25),
        key("L", 0x26),
        key(";", 0x27),
        key("'", 0x28),
        key("Ent", 0x1C),
    ],
    &[
        key("Shf", 0x2A),
        key("Z", 0x2C),
        key("X", 0x2D),
        key("C", 0x2E),
        key("V", 0x2F),
        key("B", 0x30),
        key("N", 0x31),
        key("M", 0x32),
        key(",", 0x33),
        key(".", 0x34),
        key("/", 0x35),
        key("Shf", 0x36),
    ],
    &[
        key("Ctl", 0x1D),
        gap(),
        key("Alt", 0x38),
        gap(),
        gap(),
        key("Spc", 0x39),
        gap(),
        gap(),
        key("Alt", 0x64),
        key("Ctl", 0x61),
    ],
];

fn cell_for_scan(scan_code: u16) -> Option<(usize, usize)> {
    for (row, cells) in LAYOUT.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            if cell.scan_code == Some(scan_code) {
                return Some((row, col));
            }
        }
    }
    None
}

fn cell_for_named(key: NamedKey) -> Option<(usize, usize)> {
    for (row, cells) in LAYOUT.iter().enumerate() {
        for (col, cell) in cells.iter().enumerate() {
            if cell.named == Some(key) {
                return Some((row, col));
            }
        }
    }
    None
}

// ── Driver ───────────────────────────────────────────────────────────

/// In-memory keyboard frame that stands in for the hardware driver.
pub struct PreviewDriver {
    initialized: bool,
    cells: [[Rgb; COLS]; ROWS],
    saved: Option<[[Rgb; COLS]; ROWS]>,
}

impl PreviewDriver {
    pub fn new() -> Self {
        Self {
            initialized: false,
            cells: [[Rgb::BLACK; COLS]; ROWS],
            saved: None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Color currently shown for a scan code, if the layout carries it.
    pub fn color_at_scan(&self, scan_code: u16) -> Option<Rgb> {
        cell_for_scan(scan_code).map(|(row, col)| self.cells[row][col])
    }

    /// Color currently shown for a named key.
    pub fn color_at_named(&self, key: NamedKey) -> Option<Rgb> {
        cell_for_named(key).map(|(row, col)| self.cells[row][col])
    }

    fn paint_all(&mut self, color: Rgb) {
        for (row, cells) in LAYOUT.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if cell.has_key() {
                    self.cells[row][col] = color;
                }
            }
        }
    }

    /// Repaint the whole frame. `header` and `status` fill the lines above
    /// and below the grid.
    pub fn draw(&self, out: &mut impl Write, header: &str, status: &str) -> io::Result<()> {
        let line_width = COLS * CELL_W;

        out.queue(cursor::MoveTo(0, 0))?;
        out.queue(style::PrintStyledContent(
            format!(" {:<width$}", header, width = line_width - 1)
                .with(Color::White)
                .on(Color::DarkGrey),
        ))?;

        for row in 0..ROWS {
            out.queue(cursor::MoveTo(0, (row + 2) as u16))?;
            for col in 0..COLS {
                let cell = LAYOUT[row].get(col);
                let (label, fg, bg) = match cell {
                    Some(cell) if cell.has_key() => {
                        let rgb = self.cells[row][col];
                        let lum = (rgb.r as u16 + rgb.g as u16 + rgb.b as u16) / 3;
                        let fg = if lum > 128 { Color::Black } else { Color::White };
                        let bg = Color::Rgb {
                            r: rgb.r,
                            g: rgb.g,
                            b: rgb.b,
                        };
                        (cell.label, fg, bg)
                    }
                    _ => ("", DIM, BG),
                };
                out.queue(style::PrintStyledContent(
                    format!("{:^width$}", label, width = CELL_W).with(fg).on(bg),
                ))?;
            }
        }

        out.queue(cursor::MoveTo(0, (ROWS + 3) as u16))?;
        out.queue(style::PrintStyledContent(
            format!(" {:<width$}", status, width = line_width - 1)
                .with(Color::White)
                .on(Color::DarkGrey),
        ))?;
        out.flush()
    }
}

impl Default for PreviewDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl LedDriver for PreviewDriver {
    fn init(&mut self) -> Result<(), DriverError> {
        self.initialized = true;
        Ok(())
    }

    fn shutdown(&mut self) {
        self.initialized = false;
        // A released device falls back to its own dark idle state.
        self.cells = [[Rgb::BLACK; COLS]; ROWS];
    }

    fn set_target(&mut self, _target: DeviceTarget) {}

    fn set_all(&mut self, color: Rgb) {
        self.paint_all(color);
    }

    fn set_key(&mut self, scan_code: u16, color: Rgb) {
        if let Some((row, col)) = cell_for_scan(scan_code) {
            self.cells[row][col] = color;
        }
    }

    fn set_named_key(&mut self, key: NamedKey, color: Rgb) {
        if let Some((row, col)) = cell_for_named(key) {
            self.cells[row][col] = color;
        }
    }

    fn flash_all(&mut self, color: Rgb, _interval_ms: u32) {
        // Device-side animation; the static frame shows its bright phase.
        self.paint_all(color);
    }

    fn pulse_all(&mut self, color: Rgb, _interval_ms: u32) {
        self.paint_all(color);
    }

    fn flash_key(&mut self, scan_code: u16, color: Rgb, _interval_ms: u32) {
        self.set_key(scan_code, color);
    }

    fn pulse_key(&mut self, scan_code: u16, _from: Rgb, to: Rgb, _interval_ms: u32) {
        self.set_key(scan_code, to);
    }

    fn save_lighting(&mut self) {
        self.saved = Some(self.cells);
    }

    fn restore_lighting(&mut self) {
        if let Some(saved) = self.saved {
            self.cells = saved;
        }
    }

    fn stop_effects(&mut self) {}
}
