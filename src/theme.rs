//! Colour themes: built-in presets, btop-style `theme[key]="value"` files, brightness.

use clap::ValueEnum;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// One `[` / `]` press moves brightness by this much.
pub const BRIGHTNESS_STEP: i16 = 20;
/// Brightness stays within `-LIMIT..=LIMIT`.
pub const BRIGHTNESS_LIMIT: i16 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Preset {
    Default,
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

/// Colour in curses units, 0..=1000 per channel.
#[derive(Debug, Clone, Copy)]
struct Units(i32, i32, i32);

impl Units {
    fn lift(self, delta: i32) -> Color {
        Color::Rgb(
            unit_to_byte(self.0 + delta),
            unit_to_byte(self.1 + delta),
            unit_to_byte(self.2 + delta),
        )
    }
}

fn unit_to_byte(v: i32) -> u8 {
    (v.clamp(0, 1000) * 255 / 1000) as u8
}

/// Rounds up so that `unit_to_byte(byte_to_unit(v)) == v`.
fn byte_to_unit(v: u8) -> i32 {
    (i32::from(v) * 1000 + 254) / 255
}

/// Brick colours by tag - 1: light blue, dark blue, orange, yellow, green, red, magenta.
const BRICK_UNITS: [Units; 7] = [
    Units(200, 600, 750),
    Units(26, 250, 500),
    Units(750, 350, 50),
    Units(880, 810, 150),
    Units(60, 370, 40),
    Units(715, 205, 205),
    Units(380, 43, 470),
];

const HIGH_CONTRAST_UNITS: [Units; 7] = [
    Units(0, 1000, 1000),
    Units(0, 400, 1000),
    Units(1000, 530, 0),
    Units(1000, 1000, 0),
    Units(0, 1000, 0),
    Units(1000, 0, 0),
    Units(1000, 0, 1000),
];

// Okabe-Ito
const COLORBLIND_UNITS: [Units; 7] = [
    Units(337, 706, 914),
    Units(0, 447, 698),
    Units(902, 624, 0),
    Units(941, 894, 259),
    Units(0, 620, 451),
    Units(835, 369, 0),
    Units(800, 475, 655),
];

/// UI colour roles of a preset. Backgrounds follow brightness fully, foregrounds at half rate.
struct PresetUnits {
    background: Units,
    on_background: Units,
    surface: Units,
    on_surface: Units,
    primary: Units,
    on_primary: Units,
    secondary: Units,
    on_secondary: Units,
}

fn preset_units(preset: Preset) -> PresetUnits {
    match preset {
        Preset::Default => PresetUnits {
            background: Units(0, 0, 0),
            on_background: Units(1000, 1000, 1000),
            surface: Units(30, 30, 30),
            on_surface: Units(1000, 1000, 1000),
            primary: Units(90, 90, 90),
            on_primary: Units(1000, 1000, 1000),
            secondary: Units(150, 150, 150),
            on_secondary: Units(1000, 1000, 1000),
        },
        Preset::Dark => PresetUnits {
            background: Units(30, 30, 45),
            on_background: Units(700, 700, 700),
            surface: Units(60, 60, 75),
            on_surface: Units(300, 770, 500),
            primary: Units(60, 60, 75),
            on_primary: Units(900, 700, 120),
            secondary: Units(900, 700, 120),
            on_secondary: Units(30, 30, 45),
        },
        Preset::Light => PresetUnits {
            background: Units(270, 270, 270),
            on_background: Units(700, 1000, 490),
            surface: Units(300, 300, 300),
            on_surface: Units(90, 90, 90),
            primary: Units(300, 300, 300),
            on_primary: Units(90, 90, 90),
            secondary: Units(900, 900, 200),
            on_secondary: Units(200, 300, 400),
        },
    }
}

/// Resolved colours plus the knobs they are derived from.
#[derive(Debug, Clone)]
pub struct Theme {
    preset: Preset,
    palette: Palette,
    brightness: i16,
    /// Colours read from a theme file, keyed by btop key.
    overrides: HashMap<String, Color>,
    /// Brick colours, indexed by colour tag - 1.
    pub bricks: [Color; 7],
    pub background: Color,
    pub on_background: Color,
    /// Board and panel fill.
    pub surface: Color,
    pub on_surface: Color,
    /// Header banner.
    pub primary: Color,
    pub on_primary: Color,
    /// Highlights (reverse-video labels).
    pub secondary: Color,
    pub on_secondary: Color,
    pub warning: Color,
    pub success: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(Preset::default(), Palette::default())
    }
}

impl Theme {
    pub fn new(preset: Preset, palette: Palette) -> Self {
        let mut theme = Self {
            preset,
            palette,
            brightness: 0,
            overrides: HashMap::new(),
            bricks: [Color::Reset; 7],
            background: Color::Reset,
            on_background: Color::Reset,
            surface: Color::Reset,
            on_surface: Color::Reset,
            primary: Color::Reset,
            on_primary: Color::Reset,
            secondary: Color::Reset,
            on_secondary: Color::Reset,
            warning: Color::Red,
            success: Color::Green,
        };
        theme.rebuild();
        theme
    }

    /// Load colour overrides from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to the bare preset if `path` is None or the file does not exist.
    pub fn load(
        path: Option<&Path>,
        preset: Preset,
        palette: Palette,
    ) -> Result<Self, ThemeError> {
        let mut theme = Self::new(preset, palette);
        let path = match path {
            Some(p) if p.exists() => p,
            _ => return Ok(theme),
        };
        let s = std::fs::read_to_string(path)?;
        for (key, value) in parse_theme_file(&s) {
            match parse_hex(&value) {
                Ok(color) => {
                    theme.overrides.insert(key, color);
                }
                Err(err) => log::warn!("{}: skipping theme[{key}]: {err}", path.display()),
            }
        }
        log::info!(
            "loaded {} colour overrides from {}",
            theme.overrides.len(),
            path.display()
        );
        theme.rebuild();
        Ok(theme)
    }

    pub fn preset(&self) -> Preset {
        self.preset
    }

    pub fn palette(&self) -> Palette {
        self.palette
    }

    pub fn brightness(&self) -> i16 {
        self.brightness
    }

    pub fn set_preset(&mut self, preset: Preset) {
        self.preset = preset;
        self.rebuild();
    }

    /// One step brighter. Returns false at the limit.
    pub fn brighter(&mut self) -> bool {
        self.adjust_brightness(BRIGHTNESS_STEP)
    }

    /// One step dimmer. Returns false at the limit.
    pub fn dimmer(&mut self) -> bool {
        self.adjust_brightness(-BRIGHTNESS_STEP)
    }

    fn adjust_brightness(&mut self, delta: i16) -> bool {
        let next = self.brightness + delta;
        if next.abs() > BRIGHTNESS_LIMIT {
            return false;
        }
        self.brightness = next;
        self.rebuild();
        true
    }

    /// Colour for a field cell tag; `None` for empty (0) or unknown tags.
    #[inline]
    pub fn brick_color(&self, tag: u8) -> Option<Color> {
        let index = usize::from(tag).checked_sub(1)?;
        self.bricks.get(index).copied()
    }

    fn rebuild(&mut self) {
        let full = i32::from(self.brightness);
        let half = full / 2;
        let third = full / 3;

        let bricks = match self.palette {
            Palette::Normal => &BRICK_UNITS,
            Palette::HighContrast => &HIGH_CONTRAST_UNITS,
            Palette::Colorblind => &COLORBLIND_UNITS,
        };
        for (dst, src) in self.bricks.iter_mut().zip(bricks) {
            *dst = src.lift(third);
        }

        let u = preset_units(self.preset);
        self.background = self.pick_or("main_bg", u.background, full);
        self.on_background = self.pick_or("main_fg", u.on_background, half);
        self.surface = self.pick_or("meter_bg", u.surface, full);
        self.on_surface = self.pick_or("div_line", u.on_surface, half);
        self.primary = self.pick_or("selected_bg", u.primary, full);
        self.on_primary = self.pick_or("title", u.on_primary, half);
        self.secondary = self.pick_or("hi_fg", u.secondary, full);
        self.on_secondary = self.pick_or("selected_fg", u.on_secondary, half);
        self.warning = self
            .pick("cpu_end", 0)
            .or_else(|| self.pick("temp_end", 0))
            .unwrap_or(Color::Red);
        self.success = self
            .pick("cpu_start", 0)
            .or_else(|| self.pick("mem_box", 0))
            .unwrap_or(Color::Green);
    }

    fn pick_or(&self, key: &str, fallback: Units, delta: i32) -> Color {
        self.pick(key, delta).unwrap_or_else(|| fallback.lift(delta))
    }

    /// File override for `key`, shifted by `delta` curses units.
    fn pick(&self, key: &str, delta: i32) -> Option<Color> {
        let color = *self.overrides.get(key)?;
        if delta == 0 {
            return Some(color);
        }
        match color {
            Color::Rgb(r, g, b) => Some(
                Units(byte_to_unit(r), byte_to_unit(g), byte_to_unit(b)).lift(delta),
            ),
            other => Some(other),
        }
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(eq) = rest.find('=') {
                    let value = rest[eq + 1..]
                        .trim()
                        .trim_matches('"')
                        .trim_matches('\'')
                        .to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}
