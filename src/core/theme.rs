//! Terminal themes for the semantic parts of a rendered line
//!
//! A [`Theme`] is a frozen SGR escape prefix. It is built once from
//! directives with a [`ThemeBuilder`], choosing between the light and dark
//! variant of every color at that point, and afterwards only concatenates
//! `prefix + text + reset`.

use super::error::HandlerError;
use super::pool::Buffer;
use colored::Color;
use rand::seq::SliceRandom;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Control Sequence Introducer
pub const CSI: &str = "\x1b[";
/// SGR sequence that clears all styling
pub const RESET: &str = "\x1b[0m";

const BOLD_SEQ: &str = "1";
const FAINT_SEQ: &str = "2";
const ITALIC_SEQ: &str = "3";
const UNDERLINE_SEQ: &str = "4";
const BLINK_SEQ: &str = "5";
const REVERSE_SEQ: &str = "7";
const CROSS_OUT_SEQ: &str = "9";
const OVERLINE_SEQ: &str = "53";

/// Semantic section of a rendered record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThemeRole {
    Time,
    Debug,
    Info,
    Warn,
    Error,
    Prefix,
    Caller,
    Key,
    /// Braces of a JSON object
    Bracket,
}

/// 24-bit color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn to_color(self) -> Color {
        Color::TrueColor {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

impl FromStr for Rgb {
    type Err = HandlerError;

    /// Parse `#rrggbb` (the `#` is optional)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HandlerError::InvalidColor(s.to_string());
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16).map_err(|_| invalid())
        };
        Ok(Rgb::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Color pair picked by terminal background
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdaptiveColor {
    pub light: Rgb,
    pub dark: Rgb,
}

impl AdaptiveColor {
    pub const fn new(light: Rgb, dark: Rgb) -> Self {
        Self { light, dark }
    }

    fn pick(self, dark_background: bool) -> Rgb {
        if dark_background {
            self.dark
        } else {
            self.light
        }
    }
}

/// Composes SGR directives into a [`Theme`]
#[derive(Debug, Clone)]
pub struct ThemeBuilder {
    dark_background: bool,
    sequences: Vec<Cow<'static, str>>,
}

impl ThemeBuilder {
    pub fn new(dark_background: bool) -> Self {
        Self {
            dark_background,
            sequences: Vec::with_capacity(10),
        }
    }

    /// Set the foreground color, choosing the variant for the background
    #[must_use]
    pub fn foreground(mut self, light: Rgb, dark: Rgb) -> Self {
        let rgb = AdaptiveColor::new(light, dark).pick(self.dark_background);
        self.sequences.push(rgb.to_color().to_fg_str());
        self
    }

    /// Set the background color, choosing the variant for the background
    #[must_use]
    pub fn background(mut self, light: Rgb, dark: Rgb) -> Self {
        let rgb = AdaptiveColor::new(light, dark).pick(self.dark_background);
        self.sequences.push(rgb.to_color().to_bg_str());
        self
    }

    #[must_use]
    pub fn bold(self) -> Self {
        self.directive(BOLD_SEQ)
    }

    #[must_use]
    pub fn faint(self) -> Self {
        self.directive(FAINT_SEQ)
    }

    #[must_use]
    pub fn italic(self) -> Self {
        self.directive(ITALIC_SEQ)
    }

    #[must_use]
    pub fn underline(self) -> Self {
        self.directive(UNDERLINE_SEQ)
    }

    #[must_use]
    pub fn overline(self) -> Self {
        self.directive(OVERLINE_SEQ)
    }

    #[must_use]
    pub fn blink(self) -> Self {
        self.directive(BLINK_SEQ)
    }

    #[must_use]
    pub fn reverse(self) -> Self {
        self.directive(REVERSE_SEQ)
    }

    #[must_use]
    pub fn cross_out(self) -> Self {
        self.directive(CROSS_OUT_SEQ)
    }

    fn directive(mut self, seq: &'static str) -> Self {
        self.sequences.push(Cow::Borrowed(seq));
        self
    }

    /// Freeze the directives into a single escape prefix
    pub fn format(self) -> Theme {
        let sequences: Vec<String> = self.sequences.into_iter().map(Cow::into_owned).collect();
        let formatted = format!("{}{}m", CSI, sequences.join(";"));
        Theme {
            sequences,
            formatted,
        }
    }
}

/// Precomputed styling for one role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    sequences: Vec<String>,
    formatted: String,
}

impl Theme {
    /// Plain bold, used for levels with a custom name
    pub fn bold() -> Self {
        ThemeBuilder::new(true).bold().format()
    }

    pub fn sequences(&self) -> &[String] {
        &self.sequences
    }

    /// The escape prefix written before themed text
    pub fn prefix(&self) -> &str {
        &self.formatted
    }

    pub fn render(&self, s: &str) -> String {
        format!("{}{}{}", self.formatted, s, RESET)
    }

    pub fn render_into(&self, buf: &mut Buffer, s: &str) {
        buf.write_str(&self.formatted);
        buf.write_str(s);
        buf.write_str(RESET);
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.formatted)
    }
}

/// Role to theme mapping; a missing role renders unstyled
pub type Themes = HashMap<ThemeRole, Arc<Theme>>;

const KEY_PALETTE: [AdaptiveColor; 6] = [
    AdaptiveColor::new(Rgb::new(0x7f, 0x7f, 0x7f), Rgb::new(0x7f, 0x7f, 0x7f)),
    AdaptiveColor::new(Rgb::new(0xf2, 0xbe, 0x45), Rgb::new(0x7f, 0x7f, 0x7f)),
    AdaptiveColor::new(Rgb::new(0x62, 0x2a, 0x1d), Rgb::new(0x7f, 0x7f, 0x7f)),
    AdaptiveColor::new(Rgb::new(0x88, 0xad, 0xa6), Rgb::new(0x7f, 0x7f, 0x7f)),
    AdaptiveColor::new(Rgb::new(0x30, 0xd7, 0xeb), Rgb::new(0x7f, 0x7f, 0x7f)),
    AdaptiveColor::new(Rgb::new(0x4b, 0x5c, 0xc4), Rgb::new(0x7f, 0x7f, 0x7f)),
];

/// Built-in themes for every role.
///
/// The key color is drawn at random from a small palette, so separate
/// handlers in one process tend to be told apart at a glance.
pub fn default_themes(dark_background: bool) -> Themes {
    let adaptive = |light: Rgb, dark: Rgb| ThemeBuilder::new(dark_background).foreground(light, dark);
    let key = KEY_PALETTE
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(KEY_PALETTE[0]);

    let mut themes = Themes::new();
    themes.insert(
        ThemeRole::Time,
        Arc::new(adaptive(Rgb::new(0x60, 0x85, 0xb9), Rgb::new(0x7d, 0x46, 0x7c)).format()),
    );
    themes.insert(
        ThemeRole::Debug,
        Arc::new(adaptive(Rgb::new(0x47, 0x46, 0xff), Rgb::new(0x2f, 0x81, 0xff)).bold().format()),
    );
    themes.insert(
        ThemeRole::Info,
        Arc::new(adaptive(Rgb::new(0x00, 0x9a, 0xdc), Rgb::new(0x00, 0xff, 0xd5)).bold().format()),
    );
    themes.insert(
        ThemeRole::Warn,
        Arc::new(adaptive(Rgb::new(0xe1, 0x6c, 0x00), Rgb::new(0xff, 0x9c, 0x01)).bold().format()),
    );
    themes.insert(
        ThemeRole::Error,
        Arc::new(adaptive(Rgb::new(0xff, 0x00, 0x0a), Rgb::new(0xff, 0x4f, 0x86)).bold().format()),
    );
    themes.insert(
        ThemeRole::Prefix,
        Arc::new(adaptive(Rgb::new(0x57, 0x91, 0x59), Rgb::new(0x00, 0x87, 0x08)).bold().format()),
    );
    themes.insert(
        ThemeRole::Caller,
        Arc::new(adaptive(Rgb::new(0x9d, 0x86, 0xb9), Rgb::new(0x2f, 0x69, 0x82)).format()),
    );
    themes.insert(ThemeRole::Key, Arc::new(adaptive(key.light, key.dark).format()));
    themes.insert(ThemeRole::Bracket, Arc::new(Theme::bold()));
    themes
}

/// Guess the terminal background from `COLORFGBG` (`"fg;bg"`).
///
/// Terminals that do not set it are assumed dark.
pub fn has_dark_background() -> bool {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|value| parse_colorfgbg(&value))
        .unwrap_or(true)
}

fn parse_colorfgbg(value: &str) -> Option<bool> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(matches!(bg, 0..=6 | 8))
}
