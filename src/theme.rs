use serde::{Deserialize, Serialize};

/// Opaque sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Relative luminance in `[0, 1]`, Rec. 709 weights.
    pub fn luminance(&self) -> f32 {
        (0.2126 * self.r as f32 + 0.7152 * self.g as f32 + 0.0722 * self.b as f32) / 255.0
    }

    pub fn is_dark(&self) -> bool {
        self.luminance() < 0.5
    }
}

pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
pub const BLACK: Rgb = Rgb::new(0x00, 0x00, 0x00);

/// Link blue tuned for light backgrounds.
const LINK_ON_LIGHT: Rgb = Rgb::new(0x1E, 0x88, 0xE5);
/// Lighter link blue for dark/inverted backgrounds.
const LINK_ON_DARK: Rgb = Rgb::new(0x64, 0xB5, 0xF6);

/// Alpha for the selection highlight fill, out of 255. Kept low so the
/// text stays legible through the highlight on e-ink grayscale.
pub const SELECTION_ALPHA: u8 = 40;

/// Background and foreground pair for one display mode. Derived colors
/// (links, highlight, magnifier chrome) follow from the pair's luminance,
/// so inverted night mode needs no separate palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderTheme {
    pub background: Rgb,
    pub text: Rgb,
}

impl Default for ReaderTheme {
    fn default() -> Self {
        Self {
            background: WHITE,
            text: BLACK,
        }
    }
}

impl ReaderTheme {
    pub fn inverted() -> Self {
        Self {
            background: BLACK,
            text: WHITE,
        }
    }

    pub fn link_color(&self) -> Rgb {
        if self.background.is_dark() {
            LINK_ON_DARK
        } else {
            LINK_ON_LIGHT
        }
    }

    /// Selection fill and handle color.
    pub fn accent_color(&self) -> Rgb {
        self.link_color()
    }

    /// Border ring of the drag magnifier.
    pub fn magnifier_ring_color(&self) -> Rgb {
        if self.background.is_dark() {
            Rgb::new(0x55, 0x55, 0x55)
        } else {
            Rgb::new(0xCC, 0xCC, 0xCC)
        }
    }

    /// Card fill behind block quotes, a slight tint of the background.
    pub fn quote_card_color(&self) -> Rgb {
        if self.background.is_dark() {
            Rgb::new(0x20, 0x20, 0x20)
        } else {
            Rgb::new(0xF2, 0xF2, 0xF2)
        }
    }

    /// Accent bar along the left edge of a block quote.
    pub fn quote_bar_color(&self) -> Rgb {
        if self.background.is_dark() {
            Rgb::new(0x88, 0x88, 0x88)
        } else {
            Rgb::new(0x9E, 0x9E, 0x9E)
        }
    }
}
