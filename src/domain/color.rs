/// RGB color values and the random generators behind targets and decoys.
///
/// Colors compare structurally on their three channels. The `rgb(r, g, b)`
/// text form exists for display and for parsing user-supplied colors; it is
/// never used as an identity.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use thiserror::Error;

/// Default spread for near-miss decoys: each channel moves by at most half of it.
pub const DEFAULT_VARIATION: u8 = 30;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    /// Perceived brightness (Rec. 601 weights), 0..=255.
    /// The renderer uses it to pick a readable label color on a swatch.
    pub fn luma(self) -> u8 {
        let y = 0.299 * f32::from(self.r) + 0.587 * f32::from(self.g) + 0.114 * f32::from(self.b);
        y.round().clamp(0.0, 255.0) as u8
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("expected `rgb(r, g, b)` or `#rrggbb`, got {0:?}")]
    Format(String),
    #[error("channel {0:?} is not an integer in 0..=255")]
    Channel(String),
}

impl FromStr for Color {
    type Err = ColorParseError;

    /// Accepts `rgb(r, g, b)` (any case, any spacing) and `#rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();

        if let Some(hex) = text.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(ColorParseError::Format(s.to_string()));
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16)
                    .map_err(|_| ColorParseError::Channel(hex[i..i + 2].to_string()))
            };
            return Ok(Color::new(channel(0)?, channel(2)?, channel(4)?));
        }

        let lower = text.to_ascii_lowercase();
        let inner = lower
            .strip_prefix("rgb")
            .map(str::trim_start)
            .and_then(|rest| rest.strip_prefix('('))
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| ColorParseError::Format(s.to_string()))?;

        let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
        if parts.len() != 3 {
            return Err(ColorParseError::Format(s.to_string()));
        }
        let mut channels = [0u8; 3];
        for (slot, part) in channels.iter_mut().zip(&parts) {
            *slot = part
                .parse::<u8>()
                .map_err(|_| ColorParseError::Channel((*part).to_string()))?;
        }
        Ok(Color::new(channels[0], channels[1], channels[2]))
    }
}

// ── Generators ──

/// A color with every channel drawn uniformly from 0..=255.
pub fn random_color<R: Rng + ?Sized>(rng: &mut R) -> Color {
    Color::new(rng.gen(), rng.gen(), rng.gen())
}

/// A near-miss of `base`: each channel shifted by a uniform offset in
/// `-variation/2 ..= variation/2`, rounded and clamped to 0..=255.
pub fn similar_color<R: Rng + ?Sized>(base: Color, variation: u8, rng: &mut R) -> Color {
    let half = f64::from(variation) / 2.0;
    Color::new(
        jitter_channel(base.r, half, rng),
        jitter_channel(base.g, half, rng),
        jitter_channel(base.b, half, rng),
    )
}

/// Like [`similar_color`], but for a textual base. Anything that does not
/// parse as a color yields a fresh random color instead of an error.
pub fn similar_color_str<R: Rng + ?Sized>(base: &str, variation: u8, rng: &mut R) -> Color {
    match base.parse::<Color>() {
        Ok(color) => similar_color(color, variation, rng),
        Err(e) => {
            tracing::debug!(%e, "unparsable base color, falling back to random");
            random_color(rng)
        }
    }
}

fn jitter_channel<R: Rng + ?Sized>(channel: u8, half: f64, rng: &mut R) -> u8 {
    let offset = if half > 0.0 { rng.gen_range(-half..=half) } else { 0.0 };
    (f64::from(channel) + offset).round().clamp(0.0, 255.0) as u8
}
