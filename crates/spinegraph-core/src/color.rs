use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::from_hex(0xffffff);
    /// Fallback for anything outside the emotion vocabulary.
    pub const NEUTRAL: Color = Color::from_hex(0xcccccc);

    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as u8,
            g: ((hex >> 8) & 0xff) as u8,
            b: (hex & 0xff) as u8,
        }
    }

    pub fn to_hex(self) -> u32 {
        (u32::from(self.r) << 16) | (u32::from(self.g) << 8) | u32::from(self.b)
    }

    /// Accepts `#rrggbb` or `rrggbb`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let digits = s.strip_prefix('#').unwrap_or(s);
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_hex)
    }

    /// Tint toward white: 0 keeps the color, 1 yields white.
    pub fn lighten(self, factor: f32) -> Self {
        let f = if factor.is_finite() {
            factor.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let mix = |c: u8| -> u8 {
            let c = f32::from(c);
            (c + (255.0 - c) * f).round().clamp(0.0, 255.0) as u8
        };
        Self {
            r: mix(self.r),
            g: mix(self.g),
            b: mix(self.b),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

impl TryFrom<String> for Color {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Color::parse(&s).ok_or_else(|| format!("invalid color: {s}"))
    }
}

pub fn lighten(color: Color, factor: f32) -> Color {
    color.lighten(factor)
}

/// Closed vocabulary of primary emotions that carry their own color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Emotion {
    Dread,
    Horror,
    Betrayal,
    Anger,
    Revenge,
    Revulsion,
    Humiliation,
    Grief,
    Despair,
    Loneliness,
    Foreboding,
    Unease,
    Anxiety,
    Bittersweet,
    Desperation,
    Hope,
    Wonder,
    Relief,
    Anticipation,
    Curiosity,
    Awe,
    Tension,
    Shock,
    Warmth,
    Other,
}

impl Emotion {
    pub const ALL: [Emotion; 25] = [
        Emotion::Dread,
        Emotion::Horror,
        Emotion::Betrayal,
        Emotion::Anger,
        Emotion::Revenge,
        Emotion::Revulsion,
        Emotion::Humiliation,
        Emotion::Grief,
        Emotion::Despair,
        Emotion::Loneliness,
        Emotion::Foreboding,
        Emotion::Unease,
        Emotion::Anxiety,
        Emotion::Bittersweet,
        Emotion::Desperation,
        Emotion::Hope,
        Emotion::Wonder,
        Emotion::Relief,
        Emotion::Anticipation,
        Emotion::Curiosity,
        Emotion::Awe,
        Emotion::Tension,
        Emotion::Shock,
        Emotion::Warmth,
        Emotion::Other,
    ];

    /// Total over all strings: unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "dread" => Emotion::Dread,
            "horror" => Emotion::Horror,
            "betrayal" => Emotion::Betrayal,
            "anger" => Emotion::Anger,
            "revenge" => Emotion::Revenge,
            "revulsion" => Emotion::Revulsion,
            "humiliation" => Emotion::Humiliation,
            "grief" => Emotion::Grief,
            "despair" => Emotion::Despair,
            "loneliness" => Emotion::Loneliness,
            "foreboding" => Emotion::Foreboding,
            "unease" => Emotion::Unease,
            "anxiety" => Emotion::Anxiety,
            "bittersweet" => Emotion::Bittersweet,
            "desperation" => Emotion::Desperation,
            "hope" => Emotion::Hope,
            "wonder" => Emotion::Wonder,
            "relief" => Emotion::Relief,
            "anticipation" => Emotion::Anticipation,
            "curiosity" => Emotion::Curiosity,
            "awe" => Emotion::Awe,
            "tension" => Emotion::Tension,
            "shock" => Emotion::Shock,
            "warmth" => Emotion::Warmth,
            _ => Emotion::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Emotion::Dread => "dread",
            Emotion::Horror => "horror",
            Emotion::Betrayal => "betrayal",
            Emotion::Anger => "anger",
            Emotion::Revenge => "revenge",
            Emotion::Revulsion => "revulsion",
            Emotion::Humiliation => "humiliation",
            Emotion::Grief => "grief",
            Emotion::Despair => "despair",
            Emotion::Loneliness => "loneliness",
            Emotion::Foreboding => "foreboding",
            Emotion::Unease => "unease",
            Emotion::Anxiety => "anxiety",
            Emotion::Bittersweet => "bittersweet",
            Emotion::Desperation => "desperation",
            Emotion::Hope => "hope",
            Emotion::Wonder => "wonder",
            Emotion::Relief => "relief",
            Emotion::Anticipation => "anticipation",
            Emotion::Curiosity => "curiosity",
            Emotion::Awe => "awe",
            Emotion::Tension => "tension",
            Emotion::Shock => "shock",
            Emotion::Warmth => "warmth",
            Emotion::Other => "other",
        }
    }

    pub fn color(self) -> Color {
        let hex = match self {
            // reds: fear, horror, anger, betrayal, revenge
            Emotion::Dread => 0xc41e3a,
            Emotion::Horror => 0xff1744,
            Emotion::Betrayal => 0xd32f2f,
            Emotion::Anger => 0xf57c00,
            Emotion::Revenge => 0xb71c1c,
            Emotion::Revulsion => 0xa81a4a,
            Emotion::Humiliation => 0xc2185b,
            // purples and blues
            Emotion::Grief => 0x7b1fa2,
            Emotion::Despair => 0x512da8,
            Emotion::Loneliness => 0x673ab7,
            Emotion::Foreboding => 0x1a237e,
            Emotion::Unease => 0x0277bd,
            Emotion::Anxiety => 0x01579b,
            Emotion::Bittersweet => 0x6a1b9a,
            Emotion::Desperation => 0x4527a0,
            // cool, calmer moments
            Emotion::Hope => 0x00695c,
            Emotion::Wonder => 0x00838f,
            Emotion::Relief => 0x0288d1,
            Emotion::Anticipation => 0x0097a7,
            Emotion::Curiosity => 0x1976d2,
            // muted warm
            Emotion::Awe => 0x8b6f47,
            Emotion::Tension => 0x9c6c27,
            Emotion::Shock => 0xf9a825,
            Emotion::Warmth => 0xd4863e,
            Emotion::Other => return Color::NEUTRAL,
        };
        Color::from_hex(hex)
    }
}

pub fn resolve_color(category: &str) -> Color {
    Emotion::from_label(category).color()
}
