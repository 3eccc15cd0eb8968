//! Condition code to visual theme mapping.
//!
//! A static, ordered table of inclusive code ranges. The first range that
//! contains the code wins; codes outside every range get the fallback theme,
//! so classification is total.

use serde::Serialize;

use crate::types::ConditionCode;

/// Symbolic icon name, resolved to a renderable asset by the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IconId {
    CloudLightning,
    CloudDrizzle,
    CloudRain,
    CloudSnow,
    Eye,
    Sun,
    CloudSun,
    Cloud,
    Wind,
}

impl IconId {
    pub fn name(self) -> &'static str {
        match self {
            Self::CloudLightning => "cloud_lightning",
            Self::CloudDrizzle => "cloud_drizzle",
            Self::CloudRain => "cloud_rain",
            Self::CloudSnow => "cloud_snow",
            Self::Eye => "eye",
            Self::Sun => "sun",
            Self::CloudSun => "cloud_sun",
            Self::Cloud => "cloud",
            Self::Wind => "wind",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorStop {
    /// `#rrggbb`
    pub color: &'static str,
    /// Percent along the gradient axis
    pub position: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Gradient {
    pub angle_deg: u16,
    pub stops: &'static [ColorStop],
}

impl Gradient {
    /// Render as a CSS `linear-gradient(...)` value.
    pub fn to_css(&self) -> String {
        let stops = self
            .stops
            .iter()
            .map(|s| format!("{} {}%", s.color, s.position))
            .collect::<Vec<_>>()
            .join(", ");
        format!("linear-gradient({}deg, {})", self.angle_deg, stops)
    }
}

/// Visual and advisory bundle derived from a condition code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ThemeDescriptor {
    pub gradient: Gradient,
    pub accent_primary: &'static str,
    pub accent_secondary: &'static str,
    pub advisory: &'static str,
    pub icon: IconId,
    pub label: &'static str,
}

struct ThemeRule {
    min: ConditionCode,
    max: ConditionCode,
    theme: ThemeDescriptor,
}

/// 135° gradient from `color position` pairs.
macro_rules! diagonal {
    ($($color:literal $position:literal),+ $(,)?) => {
        Gradient {
            angle_deg: 135,
            stops: &[$(ColorStop { color: $color, position: $position }),+],
        }
    };
}

static THEMES: [ThemeRule; 8] = [
    ThemeRule {
        min: 200,
        max: 232,
        theme: ThemeDescriptor {
            gradient: diagonal!("#0a0a1a" 0, "#12122e" 50, "#1a1040" 100),
            accent_primary: "#4f46e5",
            accent_secondary: "#7c3aed",
            advisory: "Restez à l'intérieur, orage imminent ⚡",
            icon: IconId::CloudLightning,
            label: "Orage",
        },
    },
    ThemeRule {
        min: 300,
        max: 321,
        theme: ThemeDescriptor {
            gradient: diagonal!("#1e2d40" 0, "#243447" 50, "#2a3d52" 100),
            accent_primary: "#60a5fa",
            accent_secondary: "#93c5fd",
            advisory: "Un petit imperméable suffit aujourd'hui 🧥",
            icon: IconId::CloudDrizzle,
            label: "Bruine",
        },
    },
    ThemeRule {
        min: 500,
        max: 531,
        theme: ThemeDescriptor {
            gradient: diagonal!("#1a2540" 0, "#1e2d52" 50, "#243360" 100),
            accent_primary: "#3b82f6",
            accent_secondary: "#1d4ed8",
            advisory: "N'oublie pas ton parapluie ☂️",
            icon: IconId::CloudRain,
            label: "Pluie",
        },
    },
    ThemeRule {
        min: 600,
        max: 622,
        theme: ThemeDescriptor {
            gradient: diagonal!("#c8d6e5" 0, "#d8e8f4" 50, "#e8f2fa" 100),
            accent_primary: "#bae6fd",
            accent_secondary: "#e0f2fe",
            advisory: "Chaussures imperméables et gants recommandés 🧤",
            icon: IconId::CloudSnow,
            label: "Neige",
        },
    },
    // Mist, smoke, haze, dust, fog, ash, squalls, tornado
    ThemeRule {
        min: 700,
        max: 781,
        theme: ThemeDescriptor {
            gradient: diagonal!("#4b5563" 0, "#6b7280" 50, "#9ca3af" 100),
            accent_primary: "#d1d5db",
            accent_secondary: "#9ca3af",
            advisory: "Visibilité réduite, conduisez prudemment 🌫️",
            icon: IconId::Eye,
            label: "Brume / Brouillard",
        },
    },
    ThemeRule {
        min: 800,
        max: 800,
        theme: ThemeDescriptor {
            gradient: diagonal!("#0c2e5c" 0, "#1a4a8a" 40, "#2563b8" 100),
            accent_primary: "#fbbf24",
            accent_secondary: "#f59e0b",
            advisory: "Pense à tes lunettes de soleil 🕶️",
            icon: IconId::Sun,
            label: "Ciel dégagé",
        },
    },
    ThemeRule {
        min: 801,
        max: 802,
        theme: ThemeDescriptor {
            gradient: diagonal!("#1a3a5c" 0, "#264d73" 50, "#2d5f8a" 100),
            accent_primary: "#93c5fd",
            accent_secondary: "#fbbf24",
            advisory: "Belle journée, profitez-en ! ☀️🌤",
            icon: IconId::CloudSun,
            label: "Partiellement nuageux",
        },
    },
    ThemeRule {
        min: 803,
        max: 804,
        theme: ThemeDescriptor {
            gradient: diagonal!("#374151" 0, "#4b5563" 50, "#6b7280" 100),
            accent_primary: "#9ca3af",
            accent_secondary: "#6b7280",
            advisory: "Ciel couvert, une petite veste s'impose 🧣",
            icon: IconId::Cloud,
            label: "Nuageux",
        },
    },
];

/// Returned when no range matches.
pub static FALLBACK_THEME: ThemeDescriptor = ThemeDescriptor {
    gradient: diagonal!("#1e293b" 0, "#334155" 50, "#475569" 100),
    accent_primary: "#94a3b8",
    accent_secondary: "#64748b",
    advisory: "Vérifiez la météo avant de sortir 🌡️",
    icon: IconId::Wind,
    label: "Inconnu",
};

/// Map a condition code to its theme. Total: unknown codes get [`FALLBACK_THEME`].
pub fn classify(code: ConditionCode) -> &'static ThemeDescriptor {
    THEMES
        .iter()
        .find(|rule| (rule.min..=rule.max).contains(&code))
        .map(|rule| &rule.theme)
        .unwrap_or(&FALLBACK_THEME)
}

/// Advisory text for a condition code.
pub fn advice_for(code: ConditionCode) -> &'static str {
    classify(code).advisory
}

/// True for thunderstorm through snow (`[200, 700)`).
///
/// A plain range check, independent of the theme table: the atmosphere band
/// (700–781) is not included.
pub fn requires_protection(code: ConditionCode) -> bool {
    (200..700).contains(&code)
}
