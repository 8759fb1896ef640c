//! Static theme registry.
//!
//! The available set is fixed at build time; preference records refer to a
//! theme by id and unknown ids resolve to the default on read.

#[cfg(test)]
#[path = "themes_test.rs"]
mod themes_test;

/// Named colors a theme exposes to the UI layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub surface: &'static str,
    pub text: &'static str,
    pub muted: &'static str,
    pub accent: &'static str,
    pub border: &'static str,
}

/// One selectable theme. Immutable at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeDefinition {
    pub id: &'static str,
    pub label: &'static str,
    pub dark: bool,
    pub palette: Palette,
}

/// Theme applied to brand-new identities and substituted for unknown ids.
pub const DEFAULT_THEME_ID: &str = "dark";

pub static THEMES: [ThemeDefinition; 6] = [
    ThemeDefinition {
        id: "dark",
        label: "Dark",
        dark: true,
        palette: Palette {
            background: "#16181d",
            surface: "#1f232b",
            text: "#e8e6e3",
            muted: "#8b919c",
            accent: "#4f8cc9",
            border: "#2c313a",
        },
    },
    ThemeDefinition {
        id: "light",
        label: "Light",
        dark: false,
        palette: Palette {
            background: "#f6f2ef",
            surface: "#ffffff",
            text: "#1f1a17",
            muted: "#6f6a66",
            accent: "#2f6f9f",
            border: "#d9d3cd",
        },
    },
    ThemeDefinition {
        id: "ocean",
        label: "Ocean",
        dark: true,
        palette: Palette {
            background: "#0b1d26",
            surface: "#122a36",
            text: "#d7e7ee",
            muted: "#7799a8",
            accent: "#38b2ac",
            border: "#1d3a48",
        },
    },
    ThemeDefinition {
        id: "forest",
        label: "Forest",
        dark: true,
        palette: Palette {
            background: "#101810",
            surface: "#18241a",
            text: "#dde8da",
            muted: "#86977f",
            accent: "#6fae4f",
            border: "#24331f",
        },
    },
    ThemeDefinition {
        id: "sunset",
        label: "Sunset",
        dark: false,
        palette: Palette {
            background: "#fbf1e6",
            surface: "#fff8f0",
            text: "#3a2620",
            muted: "#96705c",
            accent: "#d1662b",
            border: "#ecd9c6",
        },
    },
    ThemeDefinition {
        id: "midnight",
        label: "Midnight",
        dark: true,
        palette: Palette {
            background: "#0a0a12",
            surface: "#12121f",
            text: "#d8d8e8",
            muted: "#77778c",
            accent: "#8468d9",
            border: "#1e1e30",
        },
    },
];

/// Look up a theme by id.
pub fn find(id: &str) -> Option<&'static ThemeDefinition> {
    THEMES.iter().find(|theme| theme.id == id)
}

/// The default theme. Present in [`THEMES`] by construction.
pub fn default_theme() -> &'static ThemeDefinition {
    find(DEFAULT_THEME_ID).unwrap_or(&THEMES[0])
}
