//! Dark/light recoloring of live materials.

use serde::{Deserialize, Serialize};

use crate::scene::{Color, Material, Role};

/// Storage key holding the persisted theme flag.
pub const THEME_STORAGE_KEY: &str = "theme";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark(is_dark: bool) -> Self {
        if is_dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    pub fn toggled(self) -> Self {
        Self::from_dark(!self.is_dark())
    }

    /// Decode the persisted flag; anything but `"dark"` is light.
    pub fn from_stored(value: Option<&str>) -> Self {
        Self::from_dark(value == Some("dark"))
    }

    pub fn as_stored(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeColors {
    pub light: Color,
    pub dark: Color,
}

impl ThemeColors {
    pub const fn new(light: u32, dark: u32) -> Self {
        Self { light: Color(light), dark: Color(dark) }
    }

    pub fn pick(&self, theme: Theme) -> Color {
        match theme {
            Theme::Light => self.light,
            Theme::Dark => self.dark,
        }
    }
}

/// Fixed per-widget color table keyed by role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub primary: ThemeColors,
    pub accent: ThemeColors,
}

impl Palette {
    pub const fn single(colors: ThemeColors) -> Self {
        Self { primary: colors, accent: colors }
    }

    pub fn color(&self, role: Role, theme: Theme) -> Color {
        match role {
            Role::Primary => self.primary.pick(theme),
            Role::Accent => self.accent.pick(theme),
        }
    }
}

/// Reassign every material's color for `theme`. Geometry is not touched.
pub fn apply_theme(materials: &mut [Material], palette: &Palette, theme: Theme) {
    for m in materials {
        m.color = palette.color(m.role, theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PALETTE: Palette = Palette {
        primary: ThemeColors::new(0x0f0f0f, 0xf6f3f0),
        accent: ThemeColors::new(0x0036fe, 0xfec800),
    };

    #[test]
    fn stored_flag_round_trips() {
        assert_eq!(Theme::from_stored(Some("dark")), Theme::Dark);
        assert_eq!(Theme::from_stored(Some("light")), Theme::Light);
        assert_eq!(Theme::from_stored(Some("DARK")), Theme::Light);
        assert_eq!(Theme::from_stored(None), Theme::Light);
        assert_eq!(Theme::Dark.as_stored(), "dark");
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
    }

    #[test]
    fn materials_follow_their_role() {
        let mut mats = vec![
            Material { role: Role::Primary, color: Color(0) },
            Material { role: Role::Accent, color: Color(0) },
            Material { role: Role::Primary, color: Color(0) },
        ];
        apply_theme(&mut mats, &PALETTE, Theme::Dark);
        assert_eq!(mats[0].color, Color(0xf6f3f0));
        assert_eq!(mats[1].color, Color(0xfec800));
        apply_theme(&mut mats, &PALETTE, Theme::Light);
        assert_eq!(mats[1].color, Color(0x0036fe));
        assert_eq!(mats[2].color, Color(0x0f0f0f));
    }
}
