// ── Theme resolution ──
//
// Looks a theme up by name and pairs each background color with the
// black or white text color that stays legible on it.

use serde::Serialize;

use pilotsync_api::protocol::{Rgb, Theme};

use crate::error::CoreError;

/// Contrast text color class for a background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Contrast {
    /// Black text; the background is bright.
    Dark,
    /// White text; the background is dim.
    Light,
}

impl Contrast {
    /// Classify a background by perceived luminance.
    ///
    /// `0.299 R + 0.587 G + 0.114 B > 186` selects dark text. Weights are
    /// scaled to integers so the threshold is exact.
    pub fn of(color: Rgb) -> Self {
        let weighted =
            299 * u32::from(color.r) + 587 * u32::from(color.g) + 114 * u32::from(color.b);
        if weighted > 186_000 { Self::Dark } else { Self::Light }
    }

    /// The text color itself.
    pub const fn color(self) -> Rgb {
        match self {
            Self::Dark => Rgb::BLACK,
            Self::Light => Rgb::WHITE,
        }
    }

    /// Icons are drawn black; they need inverting over a dim background.
    pub const fn invert_icons(self) -> bool {
        matches!(self, Self::Light)
    }

    /// CSS `filter` value for icons drawn on this background.
    pub const fn icon_filter(self) -> &'static str {
        if self.invert_icons() { "invert(100%)" } else { "invert(0%)" }
    }
}

/// Perceived luminance on the 0–255 scale.
pub fn luminance(color: Rgb) -> f64 {
    0.299 * f64::from(color.r) + 0.587 * f64::from(color.g) + 0.114 * f64::from(color.b)
}

/// A theme with its contrast pairs worked out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedTheme {
    pub name: String,
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
    pub primary_contrast: Contrast,
    pub secondary_contrast: Contrast,
}

impl ResolvedTheme {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            name: theme.name.clone(),
            primary: theme.primary,
            secondary: theme.secondary,
            accent: theme.accent,
            primary_contrast: Contrast::of(theme.primary),
            secondary_contrast: Contrast::of(theme.secondary),
        }
    }

    /// CSS custom properties for the theme, as `(name, value)` pairs.
    pub fn css_variables(&self) -> [(&'static str, String); 5] {
        [
            ("--accent-color", self.accent.to_string()),
            ("--primary-color", self.primary.to_string()),
            ("--secondary-color", self.secondary.to_string()),
            ("--primary-lumin", self.primary_contrast.color().to_string()),
            ("--secondary-lumin", self.secondary_contrast.color().to_string()),
        ]
    }
}

/// Find `name` in `catalog` and compute its contrast pairs.
pub fn resolve(name: &str, catalog: &[Theme]) -> Result<ResolvedTheme, CoreError> {
    catalog
        .iter()
        .find(|theme| theme.name == name)
        .map(ResolvedTheme::from_theme)
        .ok_or_else(|| CoreError::ThemeNotFound { name: name.into() })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::default_themes;
    use pretty_assertions::assert_eq;

    fn gray(level: u8) -> Rgb {
        Rgb::new(level, level, level)
    }

    #[test]
    fn threshold_is_strictly_greater_than_186() {
        assert_eq!(Contrast::of(gray(186)), Contrast::Light);
        assert_eq!(Contrast::of(gray(187)), Contrast::Dark);
        assert!((luminance(gray(186)) - 186.0).abs() < 1e-9);
    }

    #[test]
    fn extremes() {
        assert_eq!(Contrast::of(Rgb::BLACK), Contrast::Light);
        assert_eq!(Contrast::of(Rgb::WHITE), Contrast::Dark);
        assert_eq!(Contrast::Dark.color(), Rgb::BLACK);
        assert!(Contrast::Light.invert_icons());
        assert_eq!(Contrast::Dark.icon_filter(), "invert(0%)");
    }

    #[test]
    fn resolves_builtin_dark_theme() {
        let theme = resolve("dark", &default_themes()).unwrap();
        assert_eq!(theme.primary, Rgb::new(28, 30, 33));
        assert_eq!(theme.primary_contrast, Contrast::Light);
        assert_eq!(theme.secondary_contrast, Contrast::Dark);
    }

    #[test]
    fn css_variables_use_rgb_function() {
        let theme = resolve("light", &default_themes()).unwrap();
        let vars = theme.css_variables();
        assert_eq!(vars[0], ("--accent-color", "rgb(221,113,98)".to_owned()));
        assert_eq!(vars[3], ("--primary-lumin", "rgb(0,0,0)".to_owned()));
        assert_eq!(vars[4], ("--secondary-lumin", "rgb(255,255,255)".to_owned()));
    }

    #[test]
    fn unknown_theme_is_an_error() {
        let err = resolve("neon", &default_themes()).unwrap_err();
        assert!(matches!(err, CoreError::ThemeNotFound { ref name } if name == "neon"));
    }
}
