use serde::Serialize;

use pilotsync_api::protocol::{Rgb, SettingsPayload, Theme};

/// Name of the theme selected before the backend says otherwise.
pub const DEFAULT_THEME: &str = "sherbet";

/// User preferences and the theme catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub version: String,
    /// 24-hour clock.
    pub tf_hour_time: bool,
    pub metric_units: bool,
    pub phone_enabled: bool,
    pub vehicle_enabled: bool,
    pub selected_theme: String,
    /// Route shown on startup.
    pub home: Option<String>,
    pub themes: Vec<Theme>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: "0.0.0".into(),
            tf_hour_time: false,
            metric_units: false,
            phone_enabled: false,
            vehicle_enabled: false,
            selected_theme: DEFAULT_THEME.into(),
            home: None,
            themes: default_themes(),
        }
    }
}

impl Settings {
    pub fn theme(&self, name: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.name == name)
    }

    /// A full settings payload for writing back to the backend.
    ///
    /// `version` is left out: it belongs to the backend.
    pub fn to_payload(&self) -> SettingsPayload {
        SettingsPayload {
            version: None,
            tf_hour_time: Some(self.tf_hour_time),
            metric_units: Some(self.metric_units),
            phone_enabled: Some(self.phone_enabled),
            vehicle_enabled: Some(self.vehicle_enabled),
            selected_theme: Some(self.selected_theme.clone()),
            home: Some(self.home.clone()),
            themes: Some(self.themes.clone()),
        }
    }
}

/// The built-in theme catalog.
pub fn default_themes() -> Vec<Theme> {
    vec![
        Theme {
            name: "sherbet".into(),
            accent: Rgb::new(182, 215, 168),
            primary: Rgb::new(234, 153, 153),
            secondary: Rgb::new(249, 203, 156),
        },
        Theme {
            name: "dark".into(),
            accent: Rgb::new(131, 52, 45),
            primary: Rgb::new(28, 30, 33),
            secondary: Rgb::new(215, 208, 200),
        },
        Theme {
            name: "light".into(),
            accent: Rgb::new(221, 113, 98),
            primary: Rgb::new(236, 241, 250),
            secondary: Rgb::new(112, 121, 137),
        },
    ]
}
