use crate::camera::{DEFAULT_ALTITUDE, MAX_ALTITUDE, MIN_ALTITUDE};
use crate::settings::Settings;

/// Runtime options for the interactive explorer
#[derive(Debug, Clone)]
pub struct ExploreConfig {
    pub time_step: f32,
    pub altitude: f32,
    pub auto_rotate: bool,
    pub auto_rotate_speed: f32,
    pub color_scheme: u8,
    pub seed: Option<u64>,
    pub earth_viewer_url: String,
    pub borders_url: String,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl ExploreConfig {
    /// Start from the `[globe]` settings; CLI flags are layered on by the caller
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            time_step: 0.03,
            altitude: DEFAULT_ALTITUDE,
            auto_rotate: true,
            auto_rotate_speed: settings.globe.auto_rotate_speed,
            color_scheme: settings.globe.color_scheme,
            seed: None,
            earth_viewer_url: settings.globe.earth_viewer_url.clone(),
            borders_url: settings.globe.borders_url.clone(),
        }
    }

    pub fn with_altitude(mut self, altitude: f32) -> Self {
        self.altitude = altitude.clamp(MIN_ALTITUDE, MAX_ALTITUDE);
        self
    }

    pub fn with_time_step(mut self, time_step: f32) -> Self {
        self.time_step = time_step.clamp(0.005, 0.5);
        self
    }
}
