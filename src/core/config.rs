//! Scene configuration.
//!
//! One configuration drives the whole scene: the marker list, the marker
//! material table, the visualizer preset and the remote service settings.
//! `SceneConfig::default()` is the shipped location library; a page can
//! override any part of it with JSON.

use crate::core::constants::{DEFAULT_TRIAL_ALLOWANCE, ENERGETIC_GAIN, SUBTLE_GAIN};
use crate::core::marker::{MarkerVisualState, MaterialState};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid scene config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("scene config has no markers")]
    NoMarkers,
    #[error("duplicate marker location key: {0}")]
    DuplicateLocation(String),
    #[error("invalid color {0:?} (expected #rrggbb)")]
    InvalidColor(String),
}

/// One clickable location on the globe.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarkerDef {
    pub lat: f32,
    pub lng: f32,
    pub title: String,
    /// Location key; doubles as the track identifier.
    pub location: String,
    /// Audio URL, absolute or relative to the page.
    pub audio: String,
}

impl MarkerDef {
    fn new(lat: f32, lng: f32, title: &str, location: &str, audio: &str) -> Self {
        Self {
            lat,
            lng,
            title: title.to_string(),
            location: location.to_string(),
            audio: audio.to_string(),
        }
    }
}

/// Target appearance for each marker visual state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialStateTable {
    pub default: MaterialState,
    pub hover: MaterialState,
    pub active: MaterialState,
}

impl MaterialStateTable {
    pub fn get(&self, state: MarkerVisualState) -> &MaterialState {
        match state {
            MarkerVisualState::Default => &self.default,
            MarkerVisualState::Hover => &self.hover,
            MarkerVisualState::Active => &self.active,
        }
    }
}

impl Default for MaterialStateTable {
    fn default() -> Self {
        Self {
            default: MaterialState::new("#FF4B6C", 0.8, 1.0),
            hover: MaterialState::new("#FFFFFF", 1.0, 1.5),
            active: MaterialState::new("#FFD700", 1.0, 1.8),
        }
    }
}

/// Bar visualizer tuning: "subtle" and "energetic" differ in gain and palette.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualPreset {
    #[default]
    Subtle,
    Energetic,
}

impl VisualPreset {
    pub fn gain(self) -> f32 {
        match self {
            VisualPreset::Subtle => SUBTLE_GAIN,
            VisualPreset::Energetic => ENERGETIC_GAIN,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ApiConfig {
    /// Prefix for `/api/user/*`; empty means same origin.
    pub base_url: String,
    /// Use the in-process user directory instead of the remote service.
    pub offline: bool,
    pub trial_allowance: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            offline: false,
            trial_allowance: DEFAULT_TRIAL_ALLOWANCE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneConfig {
    pub markers: Vec<MarkerDef>,
    pub material_states: MaterialStateTable,
    pub preset: VisualPreset,
    pub api: ApiConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            markers: vec![
                MarkerDef::new(48.8566, 2.3522, "6am in Paris", "paris", "/paris.mp3"),
                MarkerDef::new(51.5074, -0.1278, "memory lane", "london", "/memorylane.mp3"),
                MarkerDef::new(38.7223, -9.1393, "summer in lisbon", "lisbon", "/lisbon.mp3"),
                MarkerDef::new(
                    40.6782,
                    -73.9442,
                    "bushwick yacht club",
                    "bushwick",
                    "/yachtclub.mp3",
                ),
                MarkerDef::new(
                    37.8044,
                    -122.2712,
                    "somewhere out in oakland",
                    "oakland",
                    "/oakland.mp3",
                ),
                MarkerDef::new(-33.8688, 151.2093, "skyclub", "sydney", "/skyclub.mp3"),
            ],
            material_states: MaterialStateTable::default(),
            preset: VisualPreset::default(),
            api: ApiConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Parse a (possibly partial) JSON override; missing fields keep defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: SceneConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.markers.is_empty() {
            return Err(ConfigError::NoMarkers);
        }
        for (i, m) in self.markers.iter().enumerate() {
            if self.markers[..i].iter().any(|o| o.location == m.location) {
                return Err(ConfigError::DuplicateLocation(m.location.clone()));
            }
        }
        for state in [
            &self.material_states.default,
            &self.material_states.hover,
            &self.material_states.active,
        ] {
            state.rgb()?;
        }
        Ok(())
    }
}
