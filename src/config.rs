use crate::{
    metronome_back::{clamp_volume, Bpm, Subdivision},
    theme::Theme,
};
use log::{info, warn};
use serde::{Deserialize, Deserializer};
use std::{
    fs::read_to_string,
    io,
    path::{Path, PathBuf},
    sync::LazyLock,
};

pub const CONFIG_PATH_VAR: &str = "GENERIC_METRONOME_CONFIG";

pub static CONFIG_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    std::env::var_os(CONFIG_PATH_VAR)
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|dir| dir.join("generic_metronome.toml")))
});

/// startup settings; the metronome never writes them back
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub bpm: Bpm,
    pub subdivision: Subdivision,
    /// between 0.0 and 1.0
    #[serde(deserialize_with = "volume")]
    pub volume: f32,
    /// replaces the bundled click
    pub click_sound: Option<PathBuf>,
    /// name of the output device, the default device is used if unset or not found
    pub output_device: Option<String>,
    pub theme: Theme,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bpm: Bpm::default(),
            subdivision: Subdivision::default(),
            volume: 1.0,
            click_sound: None,
            output_device: None,
            theme: Theme::default(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn read() -> Self {
        CONFIG_PATH
            .as_deref()
            .map_or_else(Self::default, Self::read_from)
    }

    #[must_use]
    pub fn read_from(path: &Path) -> Self {
        let config = match read_to_string(path) {
            Ok(config) => config,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                warn!("failed to read {}: {err}", path.display());
                return Self::default();
            }
        };

        match Self::parse(&config) {
            Ok(config) => {
                info!("loaded config from {}", path.display());
                config
            }
            Err(err) => {
                warn!("ignoring malformed config {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn parse(config: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(config)
    }
}

fn volume<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    f32::deserialize(deserializer).map(clamp_volume)
}
