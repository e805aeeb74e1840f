//! Named weather presets
//!
//! Each preset is defined as a 20-value legacy tuple and passed through the
//! clamping setters, so a preset is always a valid [`WeatherParameters`].
//! Fields missing from the legacy layout keep their defaults.
//!
//! # Example
//!
//! ```
//! use wintersim_core::WeatherPreset;
//!
//! let preset = WeatherPreset::from_name("hard_snow_noon").unwrap();
//! let weather = preset.parameters();
//! assert!(weather.is_snowing());
//! ```

use crate::core_types::weather::WeatherParameters;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Named weather configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeatherPreset {
    /// All sentinel-capable fields left unset
    Default,
    ClearNoon,
    CloudyNoon,
    WetNoon,
    WetCloudyNoon,
    MidRainyNoon,
    HardRainNoon,
    SoftRainNoon,
    ClearSunset,
    CloudySunset,
    WetSunset,
    WetCloudySunset,
    MidRainSunset,
    HardRainSunset,
    SoftRainSunset,
    ClearNight,
    CloudyNight,
    WetNight,
    WetCloudyNight,
    SoftRainNight,
    MidRainyNight,
    HardRainNight,
    WinterMorning,
    WinterNoon,
    WinterCloudyNoon,
    WinterNight,
    SoftSnowNoon,
    MidSnowNoon,
    HardSnowNoon,
    SoftSnowMorning,
    MidSnowMorning,
    HardSnowMorning,
}

// cloud, precip, deposits, wind, azimuth, altitude, fog dens, fog dist, fog fall, wet,
// scattering, mie, rayleigh, snow, temp, ice, psize, humidity, dewpoint, wind dir
#[rustfmt::skip]
const fn legacy_values(preset: WeatherPreset) -> [f32; 20] {
    match preset {
        WeatherPreset::Default =>          [-1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0, -1.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 85.0, 0.0, 15.0],
        WeatherPreset::ClearNoon =>        [15.0, 0.0, 0.0, 0.35, 0.0, 75.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 84.0, 0.0, 35.0],
        WeatherPreset::CloudyNoon =>       [80.0, 0.0, 0.0, 0.35, 0.0, 75.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 88.0, 0.0, 65.0],
        WeatherPreset::WetNoon =>          [20.0, 0.0, 50.0, 0.35, 0.0, 75.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 88.0, 0.0, 95.0],
        WeatherPreset::WetCloudyNoon =>    [80.0, 0.0, 50.0, 0.35, 0.0, 75.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 88.0, 0.0, 115.0],
        WeatherPreset::MidRainyNoon =>     [80.0, 30.0, 50.0, 0.40, 0.0, 75.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 84.0, 0.0, 135.0],
        WeatherPreset::HardRainNoon =>     [90.0, 60.0, 100.0, 1.00, 0.0, 75.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 81.0, 0.0, 155.0],
        WeatherPreset::SoftRainNoon =>     [70.0, 15.0, 50.0, 0.35, 0.0, 75.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 75.0, 0.0, 185.0],
        WeatherPreset::ClearSunset =>      [15.0, 0.0, 0.0, 0.35, 0.0, 15.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 77.0, 0.0, 191.0],
        WeatherPreset::CloudySunset =>     [80.0, 0.0, 0.0, 0.35, 0.0, 15.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 88.0, 0.0, 200.0],
        WeatherPreset::WetSunset =>        [20.0, 0.0, 50.0, 0.35, 0.0, 15.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 88.0, 0.0, 202.0],
        WeatherPreset::WetCloudySunset =>  [90.0, 0.0, 50.0, 0.35, 0.0, 15.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 88.0, 0.0, 13.0],
        WeatherPreset::MidRainSunset =>    [80.0, 30.0, 50.0, 0.40, 0.0, 15.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 88.0, 0.0, 75.0],
        WeatherPreset::HardRainSunset =>   [80.0, 60.0, 100.0, 1.00, 0.0, 15.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 88.0, 0.0, 43.0],
        WeatherPreset::SoftRainSunset =>   [90.0, 15.0, 50.0, 0.35, 0.0, 15.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 88.0, 0.0, 55.0],
        // Night presets: sunset conditions with the sun below the horizon
        WeatherPreset::ClearNight =>       [15.0, 0.0, 0.0, 0.35, 0.0, -90.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 77.0, 0.0, 191.0],
        WeatherPreset::CloudyNight =>      [80.0, 0.0, 0.0, 0.35, 0.0, -90.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 88.0, 0.0, 200.0],
        WeatherPreset::WetNight =>         [20.0, 0.0, 50.0, 0.35, 0.0, -90.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 88.0, 0.0, 202.0],
        WeatherPreset::WetCloudyNight =>   [90.0, 0.0, 50.0, 0.35, 0.0, -90.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 88.0, 0.0, 13.0],
        WeatherPreset::SoftRainNight =>    [90.0, 15.0, 50.0, 0.35, 0.0, -90.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 88.0, 0.0, 55.0],
        WeatherPreset::MidRainyNight =>    [80.0, 30.0, 50.0, 0.40, 0.0, -90.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 88.0, 0.0, 75.0],
        WeatherPreset::HardRainNight =>    [80.0, 60.0, 100.0, 1.00, 0.0, -90.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 0.0, 20.0, 0.0, 0.0, 88.0, 0.0, 43.0],
        WeatherPreset::WinterMorning =>    [0.0, 0.0, 20.0, 0.18, 270.0, 2.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 100.0, -9.4, 0.0, 1.5, 88.0, -19.1, 115.0],
        WeatherPreset::WinterNoon =>       [0.0, 0.0, 20.0, 0.18, 270.0, 75.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 98.0, -14.4, 0.0, 1.5, 88.0, -19.1, 75.0],
        WeatherPreset::WinterCloudyNoon => [100.0, 0.0, 20.0, 0.50, 270.0, 75.0, 29.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 95.0, -17.4, 0.0, 3.5, 88.0, -19.1, 55.0],
        WeatherPreset::WinterNight =>      [0.0, 0.0, 20.0, 0.05, 270.0, -8.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 100.0, -21.4, 0.0, 7.0, 88.0, -19.1, 95.0],
        WeatherPreset::SoftSnowNoon =>     [100.0, 20.0, 10.0, 0.10, 270.0, 75.0, 10.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 77.0, -17.4, 0.0, 5.0, 88.0, -19.1, 35.0],
        WeatherPreset::MidSnowNoon =>      [100.0, 44.0, 34.0, 1.00, 270.0, 75.0, 20.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 91.0, -17.4, 0.0, 0.5, 88.0, -19.1, 75.0],
        WeatherPreset::HardSnowNoon =>     [100.0, 80.0, 80.0, 0.35, 270.0, 75.0, 23.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 99.0, -16.4, 0.0, 2.0, 88.0, -19.1, 25.0],
        WeatherPreset::SoftSnowMorning =>  [20.0, 20.0, 20.0, 0.18, 270.0, 2.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 85.0, -15.4, 0.0, 1.5, 88.0, -19.1, 115.0],
        WeatherPreset::MidSnowMorning =>   [40.0, 51.0, 40.0, 0.35, 270.0, 2.0, 4.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 89.0, -19.4, 0.0, 4.0, 88.0, -19.1, 45.0],
        WeatherPreset::HardSnowMorning =>  [100.0, 82.0, 82.0, 0.20, 270.0, 2.0, 12.0, 0.0, 0.0, 0.0, 1.0, 0.03, 0.0331, 71.0, -13.4, 0.0, 4.5, 88.0, -19.1, 87.0],
    }
}

static PRESETS_BY_NAME: LazyLock<FxHashMap<String, WeatherPreset>> = LazyLock::new(|| {
    WeatherPreset::ALL
        .iter()
        .map(|&preset| (normalize_name(preset.name()), preset))
        .collect()
});

/// Lowercase, alphanumerics only, so `"HardSnowNoon"`, `"hard_snow_noon"`
/// and `"Hard Snow Noon"` all resolve to the same key.
fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl WeatherPreset {
    /// Every preset, in declaration order.
    pub const ALL: &'static [WeatherPreset] = &[
        WeatherPreset::Default,
        WeatherPreset::ClearNoon,
        WeatherPreset::CloudyNoon,
        WeatherPreset::WetNoon,
        WeatherPreset::WetCloudyNoon,
        WeatherPreset::MidRainyNoon,
        WeatherPreset::HardRainNoon,
        WeatherPreset::SoftRainNoon,
        WeatherPreset::ClearSunset,
        WeatherPreset::CloudySunset,
        WeatherPreset::WetSunset,
        WeatherPreset::WetCloudySunset,
        WeatherPreset::MidRainSunset,
        WeatherPreset::HardRainSunset,
        WeatherPreset::SoftRainSunset,
        WeatherPreset::ClearNight,
        WeatherPreset::CloudyNight,
        WeatherPreset::WetNight,
        WeatherPreset::WetCloudyNight,
        WeatherPreset::SoftRainNight,
        WeatherPreset::MidRainyNight,
        WeatherPreset::HardRainNight,
        WeatherPreset::WinterMorning,
        WeatherPreset::WinterNoon,
        WeatherPreset::WinterCloudyNoon,
        WeatherPreset::WinterNight,
        WeatherPreset::SoftSnowNoon,
        WeatherPreset::MidSnowNoon,
        WeatherPreset::HardSnowNoon,
        WeatherPreset::SoftSnowMorning,
        WeatherPreset::MidSnowMorning,
        WeatherPreset::HardSnowMorning,
    ];

    /// Preset name, upper camel case.
    pub fn name(self) -> &'static str {
        match self {
            WeatherPreset::Default => "Default",
            WeatherPreset::ClearNoon => "ClearNoon",
            WeatherPreset::CloudyNoon => "CloudyNoon",
            WeatherPreset::WetNoon => "WetNoon",
            WeatherPreset::WetCloudyNoon => "WetCloudyNoon",
            WeatherPreset::MidRainyNoon => "MidRainyNoon",
            WeatherPreset::HardRainNoon => "HardRainNoon",
            WeatherPreset::SoftRainNoon => "SoftRainNoon",
            WeatherPreset::ClearSunset => "ClearSunset",
            WeatherPreset::CloudySunset => "CloudySunset",
            WeatherPreset::WetSunset => "WetSunset",
            WeatherPreset::WetCloudySunset => "WetCloudySunset",
            WeatherPreset::MidRainSunset => "MidRainSunset",
            WeatherPreset::HardRainSunset => "HardRainSunset",
            WeatherPreset::SoftRainSunset => "SoftRainSunset",
            WeatherPreset::ClearNight => "ClearNight",
            WeatherPreset::CloudyNight => "CloudyNight",
            WeatherPreset::WetNight => "WetNight",
            WeatherPreset::WetCloudyNight => "WetCloudyNight",
            WeatherPreset::SoftRainNight => "SoftRainNight",
            WeatherPreset::MidRainyNight => "MidRainyNight",
            WeatherPreset::HardRainNight => "HardRainNight",
            WeatherPreset::WinterMorning => "WinterMorning",
            WeatherPreset::WinterNoon => "WinterNoon",
            WeatherPreset::WinterCloudyNoon => "WinterCloudyNoon",
            WeatherPreset::WinterNight => "WinterNight",
            WeatherPreset::SoftSnowNoon => "SoftSnowNoon",
            WeatherPreset::MidSnowNoon => "MidSnowNoon",
            WeatherPreset::HardSnowNoon => "HardSnowNoon",
            WeatherPreset::SoftSnowMorning => "SoftSnowMorning",
            WeatherPreset::MidSnowMorning => "MidSnowMorning",
            WeatherPreset::HardSnowMorning => "HardSnowMorning",
        }
    }

    /// Look a preset up by name, ignoring case and separators.
    pub fn from_name(name: &str) -> Option<WeatherPreset> {
        PRESETS_BY_NAME.get(&normalize_name(name)).copied()
    }

    /// Weather record for this preset.
    #[must_use]
    pub fn parameters(self) -> WeatherParameters {
        WeatherParameters::from_legacy_values(legacy_values(self))
    }

    /// `true` for the presets with below-freezing temperatures.
    pub fn is_winter(self) -> bool {
        self.parameters().temperature() < 0.0
    }
}

impl From<WeatherPreset> for WeatherParameters {
    fn from(preset: WeatherPreset) -> Self {
        preset.parameters()
    }
}
