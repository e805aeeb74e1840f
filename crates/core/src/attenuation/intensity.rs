//! Atmospheric intensity attenuation
//!
//! Returned intensity follows Beer-Lambert extinction, `I = exp(k·d)`. The
//! clear-air rate and humidity slope follow the weather lidar's
//! `0.019 + 0.017·humidity` absorption, with humidity taken as a fraction in
//! `[0, 1]`. Cold air and precipitation add further extinction on top.

use crate::core_types::weather::WeatherParameters;

/// Clear-air extinction rate (1/m)
pub const DEFAULT_ATMOSPHERIC_ATTENUATION: f32 = 0.019;

/// Extinction added per unit of relative humidity fraction
const HUMIDITY_COEFF: f32 = 0.017;
/// Extinction added per °C below 40 °C
const TEMPERATURE_COEFF: f32 = 0.000_05;
/// Extinction added per precipitation class
const PRECIPITATION_COEFF: f32 = 0.003;
/// Upper edge of the temperature scale used by the cold term
const TEMPERATURE_CEILING: f32 = 40.0;

/// Width of one precipitation bin on the `[0, 100]` scale
const PRECIPITATION_BIN_WIDTH: f32 = 100.0 / 3.0;

/// Intensity of a return at `distance` meters under `weather`.
///
/// Uses the clear-air rate [`DEFAULT_ATMOSPHERIC_ATTENUATION`]. Result is in
/// `[0, 1]`, exactly 1 at distance 0 and non-increasing with distance.
pub fn compute_intensity(distance: f32, weather: &WeatherParameters) -> f32 {
    compute_intensity_with_base(distance, weather, DEFAULT_ATMOSPHERIC_ATTENUATION)
}

/// [`compute_intensity`] with an explicit clear-air extinction rate.
///
/// # Arguments
/// * `distance` - Ray length in meters (negative values are treated as 0)
/// * `weather` - Sanitized weather snapshot
/// * `base_rate` - Clear-air extinction rate (1/m), floored at 0
pub fn compute_intensity_with_base(
    distance: f32,
    weather: &WeatherParameters,
    base_rate: f32,
) -> f32 {
    let k = extinction_coefficient(weather, base_rate);
    (k * distance.max(0.0)).exp().clamp(0.0, 1.0)
}

/// Extinction exponent `k` (always `<= 0`).
pub fn extinction_coefficient(weather: &WeatherParameters, base_rate: f32) -> f32 {
    let humidity = HUMIDITY_COEFF * weather.relative_humidity() / 100.0;
    let cold = TEMPERATURE_COEFF * (TEMPERATURE_CEILING - weather.temperature());
    let precipitation = PRECIPITATION_COEFF
        * classify_precipitation(weather.precipitation(), weather.particle_size());

    let alpha = base_rate.max(0.0) + humidity + cold + precipitation;
    -alpha.max(0.0)
}

/// Discrete precipitation class used by the extinction model.
///
/// 0 for no precipitation, otherwise bins 1 to 3 over thirds of `[0, 100]`,
/// raised by `(particle_size - 1) / 2` for coarser particles.
pub fn classify_precipitation(amount: f32, particle_size: f32) -> f32 {
    if amount.is_nan() || amount <= 0.0 {
        return 0.0;
    }
    let bin = (amount / PRECIPITATION_BIN_WIDTH).ceil().clamp(1.0, 3.0);
    let size_offset = (particle_size.clamp(1.0, 3.0) - 1.0) / 2.0;
    bin + size_offset
}

/// Temperature-dependent positional noise (standard deviation, meters).
///
/// Colder air gives a noisier return; never negative.
pub fn weather_noise_stddev(temperature: f32) -> f32 {
    (-0.000_24 * temperature + 0.011).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::WeatherPreset;
    use approx::assert_relative_eq;

    #[test]
    fn test_intensity_is_one_at_origin() {
        for &preset in WeatherPreset::ALL {
            let weather = preset.parameters().sanitized();
            assert_eq!(compute_intensity(0.0, &weather), 1.0);
        }
    }

    #[test]
    fn test_intensity_decreases_with_distance() {
        let weather = WeatherPreset::HardSnowNoon.parameters().sanitized();
        let mut previous = 1.0;
        for step in 1..200 {
            let i = compute_intensity(step as f32, &weather);
            assert!(i <= previous);
            assert!((0.0..=1.0).contains(&i));
            previous = i;
        }
    }

    #[test]
    fn test_snow_attenuates_more_than_clear_air() {
        let clear = WeatherPreset::ClearNoon.parameters().sanitized();
        let snow = WeatherPreset::HardSnowNoon.parameters().sanitized();
        assert!(compute_intensity(50.0, &snow) < compute_intensity(50.0, &clear));
    }

    #[test]
    fn test_humidity_term_in_dry_warm_air() {
        // No cold or precipitation contribution at 40 °C and dry air
        let mut weather = WeatherParameters::default();
        weather
            .set_temperature(40.0)
            .set_precipitation(0.0)
            .set_relative_humidity(100.0);
        assert_relative_eq!(
            extinction_coefficient(&weather, DEFAULT_ATMOSPHERIC_ATTENUATION),
            -(0.019 + 0.017),
            epsilon = 1e-6
        );

        weather.set_relative_humidity(0.0);
        assert_relative_eq!(
            compute_intensity(10.0, &weather),
            (-0.19_f32).exp(),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_precipitation_bins() {
        assert_eq!(classify_precipitation(0.0, 3.0), 0.0);
        assert_eq!(classify_precipitation(10.0, 1.0), 1.0);
        assert_eq!(classify_precipitation(50.0, 1.0), 2.0);
        assert_eq!(classify_precipitation(100.0, 1.0), 3.0);
        assert_relative_eq!(classify_precipitation(100.0, 3.0), 4.0);
        assert_relative_eq!(classify_precipitation(20.0, 2.0), 1.5);
    }

    #[test]
    fn test_noise_stddev() {
        assert_relative_eq!(weather_noise_stddev(0.0), 0.011);
        assert_relative_eq!(weather_noise_stddev(-20.0), 0.0158, epsilon = 1e-6);
        assert_relative_eq!(weather_noise_stddev(40.0), 0.0014, epsilon = 1e-6);
        assert!(weather_noise_stddev(100.0) >= 0.0);
    }
}
