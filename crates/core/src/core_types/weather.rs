//! Weather snapshot consumed by the sensor pipeline
//!
//! `WeatherParameters` is a flat record of environmental scalars. Every field
//! has a documented physical range that is enforced at assignment time, so a
//! value read back from the record is always inside its interval (or the
//! `UNSET` sentinel for the fields that accept it).
//!
//! The record is read once per sensor tick and never mutated while a tick is
//! running; a weather update replaces the whole snapshot.

use crate::error::WeatherTupleError;
use serde::{Deserialize, Serialize};

/// Sentinel marking a field as "not specified" (as opposed to an explicit zero).
///
/// Only fields for which [`WeatherField::accepts_unset`] returns `true` keep
/// this value on assignment. Everywhere else `-1.0` is clamped like any other
/// number.
pub const UNSET: f32 = -1.0;

macro_rules! weather_fields {
    (@unset) => { false };
    (@unset unset) => { true };
    ($(
        $(#[$doc:meta])*
        $variant:ident => $field:ident, $setter:ident,
            [$min:expr, $max:expr], default $default:expr $(, $unset:ident)?;
    )*) => {
        /// Named field of a [`WeatherParameters`] record, in wire order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum WeatherField {
            $($(#[$doc])* $variant,)*
        }

        impl WeatherField {
            /// Every field, in the order of the current tuple schema.
            pub const ALL: &'static [WeatherField] = &[$(WeatherField::$variant,)*];

            /// Snake-case field name, as used by the serialized record.
            pub fn name(self) -> &'static str {
                match self {
                    $(WeatherField::$variant => stringify!($field),)*
                }
            }

            /// Inclusive `(min, max)` interval the field is clamped to.
            pub fn bounds(self) -> (f32, f32) {
                match self {
                    $(WeatherField::$variant => ($min, $max),)*
                }
            }

            /// Value used when the field is unset or malformed.
            pub fn default_value(self) -> f32 {
                match self {
                    $(WeatherField::$variant => $default,)*
                }
            }

            /// Whether the field keeps the [`UNSET`] sentinel on assignment.
            pub fn accepts_unset(self) -> bool {
                match self {
                    $(WeatherField::$variant => weather_fields!(@unset $($unset)?),)*
                }
            }
        }

        /// Snapshot of the environmental conditions for one simulation tick.
        ///
        /// Fields are private; setters clamp to the field's interval and getters
        /// return the stored value. Use [`WeatherParameters::sanitized`] before
        /// feeding a record into the sensor models.
        #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
        #[serde(default)]
        pub struct WeatherParameters {
            $($(#[$doc])* $field: f32,)*
        }

        impl Default for WeatherParameters {
            fn default() -> Self {
                WeatherParameters {
                    $($field: $default,)*
                }
            }
        }

        impl WeatherParameters {
            $(
                $(#[$doc])*
                #[inline]
                pub fn $field(&self) -> f32 {
                    self.$field
                }

                /// Assign the field, clamped to its declared interval.
                #[inline]
                pub fn $setter(&mut self, value: f32) -> &mut Self {
                    self.$field = WeatherField::$variant.clamp(value);
                    self
                }
            )*

            /// Read a field by name.
            pub fn get(&self, field: WeatherField) -> f32 {
                match field {
                    $(WeatherField::$variant => self.$field,)*
                }
            }

            /// Assign a field by name, clamped to its declared interval.
            pub fn set(&mut self, field: WeatherField, value: f32) -> &mut Self {
                match field {
                    $(WeatherField::$variant => { self.$setter(value); })*
                }
                self
            }
        }
    };
}

weather_fields! {
    /// Cloud cover (%)
    Cloudiness => cloudiness, set_cloudiness, [0.0, 100.0], default 0.0, unset;
    /// Rain or snowfall intensity (0 = none, 100 = heaviest)
    Precipitation => precipitation, set_precipitation, [0.0, 100.0], default 0.0, unset;
    /// Standing water / snow deposits on the ground (%)
    PrecipitationDeposits => precipitation_deposits, set_precipitation_deposits, [0.0, 100.0], default 0.0, unset;
    /// Wind strength (%)
    WindIntensity => wind_intensity, set_wind_intensity, [0.0, 100.0], default 0.35, unset;
    /// Sun azimuth (degrees)
    SunAzimuthAngle => sun_azimuth_angle, set_sun_azimuth_angle, [0.0, 360.0], default 0.0, unset;
    /// Sun altitude (degrees, negative below the horizon)
    SunAltitudeAngle => sun_altitude_angle, set_sun_altitude_angle, [-90.0, 90.0], default 75.0, unset;
    /// Fog concentration (%)
    FogDensity => fog_density, set_fog_density, [0.0, 100.0], default 0.0, unset;
    /// Fog start distance (meters)
    FogDistance => fog_distance, set_fog_distance, [0.0, f32::MAX], default 0.0, unset;
    /// Fog height falloff
    FogFalloff => fog_falloff, set_fog_falloff, [0.0, f32::MAX], default 0.2, unset;
    /// Surface wetness (%)
    Wetness => wetness, set_wetness, [0.0, 100.0], default 0.0, unset;
    /// Light scattering intensity (%)
    ScatteringIntensity => scattering_intensity, set_scattering_intensity, [0.0, 100.0], default 0.0;
    /// Mie scattering scale
    MieScatteringScale => mie_scattering_scale, set_mie_scattering_scale, [0.0, 5.0], default 0.0;
    /// Rayleigh scattering scale
    RayleighScatteringScale => rayleigh_scattering_scale, set_rayleigh_scattering_scale, [0.0, 2.0], default 0.0331;
    /// Snow cover on the ground (%)
    SnowAmount => snow_amount, set_snow_amount, [0.0, 100.0], default 0.0;
    /// Dirt mixed into the snow cover (%)
    SnowDirtyness => snow_dirtyness, set_snow_dirtyness, [0.0, 100.0], default 0.0;
    /// Air temperature (°C)
    Temperature => temperature, set_temperature, [-40.0, 40.0], default 0.0;
    /// Ice on road surfaces (%)
    IceAmount => ice_amount, set_ice_amount, [0.0, 100.0], default 0.0;
    /// Precipitation particle size (1 = fine, 3 = coarse)
    ParticleSize => particle_size, set_particle_size, [1.0, 3.0], default 1.0;
    /// Relative humidity (%)
    RelativeHumidity => relative_humidity, set_relative_humidity, [0.0, 100.0], default 0.0;
    /// Dew point (°C)
    Dewpoint => dewpoint, set_dewpoint, [-40.0, 40.0], default 0.0;
    /// Wind direction (degrees)
    WindDirection => wind_direction, set_wind_direction, [0.0, 360.0], default 0.0;
    /// Latitude used for sun placement
    Latitude => latitude, set_latitude, [-100.0, 100.0], default 0.0;
    /// Longitude used for sun placement
    Longitude => longitude, set_longitude, [-100.0, 100.0], default 0.0;
    /// Offset from UTC (hours)
    Timezone => timezone, set_timezone, [-10.0, 10.0], default 0.0;
    /// Snow on the road surface (%)
    RoadSnowiness => road_snowiness, set_road_snowiness, [0.0, 100.0], default 0.0;
    /// Calendar month
    Month => month, set_month, [0.0, 12.0], default 0.0;
    /// Day of month
    Day => day, set_day, [0.0, 31.0], default 0.0;
    /// Time of day (hours)
    Time => time, set_time, [0.0, 24.0], default 0.0;
}

impl WeatherField {
    /// Clamp `value` to this field's interval.
    ///
    /// NaN resolves to the field default. The [`UNSET`] sentinel is kept for
    /// fields that accept it.
    pub fn clamp(self, value: f32) -> f32 {
        if self.accepts_unset() && value == UNSET {
            return UNSET;
        }
        if value.is_nan() {
            return self.default_value();
        }
        let (min, max) = self.bounds();
        value.clamp(min, max)
    }
}

/// Fixed-arity tuple layouts used at the serialization boundary.
///
/// Field order is part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeatherSchema {
    /// 20 floats: no snow dirtyness, geolocation or calendar fields
    Legacy,
    /// 28 floats: every [`WeatherField`]
    Current,
}

const LEGACY_FIELDS: &[WeatherField] = &[
    WeatherField::Cloudiness,
    WeatherField::Precipitation,
    WeatherField::PrecipitationDeposits,
    WeatherField::WindIntensity,
    WeatherField::SunAzimuthAngle,
    WeatherField::SunAltitudeAngle,
    WeatherField::FogDensity,
    WeatherField::FogDistance,
    WeatherField::FogFalloff,
    WeatherField::Wetness,
    WeatherField::ScatteringIntensity,
    WeatherField::MieScatteringScale,
    WeatherField::RayleighScatteringScale,
    WeatherField::SnowAmount,
    WeatherField::Temperature,
    WeatherField::IceAmount,
    WeatherField::ParticleSize,
    WeatherField::RelativeHumidity,
    WeatherField::Dewpoint,
    WeatherField::WindDirection,
];

impl WeatherSchema {
    /// Fields carried by this layout, in order.
    pub fn fields(self) -> &'static [WeatherField] {
        match self {
            WeatherSchema::Legacy => LEGACY_FIELDS,
            WeatherSchema::Current => WeatherField::ALL,
        }
    }

    /// Number of floats in the tuple.
    pub fn arity(self) -> usize {
        self.fields().len()
    }
}

impl WeatherParameters {
    /// Build a record from the 20 legacy-ordered values, clamping each one.
    pub(crate) fn from_legacy_values(values: [f32; 20]) -> Self {
        let mut weather = WeatherParameters::default();
        for (&field, value) in LEGACY_FIELDS.iter().zip(values) {
            weather.set(field, value);
        }
        weather
    }

    /// Serialize into the ordered tuple of `schema`.
    pub fn to_tuple(&self, schema: WeatherSchema) -> Vec<f32> {
        schema.fields().iter().map(|&field| self.get(field)).collect()
    }

    /// Rebuild a record from an ordered tuple.
    ///
    /// Fields the schema does not carry keep their defaults. Values are
    /// clamped exactly as the setters would.
    pub fn from_tuple(schema: WeatherSchema, values: &[f32]) -> Result<Self, WeatherTupleError> {
        if values.len() != schema.arity() {
            return Err(WeatherTupleError::Arity {
                schema,
                expected: schema.arity(),
                found: values.len(),
            });
        }
        let mut weather = WeatherParameters::default();
        for (&field, &value) in schema.fields().iter().zip(values) {
            weather.set(field, value);
        }
        Ok(weather)
    }

    /// `false` if the field holds the [`UNSET`] sentinel.
    pub fn is_set(&self, field: WeatherField) -> bool {
        !(field.accepts_unset() && self.get(field) == UNSET)
    }

    /// Copy with every sentinel resolved to its default and every value
    /// clamped, including values that bypassed the setters (deserialization).
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let mut clean = *self;
        for &field in WeatherField::ALL {
            let value = self.get(field);
            let resolved = if field.accepts_unset() && value == UNSET {
                field.default_value()
            } else {
                value
            };
            clean.set(field, resolved);
        }
        clean
    }

    /// Below-freezing precipitation.
    pub fn is_snowing(&self) -> bool {
        self.temperature < 0.0 && self.precipitation > 0.0
    }
}
