//! Weather record invariants: clamping, sentinels, presets and tuple layouts

mod common;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use wintersim_core::core_types::UNSET;
use wintersim_core::{WeatherField, WeatherParameters, WeatherPreset, WeatherSchema};

#[test]
fn test_random_assignments_stay_in_range() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let mut weather = WeatherParameters::default();

    for _ in 0..5_000 {
        let field = WeatherField::ALL[rng.random_range(0..WeatherField::ALL.len())];
        let value: f32 = rng.random_range(-1.0e4..1.0e4);
        weather.set(field, value);

        let stored = weather.get(field);
        let (min, max) = field.bounds();
        let in_range = (min..=max).contains(&stored);
        let sentinel = field.accepts_unset() && stored == UNSET;
        assert!(
            in_range || sentinel,
            "{} = {stored} outside [{min}, {max}]",
            field.name()
        );
    }
}

#[test]
fn test_sanitized_is_in_range_and_idempotent() {
    for &preset in WeatherPreset::ALL {
        let clean = preset.parameters().sanitized();
        for &field in WeatherField::ALL {
            let (min, max) = field.bounds();
            assert!((min..=max).contains(&clean.get(field)));
        }
        assert_eq!(clean.sanitized(), clean);
    }
}

#[test]
fn test_clear_noon_tuple_round_trip_is_bit_exact() {
    let weather = WeatherPreset::ClearNoon.parameters();

    for schema in [WeatherSchema::Legacy, WeatherSchema::Current] {
        let tuple = weather.to_tuple(schema);
        assert_eq!(tuple.len(), schema.arity());

        let restored = WeatherParameters::from_tuple(schema, &tuple).unwrap();
        for &field in WeatherField::ALL {
            assert_eq!(
                restored.get(field).to_bits(),
                weather.get(field).to_bits(),
                "{:?} {}",
                schema,
                field.name()
            );
        }
    }
}

#[test]
fn test_legacy_tuple_order() {
    let tuple = WeatherPreset::WinterMorning.parameters().to_tuple(WeatherSchema::Legacy);
    assert_eq!(tuple[4], 270.0); // sun azimuth
    assert_eq!(tuple[13], 100.0); // snow amount
    assert_eq!(tuple[14], -9.4); // temperature
    assert_eq!(tuple[16], 1.5); // particle size
    assert_eq!(tuple[18], -19.1); // dewpoint
    assert_eq!(tuple[19], 115.0); // wind direction
}

#[test]
fn test_current_tuple_carries_new_fields() {
    let mut weather = WeatherParameters::default();
    weather.set_snow_dirtyness(40.0).set_month(12.0).set_time(23.5);

    let tuple = weather.to_tuple(WeatherSchema::Current);
    assert_eq!(tuple[14], 40.0);
    assert_eq!(tuple[25], 12.0);
    assert_eq!(tuple[27], 23.5);

    let legacy = weather.to_tuple(WeatherSchema::Legacy);
    assert!(!legacy.contains(&40.0));
}

#[test]
fn test_arity_mismatch_is_an_error() {
    let err = WeatherParameters::from_tuple(WeatherSchema::Legacy, &[0.0; 28]).unwrap_err();
    assert!(err.to_string().contains("20"));
}
