//! Error types for sensor setup, weather tuples and buffer decoding

use crate::core_types::weather::WeatherSchema;
use thiserror::Error;

/// A sensor could not be assembled from its collaborators.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SetupError {
    #[error("no ray caster was provided")]
    MissingRayCaster,
    #[error("no weather provider was provided")]
    MissingWeatherProvider,
}

/// A weather tuple did not match its schema.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WeatherTupleError {
    #[error("{schema:?} weather tuple needs {expected} values, got {found}")]
    Arity {
        schema: WeatherSchema,
        expected: usize,
        found: usize,
    },
}

/// Bytes could not be read back into a point-cloud buffer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferDecodeError {
    #[error("buffer truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },
    #[error("channel counts sum to {declared} records but {actual} follow the header")]
    CountMismatch { declared: usize, actual: usize },
}
