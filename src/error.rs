//! Error type for simulation construction and validation.

use thiserror::Error;

/// Errors raised while building a simulation or environment.
///
/// Stepping an already constructed simulation never fails; only the
/// parameters handed to constructors are checked.
#[derive(Debug, Error, PartialEq)]
pub enum Error {
    #[error("time step must be positive and finite, got {0}")]
    InvalidTimeStep(f64),

    #[error("parameter `{name}` is out of range: {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("max red time {max_red}s is shorter than min green {min_green}s plus yellow {yellow}s")]
    InconsistentTiming {
        max_red: f64,
        min_green: f64,
        yellow: f64,
    },

    #[error("vehicle id {0} is used more than once")]
    DuplicateVehicle(u32),

    #[error("action {0} is not one of 0 (hold) or 1 (switch)")]
    InvalidAction(u8),
}

/// Shorthand result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Checks that `value` is finite and strictly positive.
pub(crate) fn positive(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter { name, value })
    }
}

/// Checks that `value` is finite and not negative.
pub(crate) fn non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidParameter { name, value })
    }
}

/// Checks that `value` is a probability.
pub(crate) fn probability(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidParameter { name, value })
    }
}
