//! Input checks shared by the primitives.

use crate::error::{Result, UncertaintyError};

fn non_empty(values: &[f64]) -> Result<()> {
    if values.is_empty() {
        return Err(UncertaintyError::Empty);
    }
    Ok(())
}

fn each_finite(values: &[f64]) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(UncertaintyError::NonFinite {
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

/// Non-empty, finite and strictly positive.
pub(crate) fn positive(values: &[f64]) -> Result<()> {
    non_empty(values)?;
    each_finite(values)?;
    match values.iter().position(|&v| v <= 0.0) {
        Some(index) => Err(UncertaintyError::NonPositive {
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

/// Non-empty, finite and at least 1.
pub(crate) fn mul_cis(values: &[f64]) -> Result<()> {
    non_empty(values)?;
    each_finite(values)?;
    match values.iter().position(|&v| v < 1.0) {
        Some(index) => Err(UncertaintyError::CiBelowOne {
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

/// Non-empty and strictly inside (0, 1).
pub(crate) fn fractions(values: &[f64]) -> Result<()> {
    non_empty(values)?;
    each_finite(values)?;
    match values.iter().position(|&v| v <= 0.0 || v >= 1.0) {
        Some(index) => Err(UncertaintyError::OutsideUnitInterval {
            index,
            value: values[index],
        }),
        None => Ok(()),
    }
}

pub(crate) fn same_length(expected: &[f64], actual: &[f64]) -> Result<()> {
    if expected.len() != actual.len() {
        return Err(UncertaintyError::LengthMismatch {
            expected: expected.len(),
            actual: actual.len(),
        });
    }
    Ok(())
}

/// Finite, non-negative, not all zero.
pub(crate) fn weights(values: &[f64]) -> Result<()> {
    let all_valid = values.iter().all(|w| w.is_finite() && *w >= 0.0);
    if !all_valid || values.iter().all(|&w| w == 0.0) {
        return Err(UncertaintyError::InvalidWeights);
    }
    Ok(())
}
