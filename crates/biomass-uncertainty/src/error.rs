/// Invalid input to one of the uncertainty primitives.
///
/// Every primitive validates its inputs before computing, so a NaN or
/// infinite result never leaks into an aggregate total.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum UncertaintyError {
    #[display("input is empty")]
    Empty,
    #[display("parallel inputs differ in length: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
    #[display("value at index {index} is not finite: {value}")]
    NonFinite { index: usize, value: f64 },
    #[display("value at index {index} must be strictly positive, got {value}")]
    NonPositive { index: usize, value: f64 },
    #[display("multiplicative CI at index {index} must be at least 1, got {value}")]
    CiBelowOne { index: usize, value: f64 },
    #[display("fraction at index {index} must lie strictly inside (0, 1), got {value}")]
    OutsideUnitInterval { index: usize, value: f64 },
    #[display("weights must be finite, non-negative and not all zero")]
    InvalidWeights,
    #[display("sample count must be positive")]
    InvalidSampleCount,
    #[display("clamping epsilon must lie inside (0, 0.5), got {epsilon}")]
    InvalidEpsilon { epsilon: f64 },
    #[display("propagated 95% range is not finite: mean {mean}, range [{low}, {high}]")]
    NonFiniteRange { mean: f64, low: f64, high: f64 },
}

pub type Result<T> = std::result::Result<T, UncertaintyError>;
