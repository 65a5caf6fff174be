use thiserror::Error;

use crate::chain::Cell;

/// Errors surfaced synchronously by the kernel (§7).
///
/// `NotCubical` and `GradingNotMonotone` are contract violations: the caller
/// passed something the API explicitly rejects, and can recover by fixing
/// its input. `InvariantViolation` signals that a `Complex` implementation
/// handed to us broke one of the invariants in §4.2/§4.5 — this should never
/// happen for a spec-conformant complex, so it is reported rather than
/// silently producing a wrong matching.
#[derive(Debug, Error)]
pub enum MorseError {
    #[error("expected a cubical complex, got a general complex of dimension {dimension}")]
    NotCubical { dimension: usize },

    #[error("grading is not monotone: value(face {face}) = {face_value} > value(cell {cell}) = {cell_value}")]
    GradingNotMonotone {
        cell: Cell,
        cell_value: i64,
        face: Cell,
        face_value: i64,
    },

    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, MorseError>;
