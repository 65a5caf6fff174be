//! Discrete Morse theory over Z/2Z: acyclic partial matchings, the Morse
//! complex they induce, and the connection-matrix fixed point that drives
//! homology computation.
//!
//! A complex ([`complex::Complex`]) is a graded family of cells with a
//! boundary map; [`cubical::CubicalComplex`] and the auxiliary complexes in
//! [`auxiliary`] are the concrete instances this crate ships. A matching
//! ([`matching::Matching`]) pairs faces with cofaces subject to the
//! acyclicity property; [`matching::compute_matching`] picks the
//! closed-form cubical algorithm or the generic coreduction algorithm
//! depending on the complex. [`morse_complex::MorseComplex`] builds the
//! reduced chain complex on critical cells, and [`connection_matrix`]
//! iterates that to a fixed point, either under a [`grading::GradedComplex`]
//! or (via [`connection_matrix::homology`]) ungraded.

pub mod auxiliary;
pub mod chain;
pub mod complex;
pub mod connection_matrix;
pub mod cubical;
pub mod error;
pub mod grading;
pub mod matching;
pub mod morse_complex;

pub use auxiliary::{order_complex, DualComplex, Simplex, SimplicialComplex};
pub use chain::{Cell, Chain};
pub use complex::Complex;
pub use connection_matrix::{connection_matrix, connection_matrix_tower, homology, morse_graded_complex, morse_graded_complex_auto};
pub use cubical::CubicalComplex;
pub use error::{MorseError, Result};
pub use grading::{construct_grading, GradedComplex};
pub use matching::{compute_matching, CriticalCells, Matching};
pub use morse_complex::MorseComplex;
