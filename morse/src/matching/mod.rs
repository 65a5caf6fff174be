//! Acyclic partial matchings (§4.5, §4.6): pairs of functions `mate` and
//! `priority` satisfying the involution, shift, incidence, and acyclicity
//! axioms in §3. Two implementations share the [`Matching`] interface — a
//! generic coreduction algorithm that works on any [`Complex`], and a
//! closed-form one specialized to [`CubicalComplex`].

pub mod cubical;
pub mod generic;

use crate::chain::Cell;
use crate::cubical::CubicalComplex;
use crate::error::Result;
use crate::grading::GradedComplex;

/// Where the critical (self-matched) cells of a matching land in the
/// reduced complex: `begin[d]` is the first new index at dimension `d`, and
/// `reindex` maps each critical cell's original index to its new one, in
/// increasing order of the new index.
pub struct CriticalCells {
    pub begin: Vec<Cell>,
    pub reindex: Vec<(Cell, Cell)>,
}

pub trait Matching: Send + Sync {
    fn mate(&self, x: Cell) -> Cell;
    fn priority(&self, x: Cell) -> i64;
    fn critical_cells(&self) -> &CriticalCells;
}

/// Dispatches to the cubical matching when the graded complex wraps a
/// [`CubicalComplex`], and to the generic one otherwise. Fails only through
/// the generic path, if `graded` violates the closure property or the
/// complex it wraps breaks an internal invariant the matching relies on.
pub fn compute_matching(graded: &GradedComplex) -> Result<Box<dyn Matching>> {
    if let Some(cubical_complex) = graded.complex().as_any().downcast_ref::<CubicalComplex>() {
        Ok(Box::new(cubical::CubicalMatching::new(cubical_complex, graded)))
    } else {
        Ok(Box::new(generic::GenericMatching::from_graded(graded)?))
    }
}
