//! Closed-form cubical Morse matching (§4.6): avoids enumerating boundaries
//! by computing `mate` directly from shape/position arithmetic. The complex
//! is never stored by reference here — only the handful of scalar tables
//! `mate_rec` needs are copied out of it once, mirroring the way the
//! original caches `type_size_` as a constructor-time copy rather than
//! re-deriving it from the complex on every call.

use std::sync::Arc;

use crate::chain::Cell;
use crate::complex::Complex;
use crate::cubical::CubicalComplex;
use crate::error::{MorseError, Result};
use crate::grading::GradedComplex;

use super::{CriticalCells, Matching};

pub struct CubicalMatching {
    dimension: usize,
    type_size: usize,
    boxes: Vec<usize>,
    place_values: Vec<usize>,
    shape_from_type: Vec<usize>,
    type_from_shape: Vec<usize>,
    value: Arc<dyn Fn(Cell) -> i64 + Send + Sync>,
    critical: CriticalCells,
}

impl CubicalMatching {
    pub fn new(complex: &CubicalComplex, graded: &GradedComplex) -> Self {
        let mut m = Self {
            dimension: complex.dimension(),
            type_size: complex.type_size(),
            boxes: complex.boxes().to_vec(),
            place_values: complex.place_values().to_vec(),
            shape_from_type: complex.shape_from_type().to_vec(),
            type_from_shape: complex.type_from_shape().to_vec(),
            value: graded.value_fn(),
            critical: CriticalCells { begin: Vec::new(), reindex: Vec::new() },
        };
        m.critical = m.compute_critical_cells(complex);
        m
    }

    /// Builds a cubical matching from a type-erased complex, failing with
    /// `MorseError::NotCubical` if it isn't actually a [`CubicalComplex`]
    /// (§7: a contract violation the caller can recover from, as opposed to
    /// `compute_matching`'s infallible internal dispatch which simply falls
    /// back to the generic matching instead).
    pub fn try_new(complex: &Arc<dyn Complex>, graded: &GradedComplex) -> Result<Self> {
        match complex.as_any().downcast_ref::<CubicalComplex>() {
            Some(cubical) => Ok(Self::new(cubical, graded)),
            None => Err(MorseError::NotCubical { dimension: complex.dimension() }),
        }
    }

    fn cell_position(&self, cell: Cell) -> usize {
        cell % self.type_size
    }

    fn cell_type(&self, cell: Cell) -> usize {
        cell / self.type_size
    }

    fn cell_shape(&self, cell: Cell) -> usize {
        self.shape_from_type[self.cell_type(cell)]
    }

    fn coordinates(&self, cell: Cell) -> Vec<usize> {
        let mut position = self.cell_position(cell);
        let mut result = vec![0usize; self.dimension];
        for d in 0..self.dimension {
            result[d] = position % self.boxes[d];
            position /= self.boxes[d];
        }
        result
    }

    fn rightfringe(&self, cell: Cell) -> bool {
        let shape = self.cell_shape(cell);
        let coords = self.coordinates(cell);
        (0..self.dimension).any(|d| shape & (1 << d) != 0 && coords[d] == self.boxes[d] - 1)
    }

    /// `mate_(cell, D)` from §4.6: `d_limit` shrinks on recursive calls so
    /// termination is immediate from the decreasing dimension bound.
    fn mate_rec(&self, cell: Cell, d_limit: usize) -> Cell {
        if self.rightfringe(cell) {
            return cell;
        }
        let position = self.cell_position(cell);
        if position == self.type_size - 1 {
            return cell;
        }
        let shape = self.cell_shape(cell);
        for d in 0..d_limit {
            let bit = 1usize << d;
            if d == d_limit - 1 && position + self.place_values[d] >= self.type_size {
                break;
            }
            let proposed_type = self.type_from_shape[shape ^ bit];
            let proposed_mate = proposed_type * self.type_size + position;
            if (self.value)(proposed_mate) == (self.value)(cell)
                && self.mate_rec(proposed_mate, d) == proposed_mate
            {
                return proposed_mate;
            }
        }
        cell
    }

    fn compute_critical_cells(&self, complex: &CubicalComplex) -> CriticalCells {
        let mut begin = vec![0; self.dimension + 2];
        let mut reindex = Vec::new();
        let mut idx = 0;
        for d in 0..=self.dimension {
            begin[d] = idx;
            for v in complex.cells_in_dimension(d) {
                if !self.rightfringe(v) && self.mate_rec(v, self.dimension) == v {
                    reindex.push((v, idx));
                    idx += 1;
                }
            }
        }
        begin[self.dimension + 1] = idx;
        log::debug!("cubical matching on {} cells produced {idx} critical cells", complex.size());
        CriticalCells { begin, reindex }
    }
}

impl Matching for CubicalMatching {
    fn mate(&self, x: Cell) -> Cell {
        self.mate_rec(x, self.dimension)
    }

    fn priority(&self, x: Cell) -> i64 {
        (self.type_size - self.cell_position(x)) as i64
    }

    fn critical_cells(&self) -> &CriticalCells {
        &self.critical
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::Complex;

    #[test]
    fn matching_is_an_involution_except_on_fringe() {
        let k = CubicalComplex::new(vec![3, 3]);
        let graded = GradedComplex::constant_zero(Arc::new(CubicalComplex::new(vec![3, 3])));
        let m = CubicalMatching::new(&k, &graded);
        for c in k.cells() {
            assert_eq!(m.mate(m.mate(c)), c, "involution failed at cell {c}");
        }
    }

    #[test]
    fn mate_preserves_grade() {
        let k = CubicalComplex::new(vec![2, 2]);
        let graded = GradedComplex::constant_zero(Arc::new(CubicalComplex::new(vec![2, 2])));
        let m = CubicalMatching::new(&k, &graded);
        for c in k.cells() {
            assert_eq!(graded.value(c), graded.value(m.mate(c)));
        }
    }

    #[test]
    fn try_new_rejects_a_non_cubical_complex() {
        let simplicial: Arc<dyn Complex> =
            Arc::new(crate::auxiliary::SimplicialComplex::new(&[vec![0, 1, 2]]));
        let graded = GradedComplex::constant_zero(simplicial.clone());
        let err = CubicalMatching::try_new(&simplicial, &graded).unwrap_err();
        assert!(matches!(err, MorseError::NotCubical { .. }));
    }

    #[test]
    fn all_ones_top_cell_is_always_an_ace() {
        let k = CubicalComplex::new(vec![3, 3]);
        let graded = GradedComplex::constant_zero(Arc::new(CubicalComplex::new(vec![3, 3])));
        let m = CubicalMatching::new(&k, &graded);
        let top_shape = k.num_types() - 1;
        let corner = k.cell_index(&[2, 2], top_shape);
        assert_eq!(m.mate(corner), corner);
    }
}
