//! The dual complex (§9C): reindexes a complex's cells so that dimension
//! `d` cells in the dual are dimension `(dimension - d)` cells in the
//! original, and swaps `column`/`row` so the dual's boundary map is the
//! original's coboundary map read backwards.

use std::sync::Arc;

use crate::chain::Cell;
use crate::complex::Complex;

pub struct DualComplex {
    inner: Arc<dyn Complex>,
    begin: Vec<Cell>,
    dimension: usize,
}

impl DualComplex {
    pub fn new(inner: Arc<dyn Complex>) -> Self {
        let dimension = inner.dimension();
        let mut begin = vec![0; dimension + 2];
        let mut cumulative = 0;
        for d in 0..=dimension {
            begin[d] = cumulative;
            cumulative += inner.size_in_dimension(dimension - d);
        }
        begin[dimension + 1] = inner.size();
        Self { inner, begin, dimension }
    }

    pub fn inner(&self) -> &Arc<dyn Complex> {
        &self.inner
    }
}

impl Complex for DualComplex {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn begin(&self, d: usize) -> Cell {
        self.begin[d]
    }

    fn column(&self, cell: Cell, cb: &mut dyn FnMut(Cell)) {
        let n = self.size();
        self.inner.row(n - cell - 1, &mut |x| cb(n - x - 1));
    }

    fn row(&self, cell: Cell, cb: &mut dyn FnMut(Cell)) {
        let n = self.size();
        self.inner.column(n - cell - 1, &mut |x| cb(n - x - 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cubical::CubicalComplex;

    #[test]
    fn dual_swaps_dimension_counts() {
        let k: Arc<dyn Complex> = Arc::new(CubicalComplex::new(vec![2, 2]));
        let dual = DualComplex::new(k.clone());
        for d in 0..=k.dimension() {
            assert_eq!(dual.size_in_dimension(d), k.size_in_dimension(k.dimension() - d));
        }
        assert_eq!(dual.size(), k.size());
    }

    #[test]
    fn dual_boundary_matches_reversed_coboundary() {
        use itertools::Itertools;

        let k: Arc<dyn Complex> = Arc::new(CubicalComplex::new(vec![2, 2]));
        let n = k.size();
        let dual = DualComplex::new(k.clone());
        for x in k.cells() {
            let dual_cell = n - x - 1;
            let mut expected: Vec<Cell> = Vec::new();
            k.row(x, &mut |u| expected.push(n - u - 1));

            let mut actual: Vec<Cell> = Vec::new();
            dual.column(dual_cell, &mut |u| actual.push(u));

            for (a, e) in actual.iter().sorted().zip_eq(expected.iter().sorted()) {
                assert_eq!(a, e, "mismatch at dual cell {dual_cell}");
            }
        }
    }

    #[test]
    fn dual_of_dual_column_matches_original() {
        let k: Arc<dyn Complex> = Arc::new(CubicalComplex::new(vec![2, 2]));
        let dual = Arc::new(DualComplex::new(k.clone()));
        let dual_dual = DualComplex::new(dual as Arc<dyn Complex>);
        for x in k.cells() {
            let mut expected: Vec<Cell> = Vec::new();
            k.column(x, &mut |u| expected.push(u));
            expected.sort_unstable();

            let mut actual: Vec<Cell> = Vec::new();
            dual_dual.column(x, &mut |u| actual.push(u));
            actual.sort_unstable();

            assert_eq!(actual, expected, "double dual mismatch at cell {x}");
        }
    }
}
