//! A simplicial complex built from a list of maximal simplices (§9B),
//! closed under taking faces. Also backs [`super::order::order_complex`],
//! whose barycentric chains are handed to [`SimplicialComplex::new`] as
//! maximal simplices.

use std::collections::HashMap;

use crate::chain::{Cell, Chain};
use crate::complex::Complex;

/// A simplex is a sequence of (ambient) cell indices; the boundary of a
/// simplex of length n is its n sub-sequences with one entry removed.
pub type Simplex = Vec<Cell>;

fn simplex_boundary(s: &Simplex) -> Vec<Simplex> {
    if s.len() <= 1 {
        return Vec::new();
    }
    (0..s.len())
        .map(|i| {
            let mut t = s.clone();
            t.remove(i);
            t
        })
        .collect()
}

pub struct SimplicialComplex {
    simplices: Vec<Simplex>,
    index_of: HashMap<Simplex, Cell>,
    begin: Vec<Cell>,
    dimension: usize,
    boundary_table: Vec<Chain>,
    coboundary_table: Vec<Chain>,
}

impl SimplicialComplex {
    /// Builds the complex generated by `maximal_simplices`, closed under
    /// taking faces (a simplex present in the input pulls in every
    /// sub-simplex obtained by deleting vertices).
    pub fn new(maximal_simplices: &[Simplex]) -> Self {
        let mut index_of: HashMap<Simplex, ()> = HashMap::new();
        let mut simplices: Vec<Simplex> = Vec::new();
        for s in maximal_simplices {
            let mut work_stack = vec![s.clone()];
            while let Some(t) = work_stack.pop() {
                if index_of.insert(t.clone(), ()).is_none() {
                    simplices.push(t.clone());
                    work_stack.extend(simplex_boundary(&t));
                }
            }
        }

        simplices.sort_by_key(|s| s.len());

        let n = simplices.len();
        let mut index_of: HashMap<Simplex, Cell> = HashMap::with_capacity(n);
        for (i, s) in simplices.iter().enumerate() {
            index_of.insert(s.clone(), i);
        }

        // begin[d] is the index of the first simplex of dimension d.
        let mut begin: Vec<usize> = Vec::new();
        let mut current_dim: isize = -1;
        for (i, s) in simplices.iter().enumerate() {
            let d = s.len() as isize - 1;
            while current_dim < d {
                begin.push(i);
                current_dim += 1;
            }
        }
        let dimension = current_dim.max(0) as usize;
        begin.push(n);

        let mut boundary_table = Vec::with_capacity(n);
        for s in &simplices {
            let mut c = Chain::new();
            for face in simplex_boundary(s) {
                c.toggle(index_of[&face]);
            }
            boundary_table.push(c);
        }

        let mut coboundary_table = vec![Chain::new(); n];
        for (i, bd) in boundary_table.iter().enumerate() {
            for face in bd.iter() {
                coboundary_table[face].toggle(i);
            }
        }

        Self { simplices, index_of, begin, dimension, boundary_table, coboundary_table }
    }

    pub fn simplex(&self, i: Cell) -> &Simplex {
        &self.simplices[i]
    }

    pub fn idx(&self, s: &Simplex) -> Option<Cell> {
        self.index_of.get(s).copied()
    }
}

impl Complex for SimplicialComplex {
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
        for x in self.boundary_table[cell].iter() {
            cb(x);
        }
    }

    fn row(&self, cell: Cell, cb: &mut dyn FnMut(Cell)) {
        for x in self.coboundary_table[cell].iter() {
            cb(x);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_boundary_has_three_vertices_and_three_edges() {
        // Three edges joining three vertices, no filled-in 2-cell: a circle,
        // with Betti numbers (1, 1).
        let k = SimplicialComplex::new(&[vec![0, 1], vec![1, 2], vec![0, 2]]);
        assert_eq!(k.size_in_dimension(0), 3);
        assert_eq!(k.size_in_dimension(1), 3);
        assert_eq!(k.size_in_dimension(2), 0);

        let h = crate::connection_matrix::homology(std::sync::Arc::new(k)).unwrap();
        assert_eq!(h.size_in_dimension(0), 1);
        assert_eq!(h.size_in_dimension(1), 1);
    }

    #[test]
    fn boundary_of_boundary_vanishes() {
        let k = SimplicialComplex::new(&[vec![0, 1, 2, 3]]);
        for c in k.cells() {
            let bd = k.boundary(&Chain::single(c));
            let bdbd = k.boundary(&bd);
            assert!(bdbd.is_empty(), "d^2 != 0 at cell {c}");
        }
    }

    #[test]
    fn solid_tetrahedron_has_betti_one_zero_zero_zero() {
        let k: std::sync::Arc<dyn Complex> = std::sync::Arc::new(SimplicialComplex::new(&[vec![0, 1, 2, 3]]));
        let h = crate::connection_matrix::homology(k).unwrap();
        assert_eq!(h.size_in_dimension(0), 1);
        for d in 1..=3 {
            assert_eq!(h.size_in_dimension(d), 0);
        }
    }
}
