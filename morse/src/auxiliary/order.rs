//! The order complex of a complex's face poset (§9B): a simplicial complex
//! whose simplices are chains `c0 > c1 > ... > ck` of strictly decreasing
//! faces, i.e. the barycentric subdivision.

use crate::chain::Chain;
use crate::complex::Complex;

use super::simplicial::{Simplex, SimplicialComplex};

/// Builds the order complex of `c` by enumerating every maximal chain in
/// the face poset (cell, then a face of it, then a face of that, down to a
/// cell with empty boundary) and handing the result to
/// [`SimplicialComplex::new`], which takes care of filling in every shorter
/// sub-chain as a face.
///
/// Uses `boundary` (the cancelling Chain), not raw `column`, to descend:
/// the former is what decides whether a cell has any faces left, and for
/// some complexes (e.g. a degenerate cubical wrap) a cell's raw column can
/// be nonempty while its boundary chain cancels to zero.
pub fn order_complex(c: &dyn Complex) -> SimplicialComplex {
    let mut chains: Vec<Simplex> = Vec::new();
    for i in c.cells() {
        let mut work_stack: Vec<Simplex> = vec![vec![i]];
        while let Some(chain) = work_stack.pop() {
            let v = *chain.last().unwrap();
            let bd: Chain = c.boundary(&Chain::single(v));
            if bd.is_empty() {
                chains.push(chain);
            } else {
                for u in bd.iter() {
                    let mut extended = chain.clone();
                    extended.push(u);
                    work_stack.push(extended);
                }
            }
        }
    }
    SimplicialComplex::new(&chains)
}
