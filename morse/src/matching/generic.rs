//! Coreduction-by-boundary-count (§4.5): the general Morse matching
//! algorithm, usable on any complex. A cell with exactly one same-grade
//! boundary cell left unprocessed is *coreducible*; pairing it with that
//! boundary cell and reprocessing their cofaces drives the reduction until
//! every cell is either matched or a self-matched ace.

use std::collections::BTreeSet;

use parking_lot::Mutex;

use crate::chain::{Cell, Chain};
use crate::complex::Complex;
use crate::error::{MorseError, Result};
use crate::grading::GradedComplex;

use super::{CriticalCells, Matching};

pub struct GenericMatching {
    mate: Vec<Cell>,
    priority: Vec<i64>,
    critical: CriticalCells,
}

/// Mutable build state for one call to `GenericMatching::from_graded`.
/// Construction is single-threaded (§5); this is guarded by a `Mutex`
/// anyway so that `process` can take a single shared handle instead of five
/// separate `&mut` parameters, the way the teacher guards one-time build
/// state it hands to helper functions rather than threading it positionally.
struct Scratch {
    priority: Vec<i64>,
    boundary_count: Vec<usize>,
    coreducible: BTreeSet<Cell>,
    ace_candidates: BTreeSet<Cell>,
    num_processed: usize,
}

/// The same-grade boundary of `x`: boundary cells with `value == value(x)`.
/// The grading's closure property guarantees no boundary cell has a
/// strictly larger value; a grading that violates this is a contract
/// violation (§7), reported rather than asserted.
fn graded_boundary(graded: &GradedComplex, complex: &dyn Complex, x: Cell) -> Result<Chain> {
    let mut result = Chain::new();
    let x_val = graded.value(x);
    let mut violation = None;
    complex.column(x, &mut |y| {
        let y_val = graded.value(y);
        if y_val > x_val {
            violation.get_or_insert((y, y_val));
        } else if y_val == x_val {
            result.toggle(y);
        }
    });
    match violation {
        Some((face, face_value)) => Err(MorseError::GradingNotMonotone {
            cell: x,
            cell_value: x_val,
            face,
            face_value,
        }),
        None => Ok(result),
    }
}

fn graded_coboundary(graded: &GradedComplex, complex: &dyn Complex, x: Cell) -> Chain {
    let mut result = Chain::new();
    let x_val = graded.value(x);
    complex.row(x, &mut |y| {
        if graded.value(y) == x_val {
            result.toggle(y);
        }
    });
    result
}

/// Finalizes `y`: assigns it a priority (grade-major, construction-order
/// minor, as in the original), removes it from the worklists, and
/// decrements the boundary count of every same-grade coface.
fn process(y: Cell, graded: &GradedComplex, complex: &dyn Complex, n: usize, scratch: &Mutex<Scratch>) {
    let coboundary = graded_coboundary(graded, complex, y);
    let mut scratch = scratch.lock();

    scratch.priority[y] = graded.value(y) * n as i64 + scratch.num_processed as i64;
    scratch.num_processed += 1;
    scratch.coreducible.remove(&y);
    scratch.ace_candidates.remove(&y);

    for x in coboundary.iter() {
        scratch.boundary_count[x] -= 1;
        match scratch.boundary_count[x] {
            0 => {
                scratch.coreducible.remove(&x);
                scratch.ace_candidates.insert(x);
            }
            1 => {
                scratch.coreducible.insert(x);
            }
            _ => {}
        }
    }
}

impl GenericMatching {
    pub fn new(complex: std::sync::Arc<dyn Complex>) -> Result<Self> {
        Self::from_graded(&GradedComplex::constant_zero(complex))
    }

    /// Determinism policy (§5): both worklists are ordered sets, and every
    /// "pick one" step below takes the smallest index. This fixes the
    /// matching as a pure function of the graded complex.
    ///
    /// Fails with `MorseError::GradingNotMonotone` if `graded` violates the
    /// closure property (§7, a contract violation), or with
    /// `MorseError::InvariantViolation` if a coreducible cell or a
    /// should-be-nonempty ace worklist turns out empty (§7, an internal
    /// invariant failure in whatever `Complex` impl was handed to us).
    pub fn from_graded(graded: &GradedComplex) -> Result<Self> {
        let complex: &dyn Complex = graded.complex().as_ref();
        let n = complex.size();

        let mut mate = vec![Cell::MAX; n];
        let mut boundary_count = vec![0usize; n];
        let mut coreducible: BTreeSet<Cell> = BTreeSet::new();
        let mut ace_candidates: BTreeSet<Cell> = BTreeSet::new();

        for x in complex.cells() {
            boundary_count[x] = graded_boundary(graded, complex, x)?.len();
            match boundary_count[x] {
                0 => {
                    ace_candidates.insert(x);
                }
                1 => {
                    coreducible.insert(x);
                }
                _ => {}
            }
        }

        let scratch = Mutex::new(Scratch {
            priority: vec![0i64; n],
            boundary_count,
            coreducible,
            ace_candidates,
            num_processed: 0,
        });

        while scratch.lock().num_processed < n {
            let next_coreducible = scratch.lock().coreducible.iter().next().copied();
            if let Some(k) = next_coreducible {
                scratch.lock().coreducible.remove(&k);
                let bd_k = graded_boundary(graded, complex, k)?;
                let q = bd_k
                    .iter()
                    .filter(|&x| mate[x] == Cell::MAX)
                    .min()
                    .ok_or_else(|| {
                        MorseError::InvariantViolation(format!(
                            "coreducible cell {k} has no unmatched same-grade boundary cell"
                        ))
                    })?;
                if graded.value(k) != graded.value(q) {
                    return Err(MorseError::InvariantViolation(format!(
                        "matched cells {k} and {q} do not share a grade"
                    )));
                }
                mate[q] = k;
                mate[k] = q;
                process(q, graded, complex, n, &scratch);
                process(k, graded, complex, n, &scratch);
            } else {
                let a = scratch.lock().ace_candidates.iter().next().copied().ok_or_else(|| {
                    MorseError::InvariantViolation(
                        "no coreducible cell and no ace candidate: the complex has an unmatchable remainder"
                            .to_string(),
                    )
                })?;
                scratch.lock().ace_candidates.remove(&a);
                mate[a] = a;
                process(a, graded, complex, n, &scratch);
            }
        }

        let priority = scratch.into_inner().priority;

        let dim = complex.dimension();
        let mut begin = vec![0; dim + 2];
        let mut reindex = Vec::new();
        let mut idx = 0;
        for d in 0..=dim {
            begin[d] = idx;
            for v in complex.cells_in_dimension(d) {
                if mate[v] == v {
                    reindex.push((v, idx));
                    idx += 1;
                }
            }
        }
        begin[dim + 1] = idx;

        log::debug!(
            "generic matching on {n} cells produced {} critical cells",
            reindex.len()
        );

        Ok(Self { mate, priority, critical: CriticalCells { begin, reindex } })
    }
}

impl Matching for GenericMatching {
    fn mate(&self, x: Cell) -> Cell {
        self.mate[x]
    }

    fn priority(&self, x: Cell) -> i64 {
        self.priority[x]
    }

    fn critical_cells(&self) -> &CriticalCells {
        &self.critical
    }
}
