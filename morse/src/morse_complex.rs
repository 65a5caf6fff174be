//! The Morse complex and its *flow* reduction (§4.7, §4.8): the chain
//! complex on critical cells, with boundaries transported from the base
//! complex by repeatedly canceling matched pairs.

use std::collections::{BinaryHeap, HashMap, HashSet};
use std::sync::Arc;

use once::OnceVec;

use crate::chain::{Cell, Chain};
use crate::complex::Complex;
use crate::error::Result;
use crate::matching::{compute_matching, Matching};

/// A cell ordered by its matching priority, for the max-heap in `flow`.
/// `BinaryHeap` is a max-heap, which is exactly the "highest priority
/// first" order `flow` needs — no inverted-comparator wrapper required.
#[derive(PartialEq, Eq)]
struct PrioritizedQueen {
    priority: i64,
    queen: Cell,
}

impl Ord for PrioritizedQueen {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.priority.cmp(&other.priority).then_with(|| self.queen.cmp(&other.queen))
    }
}

impl PartialOrd for PrioritizedQueen {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// The Morse complex built from a base complex and a matching on it: a
/// complex on critical ("ace") cells only, with `column`/`row` precomputed
/// once at construction by transporting the base boundary through `flow`.
pub struct MorseComplex {
    base: Arc<dyn Complex>,
    matching: Box<dyn Matching>,
    dimension: usize,
    begin: Vec<Cell>,
    /// new index -> original base cell index, for critical cells.
    include: Vec<Cell>,
    /// original base cell index -> new index, for critical cells only.
    project: HashMap<Cell, Cell>,
    boundary_table: Vec<Chain>,
    coboundary_table: Vec<Chain>,
}

impl MorseComplex {
    pub fn new(base: Arc<dyn Complex>, matching: Box<dyn Matching>) -> Self {
        let dimension = base.dimension();
        let critical = matching.critical_cells();
        let begin = critical.begin.clone();
        let size = *begin.last().unwrap();

        let mut include = vec![0 as Cell; size];
        let mut project = HashMap::with_capacity(size);
        for &(old, new) in &critical.reindex {
            include[new] = old;
            project.insert(old, new);
        }

        let mut morse = Self {
            base,
            matching,
            dimension,
            begin,
            include,
            project,
            boundary_table: Vec::new(),
            coboundary_table: Vec::new(),
        };

        // Appended once per ace in increasing index order and never
        // revisited, so the per-ace boundary table is built through a
        // `OnceVec` rather than a plain `Vec`.
        let boundary_table: OnceVec<Chain> = OnceVec::with_capacity(size);
        for ace in 0..size {
            let included = morse.include(&Chain::single(ace));
            let base_boundary = morse.base.boundary(&included);
            boundary_table.push(morse.lower(&base_boundary));
        }
        morse.boundary_table = boundary_table.into_vec();

        let mut coboundary_table = vec![Chain::new(); size];
        for ace in 0..size {
            for bd_cell in morse.boundary_table[ace].iter() {
                coboundary_table[bd_cell].toggle(ace);
            }
        }
        morse.coboundary_table = coboundary_table;

        morse
    }

    /// Computes a matching automatically (generic or cubical, whichever
    /// `compute_matching` picks) before building the reduction.
    pub fn from_base(base: Arc<dyn Complex>) -> Result<Self> {
        let graded = crate::grading::GradedComplex::constant_zero(base.clone());
        let matching = compute_matching(&graded)?;
        Ok(Self::new(base, matching))
    }

    pub fn base(&self) -> &Arc<dyn Complex> {
        &self.base
    }

    pub fn matching(&self) -> &dyn Matching {
        self.matching.as_ref()
    }

    /// Maps a chain of Morse-complex (ace) indices to the corresponding
    /// chain of base-complex cells.
    pub fn include(&self, c: &Chain) -> Chain {
        c.iter().map(|x| self.include[x]).collect()
    }

    /// Maps a chain of base-complex cells to Morse-complex indices,
    /// dropping any cell that is not an ace.
    pub fn project(&self, c: &Chain) -> Chain {
        c.iter().filter_map(|x| self.project.get(&x).copied()).collect()
    }

    /// Maps a chain of Morse-complex indices, as understood in the target
    /// reduced complex, back up to a base chain representing the same
    /// homology class (§8 property 10: `lower . lift == identity`).
    pub fn lift(&self, c: &Chain) -> Chain {
        let included = self.include(c);
        let (_, gamma) = self.flow(&self.base.boundary(&included));
        included.add_with(&gamma)
    }

    /// Maps a base chain down to the Morse complex by reducing it via
    /// `flow` and projecting the canonical part.
    pub fn lower(&self, c: &Chain) -> Chain {
        let (canonical, _) = self.flow(c);
        self.project(&canonical)
    }

    /// Reduces a base chain to `(canonical, gamma)` with
    /// `input = canonical + base.boundary(gamma)` (§8 property 9):
    /// `canonical` is supported on aces and still-unprocessed kings,
    /// `gamma` collects the kings whose cancellation was applied.
    ///
    /// Each queen is pushed to the heap at most once (`queens_seen` dedups
    /// at push time), but may be toggled in and out of `canonical` many
    /// times before its turn comes up; the `canonical.contains` check at
    /// pop time, not push time, is what decides whether it still needs
    /// cancelling. Priority order guarantees every such toggle happens
    /// before the queen's own pop, so that check sees the final state.
    pub fn flow(&self, input: &Chain) -> (Chain, Chain) {
        let mut canonical = Chain::new();
        let mut gamma = Chain::new();
        let mut queens_seen: HashSet<Cell> = HashSet::new();
        let mut heap: BinaryHeap<PrioritizedQueen> = BinaryHeap::new();

        let mut process = |x: Cell, canonical: &mut Chain, heap: &mut BinaryHeap<PrioritizedQueen>, queens_seen: &mut HashSet<Cell>| {
            if self.is_queen(x) && queens_seen.insert(x) {
                heap.push(PrioritizedQueen { priority: self.matching.priority(x), queen: x });
            }
            canonical.toggle(x);
        };

        for x in input.iter() {
            process(x, &mut canonical, &mut heap, &mut queens_seen);
        }

        let mut high_water = heap.len();

        while let Some(PrioritizedQueen { queen, .. }) = heap.pop() {
            if !canonical.contains(queen) {
                continue;
            }
            let king = self.matching.mate(queen);
            gamma.toggle(king);
            let mut boundary_of_king = Vec::new();
            self.base.column(king, &mut |x| boundary_of_king.push(x));
            for x in boundary_of_king {
                process(x, &mut canonical, &mut heap, &mut queens_seen);
            }
            high_water = high_water.max(heap.len());
        }

        log::trace!("flow heap high-water mark: {high_water}");

        (canonical, gamma)
    }

    fn is_queen(&self, x: Cell) -> bool {
        x < self.matching.mate(x)
    }
}

impl Complex for MorseComplex {
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

    fn boundary(&self, chain: &Chain) -> Chain {
        let mut result = Chain::new();
        for x in chain.iter() {
            result.add_assign_chain(&self.boundary_table[x]);
        }
        result
    }

    fn coboundary(&self, chain: &Chain) -> Chain {
        let mut result = Chain::new();
        for x in chain.iter() {
            result.add_assign_chain(&self.coboundary_table[x]);
        }
        result
    }
}

trait ChainExt {
    fn add_with(&self, other: &Chain) -> Chain;
}

impl ChainExt for Chain {
    fn add_with(&self, other: &Chain) -> Chain {
        let mut result = self.clone();
        result.add_assign_chain(other);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cubical::CubicalComplex;

    #[test]
    fn point_edge_complex_reduces_to_a_single_vertex() {
        let base: Arc<dyn Complex> = Arc::new(CubicalComplex::new(vec![1]));
        let morse = MorseComplex::from_base(base).unwrap();
        assert_eq!(morse.size(), 1);
        assert_eq!(morse.size_in_dimension(0), 1);
        assert_eq!(morse.size_in_dimension(1), 0);
    }

    #[test]
    fn disk_reduces_to_a_single_vertex() {
        let base: Arc<dyn Complex> = Arc::new(CubicalComplex::new(vec![2, 2]));
        let morse = MorseComplex::from_base(base).unwrap();
        assert_eq!(morse.size(), 1);
        assert_eq!(morse.size_in_dimension(0), 1);
    }

    #[test]
    fn lower_after_lift_is_identity_on_morse_chains() {
        let base: Arc<dyn Complex> = Arc::new(CubicalComplex::new(vec![3, 3]));
        let morse = MorseComplex::from_base(base).unwrap();
        for c in morse.cells() {
            let chain = Chain::single(c);
            let round_tripped = morse.lower(&morse.lift(&chain));
            assert_eq!(round_tripped, chain, "lower(lift(x)) != x at cell {c}");
        }
    }

    #[test]
    fn flow_decomposes_input_as_canonical_plus_boundary_of_gamma() {
        let base: Arc<dyn Complex> = Arc::new(CubicalComplex::new(vec![3, 3]));
        let morse = MorseComplex::from_base(base.clone()).unwrap();
        for x in base.cells() {
            let input = Chain::single(x);
            let (canonical, gamma) = morse.flow(&input);
            let reconstructed = canonical.add_with(&base.boundary(&gamma));
            assert_eq!(reconstructed, input, "flow decomposition failed at cell {x}");
        }
    }
}
