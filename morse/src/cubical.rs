//! The cubical complex (§3, §4.3): a D-dimensional product of `boxes[d]`
//! unit boxes with twisted-periodic wrap. Cells factor as `type * type_size
//! + position`; `column`/`row` and `topstar` exploit that arithmetic
//! directly instead of enumerating a boundary operator table.

use once::OnceVec;

use crate::chain::Cell;
use crate::complex::Complex;

/// A cubical complex on `boxes[0] x boxes[1] x ... x boxes[D-1]` unit
/// boxes, with the twisted-periodic wrap described in §3: stepping past the
/// far edge of the product wraps the *global* position modulo `type_size`,
/// not the individual coordinate modulo `boxes[d]`. This produces a fringe
/// layer (see [`CubicalComplex::rightfringe`]) that makes the wrap
/// algebraically consistent; callers that want the "real" complex restrict
/// to non-fringe cells.
pub struct CubicalComplex {
    boxes: Vec<usize>,
    /// `place_values[0] = 1`, `place_values[d+1] = place_values[d] * boxes[d]`.
    place_values: Vec<usize>,
    /// type -> shape, sorted so that types group by ascending popcount (dimension).
    shape_from_type: Vec<usize>,
    /// shape -> type, the inverse of `shape_from_type`.
    type_from_shape: Vec<usize>,
    /// Precomputed position offsets used by `topstar`, indexed by shape-extension bitmask.
    topstar_offset: Vec<i64>,
    /// `begin[d]` for d in `0..=dimension+1`, satisfying the `Complex` contract.
    begin: Vec<Cell>,
    type_size: usize,
    dimension: usize,
}

fn popcount(x: usize) -> usize {
    x.count_ones() as usize
}

impl CubicalComplex {
    /// Builds the complex that is `boxes[d]` boxes across in dimension `d`.
    /// `boxes` may be empty, giving the single-point complex.
    pub fn new(boxes: Vec<usize>) -> Self {
        let dimension = boxes.len();

        let mut place_values = vec![0usize; dimension + 1];
        place_values[0] = 1;
        for d in 0..dimension {
            place_values[d + 1] = place_values[d] * boxes[d];
        }
        let type_size = place_values[dimension];

        let num_types = 1usize << dimension;
        let mut shape_from_type: Vec<usize> = (0..num_types).collect();
        shape_from_type.sort_by_key(|&shape| popcount(shape));
        let mut type_from_shape = vec![0usize; num_types];
        for (ty, &shape) in shape_from_type.iter().enumerate() {
            type_from_shape[shape] = ty;
        }

        // types are stable-sorted by popcount, so counting how many types
        // land at each popcount and accumulating gives begin[] by a single
        // left-to-right pass; built with `OnceVec` since it is filled by
        // pushing the running total once per dimension, never revisited.
        let mut counts = vec![0usize; dimension + 1];
        for &shape in &shape_from_type {
            counts[popcount(shape)] += 1;
        }
        let begin_table: OnceVec<Cell> = OnceVec::with_capacity(dimension + 2);
        let mut cumulative = 0;
        for &count in &counts {
            begin_table.push(cumulative);
            cumulative += count * type_size;
        }
        begin_table.push(cumulative);
        let begin = begin_table.into_vec();

        let mut topstar_offset = vec![0i64; num_types];
        for (i, offset) in topstar_offset.iter_mut().enumerate() {
            for d in 0..dimension {
                if i & (1 << d) == 0 {
                    *offset -= place_values[d] as i64;
                }
            }
        }

        Self {
            boxes,
            place_values,
            shape_from_type,
            type_from_shape,
            topstar_offset,
            begin,
            type_size,
            dimension,
        }
    }

    pub fn boxes(&self) -> &[usize] {
        &self.boxes
    }

    pub fn type_size(&self) -> usize {
        self.type_size
    }

    pub fn num_types(&self) -> usize {
        self.shape_from_type.len()
    }

    /// Given a cell index, returns `(x_0, ..., x_{D-1})`.
    pub fn coordinates(&self, cell: Cell) -> Vec<usize> {
        let mut position = cell % self.type_size;
        let mut result = vec![0usize; self.dimension];
        for d in 0..self.dimension {
            result[d] = position % self.boxes[d];
            position /= self.boxes[d];
        }
        result
    }

    /// Builds a cell index from coordinates and a shape.
    pub fn cell_index(&self, coordinates: &[usize], shape: usize) -> Cell {
        let mut cell = 0usize;
        for d in (0..self.dimension).rev() {
            cell = cell * self.boxes[d] + coordinates[d];
        }
        cell + self.type_from_shape[shape] * self.type_size
    }

    pub fn cell_type(&self, cell: Cell) -> usize {
        cell / self.type_size
    }

    pub fn cell_shape(&self, cell: Cell) -> usize {
        self.shape_from_type[self.cell_type(cell)]
    }

    pub fn cell_position(&self, cell: Cell) -> usize {
        cell % self.type_size
    }

    pub fn cell_dim(&self, cell: Cell) -> usize {
        popcount(self.cell_shape(cell))
    }

    /// Bitmask with bit `d` set iff `cell`'s `d`-th coordinate is `0`.
    pub fn mincoords(&self, cell: Cell) -> usize {
        let coords = self.coordinates(cell);
        (0..self.dimension).fold(0, |acc, d| if coords[d] == 0 { acc | (1 << d) } else { acc })
    }

    /// Bitmask with bit `d` set iff `cell`'s `d`-th coordinate sits on the
    /// far edge of its box (`boxes[d] - 1`).
    pub fn maxcoords(&self, cell: Cell) -> usize {
        let coords = self.coordinates(cell);
        (0..self.dimension).fold(0, |acc, d| {
            if coords[d] == self.boxes[d] - 1 {
                acc | (1 << d)
            } else {
                acc
            }
        })
    }

    /// A cell is right-fringe if, for some dimension it has extent in, its
    /// coordinate there sits on the far edge of the box. Right-fringe cells
    /// exist only to make the twisted wrap consistent and are excluded from
    /// the acyclic interior by the cubical matching (§4.6).
    pub fn rightfringe(&self, cell: Cell) -> bool {
        self.cell_shape(cell) & self.maxcoords(cell) != 0
    }

    /// The mirror of [`CubicalComplex::rightfringe`]: a cell is left-fringe
    /// if, for some dimension it has extent in, its coordinate there sits on
    /// the near edge of the box.
    pub fn leftfringe(&self, cell: Cell) -> bool {
        self.cell_shape(cell) & self.mincoords(cell) != 0
    }

    /// All cells of the same shape whose closure contains a cell in the
    /// closure of `cell`: vary each dimension `cell` has extent in by one
    /// position, in both directions, with the same twisted wrap `column`
    /// and `row` use.
    pub fn parallelneighbors(&self, cell: Cell) -> Vec<Cell> {
        let shape = self.cell_shape(cell);
        let base = self.cell_type(cell) * self.type_size;
        let position = self.cell_position(cell);
        let mut result = Vec::new();
        for d in 0..self.dimension {
            if shape & (1 << d) == 0 {
                continue;
            }
            let pv = self.place_values[d];
            result.push(base + (position + pv) % self.type_size);
            result.push(base + (position + self.type_size - pv % self.type_size) % self.type_size);
        }
        result
    }

    pub(crate) fn place_values(&self) -> &[usize] {
        &self.place_values
    }

    pub(crate) fn type_from_shape(&self) -> &[usize] {
        &self.type_from_shape
    }

    pub(crate) fn shape_from_type(&self) -> &[usize] {
        &self.shape_from_type
    }
}

impl Complex for CubicalComplex {
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
        let shape = self.cell_shape(cell);
        let position = self.cell_position(cell);
        for d in 0..self.dimension {
            let bit = 1usize << d;
            if shape & bit == 0 {
                continue;
            }
            let face_type = self.type_from_shape[shape ^ bit];
            let base = face_type * self.type_size;
            cb(base + position);
            let right = (position + self.place_values[d]) % self.type_size;
            cb(base + right);
        }
    }

    fn row(&self, cell: Cell, cb: &mut dyn FnMut(Cell)) {
        let shape = self.cell_shape(cell);
        let position = self.cell_position(cell);
        for d in 0..self.dimension {
            let bit = 1usize << d;
            if shape & bit != 0 {
                continue;
            }
            let coface_type = self.type_from_shape[shape ^ bit];
            let base = coface_type * self.type_size;
            cb(base + position);
            let left = (position + self.type_size - self.place_values[d] % self.type_size)
                % self.type_size;
            cb(base + left);
        }
    }

    /// Closed-form top-dimensional star, avoiding the generic DFS (§4.3).
    fn topstar(&self, cell: Cell) -> Vec<Cell> {
        let shape = self.cell_shape(cell);
        let num_types = self.num_types();
        let x = self.cell_position(cell) as i64;
        let top_type = num_types - 1;
        let offset = (self.type_size * top_type) as i64;
        let type_size = self.type_size as i64;
        let mut result = Vec::new();
        for i in 0..num_types {
            if shape & !i == 0 {
                let pos = (x + self.topstar_offset[i] + type_size).rem_euclid(type_size);
                result.push((offset + pos) as Cell);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_box_has_a_vertex_and_an_edge() {
        let k = CubicalComplex::new(vec![1]);
        assert_eq!(k.dimension(), 1);
        assert_eq!(k.size(), 2);
        assert_eq!(k.size_in_dimension(0), 1);
        assert_eq!(k.size_in_dimension(1), 1);
    }

    #[test]
    fn empty_boxes_is_a_point() {
        let k = CubicalComplex::new(vec![]);
        assert_eq!(k.dimension(), 0);
        assert_eq!(k.size(), 1);
    }

    #[test]
    fn boundary_of_boundary_vanishes_on_a_square() {
        let k = CubicalComplex::new(vec![2, 2]);
        for c in k.cells() {
            let bd = k.boundary(&crate::chain::Chain::single(c));
            let bdbd = k.boundary(&bd);
            assert!(bdbd.is_empty(), "d^2 != 0 at cell {c}");
        }
    }

    #[test]
    fn row_is_transpose_of_column_on_a_cube() {
        let k = CubicalComplex::new(vec![2, 2, 2]);
        for i in k.cells() {
            let mut from_i = Vec::new();
            k.column(i, &mut |x| from_i.push(x));
            for &j in &from_i {
                let mut in_row = false;
                k.row(j, &mut |x| in_row |= x == i);
                assert!(in_row, "({i}, {j}) in column but not row");
            }
        }
    }

    #[test]
    fn cell_index_and_coordinates_round_trip() {
        let k = CubicalComplex::new(vec![3, 4]);
        for shape in 0..4 {
            for x in 0..3 {
                for y in 0..4 {
                    let cell = k.cell_index(&[x, y], shape);
                    assert_eq!(k.coordinates(cell), vec![x, y]);
                    assert_eq!(k.cell_shape(cell), shape);
                }
            }
        }
    }

    #[test]
    fn all_ones_top_cell_is_rightfringe() {
        let k = CubicalComplex::new(vec![3, 3]);
        let top_shape = k.num_types() - 1;
        let corner = k.cell_index(&[2, 2], top_shape);
        assert!(k.rightfringe(corner));
        let center = k.cell_index(&[0, 0], top_shape);
        assert!(!k.rightfringe(center));
    }

    #[test]
    fn corner_vertex_is_leftfringe_not_rightfringe() {
        let k = CubicalComplex::new(vec![3, 3]);
        let near_corner = k.cell_index(&[0, 0], 0b11);
        assert!(k.leftfringe(near_corner));
        assert!(!k.rightfringe(near_corner));

        let far_corner = k.cell_index(&[2, 2], 0b11);
        assert!(k.rightfringe(far_corner));
        assert!(!k.leftfringe(far_corner));
    }

    #[test]
    fn mincoords_and_maxcoords_agree_with_rightfringe() {
        let k = CubicalComplex::new(vec![3, 3]);
        for c in k.cells() {
            assert_eq!(k.rightfringe(c), k.cell_shape(c) & k.maxcoords(c) != 0);
            assert_eq!(k.leftfringe(c), k.cell_shape(c) & k.mincoords(c) != 0);
        }
    }

    #[test]
    fn parallelneighbors_of_an_edge_are_the_same_shape_one_step_away() {
        let k = CubicalComplex::new(vec![3, 3]);
        let edge = k.cell_index(&[1, 1], 0b01);
        let neighbors = k.parallelneighbors(edge);
        assert_eq!(neighbors.len(), 2);
        for &n in &neighbors {
            assert_eq!(k.cell_shape(n), k.cell_shape(edge));
            assert_ne!(n, edge);
        }
    }

    #[test]
    fn parallelneighbors_of_the_top_cell_has_two_per_dimension() {
        let k = CubicalComplex::new(vec![3, 3, 3]);
        let top_shape = k.num_types() - 1;
        let cell = k.cell_index(&[1, 1, 1], top_shape);
        let neighbors = k.parallelneighbors(cell);
        assert_eq!(neighbors.len(), 2 * k.dimension());
        for &n in &neighbors {
            assert_eq!(k.cell_shape(n), top_shape);
        }
    }

    #[test]
    fn topstar_of_vertex_matches_generic_star() {
        let k = CubicalComplex::new(vec![2, 2]);
        for c in k.cells_in_dimension(0) {
            let mut expected: Vec<Cell> = k.star(c).into_iter().filter(|&x| k.cell_dim(x) == k.dimension()).collect();
            let mut got = k.topstar(c);
            expected.sort_unstable();
            got.sort_unstable();
            assert_eq!(got, expected, "topstar mismatch at cell {c}");
        }
    }
}
