//! Graded Morse reduction and its fixed-point iteration (§4.7, §4.9):
//! `morse_graded_complex` reduces a graded complex by one Morse step while
//! carrying the grade of each surviving critical cell; `connection_matrix`
//! iterates that until the cell count stops shrinking; `homology` is the
//! same iteration on the trivial (constant-zero) grading.

use std::sync::Arc;

use crate::chain::Chain;
use crate::complex::Complex;
use crate::error::Result;
use crate::grading::GradedComplex;
use crate::matching::{compute_matching, Matching};
use crate::morse_complex::MorseComplex;

/// One graded Morse reduction step (§4.7): builds the Morse complex for
/// `base`'s matching, then assigns each new cell the grade of any one base
/// cell in its `include` preimage (grade-preservation, §8 property 7,
/// guarantees every cell reachable via `include`/`lift` shares a grade).
pub fn morse_graded_complex(base: &GradedComplex, matching: Box<dyn Matching>) -> GradedComplex {
    let morse = Arc::new(MorseComplex::new(base.complex().clone(), matching));
    let base = base.clone();
    let morse_for_value = morse.clone();
    GradedComplex::new(morse, move |x| {
        let included = morse_for_value.include(&Chain::single(x));
        let representative = included.iter().next().expect("include(single cell) is never empty");
        base.value(representative)
    })
}

/// `morse_graded_complex` with the matching computed automatically. Fails
/// if `compute_matching` does (§7: a violated grading closure property or
/// internal invariant propagates here rather than panicking).
pub fn morse_graded_complex_auto(base: &GradedComplex) -> Result<GradedComplex> {
    let matching = compute_matching(base)?;
    Ok(morse_graded_complex(base, matching))
}

/// Iterates [`morse_graded_complex_auto`] until the complex's cell count
/// stops decreasing (§4.7's "connection-matrix driver"). Terminates in at
/// most `N` steps since every non-fixed-point iteration strictly shrinks
/// the complex.
pub fn connection_matrix(base: GradedComplex) -> Result<GradedComplex> {
    let mut current = base;
    let mut round = 0;
    loop {
        let next = morse_graded_complex_auto(&current)?;
        log::debug!("connection matrix round {round}: {} -> {} cells", current.complex().size(), next.complex().size());
        if next.complex().size() == current.complex().size() {
            return Ok(current);
        }
        current = next;
        round += 1;
    }
}

/// The full sequence of graded complexes visited on the way to the
/// connection-matrix fixed point, `[K0, K1, ..., Kfix]`.
pub fn connection_matrix_tower(base: GradedComplex) -> Result<Vec<GradedComplex>> {
    let mut tower = vec![base];
    loop {
        let last = tower.last().unwrap();
        let next = morse_graded_complex_auto(last)?;
        if next.complex().size() == last.complex().size() {
            break;
        }
        tower.push(next);
    }
    Ok(tower)
}

/// The ungraded analogue of [`connection_matrix`]: iterated Morse reduction
/// to a fixed point, on the constant-zero grading. Returns the reduced
/// complex, whose per-dimension cell counts are the Betti numbers of `base`
/// over Z/2Z.
pub fn homology(base: Arc<dyn Complex>) -> Result<Arc<dyn Complex>> {
    let graded = connection_matrix(GradedComplex::constant_zero(base))?;
    Ok(graded.complex().clone())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::cubical::CubicalComplex;

    #[rstest]
    #[case(vec![1], vec![1, 0])]
    #[case(vec![3], vec![1, 1])]
    #[case(vec![2, 2], vec![1, 0, 0])]
    #[case(vec![3, 3], vec![1, 2, 1])]
    fn cubical_complex_has_the_expected_betti_numbers(#[case] boxes: Vec<usize>, #[case] betti: Vec<usize>) {
        let base: Arc<dyn Complex> = Arc::new(CubicalComplex::new(boxes));
        let h = homology(base).unwrap();
        for (d, &expected) in betti.iter().enumerate() {
            assert_eq!(h.size_in_dimension(d), expected, "mismatch at dimension {d}");
        }
    }

    #[test]
    fn connection_matrix_tower_ends_at_the_same_fixed_point_as_connection_matrix() {
        let base: Arc<dyn Complex> = Arc::new(CubicalComplex::new(vec![3, 3]));
        let tower = connection_matrix_tower(GradedComplex::constant_zero(base.clone())).unwrap();
        let fixed = connection_matrix(GradedComplex::constant_zero(base)).unwrap();
        assert_eq!(tower.last().unwrap().complex().size(), fixed.complex().size());
        let one_more_step = morse_graded_complex_auto(tower.last().unwrap()).unwrap();
        assert_eq!(one_more_step.complex().size(), tower.last().unwrap().complex().size());
    }

    #[test]
    fn graded_filtration_preserves_cell_count_per_grade() {
        let base: Arc<dyn Complex> = Arc::new(CubicalComplex::new(vec![3, 3]));
        let dim = base.dimension();
        let top_begin = base.begin(dim);
        let value = crate::grading::construct_grading(base.clone(), move |v| ((v - top_begin) % 3) as i64);
        let graded = GradedComplex::new(base, value);
        let before = graded.count();
        let reduced = connection_matrix(graded).unwrap();
        let after = reduced.count();
        let total_before: usize = before.values().flatten().sum();
        let total_after: usize = after.values().flatten().sum();
        assert!(total_after <= total_before);
    }
}
