//! F_ST between two sample sets, expressed in terms of within- and
//! between-population diversity: `1 - 2(pi_a + pi_b) / (pi_a + 2*d_ab + pi_b)`.

/// Takes already-computed per-population diversities (`pi_a`, `pi_b`) and
/// the divergence between them (`d_ab`) — all three summed over the same
/// sites, from [`super::diversity::diversity`] / [`super::divergence::divergence`].
/// Returns `None` when the denominator is zero (no variation anywhere).
pub fn fst(pi_a: f64, pi_b: f64, d_ab: f64) -> Option<f64> {
    let numerator = pi_a + pi_b;
    let denominator = pi_a + 2.0 * d_ab + pi_b;
    if denominator == 0.0 {
        return None;
    }
    Some(1.0 - 2.0 * numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_populations_have_zero_fst() {
        assert_eq!(fst(0.5, 0.5, 0.5), Some(0.0));
    }

    #[test]
    fn fully_diverged_populations_approach_one() {
        let f = fst(0.0, 0.0, 1.0).unwrap();
        assert!((f - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zero_everywhere_is_undefined() {
        assert_eq!(fst(0.0, 0.0, 0.0), None);
    }
}
