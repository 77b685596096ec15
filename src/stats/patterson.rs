//! Patterson's F2/F3/F4 statistics: allele-frequency-difference admixture
//! tests over two, three, and four populations.
//!
//! Implements the unbiased (sample-size-corrected) estimators from
//! Patterson et al. (2012), "Ancient Admixture in Human History", summed
//! over every allelic state observed at a site rather than just the one
//! the biallelic fast path calls "derived" — for a genuinely biallelic site
//! the ancestral and derived terms are equal by construction, so summing
//! both and halving reproduces the classical two-allele formula exactly.

use crate::error::{Result, SfkitError};
use crate::frequencies::{AlleleFrequencies, SiteFrequencies};
use crate::samples::Count;
use crate::sequence::AllelicState;

fn require_heterozygosity_sample_size(n: Count) -> Result<()> {
    if n < 2 {
        return Err(SfkitError::AlgorithmicPrecondition {
            detail: format!("heterozygosity correction needs at least 2 samples, got {n}"),
        });
    }
    Ok(())
}

fn freq(derived: Count, n: Count) -> f64 {
    if n == 0 {
        0.0
    } else {
        derived as f64 / n as f64
    }
}

/// Unbiased per-site heterozygosity correction term, Patterson et al. (2012)
/// eq. 10. Caller must have already checked `n >= 2`.
fn het(p: f64, n: Count) -> f64 {
    p * (1.0 - p) / (n as f64 - 1.0)
}

/// Every distinct allelic state observed at a site — for `BiAllelic` this is
/// always exactly the ancestral and derived states, so the biallelic fast
/// path never has to build a `HashMap` just to iterate two entries.
fn states_at<const N: usize>(site: &SiteFrequencies<N>) -> Vec<AllelicState> {
    match site {
        SiteFrequencies::BiAllelic { ancestral_state, derived_state, .. } => vec![*ancestral_state, *derived_state],
        SiteFrequencies::MultiAllelic { counts } => counts.keys().copied().collect(),
    }
}

/// F2(A, B) = E[(p_A - p_B)^2] - bias correction, summed across sites.
pub fn f2<const N: usize>(freqs: AlleleFrequencies<'_, N>, lane_a: usize, lane_b: usize, n_a: Count, n_b: Count) -> Result<f64> {
    require_heterozygosity_sample_size(n_a)?;
    require_heterozygosity_sample_size(n_b)?;

    let mut total = [0 as Count; N];
    total[lane_a] = n_a;
    total[lane_b] = n_b;

    let mut sum = 0.0;
    for site in freqs {
        let mut site_sum = 0.0;
        for state in states_at(&site) {
            let counts = site.count_of(state, total);
            let pa = freq(counts[lane_a], n_a);
            let pb = freq(counts[lane_b], n_b);
            site_sum += (pa - pb).powi(2) - het(pa, n_a) - het(pb, n_b);
        }
        sum += site_sum / 2.0;
    }
    Ok(sum)
}

/// F3(C; A, B) = E[(p_C - p_A)(p_C - p_B)] - bias correction for C, summed
/// across sites — tests whether C is admixed between A and B.
pub fn f3<const N: usize>(
    freqs: AlleleFrequencies<'_, N>,
    lane_c: usize,
    lane_a: usize,
    lane_b: usize,
    n_c: Count,
    n_a: Count,
    n_b: Count,
) -> Result<f64> {
    require_heterozygosity_sample_size(n_c)?;

    let mut total = [0 as Count; N];
    total[lane_c] = n_c;
    total[lane_a] = n_a;
    total[lane_b] = n_b;

    let mut sum = 0.0;
    for site in freqs {
        let mut site_sum = 0.0;
        for state in states_at(&site) {
            let counts = site.count_of(state, total);
            let pc = freq(counts[lane_c], n_c);
            let pa = freq(counts[lane_a], n_a);
            let pb = freq(counts[lane_b], n_b);
            site_sum += (pc - pa) * (pc - pb) - het(pc, n_c);
        }
        sum += site_sum / 2.0;
    }
    Ok(sum)
}

/// F4(A, B; C, D) = E[(p_A - p_B)(p_C - p_D)], summed across sites — no
/// bias correction needed since the two differences involve disjoint pairs.
pub fn f4<const N: usize>(
    freqs: AlleleFrequencies<'_, N>,
    lane_a: usize,
    lane_b: usize,
    lane_c: usize,
    lane_d: usize,
    n_a: Count,
    n_b: Count,
    n_c: Count,
    n_d: Count,
) -> f64 {
    let mut total = [0 as Count; N];
    total[lane_a] = n_a;
    total[lane_b] = n_b;
    total[lane_c] = n_c;
    total[lane_d] = n_d;

    let mut sum = 0.0;
    for site in freqs {
        let mut site_sum = 0.0;
        for state in states_at(&site) {
            let counts = site.count_of(state, total);
            let pa = freq(counts[lane_a], n_a);
            let pb = freq(counts[lane_b], n_b);
            let pc = freq(counts[lane_c], n_c);
            let pd = freq(counts[lane_d], n_d);
            site_sum += (pa - pb) * (pc - pd);
        }
        sum += site_sum / 2.0;
    }
    sum
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::compress_dag;
    use crate::config::BuildConfig;
    use crate::ids::SampleSet;
    use crate::reader::fixtures::SingleTreeFixture;
    use crate::reader::MutationRecord;
    use crate::samples::from_dag;

    fn split_reader() -> SingleTreeFixture {
        SingleTreeFixture {
            num_samples: 4,
            postorder: vec![0, 1, 4, 2, 3, 5, 6],
            children: vec![(4, vec![0, 1]), (5, vec![2, 3]), (6, vec![4, 5])],
            root: 6,
            ancestral: vec![0],
            mutations: vec![vec![MutationRecord { site: 0, node: 4, derived_state: 1, parent_mutation: None }]],
        }
    }

    #[test]
    fn f4_is_zero_when_populations_identical() {
        let reader = split_reader();
        let config = BuildConfig::default();
        let (forest, seq) = compress_dag(&reader, &config).unwrap();
        let mut a = SampleSet::new(4);
        a.add(0);
        let b = a.clone();
        let mut c = SampleSet::new(4);
        c.add(2);
        let d = c.clone();
        let accessor = from_dag(&forest, [&a, &b, &c, &d]);
        let freqs = AlleleFrequencies::new(&seq, &accessor);
        let v = f4(freqs, 0, 1, 2, 3, 1, 1, 1, 1);
        assert_eq!(v, 0.0);
    }

    #[test]
    fn f2_is_positive_for_divergent_populations() {
        let reader = split_reader();
        let config = BuildConfig::default();
        let (forest, seq) = compress_dag(&reader, &config).unwrap();
        let mut a = SampleSet::new(4);
        a.add(0);
        a.add(1);
        let mut b = SampleSet::new(4);
        b.add(2);
        b.add(3);
        let accessor = from_dag(&forest, [&a, &b]);
        let freqs = AlleleFrequencies::new(&seq, &accessor);
        let v = f2(freqs, 0, 1, a.popcount(), b.popcount()).unwrap();
        assert!(v > 0.0, "got {v}");
    }

    #[test]
    fn f2_rejects_sample_sets_smaller_than_two() {
        let reader = split_reader();
        let config = BuildConfig::default();
        let (forest, seq) = compress_dag(&reader, &config).unwrap();
        let mut a = SampleSet::new(4);
        a.add(0);
        let mut b = SampleSet::new(4);
        b.add(2);
        let accessor = from_dag(&forest, [&a, &b]);
        let freqs = AlleleFrequencies::new(&seq, &accessor);
        let result = f2(freqs, 0, 1, a.popcount(), b.popcount());
        assert!(matches!(result, Err(SfkitError::AlgorithmicPrecondition { .. })));
    }

    #[test]
    fn f3_rejects_target_population_smaller_than_two() {
        let reader = split_reader();
        let config = BuildConfig::default();
        let (forest, seq) = compress_dag(&reader, &config).unwrap();
        let mut c = SampleSet::new(4);
        c.add(0);
        let mut a = SampleSet::new(4);
        a.add(1);
        let mut b = SampleSet::new(4);
        b.add(2);
        b.add(3);
        let accessor = from_dag(&forest, [&c, &a, &b]);
        let freqs = AlleleFrequencies::new(&seq, &accessor);
        let result = f3(freqs, 0, 1, 2, c.popcount(), a.popcount(), b.popcount());
        assert!(matches!(result, Err(SfkitError::AlgorithmicPrecondition { .. })));
    }
}
