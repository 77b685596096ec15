//! Divergence: per-site probability that a random sample from one sample
//! set differs from a random sample from a second (disjoint or not), summed
//! across sites.

use crate::frequencies::{AlleleFrequencies, SiteFrequencies};
use crate::samples::Count;

/// `lane_a`/`lane_b` select which of the `N` sample sets inside each
/// [`SiteFrequencies`] row to compare; `n_a`/`n_b` are those sample sets'
/// sizes.
pub fn divergence<const N: usize>(freqs: AlleleFrequencies<'_, N>, lane_a: usize, lane_b: usize, n_a: Count, n_b: Count) -> f64 {
    let total_cross_pairs = n_a as u64 * n_b as u64;
    if total_cross_pairs == 0 {
        return 0.0;
    }
    let mut sum = 0.0f64;
    for site in freqs {
        let same_cross_pairs: u64 = match site {
            SiteFrequencies::BiAllelic { derived_count, .. } => {
                let da = derived_count[lane_a] as u64;
                let db = derived_count[lane_b] as u64;
                let aa = n_a as u64 - da;
                let ab = n_b as u64 - db;
                da * db + aa * ab
            }
            SiteFrequencies::MultiAllelic { counts } => {
                counts.values().map(|row| row[lane_a] as u64 * row[lane_b] as u64).sum()
            }
        };
        sum += (total_cross_pairs - same_cross_pairs) as f64 / total_cross_pairs as f64;
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

    #[test]
    fn disjoint_populations_full_divergence_when_allele_splits_them() {
        // mutation at node 4 covers samples {0,1} exactly — population A.
        let reader = SingleTreeFixture {
            num_samples: 4,
            postorder: vec![0, 1, 4, 2, 3, 5, 6],
            children: vec![(4, vec![0, 1]), (5, vec![2, 3]), (6, vec![4, 5])],
            root: 6,
            ancestral: vec![0],
            mutations: vec![vec![MutationRecord { site: 0, node: 4, derived_state: 1, parent_mutation: None }]],
        };
        let config = BuildConfig::default();
        let (forest, seq) = compress_dag(&reader, &config).unwrap();
        let _ = &forest;

        let mut pop_a = SampleSet::new(4);
        pop_a.add(0);
        pop_a.add(1);
        let mut pop_b = SampleSet::new(4);
        pop_b.add(2);
        pop_b.add(3);

        let accessor = from_dag(&forest, [&pop_a, &pop_b]);
        let freqs = AlleleFrequencies::new(&seq, &accessor);
        let d = divergence(freqs, 0, 1, 2, 2);
        assert!((d - 1.0).abs() < 1e-9, "every A/B cross-pair must differ: {d}");
    }
}
